use std::fs;

use anyhow::{bail, Context, Result};
use catchmap::{all_states, run_batch, BatchConfig, Crs, LayerKind, OverlayConfig};

use crate::cli::{BatchArgs, Cli};

/// Parse "2010", "2007-2023", or a comma list of either.
fn parse_years(arg: &str) -> Result<Vec<i32>> {
    let mut years = Vec::new();
    for part in arg.split(',') {
        if let Some((lo, hi)) = part.split_once('-') {
            let (lo, hi) = (lo.trim().parse::<i32>()?, hi.trim().parse::<i32>()?);
            if lo > hi {
                bail!("invalid year range: {part}");
            }
            years.extend(lo..=hi);
        } else {
            years.push(part.trim().parse()?);
        }
    }
    Ok(years)
}

fn parse_kind(name: &str) -> Result<LayerKind> {
    match name.to_ascii_lowercase().as_str() {
        "county" | "counties" => Ok(LayerKind::County),
        "place" | "places" => Ok(LayerKind::Place),
        "subdivision" | "subdivisions" | "cousub" => Ok(LayerKind::Subdivision),
        other => bail!("unknown layer kind: {other}"),
    }
}

fn overlay_config(args: &BatchArgs) -> OverlayConfig {
    OverlayConfig {
        buffer_distance: args.buffer,
        simplify_tolerance: args.simplify,
        condition: !args.no_condition,
        area_crs: args.equal_area.then(Crs::conus_albers),
        ..OverlayConfig::default()
    }
}

pub fn run(cli: &Cli, args: &BatchArgs) -> Result<()> {
    let years = parse_years(&args.years)?;
    let states = if args.states.is_empty() {
        all_states().iter().map(|s| s.to_string()).collect()
    } else {
        args.states.clone()
    };
    let kinds = if args.kinds.is_empty() {
        vec![LayerKind::County, LayerKind::Place, LayerKind::Subdivision]
    } else {
        args.kinds.iter().map(|k| parse_kind(k)).collect::<Result<Vec<_>>>()?
    };

    let config = BatchConfig {
        base_dir: args.base_dir.clone(),
        years,
        states,
        kinds,
        overlay: overlay_config(args),
        merge_sources: args.merge_sources,
        verbose: cli.verbose,
    };

    let report = run_batch(&config);
    println!(
        "completed {} of {} keys ({} skipped, {} failed)",
        report.completed,
        report.total(),
        report.skipped(),
        report.failed.len(),
    );

    if let Some(path) = &args.report {
        fs::write(path, report.to_json()?)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> BatchArgs {
        BatchArgs {
            base_dir: "/data".into(),
            years: "2012".to_string(),
            states: Vec::new(),
            kinds: Vec::new(),
            merge_sources: false,
            buffer: 1e-4,
            simplify: 1e-4,
            no_condition: false,
            equal_area: false,
            report: None,
        }
    }

    #[test]
    fn year_ranges_and_lists_parse() {
        assert_eq!(parse_years("2012").unwrap(), vec![2012]);
        assert_eq!(parse_years("2007-2009").unwrap(), vec![2007, 2008, 2009]);
        assert_eq!(parse_years("2007,2010-2011").unwrap(), vec![2007, 2010, 2011]);
        assert!(parse_years("2010-2007").is_err());
        assert!(parse_years("yes").is_err());
    }

    #[test]
    fn conditioning_flags_reach_the_overlay_config() {
        let mut a = args();
        a.buffer = 0.5;
        a.simplify = 0.25;
        a.no_condition = true;
        a.equal_area = true;

        let config = overlay_config(&a);
        assert_eq!(config.buffer_distance, 0.5);
        assert_eq!(config.simplify_tolerance, 0.25);
        assert!(!config.condition);
        assert_eq!(config.area_crs.and_then(|c| c.epsg()), Some(5070));

        let config = overlay_config(&args());
        assert!(config.condition);
        assert!(config.area_crs.is_none());
    }
}
