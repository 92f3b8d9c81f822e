use anyhow::{bail, Result};
use catchmap::{attribute, read_layer, write_layer, write_table, Attribution, Crs, OverlayConfig};

use crate::cli::{Cli, OverlayArgs};

pub fn run(cli: &Cli, args: &OverlayArgs) -> Result<()> {
    let source = read_layer(&args.source)?;
    let target = read_layer(&args.target)?;

    let config = OverlayConfig {
        buffer_distance: args.buffer,
        simplify_tolerance: args.simplify,
        condition: !args.no_condition,
        clean_schema: !args.keep_scratch,
        area_crs: args.equal_area.then(Crs::conus_albers),
    };

    let records = match attribute(&source, &target, &args.key_field, &config)? {
        Attribution::Records(layer) => layer,
        Attribution::Skipped(skip) => bail!("cell skipped: {skip}"),
    };

    if cli.verbose > 0 {
        eprintln!("[overlay] {} intersection records", records.len());
    }

    write_layer(&records, &args.output)?;
    write_table(records.table(), &args.output.with_extension("csv"))?;
    Ok(())
}
