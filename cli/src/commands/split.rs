use anyhow::Result;
use catchmap::{read_layer, split_by_column, write_layer};

use crate::cli::{Cli, SplitArgs};

pub fn run(cli: &Cli, args: &SplitArgs) -> Result<()> {
    let layer = read_layer(&args.input)?;
    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer");

    for (key, group) in split_by_column(&layer, &args.column)? {
        let path = args.output.join(format!("{stem}_{key}.shp"));
        write_layer(&group, &path)?;
        if cli.verbose > 0 {
            eprintln!("[split] {key}: {} features -> {}", group.len(), path.display());
        }
    }
    Ok(())
}
