use anyhow::{bail, Context, Result};
use catchmap::{merge_directory, write_layer, IdRule};

use crate::cli::{Cli, MergeArgs};

pub fn run(cli: &Cli, args: &MergeArgs) -> Result<()> {
    let rule = IdRule::for_year(args.year);
    let Some(layer) = merge_directory(&args.input, rule)? else {
        bail!("input directory does not exist: {}", args.input.display());
    };

    if cli.verbose > 0 {
        eprintln!("[merge] {} regions from {}", layer.len(), args.input.display());
    }

    write_layer(&layer, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))
}
