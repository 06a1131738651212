use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory holding groups.json, categories.json and locations.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Snapshot to extend and write
    #[arg(long, default_value = "../catalog.bin")]
    output: PathBuf,

    /// Ignore an existing snapshot and start from scratch
    #[arg(long)]
    fresh: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    process::load_catalog(&args.data_dir, &args.output, args.fresh)?;

    Ok(())
}
