use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use labelprep::cli::{self, DownsampleArgs};
use labelprep::Utility;

fn main() -> Result<ExitCode> {
    let args = DownsampleArgs::parse();
    cli::execute::<DownsampleArgs>(Utility::Downsample, &args.input_folder, &args.common)
}
