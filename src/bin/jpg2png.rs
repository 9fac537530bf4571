use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use labelprep::cli::{self, Jpg2PngArgs};
use labelprep::Utility;

fn main() -> Result<ExitCode> {
    let args = Jpg2PngArgs::parse();
    cli::execute::<Jpg2PngArgs>(Utility::JpgToPng, &args.target_folder, &args.common)
}
