use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use labelprep::cli::{self, RemapLabelsArgs};
use labelprep::Utility;

fn main() -> Result<ExitCode> {
    let args = RemapLabelsArgs::parse();
    cli::execute::<RemapLabelsArgs>(Utility::RemapLabels, &args.input_folder, &args.common)
}
