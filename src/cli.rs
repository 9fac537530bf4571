use anyhow::Result;
use clap::{Args, CommandFactory, Parser, ValueEnum};
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::error::{Error, ErrorKind};
use crate::image_processing::batch::ErrorPolicy;
use crate::image_processing::{ProcessingConfig, ProcessingEngine, RunOutcome, Utility};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OnError {
    /// Stop at the first file that fails
    #[value(name = "stop")]
    Stop,
    /// Report the failure and continue with the next file
    #[value(name = "continue")]
    Continue,
}

impl From<OnError> for ErrorPolicy {
    fn from(on_error: OnError) -> Self {
        match on_error {
            OnError::Stop => ErrorPolicy::StopOnFirstError,
            OnError::Continue => ErrorPolicy::ContinueOnError,
        }
    }
}

/// Options shared by every tool
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// What to do when a file fails [default: stop for downsample and
    /// remap-labels, continue for jpg2png]
    #[arg(long = "on-error", value_name = "POLICY")]
    pub on_error: Option<OnError>,

    /// Print scan and timing details
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn config(&self, utility: Utility) -> ProcessingConfig {
        ProcessingConfig {
            utility,
            policy: self
                .on_error
                .map(ErrorPolicy::from)
                .unwrap_or_else(|| utility.default_policy()),
            verbose: self.verbose,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "downsample",
    version,
    about = "Halve the resolution of every image in a folder",
    long_about = "Downsample every png/jpg/jpeg/bmp/tif/tiff image in INPUT_FOLDER by a factor of two \
using Lanczos resampling.\n\nResults are written under the same file name to a `labels_2` folder \
next to INPUT_FOLDER, which is created if missing. The run stops at the first failing image."
)]
pub struct DownsampleArgs {
    /// Folder containing the images to downsample
    #[arg(value_name = "INPUT_FOLDER")]
    pub input_folder: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(
    name = "remap-labels",
    version,
    about = "Turn 0/255 segmentation masks into 0/1 label images",
    long_about = "Rewrite every single-channel png mask in INPUT_FOLDER so that 255 becomes 1.\n\n\
Masks must contain only the values 0 and 255. Results are written to a `label` folder next to \
INPUT_FOLDER, which is created if missing. The run stops at the first invalid mask."
)]
pub struct RemapLabelsArgs {
    /// Folder containing the png masks
    #[arg(value_name = "INPUT_FOLDER")]
    pub input_folder: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(
    name = "jpg2png",
    version,
    about = "Convert the jpg files of a folder to png, replacing the originals",
    long_about = "Convert every .jpg/.JPG file in TARGET_FOLDER to a .png file with the same base \
name, then delete the jpg.\n\nA jpg is only deleted after its png was written. Failing files are \
reported and skipped; the command still exits successfully unless `--on-error stop` ended \
the run."
)]
pub struct Jpg2PngArgs {
    /// Folder whose jpg files are converted in place
    #[arg(value_name = "TARGET_FOLDER")]
    pub target_folder: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Exit status of a run whose files all went through
pub const EXIT_OK: u8 = 0;

/// Exit status when files failed or the run was stopped early
pub const EXIT_FILES_FAILED: u8 = 1;

/// Map a finished run to its exit status.
pub fn exit_status(engine: &ProcessingEngine, outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::NothingToDo => EXIT_OK,
        RunOutcome::Completed(report) if engine.succeeded(report) => EXIT_OK,
        RunOutcome::Completed(_) => EXIT_FILES_FAILED,
    }
}

/// Render a usage error the way clap renders a bad argument (exit status 2)
pub fn usage_error<C: CommandFactory>(err: &Error) -> clap::Error {
    C::command().error(clap::error::ErrorKind::ValueValidation, err.to_string())
}

/// Run `utility` over `folder` and map the result to a process exit code.
///
/// Usage errors (missing folder, nothing to process) go through clap so they
/// print like argument errors and exit with status 2.
pub fn execute<C: CommandFactory>(
    utility: Utility,
    folder: &Path,
    common: &CommonArgs,
) -> Result<ExitCode> {
    let engine = ProcessingEngine::new(common.config(utility));

    if engine.config().verbose {
        println!("{}", style(format!("labelprep {:?}", utility)).bold().blue());
        println!("  Input folder: {}", folder.display());
        println!("  Error policy: {:?}", engine.config().policy);
        println!();
    }

    match engine.run(folder) {
        Ok(outcome) => Ok(ExitCode::from(exit_status(&engine, &outcome))),
        Err(e) if e.kind() == ErrorKind::Usage => usage_error::<C>(&e).exit(),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to process folder {}", folder.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_processing::batch::{process_files_sequential, BatchReport, FileOutcome};

    /// Report for `names`, where every name containing "bad" fails
    fn report(names: &[&str], policy: ErrorPolicy) -> BatchReport {
        let files: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        process_files_sequential(
            &files,
            policy,
            |path| {
                if path.to_string_lossy().contains("bad") {
                    Err(Error::BandCount { bands: 3 })
                } else {
                    Ok(FileOutcome {
                        input: path.to_path_buf(),
                        output: path.with_extension("png"),
                        removed_source: false,
                    })
                }
            },
            |_, _| {},
        )
    }

    fn status(utility: Utility, policy: ErrorPolicy, outcome: RunOutcome) -> u8 {
        let engine = ProcessingEngine::new(ProcessingConfig {
            policy,
            ..ProcessingConfig::new(utility)
        });
        exit_status(&engine, &outcome)
    }

    #[test]
    fn test_parse_downsample() {
        let args = DownsampleArgs::try_parse_from(["downsample", "data/images"]).unwrap();
        assert_eq!(args.input_folder, PathBuf::from("data/images"));
        assert_eq!(args.common.on_error, None);
        assert!(!args.common.verbose);
    }

    #[test]
    fn test_parse_flags() {
        let args = Jpg2PngArgs::try_parse_from(["jpg2png", "-v", "--on-error", "stop", "photos"])
            .unwrap();
        assert_eq!(args.target_folder, PathBuf::from("photos"));
        assert_eq!(args.common.on_error, Some(OnError::Stop));
        assert!(args.common.verbose);
    }

    #[test]
    fn test_folder_is_required() {
        assert!(RemapLabelsArgs::try_parse_from(["remap-labels"]).is_err());
        assert!(
            RemapLabelsArgs::try_parse_from(["remap-labels", "--on-error", "maybe", "m"]).is_err()
        );
    }

    #[test]
    fn test_default_policies() {
        let common = CommonArgs::default();
        assert_eq!(
            common.config(Utility::Downsample).policy,
            ErrorPolicy::StopOnFirstError
        );
        assert_eq!(
            common.config(Utility::RemapLabels).policy,
            ErrorPolicy::StopOnFirstError
        );
        assert_eq!(
            common.config(Utility::JpgToPng).policy,
            ErrorPolicy::ContinueOnError
        );
    }

    #[test]
    fn test_policy_override() {
        let common = CommonArgs {
            on_error: Some(OnError::Continue),
            verbose: true,
        };
        let config = common.config(Utility::RemapLabels);
        assert_eq!(config.policy, ErrorPolicy::ContinueOnError);
        assert!(config.verbose);
    }

    #[test]
    fn test_commands_are_consistent() {
        DownsampleArgs::command().debug_assert();
        RemapLabelsArgs::command().debug_assert();
        Jpg2PngArgs::command().debug_assert();
    }

    #[test]
    fn test_exit_status_without_failures() {
        for utility in [Utility::Downsample, Utility::RemapLabels, Utility::JpgToPng] {
            let policy = utility.default_policy();
            assert_eq!(status(utility, policy, RunOutcome::NothingToDo), EXIT_OK);
            let clean = report(&["a.jpg", "b.jpg"], policy);
            assert_eq!(status(utility, policy, RunOutcome::Completed(clean)), EXIT_OK);
        }
    }

    #[test]
    fn test_exit_status_with_failures() {
        let stop = ErrorPolicy::StopOnFirstError;
        let cont = ErrorPolicy::ContinueOnError;

        let stopped = report(&["a.png", "bad.png", "c.png"], stop);
        assert_eq!(
            status(Utility::Downsample, stop, RunOutcome::Completed(stopped)),
            EXIT_FILES_FAILED
        );

        let continued = report(&["a.png", "bad.png", "c.png"], cont);
        assert_eq!(
            status(Utility::RemapLabels, cont, RunOutcome::Completed(continued)),
            EXIT_FILES_FAILED
        );
    }

    #[test]
    fn test_exit_status_jpg2png() {
        let cont = ErrorPolicy::ContinueOnError;
        let partial = report(&["bad.jpg", "b.jpg"], cont);
        assert_eq!(
            status(Utility::JpgToPng, cont, RunOutcome::Completed(partial)),
            EXIT_OK
        );

        let stop = ErrorPolicy::StopOnFirstError;
        let stopped = report(&["bad.jpg", "b.jpg"], stop);
        assert_eq!(
            status(Utility::JpgToPng, stop, RunOutcome::Completed(stopped)),
            EXIT_FILES_FAILED
        );
    }

    #[test]
    fn test_usage_error_exits_with_status_2() {
        let err = usage_error::<DownsampleArgs>(&Error::MissingInputDir {
            path: PathBuf::from("nowhere"),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("nowhere"));
    }
}
