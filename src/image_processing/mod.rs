pub mod batch;
pub mod codec;
pub mod convert;
pub mod label;
pub mod resize;

use console::style;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::utils::{
    create_progress_bar, display_name, failure_println, format_duration, has_listed_extension,
    info_println, success_println, verbose_println, warn_println,
};
use batch::{process_files_sequential, BatchReport, ErrorPolicy, FileOutcome};

/// The three dataset preparation tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    /// Halve resolution into a sibling `labels_2` folder
    Downsample,
    /// Rewrite 0/255 masks as 0/1 labels into a sibling `label` folder
    RemapLabels,
    /// Convert JPEG files to PNG in place
    JpgToPng,
}

impl Utility {
    /// Accepted extensions, in discovery order. Matching is case-sensitive.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Utility::Downsample => &["png", "jpg", "jpeg", "bmp", "tif", "tiff"],
            Utility::RemapLabels => &["png"],
            Utility::JpgToPng => &["jpg", "JPG"],
        }
    }

    /// Name of the sibling output folder, `None` for in-place tools
    pub fn output_dir_name(self) -> Option<&'static str> {
        match self {
            Utility::Downsample => Some("labels_2"),
            Utility::RemapLabels => Some("label"),
            Utility::JpgToPng => None,
        }
    }

    pub fn default_policy(self) -> ErrorPolicy {
        match self {
            Utility::Downsample | Utility::RemapLabels => ErrorPolicy::StopOnFirstError,
            Utility::JpgToPng => ErrorPolicy::ContinueOnError,
        }
    }

    /// Whether finding no input files is a usage error
    pub fn requires_matches(self) -> bool {
        !matches!(self, Utility::JpgToPng)
    }

    /// Whether per-file failures still let the process exit successfully
    pub fn best_effort(self) -> bool {
        matches!(self, Utility::JpgToPng)
    }

    /// Where the result for `input` is written
    pub fn output_path(self, input: &Path, output_dir: &Path) -> PathBuf {
        match self {
            Utility::Downsample | Utility::RemapLabels => match input.file_name() {
                Some(name) => output_dir.join(name),
                None => output_dir.to_path_buf(),
            },
            Utility::JpgToPng => convert::png_path_for(input),
        }
    }

    /// Apply this tool's transform to one file
    pub fn process_file(self, input: &Path, output_dir: &Path) -> Result<FileOutcome> {
        let output = self.output_path(input, output_dir);
        match self {
            Utility::Downsample => resize::downsample_file(input, &output)?,
            Utility::RemapLabels => label::remap_mask_file(input, &output)?,
            Utility::JpgToPng => {
                let written = convert::convert_jpeg_to_png(input)?;
                return Ok(FileOutcome {
                    input: input.to_path_buf(),
                    output: written,
                    removed_source: true,
                });
            }
        }

        Ok(FileOutcome {
            input: input.to_path_buf(),
            output,
            removed_source: false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub utility: Utility,
    pub policy: ErrorPolicy,
    pub verbose: bool,
}

impl ProcessingConfig {
    pub fn new(utility: Utility) -> Self {
        Self {
            utility,
            policy: utility.default_policy(),
            verbose: false,
        }
    }
}

/// How a run ended when it did not fail before processing
#[derive(Debug)]
pub enum RunOutcome {
    /// Discovery found nothing and the tool treats that as success
    NothingToDo,
    Completed(BatchReport),
}

/// `dirname(abspath(input_dir)) / name`
///
/// The input path is made absolute and normalized lexically, without
/// following symlinks, so `data/images/` and `data/./images` both give
/// `data/<name>`.
pub fn sibling_output_dir(input_dir: &Path, name: &str) -> Result<PathBuf> {
    let absolute = std::path::absolute(input_dir).map_err(|source| Error::Io {
        path: input_dir.to_path_buf(),
        source,
    })?;
    let normalized = normalize_lexically(&absolute);
    let parent = normalized.parent().unwrap_or(&normalized);
    Ok(parent.join(name))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Fail unless `input_dir` is an existing directory
    pub fn validate_input(&self, input_dir: &Path) -> Result<()> {
        if input_dir.is_dir() {
            Ok(())
        } else {
            Err(Error::MissingInputDir {
                path: input_dir.to_path_buf(),
            })
        }
    }

    /// Create the output folder if needed and return it.
    ///
    /// An existing folder is reused as is; nothing in it is removed. In-place
    /// tools get `input_dir` back.
    pub fn prepare_output_dir(&self, input_dir: &Path) -> Result<PathBuf> {
        let name = match self.config.utility.output_dir_name() {
            Some(name) => name,
            None => return Ok(input_dir.to_path_buf()),
        };

        let output_dir = sibling_output_dir(input_dir, name)?;
        if output_dir.is_dir() {
            info_println(&format!("output folder already exists: {}", output_dir.display()));
        } else {
            fs::create_dir_all(&output_dir).map_err(|source| Error::Io {
                path: output_dir.clone(),
                source,
            })?;
            info_println(&format!("created output folder: {}", output_dir.display()));
        }

        Ok(output_dir)
    }

    /// Discover the files to process directly inside `input_dir`.
    ///
    /// The listing is flat. Files are grouped by extension in the order the
    /// tool lists them and sorted by name within a group. Hidden files are
    /// skipped.
    pub fn discover_images(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        verbose_println(
            self.config.verbose,
            &format!("Scanning directory: {}", input_dir.display()),
        );

        let mut candidates = Vec::new();
        let walker = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input_dir).to_path_buf();
                Error::Io {
                    path,
                    source: e.into(),
                }
            })?;

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let path = entry.path();
            if !hidden && path.is_file() {
                candidates.push(path.to_path_buf());
            }
        }

        let mut image_files = Vec::new();
        for ext in self.config.utility.extensions() {
            image_files.extend(
                candidates
                    .iter()
                    .filter(|path| has_listed_extension(path, &[*ext]))
                    .cloned(),
            );
        }

        verbose_println(
            self.config.verbose,
            &format!("Found {} matching files", image_files.len()),
        );
        Ok(image_files)
    }

    /// Run the tool's transform over `files`, reporting each result
    pub fn process_batch(&self, files: &[PathBuf], output_dir: &Path) -> BatchReport {
        let utility = self.config.utility;
        let pb = create_progress_bar(files.len() as u64);

        let report = process_files_sequential(
            files,
            self.config.policy,
            |path| {
                pb.set_message(display_name(path));
                utility.process_file(path, output_dir)
            },
            |path, result| {
                pb.suspend(|| report_file(path, result));
                pb.inc(1);
            },
        );

        pb.finish_and_clear();
        report
    }

    /// Validate, prepare the output folder, discover and process.
    ///
    /// Returns `Err` only for failures that happen before any file is
    /// touched; per-file failures are recorded in the report.
    pub fn run(&self, input_dir: &Path) -> Result<RunOutcome> {
        self.validate_input(input_dir)?;
        let output_dir = self.prepare_output_dir(input_dir)?;
        let files = self.discover_images(input_dir)?;

        if files.is_empty() {
            let err = Error::NoMatchingFiles {
                dir: input_dir.to_path_buf(),
                extensions: self
                    .config
                    .utility
                    .extensions()
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            };
            if self.config.utility.requires_matches() {
                return Err(err);
            }
            info_println(&err.to_string());
            return Ok(RunOutcome::NothingToDo);
        }

        let report = self.process_batch(&files, &output_dir);
        self.print_summary(&report);
        Ok(RunOutcome::Completed(report))
    }

    /// Whether the process should exit successfully after `report`.
    ///
    /// A run stopped by [`ErrorPolicy::StopOnFirstError`] never succeeds, even
    /// for a best-effort utility.
    pub fn succeeded(&self, report: &BatchReport) -> bool {
        !report.aborted && (self.config.utility.best_effort() || !report.has_failures())
    }

    fn print_summary(&self, report: &BatchReport) {
        println!();
        println!(
            "{} {} of {} files processed, {} failed",
            style("Done:").bold(),
            report.completed.len(),
            report.total_files,
            report.failures.len()
        );

        if report.aborted && report.skipped > 0 {
            warn_println(&format!(
                "stopped after the first error, {} file(s) not processed",
                report.skipped
            ));
        }

        verbose_println(
            self.config.verbose,
            &format!(
                "Total time: {} (avg {} per file, {:.1}% success)",
                format_duration(report.duration),
                format_duration(report.average_duration()),
                report.success_rate()
            ),
        );
    }
}

fn report_file(path: &Path, result: &Result<FileOutcome>) {
    match result {
        Ok(outcome) if outcome.removed_source => {
            success_println(&format!(
                "converted {} -> {}",
                outcome.input.display(),
                outcome.output.display()
            ));
            success_println(&format!("removed {}", outcome.input.display()));
        }
        Ok(_) => success_println(&format!("processed {}", display_name(path))),
        Err(e) => failure_println(&format!("error processing {}: {}", display_name(path), e)),
    }
}
