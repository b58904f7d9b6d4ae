//! Download command - export a project as a SCORM archive.
//!
//! Shows one progress bar per phase (download, compression). Ctrl+C cancels
//! the session; nothing is written in that case.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clicrepo::catalog::load_project;
use clicrepo::session::{MSG_COMPRESSING, MSG_DOWNLOADING, MSG_READY};
use clicrepo::{DownloadSession, SessionState, SessionStatus};
use console::style;
use dialoguer::Confirm;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::info;

use super::common::format_size;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
pub struct DownloadArgs {
    pub path: String,
    pub out: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub force: bool,
}

/// Run the download command.
pub fn run(runner: &CliRunner, args: DownloadArgs) -> Result<(), CliError> {
    runner.log_startup("download");

    let mut config = runner.download_config();
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(CliError::Config(
                "--concurrency must be at least 1.".to_string(),
            ));
        }
        config = config.with_concurrency(concurrency);
    }

    let fetcher = runner.fetcher(&config)?;
    let base_url = runner.base_url()?;
    let project = runner.block_on(load_project(&*fetcher, &base_url, &args.path))?;

    let out_dir = args.out.unwrap_or_else(|| PathBuf::from("."));
    let target = out_dir.join(project.artifact_name());
    if target.exists() && !args.force && !confirm_overwrite(&target)? {
        println!("Skipped.");
        return Ok(());
    }

    println!(
        "Exporting {} ({} files, {} parallel downloads)",
        style(project.title().unwrap_or(&project.path)).bold(),
        project.files.len(),
        config.concurrency
    );

    let bars = ExportBars::new();
    let status_bars = bars.clone();
    let session = Arc::new(
        DownloadSession::new(fetcher, &config)
            .with_base_url(base_url)
            .with_status_callback(Arc::new(move |status: &SessionStatus| {
                status_bars.update(status)
            })),
    );

    let cancel_session = Arc::clone(&session);
    ctrlc::set_handler(move || {
        cancel_session.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let result = runner.block_on(session.start(&project));
    bars.finish();
    result?;

    match session.state() {
        SessionState::Ready(_) => {
            let artifact = session.download_artifact()?;
            let path = artifact
                .save_to(&out_dir)
                .map_err(|source| CliError::Write {
                    path: target.clone(),
                    source,
                })?;
            info!(path = %path.display(), entries = artifact.entries, "Archive saved");
            println!(
                "{} {} ({}, {} entries)",
                style("Saved").green().bold(),
                path.display(),
                format_size(artifact.len()),
                artifact.entries
            );
            Ok(())
        }
        SessionState::Cancelled => {
            println!("{}", style("Cancelled.").yellow());
            Err(CliError::Cancelled)
        }
        other => Err(CliError::Config(format!(
            "Export ended in unexpected state: {}",
            other
        ))),
    }
}

fn confirm_overwrite(target: &Path) -> Result<bool, CliError> {
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", target.display()))
        .default(false)
        .interact()
        .map_err(|e| {
            CliError::Config(format!(
                "Cannot ask for confirmation ({}). Use --force to overwrite.",
                e
            ))
        })
}

/// Download and compression progress bars.
#[derive(Clone)]
struct ExportBars {
    _multi: MultiProgress,
    download: ProgressBar,
    compress: ProgressBar,
}

impl ExportBars {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template("{prefix:>12} [{bar:40}] {pos:>3}% {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        let download = multi.add(ProgressBar::new(100));
        download.set_style(style.clone());
        download.set_prefix("Downloading");

        let compress = multi.add(ProgressBar::new(100));
        compress.set_style(style);
        compress.set_prefix("Compressing");

        Self {
            _multi: multi,
            download,
            compress,
        }
    }

    fn update(&self, status: &SessionStatus) {
        if status.error.is_some() {
            self.download.abandon();
            self.compress.abandon();
            return;
        }

        match status.message.as_str() {
            MSG_DOWNLOADING => {
                self.download.set_position(status.progress.into());
                self.download.set_message(status.status.clone());
            }
            MSG_COMPRESSING => {
                self.download.set_position(100);
                self.compress.set_position(status.progress.into());
                self.compress.set_message(status.status.clone());
            }
            MSG_READY => {
                self.download.set_position(100);
                self.compress.set_position(100);
            }
            _ => {}
        }
    }

    fn finish(&self) {
        if !self.download.is_finished() {
            self.download.finish_and_clear();
        }
        if !self.compress.is_finished() {
            self.compress.finish_and_clear();
        }
    }
}
