//! `scaffold update`: bring an existing project forward to a newer template
//! revision.

use std::path::PathBuf;

use clap::Args;
use render_engine::EnvOps;
use scaffold_core::{StdinQuestionnaire, Worker, WorkerConfig};
use serde_json::Value;
use vcs_driver::GitDriver;

use super::{data_args_to_map, parse_data_arg};
use crate::errors::Error;

#[cfg(test)]
#[path = "update_cmd_tests.rs"]
mod tests;

/// Arguments for `scaffold update [dst]`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Destination directory to update. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub dst_path: PathBuf,

    /// Override an answer for this run: `--data name=value`. May be repeated.
    #[arg(short = 'd', long = "data", value_parser = parse_data_arg)]
    pub data: Vec<(String, Value)>,

    /// Overwrite existing files without asking.
    #[arg(long)]
    pub force: bool,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub pretend: bool,

    /// Suppress per-file and per-task progress output.
    #[arg(long)]
    pub quiet: bool,

    /// Update to this ref/branch/tag instead of the template's latest.
    #[arg(long = "vcs-ref")]
    pub vcs_ref: Option<String>,

    /// Answers-file name at the destination. Defaults to
    /// `.copier-answers.yml`.
    #[arg(long)]
    pub answers_file: Option<String>,

    /// Additional exclude patterns, on top of the template's own.
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Paths never overwritten once they exist.
    #[arg(long = "skip-if-exists")]
    pub skip_if_exists: Vec<String>,

    /// Allow matching against pre-release template versions.
    #[arg(long)]
    pub use_prereleases: bool,
}

pub fn execute(args: &UpdateArgs) -> Result<(), Error> {
    let vcs = GitDriver::new();
    let mut questionnaire = StdinQuestionnaire;

    let answers_file = args
        .answers_file
        .clone()
        .unwrap_or_else(|| template_model::DEFAULT_ANSWERS_RELPATH.to_string());

    let config = WorkerConfig {
        answers_file,
        data: data_args_to_map(&args.data),
        dst_path: args.dst_path.clone(),
        envops: EnvOps::default(),
        exclude: args.exclude.clone(),
        force: args.force,
        pretend: args.pretend,
        quiet: args.quiet,
        skip_if_exists: args.skip_if_exists.clone(),
        use_prereleases: args.use_prereleases,
        vcs_ref: args.vcs_ref.clone(),
        ..WorkerConfig::default()
    };

    let mut worker = Worker::new(config, &vcs, &mut questionnaire);
    worker.run_update()?;
    Ok(())
}
