//! `scaffold copy`: generate a fresh project from a template.

use std::path::PathBuf;

use clap::Args;
use render_engine::EnvOps;
use scaffold_core::{StdinQuestionnaire, Worker, WorkerConfig};
use serde_json::Value;
use vcs_driver::GitDriver;

use super::{data_args_to_map, parse_data_arg};
use crate::errors::Error;

#[cfg(test)]
#[path = "copy_cmd_tests.rs"]
mod tests;

/// Arguments for `scaffold copy <src> [dst]`.
#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Template source: a local path or a git URL.
    pub src_path: String,

    /// Destination directory. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub dst_path: PathBuf,

    /// Pre-answer a question: `--data name=value`. May be repeated.
    #[arg(short = 'd', long = "data", value_parser = parse_data_arg)]
    pub data: Vec<(String, Value)>,

    /// Overwrite existing files without asking.
    #[arg(long)]
    pub force: bool,

    /// Report what would be rendered without writing anything.
    #[arg(long)]
    pub pretend: bool,

    /// Suppress per-file and per-task progress output.
    #[arg(long)]
    pub quiet: bool,

    /// Render only this subdirectory of the template.
    #[arg(long)]
    pub subdirectory: Option<String>,

    /// Clone this ref/branch/tag instead of the template's default.
    #[arg(long = "vcs-ref")]
    pub vcs_ref: Option<String>,

    /// Answers-file name to write at the destination. Defaults to
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

pub fn execute(args: &CopyArgs) -> Result<(), Error> {
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
        src_path: Some(args.src_path.clone()),
        subdirectory: args.subdirectory.clone(),
        use_prereleases: args.use_prereleases,
        vcs_ref: args.vcs_ref.clone(),
        ..WorkerConfig::default()
    };

    let mut worker = Worker::new(config, &vcs, &mut questionnaire);
    worker.run_copy()?;
    Ok(())
}
