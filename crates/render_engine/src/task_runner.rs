//! `TaskRunner`: executes a template's post-copy and migration tasks.

use std::process::{Command, Stdio};

use template_model::{TaskCommand, TaskDescriptor};
use tracing::{info, warn};

use crate::errors::Error;

/// Runs a sequence of tasks in a working directory, setting `STAGE` in the
/// environment so a task can tell a post-copy run apart from a migration
/// `before`/`after` run.
pub struct TaskRunner {
    working_dir: std::path::PathBuf,
    quiet: bool,
}

impl TaskRunner {
    pub fn new(working_dir: impl Into<std::path::PathBuf>, quiet: bool) -> Self {
        TaskRunner {
            working_dir: working_dir.into(),
            quiet,
        }
    }

    /// Runs every task in order, stopping at the first failure.
    pub fn run_all(&self, tasks: &[TaskDescriptor], stage: &str) -> Result<(), Error> {
        let total = tasks.len();
        for (index, task) in tasks.iter().enumerate() {
            if !self.quiet {
                info!(index = index + 1, total, "running task");
            }
            self.run_one(task, stage)?;
        }
        Ok(())
    }

    fn run_one(&self, task: &TaskDescriptor, stage: &str) -> Result<(), Error> {
        let mut command = match &task.task {
            TaskCommand::Shell(script) => {
                let mut command = shell_command();
                command.arg(script);
                command
            }
            TaskCommand::Argv(argv) => {
                let Some((program, rest)) = argv.split_first() else {
                    return Ok(());
                };
                let mut command = Command::new(program);
                command.args(rest);
                command
            }
        };

        command
            .current_dir(&self.working_dir)
            .env("STAGE", stage)
            .envs(&task.extra_env)
            .stdin(Stdio::null());

        if self.quiet {
            command.stdout(Stdio::null());
        }

        let display = display_command(&task.task);
        let status = command.status().map_err(|e| Error::TaskSpawnFailed {
            command: display.clone(),
            reason: e.to_string(),
        })?;

        if !status.success() {
            warn!(command = %display, code = status.code(), "task exited non-zero");
            return Err(Error::TaskFailed {
                command: display,
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

#[cfg(unix)]
fn shell_command() -> Command {
    let mut command = Command::new("/bin/sh");
    command.arg("-c");
    command
}

#[cfg(not(unix))]
fn shell_command() -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C");
    command
}

fn display_command(task: &TaskCommand) -> String {
    match task {
        TaskCommand::Shell(script) => script.clone(),
        TaskCommand::Argv(argv) => argv.join(" "),
    }
}

#[cfg(test)]
#[path = "task_runner_tests.rs"]
mod tests;
