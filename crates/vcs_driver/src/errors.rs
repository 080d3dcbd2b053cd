use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors surfaced by the VCS driver.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("clone of {url} failed: {reason}")]
    CloneFailed { url: String, reason: String },

    #[error("{path} is not a git repository")]
    NotARepo { path: String },

    #[error("git operation '{operation}' failed: {reason}")]
    GitOperation { operation: String, reason: String },

    #[error("git executable not found or not runnable")]
    GitNotAvailable,

    #[error("git command '{command}' exited with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },
}
