use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error conditions raised while rendering a template string, path, file, or
/// folder, or while running a post-copy task.
#[derive(Error, Debug)]
pub enum Error {
    /// The templating engine rejected a template string or could not
    /// resolve a variable against the render context.
    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),

    /// A source path escaped the destination directory, either through a
    /// `..` component, an absolute path, or a rendered path segment that
    /// resolves outside the destination root.
    #[error("unsafe path: {reason}")]
    UnsafePath { reason: String },

    /// Reading or writing a file under the template or destination tree
    /// failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A post-copy or migration task exited non-zero, or could not be
    /// spawned at all.
    #[error("task failed: {command} (exit status {status})")]
    TaskFailed { command: String, status: i32 },

    #[error("task could not be started: {command}: {reason}")]
    TaskSpawnFailed { command: String, reason: String },
}
