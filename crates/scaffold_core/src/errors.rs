use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors surfaced by a [`crate::Worker`] run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] template_model::Error),

    #[error(transparent)]
    Render(#[from] render_engine::Error),

    #[error(transparent)]
    Vcs(#[from] vcs_driver::VcsError),

    /// `run_update` was called against a destination with uncommitted
    /// changes.
    #[error("destination {path} has uncommitted changes")]
    DestinationDirty { path: String },

    /// `run_update` would move the destination backward: the old commit
    /// parses to a greater version than the new one.
    #[error("refusing to downgrade from {old} to {new}")]
    DowngradeRefused { old: String, new: String },

    /// Neither `src_path` nor a prior `_src_path` answer resolved to a
    /// usable template.
    #[error("no template could be located for this destination")]
    TemplateNotFound,

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
