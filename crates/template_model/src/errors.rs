use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors surfaced while resolving a [`crate::Template`] or
/// [`crate::Subproject`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("template requires scaffolder >= {required}, this build is {actual}")]
    MinVersionUnmet { required: String, actual: String },

    #[error("could not locate a template: {reason}")]
    TemplateNotFound { reason: String },

    #[error("failed to read template configuration: {reason}")]
    ConfigUnreadable { reason: String },

    #[error("failed to parse template configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error(transparent)]
    Vcs(#[from] vcs_driver::VcsError),
}
