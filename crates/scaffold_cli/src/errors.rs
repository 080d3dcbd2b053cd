use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Scaffold(#[from] scaffold_core::Error),

    #[error("failed to flush the std out buffer")]
    StdOutFlushFailed,
}
