//! The copy/update pipeline: drives a [`Worker`] through template
//! resolution, questioning, rendering, and task execution.

mod errors;
mod questionnaire;
mod worker;

pub use errors::Error;
pub use questionnaire::{NoPromptQuestionnaire, Questionnaire, StdinQuestionnaire};
pub use worker::{Worker, WorkerConfig, WorkerState};
