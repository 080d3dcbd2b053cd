//! The data model behind a scaffolding run: a `Template` source, a
//! `Subproject` destination, the config document each template declares,
//! the `PathPolicy` that arbitrates what gets written, and the
//! `RenderContext` each file is rendered against.

mod config_document;
mod errors;
mod path_policy;
mod render_context;
mod subproject;
mod template;

pub use config_document::{
    default_exclude, MigrationDescriptor, QuestionDescriptor, TaskCommand, TaskDescriptor,
    TemplateConfigDocument, DEFAULT_TEMPLATES_SUFFIX,
};
pub use errors::Error;
pub use path_policy::{PathPolicy, RenderDecision, RenderReport};
pub use render_context::{to_remember_answers, RenderContext};
pub use subproject::{Subproject, DEFAULT_ANSWERS_RELPATH};
pub use template::{ResolvedTemplate, Template, Vcs, CURRENT_VERSION};
