//! `Template`: an immutable view of a template source.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_yaml::Value;
use tracing::debug;
use vcs_driver::{ScratchClone, VcsDriver};

use crate::config_document::{MigrationDescriptor, TaskDescriptor, TemplateConfigDocument};
use crate::errors::Error;

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The fixed `(url, ref)` pair a [`Template`] is constructed from. Every
/// other field is derived and cached on first use.
pub struct Template {
    url: String,
    git_ref: Option<String>,
    resolved: OnceLock<ResolvedTemplate>,
}

/// The full set of fields derived from a [`Template`]'s `(url, ref)` pair,
/// computed exactly once by [`Template::resolve`].
///
/// Holds the scratch clone (if any) for as long as the resolution is alive,
/// since `local_path` points inside it.
pub struct ResolvedTemplate {
    pub url_expanded: String,
    pub vcs: Vcs,
    pub local_path: PathBuf,
    pub commit: Option<String>,
    pub config: TemplateConfigDocument,
    pub default_answers: Vec<(String, Value)>,
    pub secret_questions: HashSet<String>,
    pub tasks: Vec<TaskDescriptor>,
    pub migrations: Vec<MigrationDescriptor>,
    pub templates_suffix: String,
    _scratch: Option<ScratchClone>,
}

/// Whether a template's local path is under version control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    None,
    Git,
}

impl Template {
    pub fn new(url: impl Into<String>, git_ref: Option<String>) -> Self {
        Template {
            url: url.into(),
            git_ref,
            resolved: OnceLock::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    /// Resolves and memoizes every derived field, cloning the template into
    /// a scratch directory via `vcs` if needed. Idempotent: subsequent calls
    /// return the cached result without touching `vcs` again.
    pub fn resolve(&self, vcs: &dyn VcsDriver) -> Result<&ResolvedTemplate, Error> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }
        let resolved = self.resolve_uncached(vcs)?;
        Ok(self.resolved.get_or_init(|| resolved))
    }

    fn resolve_uncached(&self, vcs: &dyn VcsDriver) -> Result<ResolvedTemplate, Error> {
        let url_expanded = vcs
            .normalize_locator(&self.url)
            .unwrap_or_else(|| self.url.clone());
        let is_vcs_locator = vcs.normalize_locator(&self.url).is_some();

        let as_path = Path::new(&url_expanded);
        let (kind, local_path, commit, scratch) = if is_vcs_locator && !vcs.is_repo_root(as_path) {
            debug!(url = %url_expanded, "cloning template source");
            let clone = vcs.clone(&url_expanded, self.git_ref.as_deref())?;
            let path = clone.path().to_path_buf();
            let commit = vcs.describe(&path).ok();
            (Vcs::Git, path, commit, Some(clone))
        } else if as_path.exists() && vcs.is_repo_root(as_path) {
            let commit = vcs.describe(as_path).ok();
            (Vcs::Git, as_path.to_path_buf(), commit, None)
        } else {
            if !as_path.exists() {
                return Err(Error::TemplateNotFound {
                    reason: format!("no usable path for template url '{}'", self.url),
                });
            }
            (Vcs::None, as_path.to_path_buf(), None, None)
        };

        let config = read_config_document(&local_path)?;

        if let Some(required) = config.min_version() {
            check_min_version(&required, CURRENT_VERSION)?;
        }

        let default_answers = config
            .questions
            .iter()
            .map(|q| (q.var_name.clone(), q.default.clone().unwrap_or(Value::Null)))
            .collect();

        let mut secret_questions: HashSet<String> =
            config.declared_secret_questions().into_iter().collect();
        for question in &config.questions {
            if question.secret {
                secret_questions.insert(question.var_name.clone());
            }
        }

        Ok(ResolvedTemplate {
            url_expanded,
            vcs: kind,
            local_path,
            commit,
            templates_suffix: config.templates_suffix(),
            tasks: config.tasks(),
            migrations: config.migrations(),
            default_answers,
            secret_questions,
            config,
            _scratch: scratch,
        })
    }
}

fn read_config_document(local_path: &Path) -> Result<TemplateConfigDocument, Error> {
    for name in ["copier.yml", "copier.yaml"] {
        let candidate = local_path.join(name);
        if candidate.is_file() {
            let text = std::fs::read_to_string(&candidate).map_err(|e| Error::ConfigUnreadable {
                reason: e.to_string(),
            })?;
            return TemplateConfigDocument::parse(&text);
        }
    }
    Ok(TemplateConfigDocument::empty())
}

/// Approximates PEP 440 ordering with `semver`, since no PEP 440 crate is
/// available; non-semver version strings are tolerated by skipping the
/// check rather than failing construction.
fn check_min_version(required: &str, actual: &str) -> Result<(), Error> {
    let required_semver = semver::Version::parse(&normalize_to_semver(required));
    let actual_semver = semver::Version::parse(&normalize_to_semver(actual));
    match (required_semver, actual_semver) {
        (Ok(required), Ok(actual)) if actual < required => Err(Error::MinVersionUnmet {
            required: required.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

fn normalize_to_semver(version: &str) -> String {
    let parts: Vec<&str> = version.splitn(3, '.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    }
}
