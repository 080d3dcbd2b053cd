//! `Subproject`: an immutable view of a copy/update destination.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use answers_map::{COMMIT_KEY, SRC_PATH_KEY};
use serde_yaml::Value;
use tracing::{trace, warn};
use vcs_driver::VcsDriver;

use crate::template::Template;

#[cfg(test)]
#[path = "subproject_tests.rs"]
mod tests;

pub const DEFAULT_ANSWERS_RELPATH: &str = ".copier-answers.yml";

/// A destination directory, optionally holding a previously written answers
/// file from an earlier copy.
pub struct Subproject {
    local_path: PathBuf,
    answers_relpath: String,
    raw_answers: HashMap<String, Value>,
}

impl Subproject {
    /// Reads the answers file at `local_path/answers_relpath` if present.
    /// A missing or unreadable file is treated as empty, never an error.
    pub fn load(local_path: impl Into<PathBuf>, answers_relpath: Option<String>) -> Self {
        let local_path = local_path.into();
        let answers_relpath = answers_relpath.unwrap_or_else(|| DEFAULT_ANSWERS_RELPATH.to_string());
        let raw_answers = read_answers_file(&local_path, &answers_relpath);
        Subproject {
            local_path,
            answers_relpath,
            raw_answers,
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn answers_relpath(&self) -> &str {
        &self.answers_relpath
    }

    pub fn raw_answers(&self) -> &HashMap<String, Value> {
        &self.raw_answers
    }

    /// The subset of `raw_answers` retaining `_src_path`, `_commit`, and
    /// every key not starting with `_`. Never contains any other private
    /// key.
    pub fn last_answers(&self) -> HashMap<String, Value> {
        self.raw_answers
            .iter()
            .filter(|(key, _)| {
                key.as_str() == SRC_PATH_KEY || key.as_str() == COMMIT_KEY || !key.starts_with('_')
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// A Template synthesized from the recorded `_src_path`/`_commit`, if
    /// both are present.
    pub fn template(&self) -> Option<Template> {
        let src_path = self.raw_answers.get(SRC_PATH_KEY)?.as_str()?.to_string();
        let commit = self
            .raw_answers
            .get(COMMIT_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Some(Template::new(src_path, commit))
    }

    /// Whether `local_path` is a VCS root.
    pub fn vcs(&self, vcs: &dyn VcsDriver) -> crate::template::Vcs {
        if vcs.is_repo_root(&self.local_path) {
            crate::template::Vcs::Git
        } else {
            crate::template::Vcs::None
        }
    }

    /// Whether the working copy has uncommitted changes. `false` when the
    /// destination isn't a VCS root at all.
    pub fn is_dirty(&self, vcs: &dyn VcsDriver) -> bool {
        if !vcs.is_repo_root(&self.local_path) {
            return false;
        }
        vcs.is_dirty(&self.local_path).unwrap_or(false)
    }
}

fn read_answers_file(local_path: &Path, answers_relpath: &str) -> HashMap<String, Value> {
    let full_path = local_path.join(answers_relpath);
    let text = match std::fs::read_to_string(&full_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            trace!(path = %full_path.display(), "no prior answers file, starting empty");
            return HashMap::new();
        }
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "answers file unreadable, treating as empty");
            return HashMap::new();
        }
    };
    match serde_yaml::from_str::<HashMap<String, Value>>(&text) {
        Ok(map) => map,
        Err(e) => {
            warn!(path = %full_path.display(), error = %e, "answers file unparseable, treating as empty");
            HashMap::new()
        }
    }
}
