//! `PathPolicy`: exclude / skip-if-exists / conflict arbitration.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use unicode_normalization::UnicodeNormalization;

use crate::errors::Error;

/// What a conflict-arbitration decision should be reported as, once writing
/// is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReport {
    Create,
    Identical,
    Conflict,
}

/// The outcome of [`PathPolicy::render_allowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    Deny,
    Allow(RenderReport),
}

/// Exclude and skip-if-exists pattern sets, compiled once at construction
/// into git-wildmatch matchers (NFD-normalized first, matching `.gitignore`
/// semantics) so that every subsequent `render_allowed` call is an O(1)
/// lookup rather than a recompilation.
pub struct PathPolicy {
    destination_root: std::path::PathBuf,
    exclude: Gitignore,
    skip_if_exists: Gitignore,
}

impl PathPolicy {
    /// Builds the matchers from the template's declared `exclude`, any
    /// caller-supplied additional excludes, and `skip_if_exists` patterns.
    pub fn new(
        destination_root: impl Into<std::path::PathBuf>,
        template_exclude: &[String],
        extra_exclude: &[String],
        skip_if_exists: &[String],
    ) -> Result<Self, Error> {
        let mut all_exclude: Vec<&str> = Vec::with_capacity(template_exclude.len() + extra_exclude.len());
        all_exclude.extend(template_exclude.iter().map(String::as_str));
        all_exclude.extend(extra_exclude.iter().map(String::as_str));

        Ok(PathPolicy {
            destination_root: destination_root.into(),
            exclude: build_matcher(&all_exclude)?,
            skip_if_exists: build_matcher(&skip_if_exists.iter().map(String::as_str).collect::<Vec<_>>())?,
        })
    }

    /// Decides whether a render of `dst_relpath` should proceed.
    ///
    /// `dst_relpath` must be relative; passing an absolute path is a
    /// programming error. `expected_contents` is asserted absent when
    /// `is_dir` is set, since directories never have expected content.
    pub fn render_allowed(
        &self,
        dst_relpath: &Path,
        is_dir: bool,
        expected_contents: Option<&[u8]>,
        force: bool,
        mut confirm: impl FnMut(&Path) -> bool,
    ) -> RenderDecision {
        assert!(dst_relpath.is_relative(), "dst_relpath must be relative");
        assert!(
            !(is_dir && expected_contents.is_some()),
            "directories never have expected content"
        );

        if self.exclude.matched(dst_relpath, is_dir).is_ignore() {
            return RenderDecision::Deny;
        }

        let absolute = self.destination_root.join(dst_relpath);
        if self.skip_if_exists.matched(dst_relpath, is_dir).is_ignore() && absolute.exists() {
            return RenderDecision::Deny;
        }

        let Ok(metadata) = std::fs::symlink_metadata(&absolute) else {
            return RenderDecision::Allow(RenderReport::Create);
        };

        if metadata.is_dir() {
            if is_dir {
                return RenderDecision::Allow(RenderReport::Identical);
            }
            return if force || confirm(dst_relpath) {
                RenderDecision::Allow(RenderReport::Conflict)
            } else {
                RenderDecision::Deny
            };
        }

        let existing = std::fs::read(&absolute).unwrap_or_default();
        if Some(existing.as_slice()) == expected_contents {
            return RenderDecision::Allow(RenderReport::Identical);
        }

        if force || confirm(dst_relpath) {
            RenderDecision::Allow(RenderReport::Conflict)
        } else {
            RenderDecision::Deny
        }
    }
}

fn build_matcher(patterns: &[&str]) -> Result<Gitignore, Error> {
    let mut builder = GitignoreBuilder::new("/");
    for pattern in patterns {
        let normalized: String = pattern.nfd().collect();
        builder
            .add_line(None, &normalized)
            .map_err(|e| Error::ConfigInvalid {
                reason: format!("invalid exclude pattern '{pattern}': {e}"),
            })?;
    }
    builder.build().map_err(|e| Error::ConfigInvalid {
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "path_policy_tests.rs"]
mod tests;
