//! Local Git operations used by the template engine's VCS driver contract.
//!
//! This crate provides the VCS driver contract: cloning a template,
//! describing its revision, checking whether a destination is a clean git
//! working copy, and the trio of operations the update pipeline needs to
//! reconstruct, diff, and replay a patch (`init`/`add`/`commit`, `fetch`,
//! `diff_tree`, `apply`).
//!
//! Read-mostly, libgit2-expressible operations go through [`git2`]. The two
//! operations libgit2 has no equivalent knob for — a diff with
//! `--inter-hunk-context`, and an apply that emits `.rej` sidecars for
//! hunks that don't apply — shell out to the `git` binary directly, the way
//! working-tree-mutating git operations are handled in the retrieved
//! `vibe-kanban` git client: libgit2 for graph reads, the CLI for anything
//! with CLI-only porcelain behavior.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;
use tracing::{debug, info, warn};

mod errors;
pub use errors::VcsError;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// A scratch clone produced by [`VcsDriver::clone`]. Owns the temporary
/// directory for its lifetime; the directory (and its contents) is removed
/// when this value is dropped, so a clone's lifetime is always scoped to
/// whatever created it.
pub struct ScratchClone {
    dir: TempDir,
}

impl ScratchClone {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// The VCS driver contract consumed by the template model and the update
/// pipeline.
pub trait VcsDriver {
    /// Clones `url` at `ref_` into a fresh scratch directory, returning its
    /// path. The directory is removed when the returned [`ScratchClone`] is
    /// dropped.
    fn clone(&self, url: &str, ref_: Option<&str>) -> Result<ScratchClone, VcsError>;

    /// A describe-like revision string for the repository at `path`,
    /// equivalent to `git describe --tags --always`.
    fn describe(&self, path: &Path) -> Result<String, VcsError>;

    /// Whether `path` is the root of a git working copy.
    fn is_repo_root(&self, path: &Path) -> bool;

    /// Recognizes `url` as a git repository locator (`https://`, `ssh://`,
    /// `git@host:path`, a `.git` suffix, or the `git+` scheme prefix some
    /// templates use) and returns its normalized form, stripping a leading
    /// `git+`. Returns `None` when `url` looks like a plain filesystem path.
    fn normalize_locator(&self, url: &str) -> Option<String>;

    /// Whether `path`'s working copy has uncommitted changes.
    fn is_dirty(&self, path: &Path) -> Result<bool, VcsError>;

    /// `git init` in `path`.
    fn init(&self, path: &Path) -> Result<(), VcsError>;

    /// `git add <pathspec>` in `path`.
    fn add(&self, path: &Path, pathspec: &str) -> Result<(), VcsError>;

    /// `git commit -m <message>`, with `allow_empty` controlling
    /// `--allow-empty` and `tolerate_failure` swallowing a non-zero exit
    /// (used when the first commit may fail because a hook reformatted
    /// files).
    fn commit(
        &self,
        path: &Path,
        message: &str,
        allow_empty: bool,
        tolerate_failure: bool,
    ) -> Result<(), VcsError>;

    /// `git fetch --depth=<depth> <remote> <ref>`, adding `remote` pointing
    /// at `remote_path` first if it isn't already configured.
    fn fetch(
        &self,
        path: &Path,
        remote_name: &str,
        remote_path: &Path,
        ref_: &str,
        depth: u32,
    ) -> Result<(), VcsError>;

    /// A unified diff between `old` and `new` revisions in `path`, trying
    /// `inter_hunk_context` first and falling back to `0` if the installed
    /// git rejects the flag.
    fn diff_tree(
        &self,
        path: &Path,
        old: &str,
        new: &str,
        inter_hunk_context: i32,
    ) -> Result<String, VcsError>;

    /// Applies `patch` in `path`. When `reject` is set, hunks that fail to
    /// apply are written as `.rej` sidecars instead of aborting the whole
    /// apply. `exclude_patterns` are passed through as `--exclude`.
    fn apply(
        &self,
        path: &Path,
        patch: &str,
        reject: bool,
        exclude_patterns: &[String],
    ) -> Result<(), VcsError>;
}

/// Default [`VcsDriver`] implementation: `git2` for reads, the `git` binary
/// for working-tree mutations libgit2 can't express.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitDriver;

impl GitDriver {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, path: &Path, args: &[&str]) -> Result<Output, VcsError> {
        debug!(?path, ?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .map_err(|_| VcsError::GitNotAvailable)
    }

    fn run_ok(&self, path: &Path, args: &[&str]) -> Result<(), VcsError> {
        let output = self.run(path, args)?;
        if output.status.success() {
            return Ok(());
        }
        Err(VcsError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl VcsDriver for GitDriver {
    fn clone(&self, url: &str, ref_: Option<&str>) -> Result<ScratchClone, VcsError> {
        let dir = TempDir::new().map_err(|e| VcsError::CloneFailed {
            url: url.to_string(),
            reason: format!("could not create scratch directory: {e}"),
        })?;

        info!(url, ?ref_, "cloning template");
        let repo = Repository::clone(url, dir.path()).map_err(|e| VcsError::CloneFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if let Some(reference) = ref_ {
            let (object, _) = repo
                .revparse_ext(reference)
                .map_err(|e| VcsError::CloneFailed {
                    url: url.to_string(),
                    reason: format!("could not resolve ref '{reference}': {e}"),
                })?;
            repo.checkout_tree(&object, None)
                .map_err(|e| VcsError::CloneFailed {
                    url: url.to_string(),
                    reason: format!("could not check out ref '{reference}': {e}"),
                })?;
        }

        Ok(ScratchClone { dir })
    }

    fn describe(&self, path: &Path) -> Result<String, VcsError> {
        let repo = Repository::open(path).map_err(|_| VcsError::NotARepo {
            path: path.display().to_string(),
        })?;
        let mut opts = git2::DescribeOptions::new();
        opts.describe_tags().show_commit_oid_as_fallback(true);
        let description = repo
            .describe(&opts)
            .map_err(|e| VcsError::GitOperation {
                operation: "describe".to_string(),
                reason: e.to_string(),
            })?
            .format(None)
            .map_err(|e| VcsError::GitOperation {
                operation: "describe".to_string(),
                reason: e.to_string(),
            })?;
        Ok(description)
    }

    fn is_repo_root(&self, path: &Path) -> bool {
        match Repository::open(path) {
            Ok(repo) => repo.workdir() == Some(path),
            Err(_) => false,
        }
    }

    fn normalize_locator(&self, url: &str) -> Option<String> {
        if let Some(stripped) = url.strip_prefix("git+") {
            return Some(stripped.to_string());
        }
        let looks_like_git = url.starts_with("https://")
            || url.starts_with("http://")
            || url.starts_with("ssh://")
            || url.starts_with("git://")
            || url.ends_with(".git")
            || (url.contains('@') && url.contains(':') && !url.starts_with('/'));
        looks_like_git.then(|| url.to_string())
    }

    fn is_dirty(&self, path: &Path) -> Result<bool, VcsError> {
        let repo = Repository::open(path).map_err(|_| VcsError::NotARepo {
            path: path.display().to_string(),
        })?;
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| VcsError::GitOperation {
                operation: "status".to_string(),
                reason: e.to_string(),
            })?;
        Ok(!statuses.is_empty())
    }

    fn init(&self, path: &Path) -> Result<(), VcsError> {
        Repository::init(path).map_err(|e| VcsError::GitOperation {
            operation: "init".to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn add(&self, path: &Path, pathspec: &str) -> Result<(), VcsError> {
        let repo = Repository::open(path).map_err(|_| VcsError::NotARepo {
            path: path.display().to_string(),
        })?;
        let mut index = repo.index().map_err(|e| VcsError::GitOperation {
            operation: "add".to_string(),
            reason: e.to_string(),
        })?;
        index
            .add_all([pathspec].iter(), IndexAddOption::DEFAULT, None)
            .map_err(|e| VcsError::GitOperation {
                operation: "add".to_string(),
                reason: e.to_string(),
            })?;
        index.write().map_err(|e| VcsError::GitOperation {
            operation: "add".to_string(),
            reason: e.to_string(),
        })
    }

    fn commit(
        &self,
        path: &Path,
        message: &str,
        allow_empty: bool,
        tolerate_failure: bool,
    ) -> Result<(), VcsError> {
        let result = (|| -> Result<(), VcsError> {
            let repo = Repository::open(path).map_err(|_| VcsError::NotARepo {
                path: path.display().to_string(),
            })?;
            let mut index = repo.index().map_err(|e| VcsError::GitOperation {
                operation: "commit".to_string(),
                reason: e.to_string(),
            })?;
            let tree_oid = index.write_tree().map_err(|e| VcsError::GitOperation {
                operation: "commit".to_string(),
                reason: e.to_string(),
            })?;
            let tree = repo.find_tree(tree_oid).map_err(|e| VcsError::GitOperation {
                operation: "commit".to_string(),
                reason: e.to_string(),
            })?;

            let parents: Vec<_> = match repo.head().and_then(|h| h.peel_to_commit()) {
                Ok(commit) => vec![commit],
                Err(_) => vec![],
            };
            if !allow_empty {
                if let Some(parent) = parents.first() {
                    if parent.tree_id() == tree_oid {
                        return Err(VcsError::GitOperation {
                            operation: "commit".to_string(),
                            reason: "nothing to commit".to_string(),
                        });
                    }
                }
            }

            let signature = Signature::now("Scaffolder", "scaffolder@example.invalid")
                .map_err(|e| VcsError::GitOperation {
                    operation: "commit".to_string(),
                    reason: e.to_string(),
                })?;
            let parent_refs: Vec<_> = parents.iter().collect();
            repo.commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .map_err(|e| VcsError::GitOperation {
                operation: "commit".to_string(),
                reason: e.to_string(),
            })?;
            Ok(())
        })();

        match result {
            Ok(()) => Ok(()),
            Err(e) if tolerate_failure => {
                warn!(error = %e, "commit failed, tolerating as configured");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn fetch(
        &self,
        path: &Path,
        remote_name: &str,
        remote_path: &Path,
        ref_: &str,
        depth: u32,
    ) -> Result<(), VcsError> {
        let remote_path_str = remote_path.display().to_string();
        // Adding the remote is allowed to fail if it already exists; only
        // the fetch itself is load-bearing.
        let _ = self.run(path, &["remote", "add", remote_name, &remote_path_str]);
        let depth_flag = format!("--depth={depth}");
        self.run_ok(path, &["fetch", &depth_flag, remote_name, ref_])
    }

    fn diff_tree(
        &self,
        path: &Path,
        old: &str,
        new: &str,
        inter_hunk_context: i32,
    ) -> Result<String, VcsError> {
        let range = format!("{old}...{new}");
        let context_flag = format!("--inter-hunk-context={inter_hunk_context}");
        let output = self.run(path, &["diff-tree", "--unified=1", &range, &context_flag])?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: "git diff-tree".to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn apply(
        &self,
        path: &Path,
        patch: &str,
        reject: bool,
        exclude_patterns: &[String],
    ) -> Result<(), VcsError> {
        if patch.trim().is_empty() {
            debug!("empty diff, nothing to apply");
            return Ok(());
        }

        let mut args: Vec<String> = vec!["apply".to_string()];
        if reject {
            args.push("--reject".to_string());
        }
        for pattern in exclude_patterns {
            args.push("--exclude".to_string());
            args.push(pattern.clone());
        }
        args.push("-".to_string());

        let mut command = Command::new("git");
        command
            .args(args.iter().map(String::as_str))
            .current_dir(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        let mut child = command.spawn().map_err(|_| VcsError::GitNotAvailable)?;
        {
            use std::io::Write;
            let mut stdin = child.stdin.take().expect("stdin was piped");
            stdin
                .write_all(patch.as_bytes())
                .map_err(|e| VcsError::GitOperation {
                    operation: "apply".to_string(),
                    reason: e.to_string(),
                })?;
        }
        let output = child.wait_with_output().map_err(|e| VcsError::GitOperation {
            operation: "apply".to_string(),
            reason: e.to_string(),
        })?;

        // `git apply --reject` exits non-zero when any hunk is rejected,
        // even though `.rej` sidecars were written successfully. Rejected
        // hunks are non-fatal; we only treat this as an error when
        // `reject` was not requested.
        if !output.status.success() && !reject {
            return Err(VcsError::CommandFailed {
                command: "git apply".to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        if !output.status.success() {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "some hunks were rejected during apply; see .rej files"
            );
        }
        Ok(())
    }
}

/// Convenience re-export so callers don't need to depend on `tempfile`
/// directly just to name the clone's path type.
pub fn scratch_path(clone: &ScratchClone) -> PathBuf {
    clone.path().to_path_buf()
}
