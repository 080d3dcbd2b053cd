//! `Renderer`: renders template strings, paths, files, and whole folders
//! against a [`template_model::RenderContext`].

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::value::Value as MiniValue;
use minijinja::Environment;
use template_model::{PathPolicy, RenderContext, RenderDecision, RenderReport};
use tracing::{debug, trace};

use crate::env_ops::EnvOps;
use crate::errors::Error;

/// What happened to one path during a folder render, for progress reporting.
#[derive(Debug, Clone)]
pub struct RenderedEntry {
    pub relpath: PathBuf,
    pub report: RenderReport,
}

/// A templating engine bound to one template's root and one
/// [`RenderContext`].
pub struct Renderer<'ctx> {
    env: Environment<'static>,
    context: &'ctx RenderContext,
    template_root: PathBuf,
    templates_suffix: String,
}

impl<'ctx> Renderer<'ctx> {
    /// Builds an engine whose loader is rooted at `template_root` (plus
    /// `extra_paths`), configured from `env_ops`, with `to_nice_yaml`
    /// registered as a filter.
    pub fn new(
        template_root: impl Into<PathBuf>,
        extra_paths: &[PathBuf],
        env_ops: &EnvOps,
        templates_suffix: impl Into<String>,
        context: &'ctx RenderContext,
    ) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.set_syntax(env_ops.syntax_config()?);
        env.set_undefined_behavior(env_ops.undefined_behavior());
        env.set_keep_trailing_newline(env_ops.keep_trailing_newline);
        env.set_trim_blocks(env_ops.trim_blocks);
        env.set_lstrip_blocks(env_ops.lstrip_blocks);
        env.add_filter("to_nice_yaml", to_nice_yaml);

        let template_root = template_root.into();
        let mut search_paths = vec![template_root.clone()];
        search_paths.extend(extra_paths.iter().cloned());
        env.set_loader(move |name| {
            for root in &search_paths {
                let candidate = root.join(name);
                if let Ok(contents) = fs::read_to_string(&candidate) {
                    return Ok(Some(contents));
                }
            }
            Ok(None)
        });

        Ok(Renderer {
            env,
            context,
            template_root,
            templates_suffix: templates_suffix.into(),
        })
    }

    fn context_value(&self) -> MiniValue {
        MiniValue::from_serialize(self.context.values())
    }

    /// Renders `s` as a one-off template string against the render context.
    pub fn render_string(&self, s: &str) -> Result<String, Error> {
        let rendered = self.env.render_str(s, self.context_value())?;
        Ok(rendered)
    }

    /// Renders each path segment of `relpath` as a template. If any segment
    /// renders to an empty string, returns `Ok(None)` to signal the whole
    /// path should be skipped. Strips `templates_suffix` from the final
    /// segment if present.
    pub fn render_path(&self, relpath: &Path) -> Result<Option<PathBuf>, Error> {
        let mut rendered = PathBuf::new();
        let segments: Vec<_> = relpath.components().collect();
        let last_index = segments.len().saturating_sub(1);

        for (index, component) in segments.iter().enumerate() {
            let segment = component.as_os_str().to_string_lossy();
            let mut rendered_segment = self.render_string(&segment)?;
            if rendered_segment.is_empty() {
                return Ok(None);
            }
            if index == last_index {
                if let Some(stripped) = rendered_segment.strip_suffix(&self.templates_suffix) {
                    rendered_segment = stripped.to_string();
                }
            }
            rendered.push(rendered_segment);
        }
        Ok(Some(rendered))
    }

    /// Renders one source file under `template_root` into `destination_root`,
    /// consulting `policy` for the write decision. Returns `None` when the
    /// rendered path was empty (skipped) or the policy denied the write.
    #[allow(clippy::too_many_arguments)]
    pub fn render_file(
        &self,
        src_abspath: &Path,
        destination_root: &Path,
        policy: &PathPolicy,
        force: bool,
        pretend: bool,
        mut confirm: impl FnMut(&Path) -> bool,
    ) -> Result<Option<RenderedEntry>, Error> {
        let src_relpath = src_abspath
            .strip_prefix(&self.template_root)
            .map_err(|_| Error::UnsafePath {
                reason: format!(
                    "{} is not under the template root",
                    src_abspath.display()
                ),
            })?;

        let Some(dst_relpath) = self.render_path(src_relpath)? else {
            trace!(path = %src_relpath.display(), "rendered path is empty, skipping");
            return Ok(None);
        };
        validate_safe_relpath(&dst_relpath)?;

        let is_template = src_abspath
            .file_name()
            .map(|n| n.to_string_lossy().ends_with(&self.templates_suffix))
            .unwrap_or(false);

        let contents = if is_template {
            let source = fs::read_to_string(src_abspath).map_err(|e| Error::Io {
                path: src_abspath.display().to_string(),
                source: e,
            })?;
            self.render_string(&source)?.into_bytes()
        } else {
            fs::read(src_abspath).map_err(|e| Error::Io {
                path: src_abspath.display().to_string(),
                source: e,
            })?
        };

        let decision = policy.render_allowed(&dst_relpath, false, Some(&contents), force, &mut confirm);
        let report = match decision {
            RenderDecision::Deny => {
                debug!(path = %dst_relpath.display(), "render denied");
                return Ok(None);
            }
            RenderDecision::Allow(report) => report,
        };

        if !pretend && report != RenderReport::Identical {
            let destination = destination_root.join(&dst_relpath);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::Io {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
            fs::write(&destination, &contents).map_err(|e| Error::Io {
                path: destination.display().to_string(),
                source: e,
            })?;
        }

        Ok(Some(RenderedEntry {
            relpath: dst_relpath,
            report,
        }))
    }

    /// Walks `src_root` (a directory under the template root) and renders
    /// every entry into `destination_root`.
    ///
    /// Returns every entry rendered before either finishing or hitting an
    /// error, paired with the outcome, so a caller can clean up whatever
    /// was already written on failure.
    pub fn render_folder(
        &self,
        src_root: &Path,
        destination_root: &Path,
        policy: &PathPolicy,
        force: bool,
        pretend: bool,
        mut confirm: impl FnMut(&Path) -> bool,
    ) -> (Vec<RenderedEntry>, Result<(), Error>) {
        let mut results = Vec::new();
        let outcome =
            self.render_folder_into(src_root, destination_root, policy, force, pretend, &mut confirm, &mut results);
        (results, outcome)
    }

    fn render_folder_into(
        &self,
        src_root: &Path,
        destination_root: &Path,
        policy: &PathPolicy,
        force: bool,
        pretend: bool,
        confirm: &mut dyn FnMut(&Path) -> bool,
        results: &mut Vec<RenderedEntry>,
    ) -> Result<(), Error> {
        let mut entries: Vec<_> = fs::read_dir(src_root)
            .map_err(|e| Error::Io {
                path: src_root.display().to_string(),
                source: e,
            })?
            .filter_map(|e| e.ok())
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| Error::Io {
                path: path.display().to_string(),
                source: e,
            })?;

            if file_type.is_dir() {
                let src_relpath = path.strip_prefix(&self.template_root).map_err(|_| Error::UnsafePath {
                    reason: format!("{} is not under the template root", path.display()),
                })?;
                let Some(dst_relpath) = self.render_path(src_relpath)? else {
                    continue;
                };
                validate_safe_relpath(&dst_relpath)?;

                let decision = policy.render_allowed(&dst_relpath, true, None, force, &mut *confirm);
                match decision {
                    RenderDecision::Deny => continue,
                    RenderDecision::Allow(report) => {
                        if !pretend {
                            let destination = destination_root.join(&dst_relpath);
                            fs::create_dir_all(&destination).map_err(|e| Error::Io {
                                path: destination.display().to_string(),
                                source: e,
                            })?;
                        }
                        results.push(RenderedEntry {
                            relpath: dst_relpath,
                            report,
                        });
                    }
                }
                self.render_folder_into(&path, destination_root, policy, force, pretend, confirm, results)?;
            } else {
                if let Some(rendered) = self.render_file(&path, destination_root, policy, force, pretend, &mut *confirm)? {
                    results.push(rendered);
                }
            }
        }
        Ok(())
    }
}

fn validate_safe_relpath(relpath: &Path) -> Result<(), Error> {
    if relpath.is_absolute() {
        return Err(Error::UnsafePath {
            reason: format!("{} is an absolute path", relpath.display()),
        });
    }
    for component in relpath.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(Error::UnsafePath {
                reason: format!("{} escapes the destination root", relpath.display()),
            });
        }
    }
    Ok(())
}

fn to_nice_yaml(value: MiniValue) -> Result<String, minijinja::Error> {
    let json_value: serde_json::Value = serde_json::to_value(&value)
        .map_err(|e| minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, e.to_string()))?;
    serde_yaml::to_string(&json_value)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, e.to_string()))
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
