//! `Worker`: drives one copy or update run end to end.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use answers_map::AnswersMap;
use render_engine::{EnvOps, Renderer, TaskRunner};
use serde_json::Value;
use template_model::{MigrationDescriptor, PathPolicy, RenderContext, Subproject, Template};
use tempfile::TempDir;
use tracing::warn;
use vcs_driver::VcsDriver;

use crate::errors::Error;
use crate::questionnaire::{NoPromptQuestionnaire, Questionnaire};

/// Configuration accepted by a [`Worker`].
pub struct WorkerConfig {
    pub answers_file: String,
    pub cleanup_on_error: bool,
    pub data: HashMap<String, Value>,
    pub dst_path: PathBuf,
    pub envops: EnvOps,
    pub exclude: Vec<String>,
    pub extra_paths: Vec<PathBuf>,
    pub force: bool,
    pub pretend: bool,
    pub quiet: bool,
    pub skip_if_exists: Vec<String>,
    pub src_path: Option<String>,
    pub subdirectory: Option<String>,
    pub use_prereleases: bool,
    pub vcs_ref: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            answers_file: template_model::DEFAULT_ANSWERS_RELPATH.to_string(),
            cleanup_on_error: false,
            data: HashMap::new(),
            dst_path: PathBuf::from("."),
            envops: EnvOps::default(),
            exclude: Vec::new(),
            extra_paths: Vec::new(),
            force: false,
            pretend: false,
            quiet: false,
            skip_if_exists: Vec::new(),
            src_path: None,
            subdirectory: None,
            use_prereleases: false,
            vcs_ref: None,
        }
    }
}

/// The run's progress, mirroring the worker's internal state machine.
/// Exposed for callers that want to report progress; not consulted by
/// `Worker` itself to gate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Resolved,
    Questioned,
    Rendered,
    TasksRun,
    Done,
    OldRendered,
    Diffed,
    DiffApplied,
    MigratedAfter,
}

/// Drives a single copy or update run. Not reused across runs: build a new
/// `Worker` per invocation.
pub struct Worker<'a> {
    config: WorkerConfig,
    vcs: &'a dyn VcsDriver,
    questionnaire: &'a mut dyn Questionnaire,
    state: WorkerState,
    subproject: Option<Subproject>,
    template: Option<Template>,
    answers: Option<AnswersMap>,
}

impl<'a> Worker<'a> {
    pub fn new(
        config: WorkerConfig,
        vcs: &'a dyn VcsDriver,
        questionnaire: &'a mut dyn Questionnaire,
    ) -> Self {
        Worker {
            config,
            vcs,
            questionnaire,
            state: WorkerState::Created,
            subproject: None,
            template: None,
            answers: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Dispatches to [`Worker::run_copy`] when `src_path` is set, otherwise
    /// to [`Worker::run_update`].
    pub fn run_auto(&mut self) -> Result<(), Error> {
        if self.config.src_path.is_some() {
            self.run_copy()
        } else {
            self.run_update()
        }
    }

    /// Resolves the template, asks questions, renders, persists the
    /// answers file, then runs post-copy tasks.
    pub fn run_copy(&mut self) -> Result<(), Error> {
        self.resolve()?;
        let user_answers = self.ask_questions()?;
        self.freeze_answers(user_answers);

        std::fs::create_dir_all(&self.config.dst_path).map_err(|e| Error::Io {
            path: self.config.dst_path.display().to_string(),
            source: e,
        })?;
        let dst_path = self.config.dst_path.clone();
        let (entries, outcome) = self.render(&dst_path, self.config.force);
        if let Err(e) = outcome {
            self.cleanup_rendered(&dst_path, &entries);
            return Err(e);
        }
        self.state = WorkerState::Rendered;

        if let Err(e) = self.run_copy_after_render() {
            self.cleanup_rendered(&dst_path, &entries);
            return Err(e);
        }
        self.state = WorkerState::Done;
        Ok(())
    }

    fn run_copy_after_render(&mut self) -> Result<(), Error> {
        self.write_answers_file()?;

        let tasks = self.template.as_ref().unwrap().resolve(self.vcs)?.tasks.clone();
        self.run_tasks(&tasks, "task")?;
        self.state = WorkerState::TasksRun;
        Ok(())
    }

    /// Brings an existing destination forward to the template's current
    /// revision: re-renders a scratch copy at the old revision, diffs it
    /// against the new revision, and replays that diff over the
    /// destination.
    pub fn run_update(&mut self) -> Result<(), Error> {
        let subproject = Subproject::load(self.config.dst_path.as_path(), Some(self.config.answers_file.clone()));
        if subproject.is_dirty(self.vcs) {
            return Err(Error::DestinationDirty {
                path: self.config.dst_path.display().to_string(),
            });
        }
        let last_answers = subproject.last_answers();
        self.subproject = Some(subproject);

        self.resolve()?;
        self.freeze_answers(HashMap::new());

        let old_commit = self
            .subproject
            .as_ref()
            .and_then(|s| s.raw_answers().get(answers_map::COMMIT_KEY))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let new_commit = self.template.as_ref().unwrap().resolve(self.vcs)?.commit.clone();
        if let (Some(old), Some(new)) = (&old_commit, &new_commit) {
            check_not_a_downgrade(old, new)?;
        }

        let data: HashMap<String, Value> = last_answers
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect();

        let scratch_root = TempDir::new().map_err(|e| Error::Io {
            path: "<scratch>".to_string(),
            source: e,
        })?;

        // Step (4): minimal copy of the old revision into the scratch root.
        let scratch_config = WorkerConfig {
            answers_file: self.config.answers_file.clone(),
            cleanup_on_error: false,
            data,
            dst_path: scratch_root.path().to_path_buf(),
            envops: self.config.envops.clone(),
            exclude: self.config.exclude.clone(),
            extra_paths: self.config.extra_paths.clone(),
            force: true,
            pretend: false,
            quiet: true,
            skip_if_exists: Vec::new(),
            src_path: self
                .subproject
                .as_ref()
                .and_then(|s| s.raw_answers().get(answers_map::SRC_PATH_KEY))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            subdirectory: self.config.subdirectory.clone(),
            use_prereleases: self.config.use_prereleases,
            vcs_ref: old_commit.clone(),
        };
        let mut noop_questionnaire = NoPromptQuestionnaire;
        let mut scratch_worker = Worker::new(scratch_config, self.vcs, &mut noop_questionnaire);
        scratch_worker.run_copy()?;
        self.state = WorkerState::OldRendered;

        // Step (5): a throwaway repo over the scratch render, then fetch the
        // real destination's HEAD so the two trees can be diffed.
        self.vcs.init(scratch_root.path())?;
        self.vcs.add(scratch_root.path(), ".")?;
        self.vcs
            .commit(scratch_root.path(), "old render", true, true)?;
        self.vcs
            .commit(scratch_root.path(), "old render (stable)", false, true)?;
        self.vcs.fetch(
            scratch_root.path(),
            "real_dst",
            &self.config.dst_path,
            "HEAD",
            1,
        )?;

        // Step (6): diff scratch HEAD against the fetched destination tree.
        let diff = match self
            .vcs
            .diff_tree(scratch_root.path(), "HEAD", "FETCH_HEAD", -1)
        {
            Ok(diff) => diff,
            Err(_) => self
                .vcs
                .diff_tree(scratch_root.path(), "HEAD", "FETCH_HEAD", 0)?,
        };
        self.state = WorkerState::Diffed;

        // Step (7): pre-migration tasks for every migration strictly
        // between the old and new commit.
        let migrations = self.template.as_ref().unwrap().resolve(self.vcs)?.migrations.clone();
        let applicable = applicable_migrations(&migrations, old_commit.as_deref(), new_commit.as_deref());
        let before_tasks: Vec<_> = applicable.iter().flat_map(|m| m.before.clone()).collect();
        self.run_tasks(&before_tasks, "before")?;

        // Step (8): a normal render of the new revision, forced.
        let dst_path = self.config.dst_path.clone();
        let (entries, outcome) = self.render(&dst_path, true);
        if let Err(e) = outcome {
            self.cleanup_rendered(&dst_path, &entries);
            return Err(e);
        }

        // Step (9): replay the captured diff, rejecting hunks that no
        // longer apply instead of aborting.
        let mut exclude_patterns = self.config.skip_if_exists.clone();
        exclude_patterns.push(self.config.answers_file.clone());
        self.vcs
            .apply(&self.config.dst_path, &diff, true, &exclude_patterns)?;
        self.state = WorkerState::DiffApplied;

        // Step (10): post-migration tasks.
        let after_tasks: Vec<_> = applicable.iter().flat_map(|m| m.after.clone()).collect();
        self.run_tasks(&after_tasks, "after")?;
        self.state = WorkerState::MigratedAfter;

        self.write_answers_file()?;
        self.state = WorkerState::Done;
        Ok(())
    }

    fn resolve(&mut self) -> Result<(), Error> {
        if self.subproject.is_none() {
            self.subproject = Some(Subproject::load(
                self.config.dst_path.as_path(),
                Some(self.config.answers_file.clone()),
            ));
        }

        let src_path = self
            .config
            .src_path
            .clone()
            .or_else(|| self.subproject.as_ref().and_then(|s| s.template()).map(|t| t.url().to_string()));
        let Some(src_path) = src_path else {
            return Err(Error::TemplateNotFound);
        };

        let git_ref = self.config.vcs_ref.clone().or_else(|| {
            self.subproject
                .as_ref()
                .and_then(|s| s.template())
                .and_then(|t| t.git_ref().map(str::to_string))
        });

        self.template = Some(Template::new(src_path, git_ref));
        self.state = WorkerState::Resolved;
        Ok(())
    }

    fn ask_questions(&mut self) -> Result<HashMap<String, Value>, Error> {
        let resolved = self.template.as_ref().unwrap().resolve(self.vcs)?;
        let last_answers = self.last_answers_as_json();

        let mut user_answers: HashMap<String, Value> = HashMap::new();
        for question in &resolved.config.questions {
            let prior_default = resolved
                .default_answers
                .iter()
                .find(|(k, _)| k == &question.var_name)
                .map(|(_, v)| yaml_to_json(v))
                .unwrap_or(Value::Null);
            let default = last_answers
                .get(&question.var_name)
                .cloned()
                .or(self.config.data.get(&question.var_name).cloned())
                .unwrap_or(prior_default);

            if let Some(when) = &question.when {
                if !self.evaluate_when(when, &user_answers)? {
                    continue;
                }
            }

            if let Some(forced) = self.config.data.get(&question.var_name) {
                user_answers.insert(question.var_name.clone(), forced.clone());
                continue;
            }

            if let Some(answer) = self.questionnaire.ask(question, &default) {
                user_answers.insert(question.var_name.clone(), answer);
            }
        }
        Ok(user_answers)
    }

    fn evaluate_when(&self, when: &serde_yaml::Value, answered_so_far: &HashMap<String, Value>) -> Result<bool, Error> {
        let Some(expr) = when.as_str() else {
            return Ok(when.as_bool().unwrap_or(true));
        };
        let answers = AnswersMap::builder().user(answered_so_far.clone()).build();
        let resolved = self.template.as_ref().unwrap().resolve(self.vcs)?;
        let context = RenderContext::new(&answers, &resolved.secret_questions, &[], Value::Null);
        let renderer = Renderer::new(
            resolved.local_path.as_path(),
            &self.config.extra_paths,
            &self.config.envops,
            resolved.templates_suffix.as_str(),
            &context,
        )?;
        let rendered = renderer.render_string(expr)?;
        Ok(!matches!(rendered.trim(), "" | "false" | "False" | "0"))
    }

    fn freeze_answers(&mut self, user_answers: HashMap<String, Value>) {
        let resolved = self.template.as_ref().unwrap().resolve(self.vcs).expect("resolved during ask_questions");
        let default: HashMap<String, Value> = resolved
            .default_answers
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect();
        let last = self.last_answers_as_json();

        let mut local = HashMap::new();
        if let Some(commit) = &resolved.commit {
            local.insert(answers_map::COMMIT_KEY.to_string(), Value::String(commit.clone()));
        }
        local.insert(
            answers_map::SRC_PATH_KEY.to_string(),
            Value::String(self.template.as_ref().unwrap().url().to_string()),
        );

        self.answers = Some(
            AnswersMap::builder()
                .default_layer(default)
                .last(last)
                .init(self.config.data.clone())
                .user(user_answers)
                .local(local)
                .build(),
        );
        self.state = WorkerState::Questioned;
    }

    fn last_answers_as_json(&self) -> HashMap<String, Value> {
        self.subproject
            .as_ref()
            .map(|s| {
                s.last_answers()
                    .iter()
                    .map(|(k, v)| (k.clone(), yaml_to_json(v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn render(&self, destination: &Path, force: bool) -> (Vec<render_engine::RenderedEntry>, Result<(), Error>) {
        let resolved = match self.template.as_ref().unwrap().resolve(self.vcs) {
            Ok(resolved) => resolved,
            Err(e) => return (Vec::new(), Err(e.into())),
        };
        let answers = self.answers.as_ref().expect("answers frozen before render");
        let question_order: Vec<String> = resolved
            .config
            .questions
            .iter()
            .map(|q| q.var_name.clone())
            .collect();
        let worker_conf = serde_json::json!({
            "dst_path": destination.display().to_string(),
            "src_path": self.template.as_ref().unwrap().url(),
        });
        let context = RenderContext::new(answers, &resolved.secret_questions, &question_order, worker_conf);

        let mut exclude = resolved.config.exclude();
        exclude.extend(self.config.exclude.clone());
        let skip_if_exists: Vec<String> = resolved
            .config
            .skip_if_exists()
            .into_iter()
            .chain(self.config.skip_if_exists.clone())
            .collect();
        let policy = match PathPolicy::new(destination, &exclude, &[], &skip_if_exists) {
            Ok(policy) => policy,
            Err(e) => return (Vec::new(), Err(e.into())),
        };

        let source_root = match &self.config.subdirectory {
            Some(sub) => resolved.local_path.join(sub),
            None => resolved.local_path.clone(),
        };

        let renderer = match Renderer::new(
            resolved.local_path.as_path(),
            &self.config.extra_paths,
            &self.config.envops,
            resolved.templates_suffix.as_str(),
            &context,
        ) {
            Ok(renderer) => renderer,
            Err(e) => return (Vec::new(), Err(e.into())),
        };
        let force = force || self.config.force;
        let pretend = self.config.pretend;
        let (entries, outcome) = renderer.render_folder(&source_root, destination, &policy, force, pretend, |_| false);
        (entries, outcome.map_err(Error::from))
    }

    /// Removes every freshly-created path from a failed render, honoring
    /// `cleanup_on_error`. Best-effort: a path already gone, or one whose
    /// removal fails, is silently skipped rather than masking the original
    /// error.
    fn cleanup_rendered(&self, destination: &Path, entries: &[render_engine::RenderedEntry]) {
        if !self.config.cleanup_on_error {
            return;
        }
        for entry in entries {
            if entry.report != template_model::RenderReport::Create {
                continue;
            }
            let path = destination.join(&entry.relpath);
            if path.is_dir() {
                let _ = std::fs::remove_dir_all(&path);
            } else {
                let _ = std::fs::remove_file(&path);
            }
        }
    }

    fn write_answers_file(&self) -> Result<(), Error> {
        let resolved = self.template.as_ref().unwrap().resolve(self.vcs)?;
        let answers = self.answers.as_ref().expect("answers frozen before writing");
        let question_order: Vec<String> = resolved
            .config
            .questions
            .iter()
            .map(|q| q.var_name.clone())
            .collect();
        let to_remember = template_model::to_remember_answers(answers, &resolved.secret_questions, &question_order);

        if self.config.pretend {
            return Ok(());
        }

        let map: serde_json::Map<String, Value> = to_remember.into_iter().collect();
        let text = serde_yaml::to_string(&Value::Object(map)).map_err(|e| Error::Io {
            path: self.config.answers_file.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;

        let destination = self.config.dst_path.join(&self.config.answers_file);
        std::fs::write(&destination, text).map_err(|e| Error::Io {
            path: destination.display().to_string(),
            source: e,
        })
    }

    fn run_tasks(&self, tasks: &[template_model::TaskDescriptor], stage: &str) -> Result<(), Error> {
        if tasks.is_empty() {
            return Ok(());
        }
        let rendered = self.render_tasks(tasks)?;
        let runner = TaskRunner::new(self.config.dst_path.as_path(), self.config.quiet);
        runner.run_all(&rendered, stage)?;
        Ok(())
    }

    /// Renders a task's command (the shell string, or every argv element)
    /// against the frozen answers, the same way a destination path or file's
    /// contents are rendered.
    fn render_tasks(
        &self,
        tasks: &[template_model::TaskDescriptor],
    ) -> Result<Vec<template_model::TaskDescriptor>, Error> {
        let resolved = self.template.as_ref().unwrap().resolve(self.vcs)?;
        let answers = self.answers.as_ref().expect("answers frozen before running tasks");
        let question_order: Vec<String> = resolved
            .config
            .questions
            .iter()
            .map(|q| q.var_name.clone())
            .collect();
        let context = RenderContext::new(answers, &resolved.secret_questions, &question_order, Value::Null);
        let renderer = Renderer::new(
            resolved.local_path.as_path(),
            &self.config.extra_paths,
            &self.config.envops,
            resolved.templates_suffix.as_str(),
            &context,
        )?;

        tasks
            .iter()
            .map(|descriptor| {
                let task = match &descriptor.task {
                    template_model::TaskCommand::Shell(script) => {
                        template_model::TaskCommand::Shell(renderer.render_string(script)?)
                    }
                    template_model::TaskCommand::Argv(argv) => {
                        let rendered = argv
                            .iter()
                            .map(|arg| renderer.render_string(arg))
                            .collect::<Result<Vec<_>, _>>()?;
                        template_model::TaskCommand::Argv(rendered)
                    }
                };
                Ok(template_model::TaskDescriptor {
                    task,
                    extra_env: descriptor.extra_env.clone(),
                })
            })
            .collect()
    }
}

fn applicable_migrations<'a>(
    migrations: &'a [MigrationDescriptor],
    old_commit: Option<&str>,
    new_commit: Option<&str>,
) -> Vec<&'a MigrationDescriptor> {
    let (Some(old), Some(new)) = (old_commit, new_commit) else {
        return Vec::new();
    };
    let Ok(old_version) = semver::Version::parse(&normalize(old)) else {
        return Vec::new();
    };
    let Ok(new_version) = semver::Version::parse(&normalize(new)) else {
        return Vec::new();
    };

    migrations
        .iter()
        .filter(|m| {
            semver::Version::parse(&normalize(&m.version))
                .map(|v| v > old_version && v <= new_version)
                .unwrap_or(false)
        })
        .collect()
}

fn check_not_a_downgrade(old: &str, new: &str) -> Result<(), Error> {
    let (Ok(old_version), Ok(new_version)) = (
        semver::Version::parse(&normalize(old)),
        semver::Version::parse(&normalize(new)),
    ) else {
        warn!(old, new, "commit strings are not semver-parseable, skipping downgrade check");
        return Ok(());
    };
    if old_version > new_version {
        return Err(Error::DowngradeRefused {
            old: old.to_string(),
            new: new.to_string(),
        });
    }
    Ok(())
}

fn normalize(version: &str) -> String {
    let trimmed = version.trim_start_matches('v');
    let parts: Vec<&str> = trimmed.splitn(3, '.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => trimmed.to_string(),
    }
}

fn yaml_to_json(value: &serde_yaml::Value) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
