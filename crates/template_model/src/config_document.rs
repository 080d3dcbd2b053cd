//! Parsing of the template-config document: the YAML document
//! at a template's root (`copier.yml` / `copier.yaml`) whose keys starting
//! with `_` configure the engine, and whose other top-level keys each
//! describe one question.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_document_tests.rs"]
mod tests;

/// Default suffix marking a file as one that must be rendered through the
/// templating engine.
pub const DEFAULT_TEMPLATES_SUFFIX: &str = ".jinja";

/// Default exclusion patterns applied when the template declares none,
/// matching Copier's `DEFAULT_EXCLUDE`.
pub fn default_exclude() -> Vec<String> {
    vec![
        ".git".to_string(),
        ".git/*".to_string(),
        "~*".to_string(),
        "*.py[co]".to_string(),
        "__pycache__".to_string(),
        "__pycache__/*".to_string(),
        ".copier-answers.yml".to_string(),
        "copier.yml".to_string(),
        "copier.yaml".to_string(),
    ]
}

/// A post-copy or migration task descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskCommand {
    /// Run through the host shell.
    Shell(String),
    /// Run as argv, without a shell.
    Argv(Vec<String>),
}

/// One task to run, with optional extra environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskDescriptor {
    pub task: TaskCommand,
    #[serde(default)]
    pub extra_env: HashMap<String, String>,
}

/// A migration associated with a template version.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationDescriptor {
    pub version: String,
    #[serde(default)]
    pub before: Vec<TaskDescriptor>,
    #[serde(default)]
    pub after: Vec<TaskDescriptor>,
}

/// A question descriptor: `{type, default, help, choices, secret, when,
/// placeholder, multiline}`.
#[derive(Debug, Clone, Default)]
pub struct QuestionDescriptor {
    pub var_name: String,
    pub kind: Option<String>,
    pub default: Option<Value>,
    pub help: Option<String>,
    pub choices: Option<Value>,
    pub secret: bool,
    pub when: Option<Value>,
    pub placeholder: Option<String>,
    pub multiline: bool,
}

impl QuestionDescriptor {
    fn from_mapping(var_name: String, value: &Value) -> Self {
        let mapping = value.as_mapping();
        let get = |key: &str| mapping.and_then(|m| m.get(key)).cloned();
        QuestionDescriptor {
            var_name,
            kind: get("type").and_then(|v| v.as_str().map(str::to_string)),
            default: get("default"),
            help: get("help").and_then(|v| v.as_str().map(str::to_string)),
            choices: get("choices"),
            secret: get("secret").and_then(|v| v.as_bool()).unwrap_or(false),
            when: get("when"),
            placeholder: get("placeholder").and_then(|v| v.as_str().map(str::to_string)),
            multiline: get("multiline").and_then(|v| v.as_bool()).unwrap_or(false),
        }
    }
}

/// The result of partitioning a template config document's raw mapping by
/// the fixed rule that keys starting with `_` belong to `config_data`,
/// others to `questions_data`.
#[derive(Debug, Clone)]
pub struct TemplateConfigDocument {
    pub raw: Mapping,
    pub config_data: Mapping,
    /// Questions, kept in the document's declaration order.
    pub questions: Vec<QuestionDescriptor>,
}

impl TemplateConfigDocument {
    /// Parses `text` as a YAML document and partitions it.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let raw: Value = serde_yaml::from_str(text).map_err(|e| Error::ConfigInvalid {
            reason: e.to_string(),
        })?;
        let raw = match raw {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => {
                return Err(Error::ConfigInvalid {
                    reason: "template config document must be a mapping".to_string(),
                })
            }
        };

        let mut config_data = Mapping::new();
        let mut questions = Vec::new();
        for (key, value) in raw.iter() {
            let key_str = key.as_str().unwrap_or_default();
            if key_str.starts_with('_') {
                config_data.insert(key.clone(), value.clone());
            } else {
                questions.push(QuestionDescriptor::from_mapping(key_str.to_string(), value));
            }
        }

        Ok(TemplateConfigDocument {
            raw,
            config_data,
            questions,
        })
    }

    /// An empty document, used when the template declares no config file.
    pub fn empty() -> Self {
        TemplateConfigDocument {
            raw: Mapping::new(),
            config_data: Mapping::new(),
            questions: Vec::new(),
        }
    }

    pub fn min_version(&self) -> Option<String> {
        self.config_data
            .get("_min_copier_version")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn templates_suffix(&self) -> String {
        self.config_data
            .get("_templates_suffix")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_TEMPLATES_SUFFIX)
            .to_string()
    }

    pub fn exclude(&self) -> Vec<String> {
        self.string_sequence("_exclude")
            .unwrap_or_else(default_exclude)
    }

    pub fn skip_if_exists(&self) -> Vec<String> {
        self.string_sequence("_skip_if_exists").unwrap_or_default()
    }

    pub fn declared_secret_questions(&self) -> Vec<String> {
        self.string_sequence("_secret_questions").unwrap_or_default()
    }

    pub fn tasks(&self) -> Vec<TaskDescriptor> {
        self.config_data
            .get("_tasks")
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn migrations(&self) -> Vec<MigrationDescriptor> {
        self.config_data
            .get("_migrations")
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    fn string_sequence(&self, key: &str) -> Option<Vec<String>> {
        self.config_data.get(key).and_then(|v| {
            v.as_sequence().map(|seq| {
                seq.iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        })
    }
}
