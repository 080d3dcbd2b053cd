//! `RenderContext` and `ToRememberAnswers`.

use std::collections::{HashMap, HashSet};

use answers_map::{AnswerKey, AnswersMap, COMMIT_KEY, SRC_PATH_KEY};
use serde_json::Value;

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;

/// The per-render template context: `DEFAULT_DATA` plus the to-be-remembered
/// answers, duplicated under `_copier_answers`, plus a deep copy of the
/// caller's public configuration under `_copier_conf`.
#[derive(Debug, Clone)]
pub struct RenderContext {
    values: HashMap<AnswerKey, Value>,
}

impl RenderContext {
    pub fn new(
        answers: &AnswersMap,
        secret_questions: &HashSet<String>,
        question_order: &[String],
        worker_conf: Value,
    ) -> Self {
        let to_remember = to_remember_answers(answers, secret_questions, question_order);

        let mut values = answers_map::default_data();
        for (key, value) in &to_remember {
            values.insert(key.clone(), value.clone());
        }
        values.insert(
            "_copier_answers".to_string(),
            Value::Object(to_remember.into_iter().collect()),
        );
        values.insert("_copier_conf".to_string(), worker_conf);

        RenderContext { values }
    }

    pub fn values(&self) -> &HashMap<AnswerKey, Value> {
        &self.values
    }
}

/// The mapping persisted to the destination's answers file: `_commit` and
/// `_src_path` first (only when defined), then every combined answer that
/// isn't private, isn't secret, and round-trips through JSON. The remainder
/// follows `question_order` (the template's questionnaire-declaration
/// order); any combined key not named there falls at the end, alphabetized,
/// e.g. answers supplied via `data` for a key the template never asks.
pub fn to_remember_answers(
    answers: &AnswersMap,
    secret_questions: &HashSet<String>,
    question_order: &[String],
) -> Vec<(String, Value)> {
    let mut result = Vec::new();
    let combined = answers.combined();

    if let Some(commit) = combined.get(COMMIT_KEY) {
        result.push((COMMIT_KEY.to_string(), commit.clone()));
    }
    if let Some(src_path) = combined.get(SRC_PATH_KEY) {
        result.push((SRC_PATH_KEY.to_string(), src_path.clone()));
    }

    let is_rememberable = |key: &str| !key.starts_with('_') && !secret_questions.contains(key);

    for key in question_order {
        if is_rememberable(key) {
            if let Some(value) = combined.get(key) {
                result.push((key.clone(), value.clone()));
            }
        }
    }

    let mut leftover: Vec<(String, Value)> = combined
        .iter()
        .filter(|(key, _)| is_rememberable(key) && !question_order.contains(*key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    leftover.sort_by(|(a, _), (b, _)| a.cmp(b));
    result.extend(leftover);
    result
}
