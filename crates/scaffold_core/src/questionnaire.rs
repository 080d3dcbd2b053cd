//! Asking the user for each question a template declares, in declaration
//! order, skipping questions whose `when` condition evaluates falsy.

use std::io::{self, Write};

use serde_json::Value;
use template_model::QuestionDescriptor;

/// Prompts for one answer per question. Implementations decide how the
/// prompt is presented; the contract only requires a `Value` back for each
/// question offered.
pub trait Questionnaire {
    /// Asks for `question`'s value, given the default already resolved from
    /// the answers layering. Returns `None` if the question should be
    /// skipped (its `when` evaluated falsy).
    fn ask(&mut self, question: &QuestionDescriptor, default: &Value) -> Option<Value>;
}

/// The default [`Questionnaire`]: prints the question text (falling back to
/// its variable name) and reads a line from stdin. An empty line accepts
/// the default.
#[derive(Debug, Default)]
pub struct StdinQuestionnaire;

impl Questionnaire for StdinQuestionnaire {
    fn ask(&mut self, question: &QuestionDescriptor, default: &Value) -> Option<Value> {
        let prompt = question.help.as_deref().unwrap_or(&question.var_name);
        let default_display = display_default(default);
        print!("{prompt}{default_display}: ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return Some(default.clone());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Some(default.clone());
        }
        Some(coerce(question, trimmed))
    }
}

/// Accepts every default without prompting. Used for the minimal scratch
/// copy `run_update` performs at the old revision, where every answer is
/// already pinned by `data` and no question should ever reach a terminal.
#[derive(Debug, Default)]
pub struct NoPromptQuestionnaire;

impl Questionnaire for NoPromptQuestionnaire {
    fn ask(&mut self, _question: &QuestionDescriptor, default: &Value) -> Option<Value> {
        Some(default.clone())
    }
}

fn display_default(default: &Value) -> String {
    match default {
        Value::Null => String::new(),
        Value::String(s) if s.is_empty() => String::new(),
        other => format!(" [{other}]"),
    }
}

fn coerce(question: &QuestionDescriptor, raw: &str) -> Value {
    match question.kind.as_deref() {
        Some("bool") => Value::Bool(matches!(
            raw.to_ascii_lowercase().as_str(),
            "y" | "yes" | "true" | "1"
        )),
        Some("int") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("float") => raw
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
            .unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
#[path = "questionnaire_tests.rs"]
mod tests;
