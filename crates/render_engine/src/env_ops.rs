//! `EnvOps`: the subset of templating-engine knobs a template may override.

use minijinja::syntax::SyntaxConfig;
use minijinja::UndefinedBehavior;

/// Delimiters, whitespace handling, and undefined-variable behavior for the
/// templating engine. Defaults match the upstream tool this engine is
/// modeled on: Jinja-style delimiters, trimmed block tags, and a strict
/// undefined behavior so a typo in a template surfaces immediately instead
/// of silently rendering as empty.
#[derive(Debug, Clone)]
pub struct EnvOps {
    pub block_start: String,
    pub block_end: String,
    pub variable_start: String,
    pub variable_end: String,
    pub comment_start: String,
    pub comment_end: String,
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
    pub keep_trailing_newline: bool,
    pub strict_undefined: bool,
}

impl Default for EnvOps {
    fn default() -> Self {
        EnvOps {
            block_start: "{%".to_string(),
            block_end: "%}".to_string(),
            variable_start: "{{".to_string(),
            variable_end: "}}".to_string(),
            comment_start: "{#".to_string(),
            comment_end: "#}".to_string(),
            trim_blocks: true,
            lstrip_blocks: true,
            keep_trailing_newline: true,
            strict_undefined: true,
        }
    }
}

impl EnvOps {
    pub fn syntax_config(&self) -> Result<SyntaxConfig, minijinja::Error> {
        SyntaxConfig::builder()
            .block_delimiters(self.block_start.clone(), self.block_end.clone())
            .variable_delimiters(self.variable_start.clone(), self.variable_end.clone())
            .comment_delimiters(self.comment_start.clone(), self.comment_end.clone())
            .build()
    }

    pub fn undefined_behavior(&self) -> UndefinedBehavior {
        if self.strict_undefined {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        }
    }
}

#[cfg(test)]
#[path = "env_ops_tests.rs"]
mod tests;
