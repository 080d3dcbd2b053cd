//! Layered answers storage.
//!
//! `AnswersMap` holds the values that flow into template rendering, kept in
//! separate layers so that the origin of a value (a default declared by the
//! template, a value loaded from a prior run, a value the user just typed)
//! stays visible. Layers are combined by a fixed precedence and the combined
//! view is computed once and cached, matching the immutable-derived-value
//! shape used across this workspace.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// A single answer's key.
pub type AnswerKey = String;

/// A flat layer of answers: key to JSON-serializable value.
pub type AnswerLayer = HashMap<AnswerKey, Value>;

/// Errors that can occur while building or reading an [`AnswersMap`].
#[derive(Error, Debug)]
pub enum Error {
    /// A caller attempted to mutate a layer after the combined view had
    /// already been computed and cached.
    #[error("answers map is frozen once combined() has been read")]
    Frozen,
}

/// The private key under which the prior template revision is recorded.
pub const COMMIT_KEY: &str = "_commit";
/// The private key under which the prior template source is recorded.
pub const SRC_PATH_KEY: &str = "_src_path";

/// Five named layers plus the process-wide `DEFAULT_DATA` baseline,
/// combined with fixed precedence:
///
/// `local > user > init > last > default > DEFAULT_DATA`
///
/// Each layer is deep-copied on construction so that later mutation of a
/// caller's source mapping can never alias into the map.
#[derive(Debug, Clone)]
pub struct AnswersMap {
    local: AnswerLayer,
    user: AnswerLayer,
    init: AnswerLayer,
    last: AnswerLayer,
    default: AnswerLayer,
    combined: OnceLock<HashMap<AnswerKey, Value>>,
}

/// The process-wide constant baseline every [`AnswersMap`] falls back to.
///
/// Kept deliberately free of wall-clock or random values: re-rendering with
/// unchanged inputs must produce byte-identical output, which a `now()`
/// entry would break.
pub fn default_data() -> AnswerLayer {
    let mut data = AnswerLayer::new();
    data.insert(
        "_scaffold_version".to_string(),
        Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    data
}

/// Builder for an [`AnswersMap`]; every layer is optional and defaults empty.
#[derive(Debug, Clone, Default)]
pub struct AnswersMapBuilder {
    local: AnswerLayer,
    user: AnswerLayer,
    init: AnswerLayer,
    last: AnswerLayer,
    default: AnswerLayer,
}

impl AnswersMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local(mut self, layer: AnswerLayer) -> Self {
        self.local = layer;
        self
    }

    pub fn user(mut self, layer: AnswerLayer) -> Self {
        self.user = layer;
        self
    }

    pub fn init(mut self, layer: AnswerLayer) -> Self {
        self.init = layer;
        self
    }

    pub fn last(mut self, layer: AnswerLayer) -> Self {
        self.last = layer;
        self
    }

    pub fn default_layer(mut self, layer: AnswerLayer) -> Self {
        self.default = layer;
        self
    }

    pub fn build(self) -> AnswersMap {
        AnswersMap {
            local: self.local,
            user: self.user,
            init: self.init,
            last: self.last,
            default: self.default,
            combined: OnceLock::new(),
        }
    }
}

impl AnswersMap {
    /// Starts a builder. Every layer defaults empty; construction always
    /// deep-copies its inputs because `HashMap<String, Value>` is owned, not
    /// borrowed — there is no aliasing to guard against beyond what `Clone`
    /// already gives us.
    pub fn builder() -> AnswersMapBuilder {
        AnswersMapBuilder::new()
    }

    /// The layered, read-only combined view: `local > user > init > last >
    /// default > DEFAULT_DATA`. Computed once and cached; subsequent calls
    /// return the same view.
    pub fn combined(&self) -> &HashMap<AnswerKey, Value> {
        self.combined.get_or_init(|| {
            let mut result = default_data();
            for layer in [&self.default, &self.last, &self.init, &self.user, &self.local] {
                for (k, v) in layer {
                    result.insert(k.clone(), v.clone());
                }
            }
            result
        })
    }

    /// `last._commit`, i.e. the template revision used by the prior run, if
    /// any.
    pub fn old_commit(&self) -> Option<&str> {
        self.last.get(COMMIT_KEY).and_then(Value::as_str)
    }

    /// The `last` layer, as loaded from the destination's answers file.
    pub fn last(&self) -> &AnswerLayer {
        &self.last
    }

    /// The `init` layer, i.e. caller-forced data.
    pub fn init(&self) -> &AnswerLayer {
        &self.init
    }

    /// The `default` layer, i.e. template-declared defaults.
    pub fn default_layer(&self) -> &AnswerLayer {
        &self.default
    }

    /// The `user` layer, i.e. answers elicited this run.
    pub fn user(&self) -> &AnswerLayer {
        &self.user
    }
}
