//! A diagnostics sink that emits warnings through `slog`.
//!
//! Each warning becomes one `WARN` record whose message is the warning text,
//! with the kind and path as flat keys and the full tag map as a nested JSON
//! object (via `slog`'s nested-value support).
//!
//! ```ignore
//! use transcopy::{slog::SlogSink, Copier};
//!
//! let sink = SlogSink::new(logger.new(slog::o!("component" => "vault")));
//! let copier = Copier::builder().transform(encrypt).diagnostics(&sink).build()?;
//! ```

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};
use slog::{Key, Logger, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::diagnostics::{DiagnosticsSink, WarningKind};

/// Logs warnings to a `slog::Logger`.
#[derive(Clone, Debug)]
pub struct SlogSink {
    logger: Logger,
}

impl SlogSink {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl DiagnosticsSink for SlogSink {
    fn add_warning(&self, message: &str, kind: WarningKind, tags: &BTreeMap<String, String>) {
        let path = tags.get("path").map_or("", String::as_str);
        slog::warn!(
            self.logger,
            "{}", message;
            "kind" => kind.as_str(),
            "path" => path,
            "tags" => WarningTags::new(tags)
        );
    }
}

/// A `slog::Value` that emits warning tags as a JSON object.
pub struct WarningTags {
    value: JsonValue,
}

impl WarningTags {
    fn new(tags: &BTreeMap<String, String>) -> Self {
        let object: Map<String, JsonValue> = tags
            .iter()
            .map(|(key, value)| (key.clone(), JsonValue::String(value.clone())))
            .collect();
        Self {
            value: JsonValue::Object(object),
        }
    }
}

impl SlogValue for WarningTags {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}
