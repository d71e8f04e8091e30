//! Non-fatal warnings raised while copying.
//!
//! The copier never aborts on a warning. Callers that need strict fidelity
//! install a [`CollectingSink`] and inspect what it gathered; everyone else
//! gets the default [`TracingSink`].

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Mutex, PoisonError},
};

/// The four kinds of fidelity warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WarningKind {
    /// The copy's concrete type differs from the declared type of the source.
    TypeFidelityLoss,
    /// A collection's hasher could not be carried over; the default was used.
    ComparerFallback,
    /// A read-only property was not restored by the type's reconstruction.
    ReadOnlyPropertyLost,
    /// A property that cannot be copied generically was skipped.
    IndexedPropertySkipped,
}

impl WarningKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeFidelityLoss => "type_fidelity_loss",
            Self::ComparerFallback => "comparer_fallback",
            Self::ReadOnlyPropertyLost => "read_only_property_lost",
            Self::IndexedPropertySkipped => "indexed_property_skipped",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warning as recorded by [`CollectingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// Kind-specific details. Always contains `path`.
    pub tags: BTreeMap<String, String>,
}

impl Warning {
    /// Location of the node the warning is about.
    pub fn path(&self) -> &str {
        self.tags.get("path").map_or("", String::as_str)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Receiver for fidelity warnings.
///
/// Implementations must not panic. The copier calls the sink synchronously
/// from the copying thread.
pub trait DiagnosticsSink {
    fn add_warning(&self, message: &str, kind: WarningKind, tags: &BTreeMap<String, String>);
}

impl<S> DiagnosticsSink for &S
where
    S: DiagnosticsSink + ?Sized,
{
    fn add_warning(&self, message: &str, kind: WarningKind, tags: &BTreeMap<String, String>) {
        (**self).add_warning(message, kind, tags);
    }
}

/// Emits warnings as `tracing` events at `WARN` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn add_warning(&self, message: &str, kind: WarningKind, tags: &BTreeMap<String, String>) {
        tracing::warn!(
            kind = %kind,
            path = tags.get("path").map_or("", String::as_str),
            ?tags,
            "{message}"
        );
    }
}

/// Stores warnings in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything collected so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.lock().clone()
    }

    /// Returns the collected warnings of `kind`.
    pub fn of_kind(&self, kind: WarningKind) -> Vec<Warning> {
        self.lock()
            .iter()
            .filter(|warning| warning.kind == kind)
            .cloned()
            .collect()
    }

    /// Drains the collected warnings.
    pub fn take(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Warning>> {
        // A panic while pushing cannot leave the vector half-written.
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticsSink for CollectingSink {
    fn add_warning(&self, message: &str, kind: WarningKind, tags: &BTreeMap<String, String>) {
        self.lock().push(Warning {
            kind,
            message: message.to_string(),
            tags: tags.clone(),
        });
    }
}
