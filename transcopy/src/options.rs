//! Tunables for a copy run.

/// Default bound on graph depth.
///
/// This is the only guard against reference cycles unless
/// [`CopyOptions::detect_cycles`] is enabled. A legitimately deep acyclic graph
/// beyond the bound fails the same way a cyclic one does.
pub const MAX_DEPTH: usize = 100;

/// Options controlling a [`Copier`](crate::Copier).
///
/// ```rust
/// use transcopy::CopyOptions;
///
/// let options = CopyOptions::default()
///     .with_max_depth(32)
///     .with_cycle_detection(true);
/// assert_eq!(options.max_depth(), 32);
/// assert!(options.set_mutation_guard());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CopyOptions {
    /// Deepest nesting level that may be copied.
    max_depth: usize,
    /// Reject transforms that change the hash of non-immutable set elements.
    set_mutation_guard: bool,
    /// Track shared pointers on the ancestor chain and fail on revisits.
    detect_cycles: bool,
}

impl CopyOptions {
    /// Constructs the default options: depth bound [`MAX_DEPTH`], set guard on,
    /// cycle detection off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            set_mutation_guard: true,
            detect_cycles: false,
        }
    }

    /// Uses a different depth bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables the set mutation guard.
    ///
    /// Disable only when every transform provably returns values that hash
    /// the same as their input.
    #[must_use]
    pub const fn with_set_mutation_guard(mut self, enabled: bool) -> Self {
        self.set_mutation_guard = enabled;
        self
    }

    /// Enables or disables ancestor tracking for `Rc`/`Arc` nodes.
    #[must_use]
    pub const fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub const fn set_mutation_guard(&self) -> bool {
        self.set_mutation_guard
    }

    pub const fn detect_cycles(&self) -> bool {
        self.detect_cycles
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = CopyOptions::default();
        assert_eq!(options.max_depth(), MAX_DEPTH);
        assert!(options.set_mutation_guard());
        assert!(!options.detect_cycles());
    }

    #[test]
    fn builders_override_single_fields() {
        let options = CopyOptions::new()
            .with_set_mutation_guard(false)
            .with_max_depth(4);
        assert_eq!(options.max_depth(), 4);
        assert!(!options.set_mutation_guard());
        assert!(!options.detect_cycles());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_falls_back_to_defaults() {
        let options: CopyOptions = serde_json::from_str(r#"{"detect_cycles": true}"#).unwrap();
        assert_eq!(options.max_depth(), MAX_DEPTH);
        assert!(options.detect_cycles());
    }
}
