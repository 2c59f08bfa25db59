//! Per-query resolution context.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Immutable string map threaded through one resolution walk.
///
/// Extending it with [`ResolveState::with_value`] copies the map, so a
/// state handed to a nested scope never changes what the caller sees.
#[derive(Clone, Debug, Default)]
pub struct ResolveState {
    values: Arc<FxHashMap<&'static str, Arc<str>>>,
}

impl ResolveState {
    /// Name to look for instead of the identifier's text (`int32` is
    /// searched as `intN`).
    pub const SEARCH_NAME: &'static str = "search-name";
    /// `"true"` when the identifier is the object of a member access.
    pub const DOT_QUALIFIER: &'static str = "dot-qualifier";

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(&self, key: &'static str, value: impl Into<Arc<str>>) -> Self {
        let mut values = Arc::clone(&self.values);
        Arc::make_mut(&mut values).insert(key, value.into());
        ResolveState { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|value| &**value)
    }

    pub fn search_name(&self) -> Option<&str> {
        self.get(Self::SEARCH_NAME)
    }

    pub fn is_dot_qualifier(&self) -> bool {
        self.get(Self::DOT_QUALIFIER) == Some("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn with_value_leaves_original_untouched() {
        let empty = ResolveState::new();
        let named = empty.with_value(ResolveState::SEARCH_NAME, "intN");
        assert_eq!(empty.search_name(), None);
        assert_eq!(named.search_name(), Some("intN"));

        let both = named.with_value(ResolveState::DOT_QUALIFIER, "true");
        assert!(!named.is_dot_qualifier());
        assert!(both.is_dot_qualifier());
        assert_eq!(both.search_name(), Some("intN"));
    }
}
