//! Session configuration.

use std::time::Duration;

/// Settings for one [`crate::Session`].
///
/// With the `serde` feature the struct deserializes from client settings;
/// missing keys take their [`Default`] values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SessionConfig {
    /// Directory that `@stdlib/...` imports resolve against. Its
    /// `common.tolk` is searched after the embedded stubs.
    pub stdlib_root: Option<String>,
    /// Load the embedded stubs file declaring builtin types.
    pub load_stubs: bool,
    /// Upper bound for one find-references query.
    #[cfg_attr(feature = "serde", serde(with = "millis", rename = "referenceTimeoutMs"))]
    pub reference_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            stdlib_root: None,
            load_stubs: true,
            reference_timeout: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_stdlib_root(mut self, root: impl Into<String>) -> Self {
        self.stdlib_root = Some(root.into());
        self
    }

    #[must_use]
    pub fn with_stubs(mut self, load_stubs: bool) -> Self {
        self.load_stubs = load_stubs;
        self
    }

    #[must_use]
    pub fn with_reference_timeout(mut self, timeout: Duration) -> Self {
        self.reference_timeout = Some(timeout);
        self
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_load_stubs_without_stdlib() {
        let config = SessionConfig::default();
        assert!(config.load_stubs);
        assert_eq!(config.stdlib_root, None);
        assert_eq!(config.reference_timeout, None);
    }

    #[test]
    fn builders_override_fields() {
        let config = SessionConfig::default()
            .with_stdlib_root("/opt/tolk/stdlib")
            .with_stubs(false)
            .with_reference_timeout(Duration::from_millis(250));
        assert_eq!(config.stdlib_root.as_deref(), Some("/opt/tolk/stdlib"));
        assert!(!config.load_stubs);
        assert_eq!(config.reference_timeout, Some(Duration::from_millis(250)));
    }
}
