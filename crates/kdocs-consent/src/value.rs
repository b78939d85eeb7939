//! Consent values and their persisted encoding.

/// Effective analytics consent for the current site.
///
/// `Unset` is never written to a store; it is what readers observe when no
/// valid record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentValue {
    /// No decision recorded (or the record is unreadable).
    #[default]
    Unset,
    /// The user accepted analytics.
    Granted,
    /// The user declined analytics.
    Denied,
}

/// An explicit user decision. Only decisions can be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied,
}

impl ConsentValue {
    /// Decode a stored string.
    ///
    /// Only `"true"` and `"false"` are recognized. Anything else, including
    /// surrounding whitespace or different casing, decodes to [`ConsentValue::Unset`].
    #[must_use]
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some("true") => Self::Granted,
            Some("false") => Self::Denied,
            _ => Self::Unset,
        }
    }

    /// Short lowercase label for logs and CLI output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

impl Decision {
    /// Persisted string for this decision.
    #[must_use]
    pub fn as_stored(self) -> &'static str {
        match self {
            Self::Granted => "true",
            Self::Denied => "false",
        }
    }
}

impl From<Decision> for ConsentValue {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Granted => Self::Granted,
            Decision::Denied => Self::Denied,
        }
    }
}

impl std::fmt::Display for ConsentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stored_recognized_values() {
        assert_eq!(ConsentValue::from_stored(Some("true")), ConsentValue::Granted);
        assert_eq!(ConsentValue::from_stored(Some("false")), ConsentValue::Denied);
        assert_eq!(ConsentValue::from_stored(None), ConsentValue::Unset);
    }

    #[test]
    fn test_from_stored_malformed_is_unset() {
        for raw in ["", "TRUE", " true", "yes", "1", "granted", "null"] {
            assert_eq!(
                ConsentValue::from_stored(Some(raw)),
                ConsentValue::Unset,
                "{raw:?} should decode to unset"
            );
        }
    }

    #[test]
    fn test_decision_encoding_matches_decoding() {
        for decision in [Decision::Granted, Decision::Denied] {
            assert_eq!(
                ConsentValue::from_stored(Some(decision.as_stored())),
                ConsentValue::from(decision)
            );
        }
    }
}
