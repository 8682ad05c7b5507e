//! Utility functions for serde serialization.
//!
//! Helpers used with serde's `skip_serializing_if` attribute.

/// Returns `true` if the boolean value is `false`.
///
/// Used with `#[serde(skip_serializing_if = "is_false")]` to omit false values.
#[inline]
pub fn is_false(b: &bool) -> bool {
    !*b
}

/// Name of the built-in pass-through target.
pub const DIRECT: &str = "DIRECT";

/// Name of the built-in drop target.
pub const REJECT: &str = "REJECT";

/// Returns `true` for the client's built-in targets.
pub fn is_builtin_target(name: &str) -> bool {
    name == DIRECT || name == REJECT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_false() {
        assert!(is_false(&false));
        assert!(!is_false(&true));
    }

    #[test]
    fn test_builtin_targets() {
        assert!(is_builtin_target("DIRECT"));
        assert!(is_builtin_target("REJECT"));
        assert!(!is_builtin_target("direct"));
        assert!(!is_builtin_target("🚀 Main Proxy"));
    }
}
