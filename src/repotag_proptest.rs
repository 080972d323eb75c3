//! Property-based tests for repotag resolution.

use proptest::prelude::*;

use crate::config::TagRule;

proptest! {
    /// The default rule maps every plain version string to `v<version>`.
    #[test]
    fn default_rule_prefixes_v(version in "[0-9A-Za-z][0-9A-Za-z._-]{0,24}") {
        let rule = TagRule::default();
        let tag = rule.resolve(&version).unwrap();
        prop_assert_eq!(tag, format!("v{}", version));
    }

    /// A replacement with no capture references is a constant mapping.
    #[test]
    fn literal_replacement_is_constant(version in "[0-9A-Za-z][0-9A-Za-z._-]{0,24}") {
        let rule = TagRule::new("^.*$", "trunk");
        prop_assert_eq!(rule.resolve(&version).unwrap(), "trunk");
    }

    /// Resolution is deterministic: the same rule and version always
    /// produce the same repotag.
    #[test]
    fn resolution_is_deterministic(version in "[0-9A-Za-z][0-9A-Za-z._-]{0,24}") {
        let rule = TagRule::new(r"^(\d+)\.(\d+).*$", "rel/$1.$2");
        let first = rule.resolve(&version).unwrap();
        let second = rule.resolve(&version).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Versions the pattern does not match pass through unchanged.
    #[test]
    fn unmatched_versions_pass_through(version in "[a-z]{1,10}") {
        let rule = TagRule::new(r"^\d+\.\d+\.\d+$", "v$0");
        prop_assert_eq!(rule.resolve(&version).unwrap(), version);
    }
}
