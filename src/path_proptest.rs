//! Property-based tests for path manipulation functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{file_name, join, normalize, parent, strip_dir_prefix};
    use proptest::prelude::*;

    /// Strategy producing relative paths out of short segments, sometimes
    /// with `./`, doubled or Windows-style separators mixed in.
    fn messy_path() -> impl Strategy<Value = String> {
        prop::collection::vec(
            ("[a-z0-9_.-]{1,8}", prop::sample::select(vec!["/", "//", "\\", "/./"])),
            1..6,
        )
        .prop_map(|parts| {
            parts
                .into_iter()
                .map(|(segment, sep)| format!("{}{}", segment, sep))
                .collect::<String>()
        })
    }

    fn clean_path() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z0-9_-]{1,8}", 1..6).prop_map(|segments| segments.join("/"))
    }

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(input in messy_path()) {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: normalized paths never contain backslashes or empty segments
        #[test]
        fn normalize_produces_clean_segments(input in messy_path()) {
            let result = normalize(&input);
            prop_assert!(!result.contains('\\'));
            prop_assert!(!result.starts_with('/'));
            prop_assert!(!result.ends_with('/'));
            prop_assert!(!result.contains("//"));
            prop_assert!(!result.split('/').any(|s| s == "."));
        }

        /// Property: already-clean paths are left untouched
        #[test]
        fn normalize_preserves_clean_paths(input in clean_path()) {
            prop_assert_eq!(normalize(&input), input);
        }
    }

    // ============================================================================
    // parent / file_name / join property tests
    // ============================================================================

    proptest! {
        /// Property: joining parent and file name reconstructs the path
        #[test]
        fn parent_and_file_name_reconstruct(input in clean_path()) {
            prop_assert_eq!(join(parent(&input), file_name(&input)), input);
        }

        /// Property: a joined path is always strictly below its base
        #[test]
        fn join_then_strip_roundtrips(base in clean_path(), rel in clean_path()) {
            let joined = join(&base, &rel);
            prop_assert_eq!(strip_dir_prefix(&joined, &base), Some(rel.as_str()));
        }
    }
}
