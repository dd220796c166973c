//! Property-based tests for pattern selection, module path ascent and conf
//! merging.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::conf::merge_values;
    use crate::patterns::{get_patterns, Category, OmitSet};
    use crate::resolver::ascend;
    use proptest::prelude::*;
    use serde_json::{Map, Value as JsonValue};
    use std::path::PathBuf;

    fn category_names() -> Vec<&'static str> {
        Category::ALL.iter().map(|c| c.name()).collect()
    }

    fn omit_strategy() -> impl Strategy<Value = Vec<String>> {
        let known = prop::sample::select(category_names()).prop_map(str::to_string);
        let unknown = "[a-z]{1,8}";
        prop::collection::vec(prop_oneof![known, unknown.prop_map(|s| s)], 0..12)
    }

    fn scalar_strategy() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::from),
            any::<i64>().prop_map(JsonValue::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(JsonValue::from),
        ]
    }

    fn scalar_map_strategy() -> impl Strategy<Value = JsonValue> {
        prop::collection::btree_map("[a-z]{1,6}", scalar_strategy(), 0..8)
            .prop_map(|map| JsonValue::Object(map.into_iter().collect::<Map<_, _>>()))
    }

    // ============================================================================
    // get_patterns property tests
    // ============================================================================

    proptest! {
        /// Property: omitted categories never appear, all others appear exactly once
        #[test]
        fn patterns_respect_omissions(names in omit_strategy()) {
            let omit: OmitSet = names.iter().cloned().collect();
            let patterns = get_patterns(&omit);

            for category in Category::ALL {
                let count = patterns.iter().filter(|p| p.category == category).count();
                if names.iter().any(|n| n == category.name()) {
                    prop_assert_eq!(count, 0, "{} should be omitted", category);
                } else {
                    prop_assert_eq!(count, 1, "{} should appear once", category);
                }
            }
        }

        /// Property: surviving patterns keep the fixed category order
        #[test]
        fn patterns_keep_category_order(names in omit_strategy()) {
            let omit: OmitSet = names.into_iter().collect();
            let order: Vec<Category> = get_patterns(&omit).iter().map(|p| p.category).collect();
            let mut sorted = order.clone();
            sorted.sort();
            prop_assert_eq!(order, sorted);
        }
    }

    // ============================================================================
    // ascend property tests
    // ============================================================================

    proptest! {
        /// Property: ascending is possible only across two or more dependency
        /// directories, and always removes at least two of them
        #[test]
        fn ascend_removes_dependency_levels(
            segments in prop::collection::vec(
                prop_oneof![Just("node_modules".to_string()), "[a-z]{1,6}"],
                1..10,
            )
        ) {
            let path: PathBuf = std::iter::once("/".to_string()).chain(segments.iter().cloned()).collect();
            let levels = segments.iter().filter(|s| *s == "node_modules").count();

            match ascend(&path) {
                Some(parent) => {
                    prop_assert!(levels > 1);
                    let remaining = parent
                        .components()
                        .filter(|c| c.as_os_str() == "node_modules")
                        .count();
                    prop_assert_eq!(remaining, levels - 2);
                    prop_assert!(path.starts_with(&parent));
                }
                None => prop_assert!(levels <= 1),
            }
        }
    }

    // ============================================================================
    // merge_values property tests
    // ============================================================================

    proptest! {
        /// Property: merging the same all-scalar module conf twice equals merging once
        #[test]
        fn merge_is_idempotent_for_scalar_documents(
            build in scalar_map_strategy(),
            module in scalar_map_strategy(),
        ) {
            let mut once = build.clone();
            merge_values(&mut once, &module);
            let mut twice = once.clone();
            merge_values(&mut twice, &module);
            prop_assert_eq!(once, twice);
        }

        /// Property: every module key ends up with the module's scalar value
        #[test]
        fn merge_module_scalars_win(
            build in scalar_map_strategy(),
            module in scalar_map_strategy(),
        ) {
            let mut merged = build.clone();
            merge_values(&mut merged, &module);
            for (key, value) in module.as_object().unwrap() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in build.as_object().unwrap() {
                if module.get(key).is_none() {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
    }
}
