//! Tests for `variant` module

use std::fs;
use std::path::Path;

use super::error::Error;
use super::variant::*;

fn registry(base: bool, capacities: &[usize]) -> VariantRegistry {
    let dir = Path::new("/data");
    let mut registry = VariantRegistry::new(dir, "train");
    if base {
        registry = registry.with_base(FilePair::for_split(dir, "train", None));
    }
    for &k in capacities {
        registry = registry.with_variant(k, FilePair::for_split(dir, "train", Some(k)));
    }
    registry
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").expect("touch");
}

// -------------------------------------------------------------------------
// Pure selection
// -------------------------------------------------------------------------

#[test]
fn test_select_capacity_picks_smallest_sufficient() {
    assert_eq!(select_capacity([5, 15, 20], 10), Some(15));
    assert_eq!(select_capacity([5, 15, 20], 15), Some(15));
    assert_eq!(select_capacity([5, 15, 20], 21), None);
    assert_eq!(select_capacity([], 1), None);
}

#[test]
fn test_select_smallest_qualifying_variant() {
    // Arrange
    let registry = registry(true, &[5, 15, 20]);

    // Act
    let selection = registry.select(10).expect("select");

    // Assert
    assert_eq!(selection.capacity, 15);
    assert!(selection.suffixed);
    assert_eq!(selection.files.features, Path::new("/data/object.train.15"));
    assert_eq!(selection.files.mask, Path::new("/data/object_mask.train.15"));
}

#[test]
fn test_select_falls_back_to_base() {
    let registry = registry(true, &[5]);

    let selection = registry.select(10).expect("select");

    assert_eq!(selection.capacity, DEFAULT_CAPACITY);
    assert!(!selection.suffixed);
    assert_eq!(selection.files.features, Path::new("/data/object.train"));
}

#[test]
fn test_select_prefers_larger_variant_over_base() {
    let registry = registry(true, &[36]);

    let selection = registry.select(10).expect("select");

    assert_eq!(selection.capacity, 36);
    assert!(selection.suffixed);
    assert_eq!(selection.files.features, Path::new("/data/object.train.36"));
}

#[test]
fn test_select_exact_variant_over_base() {
    let registry = registry(true, &[20]);

    let selection = registry.select(20).expect("select");

    assert_eq!(selection.capacity, 20);
    assert!(selection.suffixed);
}

#[test]
fn test_select_beyond_every_variant_fails() {
    let registry = registry(true, &[5, 15, 20]);

    let result = registry.select(25);

    match result {
        Err(Error::VariantNotFound { requested, split, .. }) => {
            assert_eq!(requested, 25);
            assert_eq!(split, "train");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_select_large_variant_above_default() {
    let registry = registry(true, &[5, 50]);

    let selection = registry.select(25).expect("select");

    assert_eq!(selection.capacity, 50);
}

#[test]
fn test_select_without_base_uses_variant() {
    let registry = registry(false, &[8]);

    assert_eq!(registry.select(3).expect("select").capacity, 8);
}

#[test]
fn test_select_empty_registry_fails() {
    let registry = registry(false, &[]);

    assert!(registry.is_empty());
    assert!(matches!(
        registry.select(1),
        Err(Error::VariantNotFound { .. })
    ));
}

#[test]
fn test_select_zero_capacity_is_invalid() {
    let registry = registry(true, &[]);

    assert!(matches!(registry.select(0), Err(Error::InvalidCapacity(0))));
}

// -------------------------------------------------------------------------
// Directory scan
// -------------------------------------------------------------------------

#[test]
fn test_scan_finds_base_and_variants() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "object.train",
        "object_mask.train",
        "object.train.5",
        "object_mask.train.5",
        "object.train.15",
        "object_mask.train.15",
    ] {
        touch(dir.path(), name);
    }

    // Act
    let registry = VariantRegistry::scan(dir.path(), "train").expect("scan");

    // Assert
    assert!(registry.base().is_some());
    assert_eq!(registry.capacities().collect::<Vec<_>>(), vec![5, 15]);
    assert_eq!(registry.split(), "train");
    assert_eq!(registry.dir(), dir.path());
}

#[test]
fn test_scan_ignores_other_splits_and_junk() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "object.valid.5",
        "object_mask.valid.5",
        "object.train.bak",
        "object.train.5.tmp",
        "object.train.0",
        "object_mask.train.0",
        "sent_num.train",
    ] {
        touch(dir.path(), name);
    }

    let registry = VariantRegistry::scan(dir.path(), "train").expect("scan");

    assert!(registry.is_empty());
}

#[test]
fn test_scan_requires_mask_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    touch(dir.path(), "object.train");
    touch(dir.path(), "object.train.10");
    touch(dir.path(), "object_mask.train.10");

    let registry = VariantRegistry::scan(dir.path(), "train").expect("scan");

    assert!(registry.base().is_none());
    assert_eq!(registry.variants().count(), 1);
}

#[test]
fn test_scan_ignores_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("object.train.7")).expect("mkdir");
    touch(dir.path(), "object_mask.train.7");

    let registry = VariantRegistry::scan(dir.path(), "train").expect("scan");

    assert!(registry.is_empty());
}

#[test]
fn test_select_variant_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "object.test",
        "object_mask.test",
        "object.test.5",
        "object_mask.test.5",
        "object.test.15",
        "object_mask.test.15",
        "object.test.20",
        "object_mask.test.20",
    ] {
        touch(dir.path(), name);
    }

    assert_eq!(select_variant(dir.path(), "test", 10).expect("select").capacity, 15);
    assert_eq!(select_variant(dir.path(), "test", 5).expect("select").capacity, 5);
    assert!(matches!(
        select_variant(dir.path(), "test", 25),
        Err(Error::VariantNotFound { .. })
    ));
}

#[test]
fn test_select_variant_on_disk_skips_base_when_variant_qualifies() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "object.train",
        "object_mask.train",
        "object.train.36",
        "object_mask.train.36",
    ] {
        touch(dir.path(), name);
    }

    // Act
    let selection = select_variant(dir.path(), "train", 10).expect("select");

    // Assert
    assert_eq!(selection.capacity, 36);
    assert!(selection.suffixed);
    assert_eq!(selection.files.features, dir.path().join("object.train.36"));
}

#[test]
fn test_scan_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");

    let result = VariantRegistry::scan(&dir.path().join("absent"), "train");

    assert!(matches!(result, Err(Error::Io(_))));
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Property: the smallest sufficient suffixed variant wins; the base
        /// is used only when no suffixed variant is large enough
        #[test]
        fn prop_selection_is_minimal_sufficient(
            base in any::<bool>(),
            capacities in proptest::collection::btree_set(1usize..64, 0..8),
            requested in 1usize..64,
        ) {
            let capacities: Vec<usize> = capacities.into_iter().collect();
            let registry = registry(base, &capacities);
            let suffixed_fit = capacities.iter().copied().filter(|&k| k >= requested).min();

            match registry.select(requested) {
                Ok(selection) => {
                    prop_assert!(selection.capacity >= requested);
                    match suffixed_fit {
                        Some(k) => {
                            prop_assert!(selection.suffixed);
                            prop_assert_eq!(selection.capacity, k);
                        }
                        None => {
                            prop_assert!(base);
                            prop_assert!(!selection.suffixed);
                            prop_assert_eq!(selection.capacity, DEFAULT_CAPACITY);
                        }
                    }
                }
                Err(Error::VariantNotFound { .. }) => {
                    prop_assert!(suffixed_fit.is_none());
                    prop_assert!(!base || requested > DEFAULT_CAPACITY);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        /// Property: selection is deterministic regardless of insertion order
        #[test]
        fn prop_selection_is_deterministic(
            capacities in proptest::collection::vec(1usize..64, 0..8),
            requested in 1usize..64,
        ) {
            let forward = registry(true, &capacities).select(requested);
            let mut reversed_caps = capacities.clone();
            reversed_caps.reverse();
            let reversed = registry(true, &reversed_caps).select(requested);

            prop_assert_eq!(forward.ok(), reversed.ok());
        }
    }
}
