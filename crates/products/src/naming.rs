//! Image naming policy.
//!
//! Turns a user-supplied file name into a storage key that is safe for object
//! stores and unique per upload:
//!
//! ```text
//! "a b?c.PNG"  ->  sanitize  ->  "abc.PNG"  ->  stamp  ->  "abc_1729080000123456789.PNG"
//! ```

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use crate::error::ProductError;

/// Hard ceiling for generated keys (mirrors common object-key limits).
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Last stamp handed out by this process; stamps are strictly increasing.
static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Derive a sanitized, collision-resistant storage key from `original`.
pub fn generate_file_name(original: &str) -> Result<String, ProductError> {
    if original.is_empty() {
        return Err(ProductError::invalid_image("image file name is required"));
    }

    let sanitized = sanitize(original);
    if sanitized.is_empty() {
        return Err(ProductError::invalid_image(format!(
            "image file name '{original}' has no usable characters"
        )));
    }

    let (base, ext) = split_extension(&sanitized);
    let file_name = format!("{base}_{}{ext}", next_stamp(Utc::now()));

    if file_name.len() > MAX_FILE_NAME_LEN {
        return Err(ProductError::invalid_image(format!(
            "image file name '{file_name}' exceeds the maximum length of {MAX_FILE_NAME_LEN} characters"
        )));
    }

    Ok(file_name)
}

/// Keep only `[A-Za-z0-9._-]`.
fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Split at the last dot; the extension keeps its leading dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Nanosecond timestamp, bumped past the previous stamp when the clock
/// has not advanced (coarse clocks, back-to-back calls).
fn next_stamp(now: DateTime<Utc>) -> i64 {
    let candidate = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));

    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(candidate.max(last.saturating_add(1)))
        })
        .unwrap_or(candidate);

    candidate.max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn stamp_of<'a>(generated: &'a str, base: &str, ext: &str) -> &'a str {
        generated
            .strip_prefix(base)
            .and_then(|s| s.strip_prefix('_'))
            .and_then(|s| s.strip_suffix(ext))
            .unwrap()
    }

    #[test]
    fn sanitizes_then_stamps_before_extension() {
        let name = generate_file_name("a b?c.PNG").unwrap();

        assert!(name.starts_with("abc_"));
        assert!(name.ends_with(".PNG"));
        let stamp = stamp_of(&name, "abc", ".PNG");
        assert!(!stamp.is_empty());
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn rejects_empty_input() {
        let err = generate_file_name("").unwrap_err();
        assert!(matches!(err, ProductError::InvalidImageData(_)));
    }

    #[test]
    fn rejects_input_without_usable_characters() {
        let err = generate_file_name("??? !!").unwrap_err();
        assert!(matches!(err, ProductError::InvalidImageData(_)));
    }

    #[test]
    fn rejects_names_over_the_length_ceiling() {
        let long = format!("{}.jpg", "x".repeat(250));
        let err = generate_file_name(&long).unwrap_err();
        match err {
            ProductError::InvalidImageData(msg) => assert!(msg.contains("255")),
            other => panic!("expected InvalidImageData, got {other:?}"),
        }
    }

    #[test]
    fn name_without_extension_gets_plain_suffix() {
        let name = generate_file_name("photo").unwrap();
        assert!(name.starts_with("photo_"));
        assert!(!name.contains('.'));
    }

    #[test]
    fn only_last_dot_starts_the_extension() {
        let name = generate_file_name("archive.tar.gz").unwrap();
        assert!(name.starts_with("archive.tar_"));
        assert!(name.ends_with(".gz"));
    }

    #[test]
    fn same_original_never_collides() {
        let names: HashSet<String> = (0..1_000)
            .map(|_| generate_file_name("photo.jpg").unwrap())
            .collect();
        assert_eq!(names.len(), 1_000);
    }

    #[test]
    fn stamps_are_strictly_increasing_even_for_a_frozen_clock() {
        let now = Utc::now();
        let a = next_stamp(now);
        let b = next_stamp(now);
        assert!(b > a);
    }

    proptest! {
        #[test]
        fn generated_names_are_storage_safe(original in ".{1,120}") {
            match generate_file_name(&original) {
                Ok(name) => {
                    prop_assert!(name.len() <= MAX_FILE_NAME_LEN);
                    prop_assert!(name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
                }
                Err(ProductError::InvalidImageData(_)) => {
                    prop_assert!(sanitize(&original).is_empty());
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        #[test]
        fn extension_is_preserved(base in "[a-z]{1,20}", ext in "[a-zA-Z0-9]{1,5}") {
            let name = generate_file_name(&format!("{base}.{ext}")).unwrap();
            let expected_ext = format!(".{ext}");
            prop_assert!(name.ends_with(&expected_ext));
            let expected_base = format!("{base}_");
            prop_assert!(name.starts_with(&expected_base));
        }
    }
}
