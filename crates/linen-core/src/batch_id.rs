//! # Batch Identifiers
//!
//! Two ids per batch:
//!
//! | Id               | Example              | Who sees it                     |
//! |------------------|----------------------|---------------------------------|
//! | Paper batch id   | `PB-2024-01-006`     | Drivers, clients, printed slips |
//! | System batch id  | `lrz3k9-4f7q2x-9c1m0a` | Internal references only      |
//!
//! The paper id generator is a suggestion for the batch form: when the
//! operator leaves it blank, the storage layer picks the next free sequence
//! for the pickup month.

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// First year accepted in a paper batch id.
pub const MIN_YEAR: i32 = 2020;
/// Last year accepted in a paper batch id.
pub const MAX_YEAR: i32 = 2030;
/// Highest per-month sequence (three digits).
pub const MAX_SEQUENCE: i64 = 999;

static PAPER_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PB-(\d{4})-(\d{2})-(\d{3})$").expect("paper batch id pattern"));

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// =============================================================================
// Paper Batch Id
// =============================================================================

/// The parts of a paper batch id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaperBatchId {
    pub year: i32,
    pub month: u32,
    pub sequence: i64,
}

impl PaperBatchId {
    /// Validates the parts and builds the id.
    pub fn new(year: i32, month: u32, sequence: i64) -> CoreResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CoreError::InvalidYear {
                year,
                min: MIN_YEAR,
                max: MAX_YEAR,
            });
        }
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidMonth { month });
        }
        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(CoreError::InvalidSequence { sequence });
        }

        Ok(PaperBatchId {
            year,
            month,
            sequence,
        })
    }
}

impl fmt::Display for PaperBatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PB-{:04}-{:02}-{:03}",
            self.year, self.month, self.sequence
        )
    }
}

/// Formats `PB-YYYY-MM-NNN`.
///
/// ## Example
/// ```rust
/// use linen_core::batch_id::generate_paper_batch_id;
///
/// assert_eq!(generate_paper_batch_id(2024, 1, 6).unwrap(), "PB-2024-01-006");
/// assert!(generate_paper_batch_id(2019, 1, 6).is_err());
/// ```
///
/// ## Errors
/// `InvalidYear` (outside 2020-2030), `InvalidMonth` (outside 1-12),
/// `InvalidSequence` (outside 1-999).
pub fn generate_paper_batch_id(year: i32, month: u32, sequence: i64) -> CoreResult<String> {
    Ok(PaperBatchId::new(year, month, sequence)?.to_string())
}

/// Strict format check plus range checks on the embedded parts.
pub fn validate_paper_batch_id(id: &str) -> bool {
    parse_paper_batch_id(id).is_some()
}

/// Splits a paper batch id into its parts.
///
/// Returns `None` for anything that [`generate_paper_batch_id`] could not
/// have produced; never panics.
pub fn parse_paper_batch_id(id: &str) -> Option<PaperBatchId> {
    let caps = PAPER_ID_PATTERN.captures(id)?;

    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let sequence = caps.get(3)?.as_str().parse().ok()?;

    PaperBatchId::new(year, month, sequence).ok()
}

/// Suggests the next paper id for a month given the ids already issued.
///
/// Ids from other months and malformed ids are ignored.
///
/// ## Errors
/// `InvalidSequence` once the month's 999 ids are used up.
pub fn next_paper_batch_id<'a, I>(year: i32, month: u32, existing: I) -> CoreResult<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(parse_paper_batch_id)
        .filter(|id| id.year == year && id.month == month)
        .map(|id| id.sequence)
        .max()
        .unwrap_or(0);

    generate_paper_batch_id(year, month, highest + 1)
}

// =============================================================================
// System Batch Id
// =============================================================================

/// Generates an opaque id: base36 millisecond timestamp plus two random
/// base36 segments, hyphen-joined.
///
/// Collisions are possible in principle; two batches would have to be
/// created in the same millisecond and draw the same 12 random characters.
pub fn generate_system_batch_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();

    format!(
        "{}-{}-{}",
        to_base36(millis),
        random_segment(&mut rng, 6),
        random_segment(&mut rng, 6)
    )
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

fn random_segment<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_generate_paper_batch_id() {
        assert_eq!(generate_paper_batch_id(2024, 1, 6).unwrap(), "PB-2024-01-006");
        assert_eq!(generate_paper_batch_id(2030, 12, 999).unwrap(), "PB-2030-12-999");
    }

    #[test]
    fn test_generate_rejects_out_of_range_parts() {
        let kind = |r: CoreResult<String>| r.unwrap_err().kind();
        assert_eq!(kind(generate_paper_batch_id(2019, 1, 1)), ErrorKind::InvalidYear);
        assert_eq!(kind(generate_paper_batch_id(2031, 1, 1)), ErrorKind::InvalidYear);
        assert_eq!(kind(generate_paper_batch_id(2024, 0, 1)), ErrorKind::InvalidMonth);
        assert_eq!(kind(generate_paper_batch_id(2024, 13, 1)), ErrorKind::InvalidMonth);
        assert_eq!(kind(generate_paper_batch_id(2024, 1, 0)), ErrorKind::InvalidSequence);
        assert_eq!(kind(generate_paper_batch_id(2024, 1, -4)), ErrorKind::InvalidSequence);
    }

    #[test]
    fn test_validate_paper_batch_id() {
        assert!(validate_paper_batch_id("PB-2024-01-006"));

        assert!(!validate_paper_batch_id("PB-2024-1-006"));
        assert!(!validate_paper_batch_id("pb-2024-01-006"));
        assert!(!validate_paper_batch_id(" PB-2024-01-006"));
        assert!(!validate_paper_batch_id("PB-2024-01-006x"));
        assert!(!validate_paper_batch_id("PB-2024-13-006"));
        assert!(!validate_paper_batch_id("PB-2019-01-006"));
        assert!(!validate_paper_batch_id("PB-2024-01-000"));
        assert!(!validate_paper_batch_id(""));
    }

    #[test]
    fn test_parse_paper_batch_id() {
        assert_eq!(
            parse_paper_batch_id("PB-2024-01-006"),
            Some(PaperBatchId {
                year: 2024,
                month: 1,
                sequence: 6
            })
        );
        assert_eq!(parse_paper_batch_id("garbage"), None);
        assert_eq!(parse_paper_batch_id("PB-2024-00-001"), None);
    }

    #[test]
    fn test_next_paper_batch_id() {
        let existing = ["PB-2024-01-004", "PB-2024-01-009", "PB-2024-02-050", "junk"];
        assert_eq!(
            next_paper_batch_id(2024, 1, existing.iter().copied()).unwrap(),
            "PB-2024-01-010"
        );
        assert_eq!(
            next_paper_batch_id(2024, 3, existing.iter().copied()).unwrap(),
            "PB-2024-03-001"
        );

        let full = ["PB-2024-01-999"];
        let err = next_paper_batch_id(2024, 1, full.iter().copied()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSequence);
    }

    #[test]
    fn test_system_batch_id_shape() {
        let id = generate_system_batch_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(!parts[0].is_empty());
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 6);
        assert!(id.chars().all(|c| c == '-' || c.is_ascii_digit() || c.is_ascii_lowercase()));

        assert_ne!(generate_system_batch_id(), generate_system_batch_id());
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    proptest! {
        #[test]
        fn prop_generated_ids_validate_and_parse_back(
            year in MIN_YEAR..=MAX_YEAR,
            month in 1u32..=12,
            sequence in 1i64..=MAX_SEQUENCE,
        ) {
            let id = generate_paper_batch_id(year, month, sequence).unwrap();
            prop_assert!(validate_paper_batch_id(&id));
            prop_assert_eq!(
                parse_paper_batch_id(&id),
                Some(PaperBatchId { year, month, sequence })
            );
        }
    }
}
