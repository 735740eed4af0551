//! Case identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

/// Literal prefix of every case id.
pub const CASE_ID_PREFIX: &str = "CWA-";

/// Length of the random suffix.
pub const CASE_ID_SUFFIX_LEN: usize = 6;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Source of case identifiers.
pub trait CaseIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random ids: `CWA-` plus six uppercase alphanumerics. Collisions are
/// possible and tolerated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCaseIds;

impl CaseIdGenerator for RandomCaseIds {
    fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..CASE_ID_SUFFIX_LEN)
            .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
            .collect();
        format!("{}{}", CASE_ID_PREFIX, suffix)
    }
}

/// Deterministic ids for tests and reproducible runs: `CWA-000001`, `CWA-000002`, ...
#[derive(Debug)]
pub struct SequentialCaseIds {
    next: AtomicU64,
}

impl Default for SequentialCaseIds {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialCaseIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl CaseIdGenerator for SequentialCaseIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        format!("{}{:06}", CASE_ID_PREFIX, n)
    }
}

/// Check the `CWA-XXXXXX` shape.
pub fn is_well_formed_case_id(id: &str) -> bool {
    match id.strip_prefix(CASE_ID_PREFIX) {
        Some(suffix) => {
            suffix.len() == CASE_ID_SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_well_formed() {
        let ids = RandomCaseIds;
        for _ in 0..200 {
            let id = ids.next_id();
            assert!(is_well_formed_case_id(&id), "malformed id {}", id);
        }
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialCaseIds::new();
        assert_eq!(ids.next_id(), "CWA-000001");
        assert_eq!(ids.next_id(), "CWA-000002");
        assert!(is_well_formed_case_id(&ids.next_id()));
    }

    #[test]
    fn test_well_formed_rejects() {
        assert!(!is_well_formed_case_id("CWA-abc123"));
        assert!(!is_well_formed_case_id("CWA-ABC12"));
        assert!(!is_well_formed_case_id("XYZ-ABC123"));
        assert!(!is_well_formed_case_id("CWA-ABC1234"));
        assert!(is_well_formed_case_id("CWA-7Q2X9B"));
    }
}
