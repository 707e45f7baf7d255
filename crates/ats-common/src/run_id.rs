//! Process-level run ID.
//!
//! Every query outcome produced by one process carries the same ULID, so logs
//! and printed results from a batch of queries can be correlated.

use once_cell::sync::Lazy;
use ulid::Ulid;

static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// The process-level run ID: generated on first call, 26 chars, time-ordered.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// A fresh ULID, e.g. for a single query within the run.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_is_stable_within_process() {
        assert_eq!(get(), get());
        assert_eq!(get().len(), 26);
    }

    #[test]
    fn generated_ids_are_unique_and_ordered() {
        let older = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = generate();
        assert_ne!(older, newer);
        assert!(older < newer);
    }
}
