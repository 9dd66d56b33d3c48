//! URL batch validation
//!
//! Classifies raw input lines against the platform domain allowlist before
//! anything touches the network. Validation failures are typed so callers
//! can tell "nothing to submit" apart from "contains invalid URLs" and from
//! "batch too large".

use std::fmt;

use crate::api::constants::{MAX_BATCH_URLS, PLATFORM_DOMAINS};

/// Outcome of classifying a batch of input lines. Both sides preserve
/// input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

/// Client-local validation failures. No network call is ever attempted
/// for these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input contained no non-blank lines.
    Empty,
    /// Input exceeded the per-batch URL cap.
    BatchTooLarge { count: usize, cap: usize },
    /// Every line was rejected by the domain allowlist.
    NoValidUrls { invalid: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "Nothing to submit: no URLs provided"),
            ValidationError::BatchTooLarge { count, cap } => {
                write!(f, "Batch of {} URLs exceeds the limit of {}", count, cap)
            }
            ValidationError::NoValidUrls { invalid } => {
                write!(
                    f,
                    "None of the {} provided URLs match a supported platform domain",
                    invalid
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Pure classifier for submission batches.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    domains: Vec<String>,
    cap: usize,
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self {
            domains: PLATFORM_DOMAINS.iter().map(|d| d.to_string()).collect(),
            cap: MAX_BATCH_URLS,
        }
    }
}

impl ValidationGate {
    pub fn new(domains: Vec<String>, cap: usize) -> Self {
        Self { domains, cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Split input into valid and invalid URLs. Blank lines are dropped
    /// after trimming; order is preserved on both sides.
    pub fn partition(&self, input: &str) -> Partition {
        let mut partition = Partition::default();
        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.domains.iter().any(|d| line.contains(d.as_str())) {
                partition.valid.push(line.to_string());
            } else {
                partition.invalid.push(line.to_string());
            }
        }
        partition
    }

    /// Validate a batch for submission: enforce the non-empty and size-cap
    /// preconditions, then classify. A partially invalid batch is not an
    /// error; the caller submits the valid subset and reports the rest.
    pub fn check_batch(&self, input: &str) -> Result<Partition, ValidationError> {
        let line_count = input.lines().filter(|l| !l.trim().is_empty()).count();
        if line_count == 0 {
            return Err(ValidationError::Empty);
        }
        if line_count > self.cap {
            return Err(ValidationError::BatchTooLarge {
                count: line_count,
                cap: self.cap,
            });
        }

        let partition = self.partition(input);
        if partition.valid.is_empty() {
            return Err(ValidationError::NoValidUrls {
                invalid: partition.invalid.len(),
            });
        }
        Ok(partition)
    }
}
