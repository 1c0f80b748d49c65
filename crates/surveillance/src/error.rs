// ---------------------------------------------------------------------------
// MutationError: rejections raised by the Mutation API
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors a mutation can be rejected with.
///
/// A rejected mutation leaves every collection untouched and queues neither a
/// durable write nor a change notification. Unknown ids are not errors: they
/// make the mutation a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// A report's case count does not match its age-group breakdown.
    Validation { cases_count: u32, age_total: u64 },
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::Validation {
                cases_count,
                age_total,
            } => write!(
                f,
                "Validation error: report has {cases_count} cases but its age groups sum to {age_total}"
            ),
        }
    }
}

impl std::error::Error for MutationError {}
