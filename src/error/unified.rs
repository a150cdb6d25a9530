//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Stream,
    Server,
    Api,
    Configuration,
    Serialization,
    Storage,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    CheckFilesystem,
    IncreaseTimeout,
    /// Re-invoke the batch with `--resume-from` to cover skipped resources.
    ResumeRun,
    ContactSupport,
}
