//! Tests for the error system.

use kbharvest::error::unified::*;
use kbharvest::error::*;

#[test]
fn error_api_creation() {
    let err = HarvestError::api(404, "Not found");
    assert!(matches!(&err, HarvestError::Api { status: 404, .. }));
    assert_eq!(err.to_string(), "API error (status 404): Not found");
}

#[test]
fn error_helper_mappings_are_stable_for_major_variants() {
    struct Case {
        error: HarvestError,
        expected_category: ErrorCategory,
        expected_retryable: bool,
        expected_transport: bool,
        expected_recovery: RecoverySuggestion,
    }

    let network_error = reqwest::Client::new()
        .get("http://[::1")
        .build()
        .unwrap_err();
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    let serde_error = serde_json::from_str::<serde_json::Value>("{not-json}").unwrap_err();

    let cases = vec![
        Case {
            error: HarvestError::Authentication("bad-key".to_string()),
            expected_category: ErrorCategory::Authentication,
            expected_retryable: false,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::CheckCredentials,
        },
        Case {
            error: HarvestError::RateLimited {
                retry_after_ms: Some(1000),
            },
            expected_category: ErrorCategory::RateLimit,
            expected_retryable: true,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: HarvestError::Timeout(5000),
            expected_category: ErrorCategory::Timeout,
            expected_retryable: true,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::IncreaseTimeout,
        },
        Case {
            error: HarvestError::Network(network_error),
            expected_category: ErrorCategory::Network,
            expected_retryable: true,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: HarvestError::Stream("connection reset".to_string()),
            expected_category: ErrorCategory::Stream,
            expected_retryable: false,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::ResumeRun,
        },
        Case {
            error: HarvestError::api(503, "Server unavailable"),
            expected_category: ErrorCategory::Server,
            expected_retryable: true,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::RetryWithBackoff,
        },
        Case {
            error: HarvestError::api(401, "Unauthorized"),
            expected_category: ErrorCategory::Authentication,
            expected_retryable: false,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::CheckCredentials,
        },
        Case {
            error: HarvestError::api(418, "Teapot"),
            expected_category: ErrorCategory::Api,
            expected_retryable: false,
            expected_transport: true,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
        Case {
            error: HarvestError::Configuration("bad-config".to_string()),
            expected_category: ErrorCategory::Configuration,
            expected_retryable: false,
            expected_transport: false,
            expected_recovery: RecoverySuggestion::CheckConfiguration,
        },
        Case {
            error: HarvestError::InvalidArgument("bad-arg".to_string()),
            expected_category: ErrorCategory::Configuration,
            expected_retryable: false,
            expected_transport: false,
            expected_recovery: RecoverySuggestion::CheckConfiguration,
        },
        Case {
            error: HarvestError::Serialization(serde_error),
            expected_category: ErrorCategory::Serialization,
            expected_retryable: false,
            expected_transport: false,
            expected_recovery: RecoverySuggestion::ContactSupport,
        },
        Case {
            error: HarvestError::Io(io_error),
            expected_category: ErrorCategory::Storage,
            expected_retryable: false,
            expected_transport: false,
            expected_recovery: RecoverySuggestion::CheckFilesystem,
        },
        Case {
            error: HarvestError::Registry("no resourceId column".to_string()),
            expected_category: ErrorCategory::Storage,
            expected_retryable: false,
            expected_transport: false,
            expected_recovery: RecoverySuggestion::CheckFilesystem,
        },
    ];

    for case in cases {
        assert_eq!(case.error.category(), case.expected_category, "{}", case.error);
        assert_eq!(case.error.is_retryable(), case.expected_retryable, "{}", case.error);
        assert_eq!(case.error.is_transport(), case.expected_transport, "{}", case.error);
        assert_eq!(case.error.recovery_suggestion(), case.expected_recovery, "{}", case.error);
    }
}

#[test]
fn io_errors_convert_with_question_mark() {
    fn open() -> Result<String> {
        Ok(std::fs::read_to_string("/definitely/not/here.csv")?)
    }
    assert!(matches!(open(), Err(HarvestError::Io(_))));
}
