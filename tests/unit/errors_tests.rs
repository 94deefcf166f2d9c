/*!
 * Unit tests for the error taxonomy, in particular which provider
 * failures the retry loop is allowed to try again.
 */

use vidscribe::errors::{ProviderError, TranslationError};

#[test]
fn test_isRetryable_withTransientErrors_shouldReturnTrue() {
    assert!(ProviderError::RequestFailed("timeout".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_retryable());
    assert!(ProviderError::EmptyResponse.is_retryable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".to_string() }.is_retryable());
    assert!(ProviderError::ApiError { status_code: 429, message: "limit".to_string() }.is_retryable());
}

#[test]
fn test_isRetryable_withStructuralErrors_shouldReturnFalse() {
    assert!(!ProviderError::ParseError("bad json".to_string()).is_retryable());
    assert!(!ProviderError::AuthenticationError("bad key".to_string()).is_retryable());
    assert!(!ProviderError::ApiError { status_code: 400, message: "bad request".to_string() }.is_retryable());
    assert!(!ProviderError::ApiError { status_code: 404, message: "gone".to_string() }.is_retryable());
}

#[test]
fn test_lineCountMismatch_shouldNameBothCounts() {
    let err = TranslationError::LineCountMismatch { expected: 5, received: 3 };
    let message = err.to_string();
    assert!(message.contains('5'));
    assert!(message.contains('3'));
}

#[test]
fn test_providerError_shouldConvertIntoTranslationError() {
    let err: TranslationError = ProviderError::EmptyResponse.into();
    assert!(matches!(err, TranslationError::Provider(ProviderError::EmptyResponse)));
}
