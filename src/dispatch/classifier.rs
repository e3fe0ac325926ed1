//! Failure classification for fallback decisions.

use crate::errors::{FailureClass, RetryableError};
use crate::types::SendResult;

/// Substrings (matched case-insensitively) that make a failure worth a hop
/// through another gateway.
const DEFAULT_PATTERNS: [(&str, FailureClass); 7] = [
    ("insufficient credits", FailureClass::TransientProvider),
    ("insufficientbalance", FailureClass::TransientProvider),
    ("sender id not approved", FailureClass::TransientProvider),
    ("timeout", FailureClass::Connectivity),
    ("connection failed", FailureClass::Connectivity),
    ("server error", FailureClass::TransientProvider),
    ("rate limit", FailureClass::TransientProvider),
];

/// Status codes treated as transient regardless of the error text.
const DEFAULT_STATUS_CODES: [u16; 7] = [402, 403, 429, 500, 502, 503, 504];

/// Decides whether a failed [`SendResult`] is retryable on another gateway.
///
/// Text patterns are checked first, then the status code. Anything
/// unrecognised is a terminal rejection.
///
/// ```
/// use sms_dispatch::dispatch::FailureClassifier;
/// use sms_dispatch::FailureClass;
///
/// let classifier = FailureClassifier::default();
/// assert_eq!(
///     classifier.classify("Request timeout: operation timed out", None),
///     FailureClass::Connectivity
/// );
/// assert_eq!(
///     classifier.classify("Invalid recipient", Some(400)),
///     FailureClass::TerminalProviderRejection
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FailureClassifier {
    patterns: Vec<(String, FailureClass)>,
    status_codes: Vec<u16>,
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS
                .iter()
                .map(|(pattern, class)| (pattern.to_string(), *class))
                .collect(),
            status_codes: DEFAULT_STATUS_CODES.to_vec(),
        }
    }
}

impl FailureClassifier {
    /// Add a retryable pattern, e.g. a provider-specific keyword.
    pub fn with_pattern(mut self, pattern: impl AsRef<str>, class: FailureClass) -> Self {
        self.patterns
            .push((pattern.as_ref().to_lowercase(), class));
        self
    }

    /// Add a status code treated as transient.
    pub fn with_status_code(mut self, status: u16) -> Self {
        if !self.status_codes.contains(&status) {
            self.status_codes.push(status);
        }
        self
    }

    pub fn classify(&self, error: &str, status_code: Option<u16>) -> FailureClass {
        let error = error.to_lowercase();
        if let Some((_, class)) = self
            .patterns
            .iter()
            .find(|(pattern, _)| error.contains(pattern.as_str()))
        {
            return *class;
        }

        match status_code {
            Some(status) if self.status_codes.contains(&status) => FailureClass::TransientProvider,
            _ => FailureClass::TerminalProviderRejection,
        }
    }

    /// Classify a failed send. Successful results are never retryable.
    pub fn classify_result(&self, result: &SendResult) -> Option<FailureClass> {
        (!result.success).then(|| self.classify(result.error_text(), result.status_code))
    }

    pub fn is_retryable(&self, result: &SendResult) -> bool {
        self.classify_result(result)
            .is_some_and(|class| class.is_retryable())
    }
}
