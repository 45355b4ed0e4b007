use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Domain error taxonomy shared by every generation tool.
///
/// Provider-specific failures are classified into these categories at the
/// client boundary; the original provider message is kept as the payload so
/// nothing is lost when a category falls through to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Credential rejected, malformed, or lacking access.
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    /// Rate or spend limit reached. Retryable later, never automatically.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Upstream model overloaded. Retryable later.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Response did not carry the expected fields or failed to parse.
    /// Not retryable without changing the input.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure (connect, TLS, interrupted download).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Anything unclassified; the message is surfaced as-is.
    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Localized text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidCredential(_) => {
                "API Key không hợp lệ hoặc không có quyền truy cập. \
                 Vui lòng kiểm tra lại key trong phần Cài đặt."
                    .to_string()
            }
            Error::QuotaExceeded(_) => {
                "Bạn đã vượt quá hạn ngạch API. Vui lòng kiểm tra gói cước, \
                 thanh toán của bạn, hoặc thử lại sau. Xem chi tiết tại: \
                 https://ai.google.dev/gemini-api/docs/rate-limits"
                    .to_string()
            }
            Error::ServiceUnavailable(_) => {
                "Model đang bị quá tải. Vui lòng thử lại sau ít phút.".to_string()
            }
            // Call sites supply an already user-facing description here.
            Error::MalformedResponse(detail) => detail.clone(),
            Error::NetworkFailure(detail) => {
                format!("Lỗi mạng: {detail}. Vui lòng kiểm tra kết nối và thử lại.")
            }
            Error::Unknown(detail) => detail.clone(),
        }
    }

    /// Whether resubmitting the same request later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::QuotaExceeded(_) | Error::ServiceUnavailable(_) | Error::NetworkFailure(_)
        )
    }
}
