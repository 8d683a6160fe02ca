use crate::config::FailurePolicy;
use crate::i18n;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Session expired")]
    SessionExpired,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invitation id could not be resolved")]
    UnresolvableInvitation,
}

impl AppError {
    /// HTTP status attached to the error, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            AppError::SessionExpired => Some(401),
            AppError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable text for a blocking dialog.
    ///
    /// Prefers the message supplied by the server and falls back to the
    /// given generic text for everything else.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            AppError::SessionExpired => i18n::t("api.session_expired"),
            _ => fallback.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Report a failure that the caller deliberately swallows.
///
/// Background work (polling, mark-read) never surfaces errors to the user;
/// the policy decides whether they are at least logged.
pub fn report_swallowed(policy: FailurePolicy, context: &str, err: &AppError) {
    match policy {
        FailurePolicy::Log => match err.status() {
            Some(status) => tracing::warn!(status, "{} failed: {}", context, err),
            None => tracing::warn!("{} failed: {}", context, err),
        },
        FailurePolicy::Silent => {}
    }
}
