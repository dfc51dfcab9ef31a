//! Mapping of GitHub HTTP failures onto [`MirrorError`].

use serde::Deserialize;

use mirror_core::MirrorError;

/// The parts of a failed response that decide its classification.
#[derive(Debug, Clone, Default)]
pub struct FailedResponse {
    pub status: u16,
    pub rate_limit_remaining: Option<String>,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl FailedResponse {
    fn details(&self) -> ErrorBody {
        serde_json::from_str(&self.body).unwrap_or_default()
    }

    fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.rate_limit_remaining.as_deref() == Some("0")
    }

    /// 422 "name already exists on this account".
    fn is_name_taken(&self) -> bool {
        if self.status != 422 {
            return false;
        }
        self.details().errors.iter().any(|e| {
            e.code.as_deref() == Some("already_exists")
                || e
                    .message
                    .as_deref()
                    .is_some_and(|m| m.contains("already exists"))
        })
    }
}

pub fn classify(action: &str, response: &FailedResponse) -> MirrorError {
    let details = response.details();
    let summary = if details.message.is_empty() {
        format!("{action}: GitHub answered HTTP {}", response.status)
    } else {
        format!(
            "{action}: GitHub answered HTTP {}: {}",
            response.status, details.message
        )
    };

    if response.is_rate_limited() {
        return MirrorError::Transient(summary);
    }
    if response.is_name_taken() {
        return MirrorError::Conflict(summary);
    }
    match response.status {
        401 | 403 => MirrorError::Auth(summary),
        404 => MirrorError::NotFound(summary),
        500..=599 => MirrorError::Transient(summary),
        _ => MirrorError::Rejected(summary),
    }
}

pub(crate) fn from_ureq(action: &str, err: ureq::Error) -> MirrorError {
    match err {
        ureq::Error::Status(status, response) => {
            let rate_limit_remaining = response
                .header("x-ratelimit-remaining")
                .map(str::to_string);
            let body = response.into_string().unwrap_or_default();
            classify(
                action,
                &FailedResponse {
                    status,
                    rate_limit_remaining,
                    body,
                },
            )
        }
        ureq::Error::Transport(transport) => {
            MirrorError::Transient(format!("{action}: {transport}"))
        }
    }
}
