use derive_more::{Display, Error};
use serde_json::Value;

/// Everything that can go wrong while talking to the dashboard backend.
#[derive(Debug, Display, Error)]
pub enum FetchError {
    #[display("request failed: {_0}")]
    Transport(#[error(source)] reqwest::Error),
    #[display("HTTP error! status: {status}")]
    Status { status: u16, detail: Option<String> },
    #[display("could not decode response: {_0}")]
    Decode(#[error(source)] serde_json::Error),
    #[display("invalid endpoint url: {_0}")]
    InvalidUrl(#[error(not(source))] String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeedbackKind {
    #[display("transport")]
    Transport,
    #[display("http")]
    Http,
    #[display("decode")]
    Decode,
}

/// User-facing description of a [`FetchError`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{message}")]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

pub const DECODE_MESSAGE: &str = "Could not process the server response.";

/// Maps any fetch error to the message every feedback site shows.
/// A server-provided `detail` wins over the bare status code.
pub fn classify(err: &FetchError) -> Feedback {
    match err {
        FetchError::Transport(e) => Feedback {
            kind: FeedbackKind::Transport,
            message: format!("Network error: {e}"),
        },
        FetchError::InvalidUrl(url) => Feedback {
            kind: FeedbackKind::Transport,
            message: format!("Invalid endpoint: {url}"),
        },
        FetchError::Status { status, detail } => Feedback {
            kind: FeedbackKind::Http,
            message: match detail {
                Some(detail) => detail.clone(),
                None => format!("HTTP error! status: {status}"),
            },
        },
        FetchError::Decode(_) => Feedback {
            kind: FeedbackKind::Decode,
            message: DECODE_MESSAGE.to_string(),
        },
    }
}

/// Pulls the `detail` out of an error body.
///
/// Handlers raise `{"detail": "..."}`; request validation failures come back as
/// `{"detail": [{"msg": "..."}, ...]}`, whose messages are joined.
pub fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_preferred_over_status_code() {
        let err = FetchError::Status {
            status: 500,
            detail: Some("busy".to_string()),
        };
        let fb = classify(&err);
        assert_eq!(fb.kind, FeedbackKind::Http);
        assert_eq!(fb.message, "busy");
    }

    #[test]
    fn status_code_is_shown_without_detail() {
        let err = FetchError::Status {
            status: 503,
            detail: None,
        };
        assert_eq!(classify(&err).message, "HTTP error! status: 503");
    }

    #[test]
    fn decode_errors_get_a_generic_message() {
        let parse = serde_json::from_str::<Value>("<html>").unwrap_err();
        let fb = classify(&FetchError::Decode(parse));
        assert_eq!(fb.kind, FeedbackKind::Decode);
        assert_eq!(fb.message, DECODE_MESSAGE);
    }

    #[test]
    fn detail_message_reads_string_and_validation_lists() {
        assert_eq!(detail_message(r#"{"detail":"busy"}"#).as_deref(), Some("busy"));
        assert_eq!(
            detail_message(r#"{"detail":[{"msg":"field required"},{"msg":"bad date"}]}"#)
                .as_deref(),
            Some("field required; bad date")
        );
        assert_eq!(detail_message(r#"{"detail":""}"#), None);
        assert_eq!(detail_message(r#"{"error":"x"}"#), None);
        assert_eq!(detail_message("Internal Server Error"), None);
    }
}
