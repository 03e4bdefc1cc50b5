use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};

/// Reply of `GET /api/status`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct StatusResponse {
    pub is_running: bool,
    #[serde(default)]
    pub pid: Option<u32>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct LogsResponse {
    pub logs: String,
}

#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct DatesResponse {
    #[serde(default)]
    pub dates: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct KeywordsResponse {
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
}

/// Reply of the run/stop endpoints. Only `message` is guaranteed.
#[derive(Debug, Deserialize, Clone, Display, Serialize)]
#[display("{message}")]
pub struct MessageResponse {
    pub message: String,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Display, Serialize, PartialEq, Eq)]
#[display("#{rank} {keyword}")]
pub struct KeywordEntry {
    pub rank: u32,
    pub keyword: String,
}

impl KeywordEntry {
    pub fn new(rank: u32, keyword: impl Into<String>) -> Self {
        Self {
            rank,
            keyword: keyword.into(),
        }
    }

    pub fn tier(&self) -> RankTier {
        RankTier::of(self.rank)
    }
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum RankTier {
    #[display("top3")]
    Top3,
    #[display("top10")]
    Top10,
    #[display("other")]
    Other,
}

impl RankTier {
    pub fn of(rank: u32) -> Self {
        match rank {
            0..=3 => RankTier::Top3,
            4..=10 => RankTier::Top10,
            _ => RankTier::Other,
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            RankTier::Top3 => Tone::Danger,
            RankTier::Top10 => Tone::Warning,
            RankTier::Other => Tone::Secondary,
        }
    }
}

/// Body of `POST /api/run-scrape`. `None` serializes as `null`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ScrapeRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ScrapeRequest {
    /// Empty inputs mean "unspecified".
    pub fn from_inputs(start_date: Option<&str>, end_date: Option<&str>) -> Self {
        Self {
            start_date: non_empty(start_date),
            end_date: non_empty(end_date),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Observed state of the scrape job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum RunStatus {
    #[display("running")]
    Running { pid: Option<u32> },
    #[display("idle")]
    Idle,
    #[default]
    #[display("unknown")]
    Unknown,
}

impl From<StatusResponse> for RunStatus {
    fn from(resp: StatusResponse) -> Self {
        if resp.is_running {
            RunStatus::Running { pid: resp.pid }
        } else {
            RunStatus::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Tone {
    #[display("info")]
    Info,
    #[display("success")]
    Success,
    #[display("warning")]
    Warning,
    #[display("danger")]
    Danger,
    #[display("secondary")]
    Secondary,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("({tone}) {text}")]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Tone::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Tone::Success, text)
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self::new(Tone::Danger, text)
    }

    pub fn secondary(text: impl Into<String>) -> Self {
        Self::new(Tone::Secondary, text)
    }
}

/// The two user actions that drive the scrape job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum JobAction {
    #[display("run")]
    Run,
    #[display("stop")]
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_tiers_split_at_three_and_ten() {
        assert_eq!(RankTier::of(1), RankTier::Top3);
        assert_eq!(RankTier::of(3), RankTier::Top3);
        assert_eq!(RankTier::of(4), RankTier::Top10);
        assert_eq!(RankTier::of(10), RankTier::Top10);
        assert_eq!(RankTier::of(11), RankTier::Other);
        assert_ne!(RankTier::Top3.tone(), RankTier::Top10.tone());
        assert_ne!(RankTier::Top10.tone(), RankTier::Other.tone());
    }

    #[test]
    fn empty_dates_serialize_as_null() {
        let req = ScrapeRequest::from_inputs(Some(""), None);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"start_date": null, "end_date": null}));

        let req = ScrapeRequest::from_inputs(Some("2024-06-01"), Some(" "));
        assert_eq!(req.start_date.as_deref(), Some("2024-06-01"));
        assert_eq!(req.end_date, None);
    }

    #[test]
    fn status_reply_maps_to_run_status() {
        let running: StatusResponse =
            serde_json::from_str(r#"{"is_running": true, "pid": 42}"#).unwrap();
        assert_eq!(RunStatus::from(running), RunStatus::Running { pid: Some(42) });

        let idle: StatusResponse =
            serde_json::from_str(r#"{"is_running": false, "pid": null}"#).unwrap();
        assert_eq!(RunStatus::from(idle), RunStatus::Idle);
    }

    #[test]
    fn run_reply_extras_are_optional() {
        let reply: MessageResponse = serde_json::from_str(r#"{"message": "started"}"#).unwrap();
        assert_eq!(reply.to_string(), "started");
        assert_eq!(reply.pid, None);
    }
}
