use core_engine::RankingPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: RequestBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    Complete(CompleteRequest),
    Commit(WordRequest),
    Learn(WordRequest),
    Stats,
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Completion(CompleteResponse),
    Committed(CommitResponse),
    Learned(LearnResponse),
    Stats(StatsResponse),
    Pong,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRequest {
    /// Text before the cursor; only its trailing word is used.
    pub context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub priority: u64,
    #[serde(default)]
    pub replace_range: Option<[usize; 2]>,
}

impl CompleteResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitResponse {
    pub word: String,
    pub priority: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LearnResponse {
    pub word: String,
    pub new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub nodes: usize,
    pub words: usize,
    pub policy: RankingPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_complete_request() {
        let raw = r#"{"id":"abc","type":"complete","context":"see you tomo"}"#;
        let request: DaemonRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.id, "abc");
        match request.body {
            RequestBody::Complete(payload) => assert_eq!(payload.context, "see you tomo"),
            _ => panic!("expected complete request"),
        }
    }

    #[test]
    fn parse_unit_requests() {
        let request: DaemonRequest = serde_json::from_str(r#"{"type":"stats"}"#).unwrap();
        assert!(request.id.is_empty());
        assert!(matches!(request.body, RequestBody::Stats));
    }

    #[test]
    fn serialize_error_response() {
        let response = DaemonResponse {
            id: "7".to_string(),
            body: ResponseBody::Error(ErrorResponse {
                code: ErrorCode::InvalidRequest,
                message: "word must not be empty".to_string(),
            }),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "invalid_request");
    }
}
