//! Line-oriented session over one service, so the store and both cache tiers
//! live for every request in the session.
//!
//! Each input line is one request:
//!
//! ```text
//! put <id> <json payload>
//! get <id>
//! list
//! delete <id>
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Each request writes
//! one line: the status code, a space, then the compact JSON body.

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::application::error::STATUS_BAD_REQUEST;
use crate::domain::LevelPayload;

use super::service::{LevelService, ServedResponse};

#[derive(Debug, Clone)]
pub enum BatchRequest {
    Get { id: String },
    List,
    Put { id: String, payload: LevelPayload },
    Delete { id: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchParseError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected}")]
    Arity {
        command: &'static str,
        expected: &'static str,
    },
    #[error("invalid payload for `{id}`: {message}")]
    Payload { id: String, message: String },
}

impl BatchRequest {
    /// Parse one session line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse(line: &str) -> Result<Option<Self>, BatchParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (command, rest) = split_word(line);
        let request = match command {
            "get" => Self::Get {
                id: single_id("get", rest)?,
            },
            "delete" => Self::Delete {
                id: single_id("delete", rest)?,
            },
            "list" if rest.is_empty() => Self::List,
            "list" => {
                return Err(BatchParseError::Arity {
                    command: "list",
                    expected: "no arguments",
                });
            }
            "put" => {
                let (id, body) = split_word(rest);
                if id.is_empty() || body.is_empty() {
                    return Err(BatchParseError::Arity {
                        command: "put",
                        expected: "an id and a JSON payload",
                    });
                }
                let payload =
                    serde_json::from_str(body).map_err(|err| BatchParseError::Payload {
                        id: id.to_string(),
                        message: err.to_string(),
                    })?;
                Self::Put {
                    id: id.to_string(),
                    payload,
                }
            }
            other => return Err(BatchParseError::UnknownCommand(other.to_string())),
        };
        Ok(Some(request))
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (input, ""),
    }
}

fn single_id(command: &'static str, rest: &str) -> Result<String, BatchParseError> {
    let (id, extra) = split_word(rest);
    if id.is_empty() || !extra.is_empty() {
        return Err(BatchParseError::Arity {
            command,
            expected: "exactly one id",
        });
    }
    Ok(id.to_string())
}

/// Counts of requests served in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub served: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl LevelService {
    /// Dispatch one parsed request.
    pub async fn serve(&self, request: BatchRequest) -> ServedResponse {
        match request {
            BatchRequest::Get { id } => self.get_level(&id).await,
            BatchRequest::List => self.list_levels().await,
            BatchRequest::Put { id, payload } => self.put_level(&id, payload).await,
            BatchRequest::Delete { id } => self.delete_level(&id).await,
        }
    }

    /// Serve every request read from `input` and write one response line per
    /// request to `output`. Unparseable lines are answered with a 400.
    pub async fn run_batch<R, W>(&self, input: R, mut output: W) -> std::io::Result<BatchSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut summary = BatchSummary::default();

        while let Some(line) = lines.next_line().await? {
            let response = match BatchRequest::parse(&line) {
                Ok(None) => continue,
                Ok(Some(request)) => self.serve(request).await,
                Err(err) => {
                    warn!(error = %err, "rejected batch line");
                    ServedResponse {
                        status: STATUS_BAD_REQUEST,
                        body: Value::String(err.to_string()),
                    }
                }
            };

            summary.served += 1;
            if !response.is_success() {
                summary.failed += 1;
            }
            output
                .write_all(format!("{} {}\n", response.status, response.body).as_bytes())
                .await?;
        }

        output.flush().await?;
        info!(served = summary.served, failed = summary.failed, "batch finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::levels::testing::RecordingStore;
    use crate::cache::{CacheConfig, ItemCache, LruByteCache};

    fn service(store: Arc<RecordingStore>) -> LevelService {
        let config = CacheConfig::default();
        let backend = Arc::new(LruByteCache::new(&config));
        LevelService::new(store, ItemCache::new(config, backend), 100)
    }

    #[test]
    fn parses_each_command() {
        assert!(matches!(
            BatchRequest::parse("get a"),
            Ok(Some(BatchRequest::Get { ref id })) if id == "a"
        ));
        assert!(matches!(BatchRequest::parse("  list "), Ok(Some(BatchRequest::List))));
        assert!(matches!(
            BatchRequest::parse("delete gone"),
            Ok(Some(BatchRequest::Delete { ref id })) if id == "gone"
        ));

        match BatchRequest::parse(r#"put b {"parent_key": "a", "rows": 0}"#) {
            Ok(Some(BatchRequest::Put { id, payload })) => {
                assert_eq!(id, "b");
                assert_eq!(payload.parent.as_deref(), Some("a"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(matches!(BatchRequest::parse(""), Ok(None)));
        assert!(matches!(BatchRequest::parse("   "), Ok(None)));
        assert!(matches!(BatchRequest::parse("# seed data"), Ok(None)));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            BatchRequest::parse("fetch a").err(),
            Some(BatchParseError::UnknownCommand("fetch".into()))
        );
        assert!(matches!(
            BatchRequest::parse("get"),
            Err(BatchParseError::Arity { command: "get", .. })
        ));
        assert!(matches!(
            BatchRequest::parse("get a b"),
            Err(BatchParseError::Arity { command: "get", .. })
        ));
        assert!(matches!(
            BatchRequest::parse("list everything"),
            Err(BatchParseError::Arity { command: "list", .. })
        ));
        assert!(matches!(
            BatchRequest::parse("put a"),
            Err(BatchParseError::Arity { command: "put", .. })
        ));
        assert!(matches!(
            BatchRequest::parse("put a {not json"),
            Err(BatchParseError::Payload { ref id, .. }) if id == "a"
        ));
    }

    #[tokio::test]
    async fn session_keeps_writes_and_cache_between_requests() {
        let store = Arc::new(RecordingStore::default());
        let service = service(store.clone());
        let input = concat!(
            "put a {\"rows\": 3}\n",
            "get a\n",
            "get a\n",
            "bogus\n",
        );
        let mut output = Vec::new();

        let summary = service
            .run_batch(input.as_bytes(), &mut output)
            .await
            .expect("batch");

        let lines: Vec<_> = std::str::from_utf8(&output).expect("utf8").lines().collect();
        assert_eq!(lines[0], "200 null");
        assert_eq!(lines[1], r#"200 {"key":"a","rows":3}"#);
        assert_eq!(lines[2], lines[1]);
        assert!(lines[3].starts_with("400 "));
        assert_eq!(summary, BatchSummary { served: 4, failed: 1 });
        assert!(!summary.all_succeeded());
        assert_eq!(store.gets(), 1);
    }
}
