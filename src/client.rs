//! HTTP client for a running board server, used by the CLI subcommands.
//! The realtime counterpart lives in [`crate::watch`].

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use taskboard_common::{Board, NewTask, Task, TaskPatch};
use thiserror::Error;

use crate::web::api::{MoveTaskRequest, MoveTaskResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    NotFound(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request to board server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sync channel error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Malformed sync message: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ClientError::WebSocket(Box::new(err))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct BoardClient {
    base_url: String,
    http: reqwest::Client,
}

impl BoardClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_board(&self) -> Result<Board, ClientError> {
        let resp = self.http.get(self.url("/api/board")).send().await?;
        decode(resp).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/tasks"))
            .json(task)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/tasks/{}", id)))
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .send()
            .await?;
        check(resp).await.map(|_| ())
    }

    pub async fn move_task(
        &self,
        id: &str,
        request: &MoveTaskRequest,
    ) -> Result<MoveTaskResponse, ClientError> {
        let resp = self
            .http
            .post(self.url(&format!("/api/tasks/{}/move", id)))
            .json(request)
            .send()
            .await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(message))
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    Ok(check(resp).await?.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BoardClient::new("http://127.0.0.1:3001/");
        assert_eq!(client.base_url(), "http://127.0.0.1:3001");
        assert_eq!(client.url("/api/board"), "http://127.0.0.1:3001/api/board");
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status {
            status: 400,
            message: "Title is required".into(),
        };
        assert_eq!(err.to_string(), "Server returned 400: Title is required");
        assert_eq!(
            ClientError::NotFound("Task x not found".into()).to_string(),
            "Task x not found"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let client = BoardClient::new("http://127.0.0.1:9");
        let err = client.fetch_board().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
