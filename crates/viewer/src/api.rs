//! Client for the slide persistence API.
//!
//! [`SlideApi`] is the seam the edit controller talks through;
//! [`HttpSlideApi`] implements it over HTTP with [`reqwest`].

use std::future::Future;

use pitchdeck_core::merge::SlideView;
use pitchdeck_core::slide::SlideDocument;
use pitchdeck_core::types::{DbId, Position, Timestamp};
use pitchdeck_core::upload::UPLOAD_FIELD;
use serde::{Deserialize, Serialize};

/// HTTP status the server answers with when a save carries a stale revision.
pub const STATUS_CONFLICT: u16 = 409;

/// A persisted override record as returned by the write endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSlide {
    pub id: DbId,
    pub position: Position,
    pub title: String,
    pub content: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of a slide save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub title: String,
    pub content: SlideDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachRequest<'a> {
    image_url: &'a str,
}

/// Errors from the persistence API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Status {
        status: u16,
        message: String,
        /// Revision the server holds, sent with a stale-write conflict.
        stored_revision: Option<i64>,
    },
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
            stored_revision: None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == STATUS_CONFLICT)
    }

    pub fn stored_revision(&self) -> Option<i64> {
        match self {
            ApiError::Status { stored_revision, .. } => *stored_revision,
            ApiError::Http(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    stored_revision: Option<i64>,
}

/// Operations the viewer needs from the server.
pub trait SlideApi: Send + Sync {
    /// The merged deck.
    fn list_slides(&self) -> impl Future<Output = Result<Vec<SlideView>, ApiError>> + Send;

    /// Upsert the override at `position`.
    fn save_slide(
        &self,
        position: Position,
        request: &SaveRequest,
    ) -> impl Future<Output = Result<SavedSlide, ApiError>> + Send;

    /// Upload image bytes; returns the public URL.
    fn upload_image(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn attach_image(
        &self,
        position: Position,
        image_url: &str,
    ) -> impl Future<Output = Result<SavedSlide, ApiError>> + Send;

    fn delete_image(&self, position: Position) -> impl Future<Output = Result<SavedSlide, ApiError>> + Send;
}

/// HTTP client for one server.
pub struct HttpSlideApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSlideApi {
    /// * `base_url` - Server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-2xx response into [`ApiError::Status`], preferring the
    /// server's `error` message over the raw body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(Self::status_error(status.as_u16(), body))
    }

    fn status_error(status: u16, body: String) -> ApiError {
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => ApiError::Status {
                status,
                message: parsed.error,
                stored_revision: parsed.stored_revision,
            },
            Err(_) => ApiError::status(status, body),
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl SlideApi for HttpSlideApi {
    async fn list_slides(&self) -> Result<Vec<SlideView>, ApiError> {
        let response = self.client.get(self.url("/api/slides")).send().await?;
        Self::parse_response(response).await
    }

    async fn save_slide(&self, position: Position, request: &SaveRequest) -> Result<SavedSlide, ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/slides/{position}")))
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn upload_image(
        &self,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.url("/api/upload/image"))
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = Self::parse_response(response).await?;
        Ok(uploaded.image_url)
    }

    async fn attach_image(&self, position: Position, image_url: &str) -> Result<SavedSlide, ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/api/slides/{position}/image")))
            .json(&AttachRequest { image_url })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete_image(&self, position: Position) -> Result<SavedSlide, ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/slides/{position}/image")))
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchdeck_core::slide::ContentSlide;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpSlideApi::new("http://localhost:3000/");
        assert_eq!(api.url("/api/slides"), "http://localhost:3000/api/slides");
    }

    #[test]
    fn conflict_is_recognised() {
        let conflict = ApiError::status(409, "stale");
        let other = ApiError::status(500, "boom");
        assert!(conflict.is_conflict());
        assert!(!other.is_conflict());
    }

    #[test]
    fn error_body_carries_message_and_stored_revision() {
        let err = HttpSlideApi::status_error(
            409,
            r#"{"error":"stale","code":"STALE_REVISION","storedRevision":7}"#.to_string(),
        );
        assert!(err.is_conflict());
        assert_eq!(err.stored_revision(), Some(7));
        assert_eq!(err.to_string(), "API error (409): stale");

        let plain = HttpSlideApi::status_error(502, "Bad Gateway".to_string());
        assert_eq!(plain.stored_revision(), None);
        assert_eq!(plain.to_string(), "API error (502): Bad Gateway");
    }

    #[test]
    fn save_request_serializes_tagged_content() {
        let request = SaveRequest {
            title: "X".into(),
            content: SlideDocument::Content(ContentSlide {
                title: "X".into(),
                visual: None,
                sections: vec![],
            }),
            revision: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["content"]["type"], "content");
        assert_eq!(value["content"]["sections"], serde_json::json!([]));
        assert!(value.get("revision").is_none());
    }
}
