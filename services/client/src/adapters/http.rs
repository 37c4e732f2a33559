//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP backend adapter, which is the concrete
//! implementation of the `AuthApi` and `FileApi` ports from the `core`
//! crate. It handles all request/response plumbing against the remote
//! backend using `reqwest`.

use crate::session::SessionContext;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use readr_core::domain::{FileId, FileRecord, Page, Session, UploadOptions, User, Voice};
use readr_core::ports::{AuthApi, FileApi, PortError, PortResult};
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter speaking the backend's REST surface.
///
/// No request carries an explicit timeout; the only timer-bounded
/// operations in this client are the OTP countdown and the post-upload
/// navigation delay, neither of which lives here.
#[derive(Clone)]
pub struct BackendHttp {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl BackendHttp {
    /// Creates a new `BackendHttp` for the given base URL.
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> PortResult<RequestBuilder> {
        let token = self.session.bearer_token()?;
        Ok(builder.bearer_auth(token))
    }

    /// Turns a non-2xx response into the port error taxonomy, preferring
    /// the backend's own `{message}` text when it sent one.
    async fn check(response: Response) -> PortResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.message)
            .filter(|m| !m.trim().is_empty());

        Err(match status {
            StatusCode::UNAUTHORIZED => PortError::Unauthorized,
            StatusCode::NOT_FOUND => {
                PortError::NotFound(message.unwrap_or_else(|| "resource".to_string()))
            }
            _ => PortError::Rejected(
                message.unwrap_or_else(|| format!("Request failed with status {}", status)),
            ),
        })
    }
}

fn transport(e: reqwest::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    access_token: String,
    user: UserRecord,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(alias = "_id")]
    id: String,
    email: String,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRecordWire {
    #[serde(rename = "_id")]
    id: String,
    file_name: String,
    #[serde(default)]
    processing_complete: bool,
    #[serde(default)]
    processed_pages: u32,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    pages: Vec<PageWire>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PageWire {
    #[serde(default)]
    text: String,
    #[serde(default)]
    audio_url: Option<String>,
}

impl FileRecordWire {
    fn to_domain(self) -> FileRecord {
        FileRecord {
            id: FileId(self.id),
            file_name: self.file_name,
            processing_complete: self.processing_complete,
            processed_pages: self.processed_pages,
            total_pages: self.total_pages,
            pages: self
                .pages
                .into_iter()
                .map(|p| Page {
                    text: p.text,
                    audio_url: p.audio_url,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct VoiceWire {
    value: String,
    name: String,
    gender: String,
    style: String,
    accent: String,
    sample: String,
}

impl VoiceWire {
    fn to_domain(self) -> Voice {
        Voice {
            value: self.value,
            name: self.name,
            gender: self.gender,
            style: self.style,
            accent: self.accent,
            sample: self.sample,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: String,
}

#[derive(Deserialize)]
struct ViewUrlResponse {
    url: String,
}

//=========================================================================================
// `AuthApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthApi for BackendHttp {
    async fn request_code(&self, email: &str) -> PortResult<()> {
        let response = self
            .client
            .post(self.url("/auth/request-otp"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> PortResult<Session> {
        let response = self
            .client
            .post(self.url("/auth/verify-otp"))
            .json(&serde_json::json!({ "email": email, "otp": code }))
            .send()
            .await
            .map_err(transport)?;
        let body: VerifyResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        Ok(Session {
            token: body.access_token,
            user: body.user.to_domain(),
            logged_in_at: Utc::now(),
        })
    }
}

//=========================================================================================
// `FileApi` Trait Implementation
//=========================================================================================

#[async_trait]
impl FileApi for BackendHttp {
    async fn list_files(&self) -> PortResult<Vec<FileRecord>> {
        let request = self.authorized(self.client.get(self.url("/files")))?;
        let response = request.send().await.map_err(transport)?;
        let records: Vec<FileRecordWire> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        debug!("Fetched {} file records", records.len());
        Ok(records.into_iter().map(FileRecordWire::to_domain).collect())
    }

    async fn delete_file(&self, id: &FileId) -> PortResult<()> {
        let request =
            self.authorized(self.client.delete(self.url(&format!("/files/{}", id))))?;
        let response = request.send().await.map_err(transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_voices(&self) -> PortResult<Vec<Voice>> {
        let request = self.authorized(self.client.get(self.url("/files/voices")))?;
        let response = request.send().await.map_err(transport)?;
        let voices: Vec<VoiceWire> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(voices.into_iter().map(VoiceWire::to_domain).collect())
    }

    async fn upload(
        &self,
        file_name: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> PortResult<FileId> {
        let file_part = multipart::Part::stream(data)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(transport)?;

        let form = multipart::Form::new()
            .part("file", file_part)
            .text("voiceId", options.voice_id.clone())
            .text("temperature", options.temperature.to_string())
            .text("speed", options.speed.to_string());

        let request = self.authorized(self.client.post(self.url("/files/upload")))?;
        let response = request.multipart(form).send().await.map_err(transport)?;
        let body: UploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(FileId(body.file_id))
    }

    async fn get_file(&self, id: &FileId) -> PortResult<FileRecord> {
        let request = self.authorized(self.client.get(self.url(&format!("/files/{}", id))))?;
        let response = request.send().await.map_err(transport)?;
        let record: FileRecordWire = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(record.to_domain())
    }

    async fn view_url(&self, id: &FileId) -> PortResult<String> {
        let request =
            self.authorized(self.client.get(self.url(&format!("/files/{}/view-url", id))))?;
        let response = request.send().await.map_err(transport)?;
        let body: ViewUrlResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(transport)?;
        Ok(body.url)
    }
}
