use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::verification::{EmailVerifier, VerificationPurpose, VerificationWindow};
use super::{
    AdmissionsBackend, ApplicationSummary, BackendError, DocumentListing, StoredDocument,
    UserProfile,
};
use crate::config::BackendConfig;
use crate::wizard::domain::ApplicationId;
use crate::wizard::payload::{CreateApplicationRequest, NestedApplication};
use crate::wizard::staging::{DocumentType, StagedFile};

/// `reqwest` client for the admissions REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, BackendError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "admissions api responded");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = rejection_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        warn!(path, status = status.as_u16(), %message, "admissions api rejected request");
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, BackendError> {
        let body = response
            .text()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|err| BackendError::Decode(format!("{path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.send(self.client.get(self.url(path)), path).await?;
        Self::decode(response, path).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.client.post(self.url(path)).json(body), path)
            .await?;
        Self::decode(response, path).await
    }
}

/// Pull a human message out of an error body: `message`, then `error`, then raw text.
fn rejection_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    Some(trimmed.chars().take(500).collect())
}

#[async_trait]
impl AdmissionsBackend for HttpBackend {
    async fn create_application(
        &self,
        payload: &CreateApplicationRequest,
    ) -> Result<ApplicationSummary, BackendError> {
        self.post_json("/applications", payload).await
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: &NestedApplication,
    ) -> Result<ApplicationSummary, BackendError> {
        let path = format!("/applications/{id}");
        let response = self
            .send(self.client.put(self.url(&path)).json(payload), &path)
            .await?;
        Self::decode(response, &path).await
    }

    async fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<NestedApplication, BackendError> {
        self.get_json(&format!("/applications/{id}")).await
    }

    async fn upload_document(
        &self,
        id: &ApplicationId,
        document_type: DocumentType,
        file: &StagedFile,
    ) -> Result<(), BackendError> {
        let path = format!("/documents/upload/{id}");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type.essence_str())
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("documentType", document_type.as_str())
            .text("isRequired", document_type.is_required().to_string());

        self.send(self.client.post(self.url(&path)).multipart(form), &path)
            .await?;
        Ok(())
    }

    async fn list_documents(
        &self,
        id: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, BackendError> {
        let listing: DocumentListing = self
            .get_json(&format!("/applications/{id}/documents"))
            .await?;
        Ok(listing.into_documents())
    }

    async fn current_profile(&self) -> Result<UserProfile, BackendError> {
        self.get_json("/users/me").await
    }
}

#[derive(Serialize)]
struct CodeRequest<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    purpose: VerificationPurpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

#[derive(Deserialize)]
struct VerifyResponse {
    #[serde(default, alias = "valid")]
    verified: bool,
}

#[async_trait]
impl EmailVerifier for HttpBackend {
    async fn send_code(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<VerificationWindow, BackendError> {
        let body = CodeRequest {
            email,
            purpose,
            code: None,
        };
        self.post_json("/email-verification/send", &body).await
    }

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: VerificationPurpose,
    ) -> Result<bool, BackendError> {
        let body = CodeRequest {
            email,
            purpose,
            code: Some(code),
        };
        let response: VerifyResponse = self.post_json("/email-verification/verify", &body).await?;
        Ok(response.verified)
    }

    async fn resend_code(
        &self,
        email: &str,
        purpose: VerificationPurpose,
    ) -> Result<VerificationWindow, BackendError> {
        let body = CodeRequest {
            email,
            purpose,
            code: None,
        };
        self.post_json("/email-verification/resend", &body).await
    }
}
