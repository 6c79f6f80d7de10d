//! REST contract the wizard submits to, plus its HTTP implementation.

mod http;
pub mod verification;

pub use http::HttpBackend;
pub use verification::{
    EmailVerifier, ResendCountdown, VerificationPurpose, VerificationWindow,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::wizard::domain::ApplicationId;
use crate::wizard::payload::{CreateApplicationRequest, NestedApplication};
use crate::wizard::staging::{DocumentType, StagedFile};

/// Summary the backend returns after writing an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub submission_date: Option<String>,
}

/// A document the backend already holds for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    #[serde(deserialize_with = "crate::wizard::domain::string_or_number")]
    pub id: String,
    pub document_type: String,
    #[serde(default, alias = "originalName")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl StoredDocument {
    pub fn kind(&self) -> Option<DocumentType> {
        self.document_type.parse().ok()
    }
}

/// `GET /applications/:id/documents` answers either wrapped or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentListing {
    Wrapped { documents: Vec<StoredDocument> },
    Bare(Vec<StoredDocument>),
}

impl DocumentListing {
    pub fn into_documents(self) -> Vec<StoredDocument> {
        match self {
            DocumentListing::Wrapped { documents } => documents,
            DocumentListing::Bare(documents) => documents,
        }
    }
}

/// Authenticated user's profile, used to pre-fill the guardian contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Failures talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Text the backend (or transport) gave, without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            BackendError::Rejected { message, .. } => message,
            BackendError::Transport(message) | BackendError::Decode(message) => message,
        }
    }
}

/// Admissions REST contract consumed by the wizard.
#[async_trait]
pub trait AdmissionsBackend: Send + Sync {
    /// `POST /applications` with the flat payload.
    async fn create_application(
        &self,
        payload: &CreateApplicationRequest,
    ) -> Result<ApplicationSummary, BackendError>;

    /// `PUT /applications/:id` with the nested payload.
    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: &NestedApplication,
    ) -> Result<ApplicationSummary, BackendError>;

    /// `GET /applications/:id`, used to pre-populate edit mode.
    async fn fetch_application(&self, id: &ApplicationId)
        -> Result<NestedApplication, BackendError>;

    /// `POST /documents/upload/:applicationId` as multipart.
    async fn upload_document(
        &self,
        id: &ApplicationId,
        document_type: DocumentType,
        file: &StagedFile,
    ) -> Result<(), BackendError>;

    /// `GET /applications/:id/documents`.
    async fn list_documents(&self, id: &ApplicationId)
        -> Result<Vec<StoredDocument>, BackendError>;

    /// `GET /users/me`.
    async fn current_profile(&self) -> Result<UserProfile, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_listing_accepts_both_shapes() {
        let wrapped: DocumentListing = serde_json::from_str(
            r#"{"documents":[{"id":7,"documentType":"BIRTH_CERTIFICATE","fileName":"acta.pdf"}]}"#,
        )
        .expect("wrapped listing");
        let bare: DocumentListing = serde_json::from_str(
            r#"[{"id":"7","documentType":"BIRTH_CERTIFICATE","originalName":"acta.pdf"}]"#,
        )
        .expect("bare listing");

        let wrapped = wrapped.into_documents();
        let bare = bare.into_documents();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped[0].kind(), Some(DocumentType::BirthCertificate));
    }

    #[test]
    fn summary_tolerates_sparse_responses() {
        let summary: ApplicationSummary =
            serde_json::from_str(r#"{"id": 15, "status": "PENDING"}"#).expect("summary");
        assert_eq!(summary.id, ApplicationId("15".to_string()));
        assert_eq!(summary.status.as_deref(), Some("PENDING"));
        assert!(summary.student_name.is_none());
    }
}
