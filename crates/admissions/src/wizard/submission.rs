use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use super::domain::{ApplicationId, WizardStep};
use super::failure::SubmissionFailure;
use super::flow::{ApplicationWizard, WizardMode};
use super::payload::{ApplicationWrite, CreateApplicationRequest, NestedApplication};
use super::staging::DocumentType;
use crate::backend::{AdmissionsBackend, ApplicationSummary, BackendError};
use crate::config::WizardConfig;

/// One document that did not make it to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub document_type: DocumentType,
    pub file_name: String,
    pub reason: String,
}

/// Per-document results of the upload phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<DocumentType>,
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    pub fn attempted(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Notice for a partial upload; `None` when every document went through.
    pub fn notice(&self) -> Option<String> {
        if self.is_complete() {
            return None;
        }
        Some(format!(
            "Se subieron {} de {} documentos. La postulación quedó registrada; puede completar la carga de documentos más tarde desde su panel.",
            self.uploaded.len(),
            self.attempted()
        ))
    }
}

/// Result of a submission that at least persisted the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub application: ApplicationSummary,
    pub created: bool,
    pub uploads: UploadReport,
}

/// Drives the application write followed by the document uploads.
pub struct SubmissionCoordinator<B> {
    backend: Arc<B>,
}

impl<B> SubmissionCoordinator<B>
where
    B: AdmissionsBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Load a stored application and its documents into an edit-mode wizard.
    pub async fn resume(
        &self,
        id: ApplicationId,
        today: NaiveDate,
        config: &WizardConfig,
    ) -> Result<ApplicationWizard, BackendError> {
        let (application, documents) = futures::try_join!(
            self.backend.fetch_application(&id),
            self.backend.list_documents(&id)
        )?;
        Ok(ApplicationWizard::edit(
            id,
            &application,
            documents,
            today,
            config,
        ))
    }

    /// Fetch the signed-in user's profile and pre-fill the guardian from it.
    pub async fn autofill(&self, wizard: &mut ApplicationWizard) -> Result<usize, BackendError> {
        let profile = self.backend.current_profile().await?;
        Ok(wizard.autofill_from_profile(&profile).len())
    }

    /// Choose the request shape for the wizard's mode.
    pub fn plan(wizard: &ApplicationWizard) -> ApplicationWrite {
        let draft = wizard.store().draft();
        let year = wizard.store().application_year();
        match wizard.mode() {
            WizardMode::Create => {
                ApplicationWrite::Create(CreateApplicationRequest::from_draft(draft, year))
            }
            WizardMode::Edit(id) => ApplicationWrite::Update {
                id: id.clone(),
                body: NestedApplication::from_draft(draft, year),
            },
        }
    }

    /// Submit from the Documents step. A failed application write aborts before any
    /// upload; failed uploads are reported but never roll the application back.
    pub async fn submit(
        &self,
        wizard: &mut ApplicationWizard,
    ) -> Result<SubmissionReceipt, SubmissionFailure> {
        if wizard.step() != WizardStep::Documents {
            return Err(SubmissionFailure::not_ready(wizard.step()));
        }

        let write = Self::plan(wizard);
        let created = matches!(write, ApplicationWrite::Create(_));
        let written = match &write {
            ApplicationWrite::Create(body) => self.backend.create_application(body).await,
            ApplicationWrite::Update { id, body } => {
                self.backend.update_application(id, body).await
            }
        };

        let application = match written {
            Ok(summary) => summary,
            Err(err) => {
                let failure = SubmissionFailure::classify(&err);
                error!(error = %err, kind = ?failure.kind, "application write failed");
                return Err(failure);
            }
        };
        info!(application_id = %application.id, created, "application saved");

        let uploads = self.upload_staged(&application.id, wizard).await;
        if let Some(notice) = uploads.notice() {
            warn!(
                application_id = %application.id,
                failed = uploads.failed.len(),
                attempted = uploads.attempted(),
                "{notice}"
            );
        }

        wizard.finish();
        Ok(SubmissionReceipt {
            application,
            created,
            uploads,
        })
    }

    async fn upload_staged(&self, id: &ApplicationId, wizard: &ApplicationWizard) -> UploadReport {
        let pending = wizard.staging().iter().map(|(document_type, file)| {
            let backend = Arc::clone(&self.backend);
            async move {
                let result = backend.upload_document(id, document_type, file).await;
                (document_type, file.file_name.clone(), result)
            }
        });

        let mut report = UploadReport::default();
        for (document_type, file_name, result) in join_all(pending).await {
            match result {
                Ok(()) => report.uploaded.push(document_type),
                Err(err) => {
                    warn!(%id, document_type = document_type.as_str(), error = %err, "document upload failed");
                    report.failed.push(UploadFailure {
                        document_type,
                        file_name,
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }
}
