use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::backend::{
    AdmissionsBackend, ApplicationSummary, BackendError, StoredDocument, UserProfile,
};
use crate::config::WizardConfig;
use crate::wizard::domain::{ApplicationId, Field, WizardStep};
use crate::wizard::flow::ApplicationWizard;
use crate::wizard::payload::{CreateApplicationRequest, NestedApplication};
use crate::wizard::staging::{DocumentType, StagedFile};
use crate::wizard::store::ApplicationDraft;

pub(super) const MIB: usize = 1024 * 1024;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub(super) fn wizard_config() -> WizardConfig {
    WizardConfig::default()
}

pub(super) fn student_values() -> Vec<(Field, &'static str)> {
    vec![
        (Field::FirstName, "Sofía Ignacia"),
        (Field::PaternalLastName, "Rojas"),
        (Field::MaternalLastName, "Muñoz"),
        (Field::Rut, "12.345.678-5"),
        (Field::BirthDate, "2009-05-10"),
        (Field::Grade, "4medio"),
        (Field::SchoolApplied, "MONTE_TABOR"),
        (Field::AdmissionPreference, "NINGUNA"),
        (Field::CurrentSchool, "Colegio San Andrés"),
        (Field::StudentAddressStreet, "Av. Providencia"),
        (Field::StudentAddressNumber, "1234"),
        (Field::StudentAddressCommune, "Providencia"),
        (Field::StudentAddressApartment, "45B"),
    ]
}

pub(super) fn parent_values() -> Vec<(Field, &'static str)> {
    vec![
        (Field::Parent1Name, "Carlos Rojas Pérez"),
        (Field::Parent1Rut, "24.123.456-8"),
        (Field::Parent1Email, "carlos.rojas@correo.cl"),
        (Field::Parent1Phone, "+56 9 1234 5678"),
        (Field::Parent1Address, "Av. Providencia 1234"),
        (Field::Parent1Profession, "Ingeniero"),
        (Field::Parent2Name, "Daniela Muñoz Soto"),
        (Field::Parent2Rut, "9.876.543-3"),
        (Field::Parent2Email, "daniela.munoz@correo.cl"),
        (Field::Parent2Phone, "+56 9 8765 4321"),
        (Field::Parent2Address, "Av. Providencia 1234"),
        (Field::Parent2Profession, "Profesora"),
    ]
}

pub(super) fn full_draft() -> ApplicationDraft {
    let mut draft = ApplicationDraft::new();
    for (field, value) in student_values().into_iter().chain(parent_values()) {
        draft.insert(field, value);
    }
    draft.insert(Field::ApplicationYear, "2027");
    draft.insert(Field::SupporterRelation, "padre");
    draft.insert(Field::SupporterName, "Carlos Rojas Pérez");
    draft.insert(Field::SupporterRut, "24.123.456-8");
    draft.insert(Field::SupporterEmail, "carlos.rojas@correo.cl");
    draft.insert(Field::SupporterPhone, "+56 9 1234 5678");
    draft.insert(Field::GuardianRelation, "abuelo");
    draft.insert(Field::GuardianName, "Jorge Muñoz Vidal");
    draft.insert(Field::GuardianRut, "15.666.777-3");
    draft.insert(Field::GuardianEmail, "jorge.munoz@correo.cl");
    draft.insert(Field::GuardianPhone, "+56 2 2345 6789");
    draft
}

fn fill(wizard: &mut ApplicationWizard, values: &[(Field, &str)]) {
    for (field, value) in values {
        wizard.set_field(*field, value).expect("editable field");
    }
}

/// Wizard walked through every data step, sitting on Documents.
pub(super) fn wizard_at_documents() -> ApplicationWizard {
    let mut wizard = ApplicationWizard::new(today(), &wizard_config());
    fill(&mut wizard, &student_values());
    wizard.next().expect("student step complete");
    fill(&mut wizard, &parent_values());
    wizard.next().expect("parents step complete");
    wizard
        .set_field(Field::SupporterRelation, "padre")
        .expect("relation accepted");
    wizard.next().expect("supporter step complete");
    fill(
        &mut wizard,
        &[
            (Field::GuardianRelation, "abuelo"),
            (Field::GuardianName, "Jorge Muñoz Vidal"),
            (Field::GuardianRut, "15.666.777-3"),
            (Field::GuardianEmail, "jorge.munoz@correo.cl"),
            (Field::GuardianPhone, "+56 2 2345 6789"),
        ],
    );
    wizard.next().expect("guardian step complete");
    assert_eq!(wizard.step(), WizardStep::Documents);
    wizard
}

pub(super) fn pdf(name: &str, size: usize) -> StagedFile {
    StagedFile::new(name, Some("application/pdf"), vec![0x25; size])
}

pub(super) fn png(name: &str, size: usize) -> StagedFile {
    StagedFile::new(name, Some("image/png"), vec![0x89; size])
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum RecordedCall {
    Create(CreateApplicationRequest),
    Update(ApplicationId, NestedApplication),
    Upload(ApplicationId, DocumentType, String),
}

/// In-memory backend that records calls and fails on request.
#[derive(Default, Clone)]
pub(super) struct MemoryBackend {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    write_error: Arc<Mutex<Option<BackendError>>>,
    failing_uploads: Arc<Mutex<BTreeSet<DocumentType>>>,
    stored: Arc<Mutex<Option<NestedApplication>>>,
    documents: Arc<Mutex<Vec<StoredDocument>>>,
    profile: Arc<Mutex<Option<UserProfile>>>,
}

impl MemoryBackend {
    pub(super) fn failing_write(error: BackendError) -> Self {
        let backend = Self::default();
        *backend.write_error.lock().expect("mutex poisoned") = Some(error);
        backend
    }

    pub(super) fn fail_upload(&self, document_type: DocumentType) {
        self.failing_uploads
            .lock()
            .expect("mutex poisoned")
            .insert(document_type);
    }

    pub(super) fn with_stored(&self, application: NestedApplication, documents: Vec<StoredDocument>) {
        *self.stored.lock().expect("mutex poisoned") = Some(application);
        *self.documents.lock().expect("mutex poisoned") = documents;
    }

    pub(super) fn with_profile(&self, profile: UserProfile) {
        *self.profile.lock().expect("mutex poisoned") = Some(profile);
    }

    pub(super) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    pub(super) fn uploads(&self) -> Vec<DocumentType> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Upload(_, kind, _) => Some(kind),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().expect("mutex poisoned").push(call);
    }

    fn write_result(&self, id: &str) -> Result<ApplicationSummary, BackendError> {
        if let Some(error) = self.write_error.lock().expect("mutex poisoned").clone() {
            return Err(error);
        }
        Ok(ApplicationSummary {
            id: ApplicationId(id.to_string()),
            student_name: Some("SOFÍA IGNACIA ROJAS MUÑOZ".to_string()),
            grade: Some("4medio".to_string()),
            status: Some("PENDING".to_string()),
            submission_date: Some("2026-10-16T10:00:00".to_string()),
        })
    }
}

#[async_trait]
impl AdmissionsBackend for MemoryBackend {
    async fn create_application(
        &self,
        payload: &CreateApplicationRequest,
    ) -> Result<ApplicationSummary, BackendError> {
        self.record(RecordedCall::Create(payload.clone()));
        self.write_result("101")
    }

    async fn update_application(
        &self,
        id: &ApplicationId,
        payload: &NestedApplication,
    ) -> Result<ApplicationSummary, BackendError> {
        self.record(RecordedCall::Update(id.clone(), payload.clone()));
        self.write_result(&id.0)
    }

    async fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<NestedApplication, BackendError> {
        self.stored
            .lock()
            .expect("mutex poisoned")
            .clone()
            .ok_or_else(|| BackendError::Rejected {
                status: 404,
                message: format!("application {id} not found"),
            })
    }

    async fn upload_document(
        &self,
        id: &ApplicationId,
        document_type: DocumentType,
        file: &StagedFile,
    ) -> Result<(), BackendError> {
        self.record(RecordedCall::Upload(
            id.clone(),
            document_type,
            file.file_name.clone(),
        ));
        if self
            .failing_uploads
            .lock()
            .expect("mutex poisoned")
            .contains(&document_type)
        {
            return Err(BackendError::Rejected {
                status: 500,
                message: "storage unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn list_documents(
        &self,
        _id: &ApplicationId,
    ) -> Result<Vec<StoredDocument>, BackendError> {
        Ok(self.documents.lock().expect("mutex poisoned").clone())
    }

    async fn current_profile(&self) -> Result<UserProfile, BackendError> {
        self.profile
            .lock()
            .expect("mutex poisoned")
            .clone()
            .ok_or_else(|| BackendError::Rejected {
                status: 401,
                message: "not signed in".to_string(),
            })
    }
}
