use chrono::NaiveDate;
use tracing::{debug, info};

use super::domain::{ApplicationId, ContactRole, Field, Relation, WizardStep};
use super::payload::NestedApplication;
use super::relation::{self, Propagation};
use super::staging::{DocumentStagingArea, DocumentType, FileConstraintViolation, StageOutcome, StagedFile};
use super::store::{ApplicationDraft, FieldStore, FieldStoreError};
use super::validation::{StepValidation, StepValidator};
use crate::backend::{StoredDocument, UserProfile};
use crate::config::WizardConfig;

/// Whether submission creates a new application or updates a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit(ApplicationId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("step '{}' is incomplete: {}", .step.label(), .missing.join(", "))]
    StepIncomplete {
        step: WizardStep,
        missing: Vec<String>,
    },
    #[error(transparent)]
    ReadOnly(#[from] FieldStoreError),
    #[error("'{0}' is not a recognised relation")]
    InvalidRelation(String),
    #[error("the documents step is finished by submitting the application")]
    SubmissionRequired,
    #[error("the application was already submitted")]
    Completed,
}

/// One wizard instance: the active step plus the store and staging area it owns.
#[derive(Debug, Clone)]
pub struct ApplicationWizard {
    step: WizardStep,
    mode: WizardMode,
    store: FieldStore,
    staging: DocumentStagingArea,
    validator: StepValidator,
    existing_documents: Vec<StoredDocument>,
}

impl ApplicationWizard {
    pub fn new(today: NaiveDate, config: &WizardConfig) -> Self {
        Self {
            step: WizardStep::Student,
            mode: WizardMode::Create,
            store: FieldStore::new(today),
            staging: DocumentStagingArea::with_limit(config.max_upload_bytes),
            validator: StepValidator::new(today),
            existing_documents: Vec::new(),
        }
    }

    /// Wizard pre-filled from a stored application; submitting issues an update.
    pub fn edit(
        id: ApplicationId,
        application: &NestedApplication,
        existing_documents: Vec<StoredDocument>,
        today: NaiveDate,
        config: &WizardConfig,
    ) -> Self {
        info!(%id, documents = existing_documents.len(), "opening application for edit");
        let mut store = FieldStore::from_draft(application.to_draft(), today);
        for role in [ContactRole::Supporter, ContactRole::Guardian] {
            let derived = store
                .get(role.fields().relation)
                .and_then(|value| value.parse::<Relation>().ok())
                .is_some_and(|relation| relation.parent().is_some());
            if derived {
                for field in role.fields().identity() {
                    store.lock(field);
                }
            }
        }

        Self {
            step: WizardStep::Student,
            mode: WizardMode::Edit(id),
            store,
            staging: DocumentStagingArea::with_limit(config.max_upload_bytes),
            validator: StepValidator::new(today),
            existing_documents,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn staging(&self) -> &DocumentStagingArea {
        &self.staging
    }

    pub fn validator(&self) -> &StepValidator {
        &self.validator
    }

    pub fn existing_documents(&self) -> &[StoredDocument] {
        &self.existing_documents
    }

    /// Record a user edit. Relation fields go through the propagation shortcut.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), WizardError> {
        if let Some(role) = ContactRole::from_relation_field(field) {
            let relation: Relation = value
                .parse()
                .map_err(|_| WizardError::InvalidRelation(value.to_string()))?;
            self.select_relation(role, relation);
            return Ok(());
        }

        self.store.set(field, value)?;
        self.refresh_errors();
        Ok(())
    }

    /// Replay a saved draft. A non-parent relation resets its contact before the
    /// saved values are written; parent relations are applied last so the copy wins.
    pub fn load_draft(&mut self, draft: &ApplicationDraft) -> Result<(), WizardError> {
        let mut parents = Vec::new();
        for (field, value) in draft.iter() {
            let Some(role) = ContactRole::from_relation_field(field) else {
                continue;
            };
            let relation: Relation = value
                .parse()
                .map_err(|_| WizardError::InvalidRelation(value.to_string()))?;
            if relation.parent().is_some() {
                parents.push((role, relation));
            } else {
                relation::select_relation(&mut self.store, role, relation);
            }
        }

        for (field, value) in draft.iter() {
            if ContactRole::from_relation_field(field).is_some() || self.store.is_locked(field) {
                continue;
            }
            self.store.set(field, value)?;
        }

        for (role, relation) in parents {
            self.select_relation(role, relation);
        }
        self.refresh_errors();
        Ok(())
    }

    /// Mark a field as visited (blur) so its findings become visible.
    pub fn touch(&mut self, field: Field) {
        self.store.touch(field);
        self.refresh_errors();
    }

    pub fn select_relation(&mut self, role: ContactRole, relation: Relation) -> Propagation {
        let outcome = relation::select_relation(&mut self.store, role, relation);
        self.store.touch(role.fields().relation);
        self.refresh_errors();
        outcome
    }

    pub fn validate_current(&self) -> StepValidation {
        self.validator.validate(self.store.draft(), self.step)
    }

    pub fn can_proceed_to_next_step(&self) -> bool {
        self.validate_current().can_advance()
    }

    /// Advance one step. An incomplete step reveals every finding and stays put.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Documents => return Err(WizardError::SubmissionRequired),
            WizardStep::Confirmation => return Err(WizardError::Completed),
            _ => {}
        }

        let validation = self.validate_current();
        if !validation.can_advance() {
            for field in validation.fields() {
                self.store.touch(field);
            }
            self.store.apply_validation(&validation);
            let mut missing: Vec<String> = validation
                .missing_labels()
                .into_iter()
                .map(str::to_string)
                .collect();
            missing.extend(validation.issues.iter().map(|issue| issue.message.clone()));
            debug!(step = self.step.label(), missing = missing.len(), "step blocked");
            return Err(WizardError::StepIncomplete {
                step: self.step,
                missing,
            });
        }

        if let Some(next) = self.step.next() {
            debug!(from = self.step.label(), to = next.label(), "advanced step");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Step back; not available once the application has been submitted.
    pub fn previous(&mut self) -> Option<WizardStep> {
        if self.step == WizardStep::Confirmation {
            return None;
        }
        let previous = self.step.previous()?;
        self.step = previous;
        Some(previous)
    }

    pub fn stage_document(
        &mut self,
        document_type: DocumentType,
        file: StagedFile,
    ) -> Result<StageOutcome, FileConstraintViolation> {
        self.staging.stage(document_type, file)
    }

    pub fn clear_document(&mut self, document_type: DocumentType) -> Option<StagedFile> {
        self.staging.clear(document_type)
    }

    /// Staged types that will overwrite a document already stored for this application.
    pub fn pending_replacements(&self) -> Vec<DocumentType> {
        self.staging
            .document_types()
            .into_iter()
            .filter(|kind| {
                self.existing_documents
                    .iter()
                    .any(|stored| stored.kind() == Some(*kind))
            })
            .collect()
    }

    /// Required types neither stored nor staged.
    pub fn missing_required_documents(&self) -> Vec<DocumentType> {
        let stored: Vec<DocumentType> = self
            .existing_documents
            .iter()
            .filter_map(StoredDocument::kind)
            .collect();
        self.staging.missing_required(&stored)
    }

    /// Pre-fill the guardian from the signed-in user. Only blank, unlocked fields change.
    pub fn autofill_from_profile(&mut self, profile: &UserProfile) -> Vec<Field> {
        let guardian = ContactRole::Guardian.fields();
        let candidates = [
            (guardian.name, Some(profile.full_name())),
            (guardian.rut, profile.rut.clone()),
            (guardian.email, Some(profile.email.clone())),
            (guardian.phone, profile.phone.clone()),
        ];

        let mut filled = Vec::new();
        for (field, value) in candidates {
            let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            if self.store.get(field).is_some() || self.store.is_locked(field) {
                continue;
            }
            self.store.put(field, value);
            filled.push(field);
        }
        debug!(filled = filled.len(), "auto-filled guardian from profile");
        filled
    }

    /// Reset after a full or partial successful submission.
    pub(crate) fn finish(&mut self) {
        self.store.clear();
        self.staging.clear_all();
        self.step = WizardStep::Confirmation;
    }

    fn refresh_errors(&mut self) {
        let validation = self.validate_current();
        self.store.apply_validation(&validation);
    }
}
