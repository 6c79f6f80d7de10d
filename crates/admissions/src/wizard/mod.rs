//! The application wizard: field state, step validation, relation shortcuts,
//! document staging and the two-phase submission.

pub mod domain;
pub mod failure;
pub mod flow;
pub mod payload;
pub mod relation;
pub mod rut;
pub mod staging;
pub mod store;
pub mod submission;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{ApplicationId, ContactRole, Field, ParentSlot, Relation, WizardStep};
pub use failure::{FailureKind, SubmissionFailure};
pub use flow::{ApplicationWizard, WizardError, WizardMode};
pub use payload::{ApplicationWrite, CreateApplicationRequest, NestedApplication};
pub use relation::{select_relation, Propagation};
pub use rut::{calculate_verification_digit, format_rut, format_rut_input, is_valid_rut};
pub use staging::{
    DocumentStagingArea, DocumentType, FileConstraintViolation, StageOutcome, StagedFile,
    UPLOADER_MAX_UPLOAD_BYTES, WIZARD_MAX_UPLOAD_BYTES,
};
pub use store::{admission_year, ApplicationDraft, FieldStore, FieldStoreError};
pub use submission::{SubmissionCoordinator, SubmissionReceipt, UploadFailure, UploadReport};
pub use validation::{Grade, StepValidation, StepValidator};
