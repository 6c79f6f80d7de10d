mod grades;
mod rules;

pub use grades::{
    age_in_years, requires_current_school, validate_birth_date_for_grade, AgeCheck, Grade,
};
pub use rules::{is_valid_email, is_valid_phone, parse_birth_date};

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{ContactRole, Field, ParentSlot, WizardStep};
use super::rut::is_valid_rut;
use super::store::{admission_year, ApplicationDraft};

/// Required field that has no value yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub field: Field,
    pub label: &'static str,
}

/// Field whose value is present but malformed or out of policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: Field,
    pub message: String,
}

/// Findings for one step. Never an error: the UI renders it inline and in the banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepValidation {
    pub step: WizardStep,
    pub missing: Vec<MissingField>,
    pub issues: Vec<FieldIssue>,
}

impl StepValidation {
    fn new(step: WizardStep) -> Self {
        Self {
            step,
            missing: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn can_advance(&self) -> bool {
        self.missing.is_empty() && self.issues.is_empty()
    }

    /// Ordered labels for the warning banner.
    pub fn missing_labels(&self) -> Vec<&'static str> {
        self.missing.iter().map(|missing| missing.label).collect()
    }

    /// Every field this step inspected and flagged.
    pub fn fields(&self) -> Vec<Field> {
        self.missing
            .iter()
            .map(|missing| missing.field)
            .chain(self.issues.iter().map(|issue| issue.field))
            .collect()
    }

    fn require(&mut self, draft: &ApplicationDraft, field: Field) -> Option<String> {
        match draft.get(field) {
            Some(value) => Some(value.to_string()),
            None => {
                self.missing.push(MissingField {
                    field,
                    label: field.label(),
                });
                None
            }
        }
    }

    fn flag(&mut self, field: Field, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field,
            message: message.into(),
        });
    }

    fn require_rut(&mut self, draft: &ApplicationDraft, field: Field) {
        if let Some(value) = self.require(draft, field) {
            if !is_valid_rut(&value) {
                self.flag(field, "RUT inválido: revise el dígito verificador");
            }
        }
    }

    fn require_email(&mut self, draft: &ApplicationDraft, field: Field) {
        if let Some(value) = self.require(draft, field) {
            self.check_email(field, &value);
        }
    }

    fn check_email(&mut self, field: Field, value: &str) {
        if !is_valid_email(value) {
            self.flag(field, "Ingrese un email válido (ej. nombre@dominio.cl)");
        }
    }

    fn require_phone(&mut self, draft: &ApplicationDraft, field: Field) {
        if let Some(value) = self.require(draft, field) {
            if !is_valid_phone(&value) {
                self.flag(field, "Ingrese un teléfono válido (mínimo 8 dígitos)");
            }
        }
    }
}

/// Pure per-step predicates, evaluated as of a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct StepValidator {
    today: NaiveDate,
}

impl StepValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn validate(&self, draft: &ApplicationDraft, step: WizardStep) -> StepValidation {
        let mut validation = StepValidation::new(step);
        match step {
            WizardStep::Student => self.student(draft, &mut validation),
            WizardStep::Parents => {
                parent(draft, ParentSlot::Father, &mut validation);
                parent(draft, ParentSlot::Mother, &mut validation);
            }
            WizardStep::Supporter => contact(draft, ContactRole::Supporter, &mut validation),
            WizardStep::Guardian => contact(draft, ContactRole::Guardian, &mut validation),
            // Files are checked one by one when staged.
            WizardStep::Documents | WizardStep::Confirmation => {}
        }
        validation
    }

    pub fn can_proceed(&self, draft: &ApplicationDraft, step: WizardStep) -> bool {
        self.validate(draft, step).can_advance()
    }

    fn student(&self, draft: &ApplicationDraft, validation: &mut StepValidation) {
        validation.require(draft, Field::FirstName);
        validation.require(draft, Field::PaternalLastName);
        validation.require(draft, Field::MaternalLastName);
        validation.require_rut(draft, Field::Rut);
        let birth_date = validation.require(draft, Field::BirthDate);
        let grade = validation.require(draft, Field::Grade);
        validation.require(draft, Field::SchoolApplied);
        validation.require(draft, Field::AdmissionPreference);
        validation.require(draft, Field::StudentAddressStreet);
        validation.require(draft, Field::StudentAddressNumber);
        validation.require(draft, Field::StudentAddressCommune);

        let expected_year = admission_year(self.today);
        match draft.get(Field::ApplicationYear) {
            Some(year) if year.parse::<i32>().ok() == Some(expected_year) => {}
            _ => validation.flag(
                Field::ApplicationYear,
                format!("El año de postulación debe ser {expected_year}"),
            ),
        }

        let birth_date = birth_date.and_then(|raw| {
            let parsed = parse_birth_date(&raw);
            if parsed.is_none() {
                validation.flag(Field::BirthDate, "Fecha de nacimiento inválida (AAAA-MM-DD)");
            }
            parsed
        });

        let grade = grade.and_then(|raw| match raw.parse::<Grade>() {
            Ok(grade) => Some(grade),
            Err(_) => {
                validation.flag(Field::Grade, format!("Curso no reconocido: {raw}"));
                None
            }
        });

        if let (Some(birth_date), Some(grade)) = (birth_date, grade) {
            let check = validate_birth_date_for_grade(birth_date, grade, self.today);
            if let Some(message) = check.message {
                validation.flag(Field::BirthDate, message);
            }
        }

        if grade.is_some_and(Grade::requires_current_school) {
            validation.require(draft, Field::CurrentSchool);
        }

        if let Some(email) = draft.get(Field::StudentEmail) {
            validation.check_email(Field::StudentEmail, email);
        }
    }
}

fn parent(draft: &ApplicationDraft, slot: ParentSlot, validation: &mut StepValidation) {
    let fields = slot.fields();
    validation.require(draft, fields.name);
    validation.require_rut(draft, fields.rut);
    validation.require_email(draft, fields.email);
    validation.require_phone(draft, fields.phone);
    validation.require(draft, fields.address);
    validation.require(draft, fields.profession);
}

fn contact(draft: &ApplicationDraft, role: ContactRole, validation: &mut StepValidation) {
    let fields = role.fields();
    validation.require(draft, fields.relation);
    validation.require(draft, fields.name);
    validation.require_rut(draft, fields.rut);
    validation.require_email(draft, fields.email);
    validation.require_phone(draft, fields.phone);
}
