use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::Field;
use super::validation::StepValidation;

/// Every value the wizard has collected so far, keyed by field.
///
/// Deserialised drafts go through [`ApplicationDraft::insert`], so saved files get
/// the same trimming and casing as live edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Field, String>",
    into = "BTreeMap<Field, String>"
)]
pub struct ApplicationDraft {
    values: BTreeMap<Field, String>,
}

impl ApplicationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed value, treating blank strings as absent.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .get(&field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn value(&self, field: Field) -> &str {
        self.get(field).unwrap_or_default()
    }

    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        let value = normalize_value(field, value.into());
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Into<String>> FromIterator<(Field, V)> for ApplicationDraft {
    fn from_iter<I: IntoIterator<Item = (Field, V)>>(iter: I) -> Self {
        let mut draft = Self::new();
        for (field, value) in iter {
            draft.insert(field, value);
        }
        draft
    }
}

impl From<BTreeMap<Field, String>> for ApplicationDraft {
    fn from(values: BTreeMap<Field, String>) -> Self {
        values.into_iter().collect()
    }
}

impl From<ApplicationDraft> for BTreeMap<Field, String> {
    fn from(draft: ApplicationDraft) -> Self {
        draft.values
    }
}

fn normalize_value(field: Field, value: String) -> String {
    let trimmed = value.trim();
    if field.is_uppercased() {
        trimmed.to_uppercase()
    } else if field.is_email() {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Errors raised when a write is refused by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldStoreError {
    #[error("{} is copied from the parent record and cannot be edited", .0.label())]
    ReadOnly(Field),
}

/// Mutable form state: the draft plus per-field touched, error and lock flags.
#[derive(Debug, Clone)]
pub struct FieldStore {
    draft: ApplicationDraft,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, String>,
    locked: BTreeSet<Field>,
    application_year: i32,
}

impl FieldStore {
    /// Empty store for an admission process evaluated on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::from_draft(ApplicationDraft::new(), today)
    }

    pub fn from_draft(draft: ApplicationDraft, today: NaiveDate) -> Self {
        let application_year = admission_year(today);
        let mut draft = draft;
        draft.insert(Field::ApplicationYear, application_year.to_string());
        Self {
            draft,
            touched: BTreeSet::new(),
            errors: BTreeMap::new(),
            locked: BTreeSet::new(),
            application_year,
        }
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.draft.get(field)
    }

    pub fn application_year(&self) -> i32 {
        self.application_year
    }

    /// User-originated write. The application year is pinned to the admission year.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<(), FieldStoreError> {
        if self.locked.contains(&field) {
            return Err(FieldStoreError::ReadOnly(field));
        }

        if field == Field::ApplicationYear {
            self.draft
                .insert(Field::ApplicationYear, self.application_year.to_string());
        } else {
            self.draft.insert(field, value);
        }
        self.touched.insert(field);
        Ok(())
    }

    /// Write that bypasses locks; used for derived values.
    pub(crate) fn put(&mut self, field: Field, value: impl Into<String>) {
        self.draft.insert(field, value);
        self.errors.remove(&field);
    }

    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn is_locked(&self, field: Field) -> bool {
        self.locked.contains(&field)
    }

    pub(crate) fn lock(&mut self, field: Field) {
        self.locked.insert(field);
    }

    pub(crate) fn unlock(&mut self, field: Field) {
        self.locked.remove(&field);
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    /// Replace the visible findings with the step's, limited to visited fields.
    pub fn apply_validation(&mut self, validation: &StepValidation) {
        self.errors.clear();
        for missing in &validation.missing {
            if self.touched.contains(&missing.field) {
                self.errors
                    .insert(missing.field, format!("{} es obligatorio", missing.label));
            }
        }
        for issue in &validation.issues {
            if self.touched.contains(&issue.field) {
                self.errors.insert(issue.field, issue.message.clone());
            }
        }
    }

    /// Drop everything the user entered, keeping the pinned admission year.
    pub fn clear(&mut self) {
        self.draft = ApplicationDraft::new();
        self.draft
            .insert(Field::ApplicationYear, self.application_year.to_string());
        self.touched.clear();
        self.errors.clear();
        self.locked.clear();
    }
}

/// Admissions are always for the following school year.
pub fn admission_year(today: NaiveDate) -> i32 {
    today.year() + 1
}
