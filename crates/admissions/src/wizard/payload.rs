//! Outbound request bodies. Create and update use different shapes on the backend
//! and are not interchangeable.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ContactRole, Field, ParentSlot};
use super::store::ApplicationDraft;

/// Flat body for `POST /applications`: every field top level, parents prefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub first_name: String,
    pub paternal_last_name: String,
    pub maternal_last_name: String,
    pub rut: String,
    pub birth_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_email: Option<String>,
    pub student_address: String,
    pub grade: String,
    pub school_applied: String,
    pub admission_preference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub application_year: i32,

    pub parent1_name: String,
    pub parent1_rut: String,
    pub parent1_email: String,
    pub parent1_phone: String,
    pub parent1_address: String,
    pub parent1_profession: String,
    pub parent2_name: String,
    pub parent2_rut: String,
    pub parent2_email: String,
    pub parent2_phone: String,
    pub parent2_address: String,
    pub parent2_profession: String,

    pub supporter_name: String,
    pub supporter_rut: String,
    pub supporter_email: String,
    pub supporter_phone: String,
    pub supporter_relation: String,
    pub guardian_name: String,
    pub guardian_rut: String,
    pub guardian_email: String,
    pub guardian_phone: String,
    pub guardian_relation: String,
}

/// Nested body for `PUT /applications/:id`, also returned by `GET /applications/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedApplication {
    pub student: StudentSection,
    pub father: ParentSection,
    pub mother: ParentSection,
    pub supporter: ContactSection,
    pub guardian: ContactSection,
    pub school_applied: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSection {
    pub first_name: String,
    pub paternal_last_name: String,
    pub maternal_last_name: String,
    pub rut: String,
    pub birth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: AddressSection,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_school: Option<String>,
    pub admission_preference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub application_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSection {
    pub street: String,
    pub number: String,
    pub commune: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
}

impl AddressSection {
    /// Single-line rendering used by the flat create payload.
    pub fn one_line(&self) -> String {
        let mut line = format!("{} {}", self.street, self.number).trim().to_string();
        if let Some(apartment) = self.apartment.as_deref().filter(|apt| !apt.is_empty()) {
            line.push_str(&format!(", DEPTO {apartment}"));
        }
        if !self.commune.is_empty() {
            line.push_str(&format!(", {}", self.commune));
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSection {
    pub full_name: String,
    pub rut: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profession: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSection {
    pub full_name: String,
    pub rut: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
}

fn owned(draft: &ApplicationDraft, field: Field) -> String {
    draft.value(field).to_string()
}

fn optional(draft: &ApplicationDraft, field: Field) -> Option<String> {
    draft.get(field).map(str::to_string)
}

fn application_year(draft: &ApplicationDraft, fallback: i32) -> i32 {
    draft
        .get(Field::ApplicationYear)
        .and_then(|year| year.parse().ok())
        .unwrap_or(fallback)
}

fn address(draft: &ApplicationDraft) -> AddressSection {
    AddressSection {
        street: owned(draft, Field::StudentAddressStreet),
        number: owned(draft, Field::StudentAddressNumber),
        commune: owned(draft, Field::StudentAddressCommune),
        apartment: optional(draft, Field::StudentAddressApartment),
    }
}

fn parent_section(draft: &ApplicationDraft, slot: ParentSlot) -> ParentSection {
    let fields = slot.fields();
    ParentSection {
        full_name: owned(draft, fields.name),
        rut: owned(draft, fields.rut),
        email: owned(draft, fields.email),
        phone: owned(draft, fields.phone),
        address: owned(draft, fields.address),
        profession: owned(draft, fields.profession),
    }
}

fn contact_section(draft: &ApplicationDraft, role: ContactRole) -> ContactSection {
    let fields = role.fields();
    ContactSection {
        full_name: owned(draft, fields.name),
        rut: owned(draft, fields.rut),
        email: owned(draft, fields.email),
        phone: owned(draft, fields.phone),
        relationship: owned(draft, fields.relation),
    }
}

impl CreateApplicationRequest {
    pub fn from_draft(draft: &ApplicationDraft, admission_year: i32) -> Self {
        let father = parent_section(draft, ParentSlot::Father);
        let mother = parent_section(draft, ParentSlot::Mother);
        let supporter = contact_section(draft, ContactRole::Supporter);
        let guardian = contact_section(draft, ContactRole::Guardian);

        Self {
            first_name: owned(draft, Field::FirstName),
            paternal_last_name: owned(draft, Field::PaternalLastName),
            maternal_last_name: owned(draft, Field::MaternalLastName),
            rut: owned(draft, Field::Rut),
            birth_date: owned(draft, Field::BirthDate),
            student_email: optional(draft, Field::StudentEmail),
            student_address: address(draft).one_line(),
            grade: owned(draft, Field::Grade),
            school_applied: owned(draft, Field::SchoolApplied),
            admission_preference: owned(draft, Field::AdmissionPreference),
            current_school: optional(draft, Field::CurrentSchool),
            additional_notes: optional(draft, Field::AdditionalNotes),
            application_year: application_year(draft, admission_year),
            parent1_name: father.full_name,
            parent1_rut: father.rut,
            parent1_email: father.email,
            parent1_phone: father.phone,
            parent1_address: father.address,
            parent1_profession: father.profession,
            parent2_name: mother.full_name,
            parent2_rut: mother.rut,
            parent2_email: mother.email,
            parent2_phone: mother.phone,
            parent2_address: mother.address,
            parent2_profession: mother.profession,
            supporter_name: supporter.full_name,
            supporter_rut: supporter.rut,
            supporter_email: supporter.email,
            supporter_phone: supporter.phone,
            supporter_relation: supporter.relationship,
            guardian_name: guardian.full_name,
            guardian_rut: guardian.rut,
            guardian_email: guardian.email,
            guardian_phone: guardian.phone,
            guardian_relation: guardian.relationship,
        }
    }
}

impl NestedApplication {
    pub fn from_draft(draft: &ApplicationDraft, admission_year: i32) -> Self {
        Self {
            student: StudentSection {
                first_name: owned(draft, Field::FirstName),
                paternal_last_name: owned(draft, Field::PaternalLastName),
                maternal_last_name: owned(draft, Field::MaternalLastName),
                rut: owned(draft, Field::Rut),
                birth_date: owned(draft, Field::BirthDate),
                email: optional(draft, Field::StudentEmail),
                address: address(draft),
                grade: owned(draft, Field::Grade),
                current_school: optional(draft, Field::CurrentSchool),
                admission_preference: owned(draft, Field::AdmissionPreference),
                additional_notes: optional(draft, Field::AdditionalNotes),
                application_year: Some(application_year(draft, admission_year)),
            },
            father: parent_section(draft, ParentSlot::Father),
            mother: parent_section(draft, ParentSlot::Mother),
            supporter: contact_section(draft, ContactRole::Supporter),
            guardian: contact_section(draft, ContactRole::Guardian),
            school_applied: owned(draft, Field::SchoolApplied),
        }
    }

    /// Rebuild a draft from a stored application so edit mode starts pre-filled.
    pub fn to_draft(&self) -> ApplicationDraft {
        let mut draft = ApplicationDraft::new();
        let student = &self.student;
        draft.insert(Field::FirstName, student.first_name.as_str());
        draft.insert(Field::PaternalLastName, student.paternal_last_name.as_str());
        draft.insert(Field::MaternalLastName, student.maternal_last_name.as_str());
        draft.insert(Field::Rut, student.rut.as_str());
        draft.insert(Field::BirthDate, student.birth_date.as_str());
        draft.insert(Field::StudentEmail, student.email.clone().unwrap_or_default());
        draft.insert(Field::Grade, student.grade.as_str());
        draft.insert(Field::SchoolApplied, self.school_applied.as_str());
        draft.insert(Field::AdmissionPreference, student.admission_preference.as_str());
        draft.insert(
            Field::CurrentSchool,
            student.current_school.clone().unwrap_or_default(),
        );
        draft.insert(Field::StudentAddressStreet, student.address.street.as_str());
        draft.insert(Field::StudentAddressNumber, student.address.number.as_str());
        draft.insert(Field::StudentAddressCommune, student.address.commune.as_str());
        draft.insert(
            Field::StudentAddressApartment,
            student.address.apartment.clone().unwrap_or_default(),
        );
        draft.insert(
            Field::AdditionalNotes,
            student.additional_notes.clone().unwrap_or_default(),
        );

        for (slot, section) in [
            (ParentSlot::Father, &self.father),
            (ParentSlot::Mother, &self.mother),
        ] {
            let fields = slot.fields();
            draft.insert(fields.name, section.full_name.as_str());
            draft.insert(fields.rut, section.rut.as_str());
            draft.insert(fields.email, section.email.as_str());
            draft.insert(fields.phone, section.phone.as_str());
            draft.insert(fields.address, section.address.as_str());
            draft.insert(fields.profession, section.profession.as_str());
        }

        for (role, section) in [
            (ContactRole::Supporter, &self.supporter),
            (ContactRole::Guardian, &self.guardian),
        ] {
            let fields = role.fields();
            draft.insert(fields.name, section.full_name.as_str());
            draft.insert(fields.rut, section.rut.as_str());
            draft.insert(fields.email, section.email.as_str());
            draft.insert(fields.phone, section.phone.as_str());
            draft.insert(fields.relation, section.relationship.as_str());
        }

        draft
    }
}

/// The application write the coordinator will issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationWrite {
    Create(CreateApplicationRequest),
    Update {
        id: ApplicationId,
        body: NestedApplication,
    },
}
