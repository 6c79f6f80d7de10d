use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the backend to a persisted application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(Self)
    }
}

/// Backend ids arrive as numbers from newer endpoints and quoted from older ones.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(raw) => Ok(raw),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "id must be a string or number, found {other}"
        ))),
    }
}

/// Ordered stages of the application wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Student,
    Parents,
    Supporter,
    Guardian,
    Documents,
    Confirmation,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Student,
            Self::Parents,
            Self::Supporter,
            Self::Guardian,
            Self::Documents,
            Self::Confirmation,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Student => 0,
            Self::Parents => 1,
            Self::Supporter => 2,
            Self::Guardian => 3,
            Self::Documents => 4,
            Self::Confirmation => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ordered().get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "Datos del estudiante",
            Self::Parents => "Datos de los padres",
            Self::Supporter => "Sostenedor",
            Self::Guardian => "Apoderado",
            Self::Documents => "Documentos",
            Self::Confirmation => "Confirmación",
        }
    }
}

/// Every field the wizard collects, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    PaternalLastName,
    MaternalLastName,
    Rut,
    BirthDate,
    StudentEmail,
    Grade,
    SchoolApplied,
    AdmissionPreference,
    CurrentSchool,
    StudentAddressStreet,
    StudentAddressNumber,
    StudentAddressCommune,
    StudentAddressApartment,
    ApplicationYear,
    AdditionalNotes,
    Parent1Name,
    Parent1Rut,
    Parent1Email,
    Parent1Phone,
    Parent1Address,
    Parent1Profession,
    Parent2Name,
    Parent2Rut,
    Parent2Email,
    Parent2Phone,
    Parent2Address,
    Parent2Profession,
    SupporterName,
    SupporterRut,
    SupporterEmail,
    SupporterPhone,
    SupporterRelation,
    GuardianName,
    GuardianRut,
    GuardianEmail,
    GuardianPhone,
    GuardianRelation,
}

impl Field {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "Nombres",
            Self::PaternalLastName => "Apellido paterno",
            Self::MaternalLastName => "Apellido materno",
            Self::Rut => "RUT del estudiante",
            Self::BirthDate => "Fecha de nacimiento",
            Self::StudentEmail => "Email del estudiante",
            Self::Grade => "Curso al que postula",
            Self::SchoolApplied => "Colegio al que postula",
            Self::AdmissionPreference => "Preferencia de admisión",
            Self::CurrentSchool => "Colegio actual",
            Self::StudentAddressStreet => "Calle",
            Self::StudentAddressNumber => "Número",
            Self::StudentAddressCommune => "Comuna",
            Self::StudentAddressApartment => "Departamento",
            Self::ApplicationYear => "Año de postulación",
            Self::AdditionalNotes => "Observaciones",
            Self::Parent1Name => "Nombre del padre",
            Self::Parent1Rut => "RUT del padre",
            Self::Parent1Email => "Email del padre",
            Self::Parent1Phone => "Teléfono del padre",
            Self::Parent1Address => "Dirección del padre",
            Self::Parent1Profession => "Profesión del padre",
            Self::Parent2Name => "Nombre de la madre",
            Self::Parent2Rut => "RUT de la madre",
            Self::Parent2Email => "Email de la madre",
            Self::Parent2Phone => "Teléfono de la madre",
            Self::Parent2Address => "Dirección de la madre",
            Self::Parent2Profession => "Profesión de la madre",
            Self::SupporterName => "Nombre del sostenedor",
            Self::SupporterRut => "RUT del sostenedor",
            Self::SupporterEmail => "Email del sostenedor",
            Self::SupporterPhone => "Teléfono del sostenedor",
            Self::SupporterRelation => "Relación del sostenedor",
            Self::GuardianName => "Nombre del apoderado",
            Self::GuardianRut => "RUT del apoderado",
            Self::GuardianEmail => "Email del apoderado",
            Self::GuardianPhone => "Teléfono del apoderado",
            Self::GuardianRelation => "Relación del apoderado",
        }
    }

    /// Fields stored in uppercase regardless of how they were typed.
    pub const fn is_uppercased(self) -> bool {
        matches!(
            self,
            Self::FirstName
                | Self::PaternalLastName
                | Self::MaternalLastName
                | Self::CurrentSchool
                | Self::StudentAddressStreet
                | Self::StudentAddressNumber
                | Self::StudentAddressCommune
                | Self::StudentAddressApartment
                | Self::Parent1Name
                | Self::Parent1Address
                | Self::Parent1Profession
                | Self::Parent2Name
                | Self::Parent2Address
                | Self::Parent2Profession
                | Self::SupporterName
                | Self::GuardianName
        )
    }

    pub const fn is_email(self) -> bool {
        matches!(
            self,
            Self::StudentEmail
                | Self::Parent1Email
                | Self::Parent2Email
                | Self::SupporterEmail
                | Self::GuardianEmail
        )
    }

    pub const fn is_rut(self) -> bool {
        matches!(
            self,
            Self::Rut | Self::Parent1Rut | Self::Parent2Rut | Self::SupporterRut | Self::GuardianRut
        )
    }

    /// Serialized key, matching the draft JSON representation.
    pub fn key(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
            .map_err(|_| format!("unknown wizard field '{raw}'"))
    }
}

/// Which parent record a propagated contact is copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentSlot {
    Father,
    Mother,
}

/// Fields describing one parent record on the Parents step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentFields {
    pub name: Field,
    pub rut: Field,
    pub email: Field,
    pub phone: Field,
    pub address: Field,
    pub profession: Field,
}

impl ParentSlot {
    pub const fn fields(self) -> ParentFields {
        match self {
            Self::Father => ParentFields {
                name: Field::Parent1Name,
                rut: Field::Parent1Rut,
                email: Field::Parent1Email,
                phone: Field::Parent1Phone,
                address: Field::Parent1Address,
                profession: Field::Parent1Profession,
            },
            Self::Mother => ParentFields {
                name: Field::Parent2Name,
                rut: Field::Parent2Rut,
                email: Field::Parent2Email,
                phone: Field::Parent2Phone,
                address: Field::Parent2Address,
                profession: Field::Parent2Profession,
            },
        }
    }
}

/// Non-parent contacts collected after the Parents step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Supporter,
    Guardian,
}

/// Fields describing a supporter or guardian contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFields {
    pub name: Field,
    pub rut: Field,
    pub email: Field,
    pub phone: Field,
    pub relation: Field,
}

impl ContactFields {
    /// The fields a relation shortcut may copy over.
    pub const fn identity(&self) -> [Field; 4] {
        [self.name, self.email, self.phone, self.rut]
    }
}

impl ContactRole {
    pub const fn fields(self) -> ContactFields {
        match self {
            Self::Supporter => ContactFields {
                name: Field::SupporterName,
                rut: Field::SupporterRut,
                email: Field::SupporterEmail,
                phone: Field::SupporterPhone,
                relation: Field::SupporterRelation,
            },
            Self::Guardian => ContactFields {
                name: Field::GuardianName,
                rut: Field::GuardianRut,
                email: Field::GuardianEmail,
                phone: Field::GuardianPhone,
                relation: Field::GuardianRelation,
            },
        }
    }

    pub const fn from_relation_field(field: Field) -> Option<Self> {
        match field {
            Field::SupporterRelation => Some(Self::Supporter),
            Field::GuardianRelation => Some(Self::Guardian),
            _ => None,
        }
    }
}

/// Familial relation declared for a supporter or guardian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Padre,
    Madre,
    Abuelo,
    Tio,
    Hermano,
    Tutor,
    Otro,
}

impl Relation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Padre => "padre",
            Self::Madre => "madre",
            Self::Abuelo => "abuelo",
            Self::Tio => "tio",
            Self::Hermano => "hermano",
            Self::Tutor => "tutor",
            Self::Otro => "otro",
        }
    }

    /// Parent record the relation mirrors, when it names one.
    pub const fn parent(self) -> Option<ParentSlot> {
        match self {
            Self::Padre => Some(ParentSlot::Father),
            Self::Madre => Some(ParentSlot::Mother),
            _ => None,
        }
    }
}

impl FromStr for Relation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "padre" => Ok(Self::Padre),
            "madre" => Ok(Self::Madre),
            "abuelo" | "abuela" => Ok(Self::Abuelo),
            "tio" | "tía" | "tia" | "tío" => Ok(Self::Tio),
            "hermano" | "hermana" => Ok(Self::Hermano),
            "tutor" => Ok(Self::Tutor),
            "otro" => Ok(Self::Otro),
            other => Err(format!("unknown relation '{other}'")),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
