use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-file limit enforced by the application wizard.
pub const WIZARD_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
/// Per-file limit enforced by the standalone dashboard uploader.
pub const UPLOADER_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Backend document taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    BirthCertificate,
    GradesCertificate,
    StudentPhoto,
    ParentIdentification,
    PersonalityReport,
    ResidenceCertificate,
    MedicalCertificate,
    PsychologicalReport,
    SpecialNeedsReport,
    RecommendationLetter,
    Other,
}

impl DocumentType {
    pub const fn required() -> [Self; 6] {
        [
            Self::BirthCertificate,
            Self::GradesCertificate,
            Self::StudentPhoto,
            Self::ParentIdentification,
            Self::PersonalityReport,
            Self::ResidenceCertificate,
        ]
    }

    pub const fn optional() -> [Self; 5] {
        [
            Self::MedicalCertificate,
            Self::PsychologicalReport,
            Self::SpecialNeedsReport,
            Self::RecommendationLetter,
            Self::Other,
        ]
    }

    pub const fn is_required(self) -> bool {
        matches!(
            self,
            Self::BirthCertificate
                | Self::GradesCertificate
                | Self::StudentPhoto
                | Self::ParentIdentification
                | Self::PersonalityReport
                | Self::ResidenceCertificate
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BirthCertificate => "BIRTH_CERTIFICATE",
            Self::GradesCertificate => "GRADES_CERTIFICATE",
            Self::StudentPhoto => "STUDENT_PHOTO",
            Self::ParentIdentification => "PARENT_IDENTIFICATION",
            Self::PersonalityReport => "PERSONALITY_REPORT",
            Self::ResidenceCertificate => "RESIDENCE_CERTIFICATE",
            Self::MedicalCertificate => "MEDICAL_CERTIFICATE",
            Self::PsychologicalReport => "PSYCHOLOGICAL_REPORT",
            Self::SpecialNeedsReport => "SPECIAL_NEEDS_REPORT",
            Self::RecommendationLetter => "RECOMMENDATION_LETTER",
            Self::Other => "OTHER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BirthCertificate => "Certificado de nacimiento",
            Self::GradesCertificate => "Certificado de notas",
            Self::StudentPhoto => "Foto del estudiante",
            Self::ParentIdentification => "Cédula de identidad del apoderado",
            Self::PersonalityReport => "Informe de personalidad",
            Self::ResidenceCertificate => "Certificado de residencia",
            Self::MedicalCertificate => "Certificado médico",
            Self::PsychologicalReport => "Informe psicológico",
            Self::SpecialNeedsReport => "Informe de necesidades educativas especiales",
            Self::RecommendationLetter => "Carta de recomendación",
            Self::Other => "Otro documento",
        }
    }

    /// Accepted MIME essences; photos must be images.
    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        const IMAGES: &[&str] = &["image/jpeg", "image/png"];
        const ANY: &[&str] = &["application/pdf", "image/jpeg", "image/png"];
        match self {
            Self::StudentPhoto => IMAGES,
            _ => ANY,
        }
    }

    pub fn accepts(self, content_type: &Mime) -> bool {
        let essence = content_type.essence_str();
        // Some browsers still report the legacy progressive JPEG type.
        let essence = if essence == "image/pjpeg" { "image/jpeg" } else { essence };
        self.allowed_mime_types().contains(&essence)
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_uppercase().replace('-', "_");
        Self::required()
            .into_iter()
            .chain(Self::optional())
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown document type '{raw}'"))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file picked by the user and held in memory until upload.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    /// Build a staged file, guessing the content type from the extension when the
    /// caller did not supply a parseable one.
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .and_then(|raw| raw.parse::<Mime>().ok())
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream());
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type.essence_str())
            .field("size", &self.size())
            .finish()
    }
}

/// Reasons a single file is refused at selection time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileConstraintViolation {
    #[error("El archivo {file_name} pesa {} y supera el máximo de {}", megabytes(.size), megabytes(.max))]
    TooLarge { file_name: String, size: u64, max: u64 },
    #[error("El archivo {file_name} ({content_type}) no es un formato permitido para {}: use {}", .document_type.label(), allowed_formats(.document_type))]
    UnsupportedType {
        file_name: String,
        content_type: String,
        document_type: DocumentType,
    },
}

fn megabytes(bytes: &u64) -> String {
    format!("{:.1} MB", *bytes as f64 / (1024.0 * 1024.0))
}

fn allowed_formats(document_type: &DocumentType) -> String {
    document_type
        .allowed_mime_types()
        .iter()
        .map(|essence| match *essence {
            "application/pdf" => "PDF",
            "image/jpeg" => "JPG",
            "image/png" => "PNG",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether staging added a new entry or replaced the previous pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Added,
    Replaced { previous_file_name: String },
}

/// In-memory buffer of files awaiting upload, one per document type.
#[derive(Debug, Clone)]
pub struct DocumentStagingArea {
    entries: BTreeMap<DocumentType, StagedFile>,
    max_file_bytes: u64,
}

impl Default for DocumentStagingArea {
    fn default() -> Self {
        Self::with_limit(WIZARD_MAX_UPLOAD_BYTES)
    }
}

impl DocumentStagingArea {
    pub fn with_limit(max_file_bytes: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_file_bytes,
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    pub fn stage(
        &mut self,
        document_type: DocumentType,
        file: StagedFile,
    ) -> Result<StageOutcome, FileConstraintViolation> {
        let size = file.size();
        if size > self.max_file_bytes {
            warn!(
                document_type = document_type.as_str(),
                size,
                max = self.max_file_bytes,
                "rejected oversized file"
            );
            return Err(FileConstraintViolation::TooLarge {
                file_name: file.file_name,
                size,
                max: self.max_file_bytes,
            });
        }

        if !document_type.accepts(&file.content_type) {
            warn!(
                document_type = document_type.as_str(),
                content_type = file.content_type.essence_str(),
                "rejected unsupported file type"
            );
            return Err(FileConstraintViolation::UnsupportedType {
                content_type: file.content_type.essence_str().to_string(),
                file_name: file.file_name,
                document_type,
            });
        }

        debug!(document_type = document_type.as_str(), file = %file.file_name, "staged file");
        Ok(match self.entries.insert(document_type, file) {
            Some(previous) => StageOutcome::Replaced {
                previous_file_name: previous.file_name,
            },
            None => StageOutcome::Added,
        })
    }

    pub fn clear(&mut self, document_type: DocumentType) -> Option<StagedFile> {
        self.entries.remove(&document_type)
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, document_type: DocumentType) -> Option<&StagedFile> {
        self.entries.get(&document_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentType, &StagedFile)> {
        self.entries.iter().map(|(kind, file)| (*kind, file))
    }

    pub fn document_types(&self) -> Vec<DocumentType> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required types with nothing staged, given the types already stored server-side.
    pub fn missing_required(&self, already_stored: &[DocumentType]) -> Vec<DocumentType> {
        DocumentType::required()
            .into_iter()
            .filter(|kind| !self.entries.contains_key(kind) && !already_stored.contains(kind))
            .collect()
    }
}
