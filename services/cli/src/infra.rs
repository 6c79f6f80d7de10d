use std::fs;
use std::path::{Path, PathBuf};

use admissions::error::AppError;
use admissions::wizard::{ApplicationDraft, DocumentType, StagedFile};
use chrono::NaiveDate;

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `TYPE=path` pair given to `submit --document`.
#[derive(Debug, Clone)]
pub(crate) struct DocumentArg {
    pub(crate) document_type: DocumentType,
    pub(crate) path: PathBuf,
}

pub(crate) fn parse_document(raw: &str) -> Result<DocumentArg, String> {
    let (kind, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TYPE=path, got '{raw}'"))?;
    let document_type = kind.parse::<DocumentType>()?;
    let path = PathBuf::from(path.trim());
    if path.as_os_str().is_empty() {
        return Err(format!("missing file path for {document_type}"));
    }
    Ok(DocumentArg {
        document_type,
        path,
    })
}

/// Draft files are JSON objects keyed by field name (`firstName`, `parent1Rut`, ...).
pub(crate) fn load_draft(path: &Path) -> Result<ApplicationDraft, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn read_staged_file(path: &Path) -> Result<StagedFile, AppError> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let guessed = mime_guess::from_path(path).first_raw();
    Ok(StagedFile::new(file_name, guessed, bytes))
}
