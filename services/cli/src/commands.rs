use std::path::PathBuf;
use std::sync::Arc;

use admissions::backend::{AdmissionsBackend, HttpBackend};
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::telemetry;
use admissions::wizard::{
    admission_year, format_rut, format_rut_input, is_valid_rut, ApplicationId,
    ApplicationWizard, FieldStore, StepValidator, SubmissionCoordinator, WizardStep,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use tracing::{info, warn};

use crate::cli::RutCommand;
use crate::infra::{load_draft, parse_date, parse_document, read_staged_file, DocumentArg};

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Draft JSON file keyed by field name
    #[arg(long)]
    pub(crate) draft: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Draft JSON file keyed by field name
    #[arg(long)]
    pub(crate) draft: PathBuf,
    /// Document to upload, as TYPE=path (repeatable)
    #[arg(long = "document", value_parser = parse_document)]
    pub(crate) documents: Vec<DocumentArg>,
    /// Update this stored application instead of creating a new one
    #[arg(long)]
    pub(crate) application_id: Option<String>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DocumentsArgs {
    /// Application identifier
    pub(crate) application_id: String,
}

pub(crate) fn run_rut(command: RutCommand) {
    match command {
        RutCommand::Check { value } => {
            if is_valid_rut(&value) {
                println!("{} is valid", format_rut(&value));
            } else {
                println!("{value} is NOT valid");
            }
        }
        RutCommand::Format { value } => println!("{}", format_rut_input(&value)),
    }
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let draft = load_draft(&args.draft)?;
    let store = FieldStore::from_draft(draft, today);
    let validator = StepValidator::new(today);

    println!(
        "Validation report for {} (admission year {})",
        args.draft.display(),
        admission_year(today)
    );
    let mut blocked = 0;
    for step in WizardStep::ordered() {
        if matches!(step, WizardStep::Documents | WizardStep::Confirmation) {
            continue;
        }
        let validation = validator.validate(store.draft(), step);
        if validation.can_advance() {
            println!("- {}: OK", step.label());
            continue;
        }
        blocked += 1;
        println!("- {}: incomplete", step.label());
        for missing in &validation.missing {
            println!("    missing: {}", missing.label);
        }
        for issue in &validation.issues {
            println!("    {}: {}", issue.field.label(), issue.message);
        }
    }

    if blocked == 0 {
        println!("All data steps are complete.");
    } else {
        println!("{blocked} step(s) need attention.");
    }
    Ok(())
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let draft = load_draft(&args.draft)?;
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let coordinator = SubmissionCoordinator::new(backend);

    let mut wizard = match args.application_id {
        Some(id) => coordinator.resume(ApplicationId(id), today, &config.wizard).await?,
        None => ApplicationWizard::new(today, &config.wizard),
    };
    wizard.load_draft(&draft)?;

    while wizard.step() != WizardStep::Documents {
        let step = wizard.next()?;
        info!(step = step.label(), "step complete");
    }

    for document in args.documents {
        let file = read_staged_file(&document.path)?;
        match wizard.stage_document(document.document_type, file) {
            Ok(_) => println!("staged {} from {}", document.document_type, document.path.display()),
            Err(err) => {
                warn!(document_type = %document.document_type, "skipping document");
                println!("skipped {}: {err}", document.document_type);
            }
        }
    }
    for replaced in wizard.pending_replacements() {
        println!("{replaced} will replace the stored document");
    }
    let missing = wizard.missing_required_documents();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|kind| kind.label()).collect();
        println!("Required documents still pending: {}", names.join(", "));
    }

    match coordinator.submit(&mut wizard).await {
        Ok(receipt) => {
            let verb = if receipt.created { "created" } else { "updated" };
            println!("Application {} {verb}", receipt.application.id);
            if let Some(status) = &receipt.application.status {
                println!("Status: {status}");
            }
            println!(
                "Documents uploaded: {}/{}",
                receipt.uploads.uploaded.len(),
                receipt.uploads.attempted()
            );
            for failed in &receipt.uploads.failed {
                println!("  {} ({}): {}", failed.document_type, failed.file_name, failed.reason);
            }
            if let Some(notice) = receipt.uploads.notice() {
                println!("{notice}");
            }
            Ok(())
        }
        Err(failure) => {
            println!("{}", failure.title);
            println!("{}", failure.message);
            for step in &failure.remediation {
                println!("  • {step}");
            }
            Err(failure.into())
        }
    }
}

pub(crate) async fn run_documents(args: DocumentsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let backend = HttpBackend::new(&config.backend)?;
    let id = ApplicationId(args.application_id);
    let documents = backend.list_documents(&id).await?;

    if documents.is_empty() {
        println!("No documents stored for application {id}");
        return Ok(());
    }
    println!("Documents for application {id}");
    for document in documents {
        let label = document
            .kind()
            .map(|kind| kind.label().to_string())
            .unwrap_or_else(|| document.document_type.clone());
        let file_name = document.file_name.as_deref().unwrap_or("-");
        let uploaded = document.upload_date.as_deref().unwrap_or("-");
        println!("- [{}] {label}: {file_name} (uploaded {uploaded})", document.id);
    }
    Ok(())
}
