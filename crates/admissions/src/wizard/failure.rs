use serde::Serialize;

use super::domain::WizardStep;
use crate::backend::BackendError;

/// Remediation category inferred from the backend's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DuplicateApplication,
    InvalidRut,
    ApplicationYear,
    Connectivity,
    Server,
    /// Submission attempted before the wizard reached the Documents step.
    NotReady,
}

/// User-facing explanation of a failed application write, rendered as a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{title}: {message}")]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub title: String,
    pub message: String,
    pub remediation: Vec<String>,
    /// Raw backend text, kept for logs and support.
    pub detail: String,
}

impl SubmissionFailure {
    pub fn classify(error: &BackendError) -> Self {
        let detail = error.message().to_string();
        let lowered = detail.to_lowercase();

        if matches!(error, BackendError::Transport(_)) {
            return Self::new(
                FailureKind::Connectivity,
                "No pudimos contactar al servidor",
                "La postulación no fue enviada porque no hubo conexión con el sistema de admisión.",
                &[
                    "Verifique su conexión a internet",
                    "Vuelva a presionar \"Enviar\" en unos minutos",
                ],
                detail,
            );
        }

        if lowered.contains("duplicad") || lowered.contains("ya existe") {
            return Self::new(
                FailureKind::DuplicateApplication,
                "Postulación duplicada",
                "Ya existe una postulación registrada para este estudiante.",
                &[
                    "Revise sus postulaciones existentes desde su panel",
                    "Si necesita modificarla, edítela en lugar de crear una nueva",
                    "Si cree que es un error, contacte a la oficina de admisión",
                ],
                detail,
            );
        }

        if lowered.contains("rut") {
            return Self::new(
                FailureKind::InvalidRut,
                "Problema con el RUT",
                "El servidor rechazó uno de los RUT ingresados.",
                &[
                    "Verifique el RUT del estudiante, padres, sostenedor y apoderado",
                    "Confirme que el dígito verificador sea correcto",
                ],
                detail,
            );
        }

        if lowered.contains("año") {
            return Self::new(
                FailureKind::ApplicationYear,
                "Año de postulación no válido",
                "El proceso de admisión solo acepta postulaciones para el próximo año escolar.",
                &["Recargue el formulario para actualizar el año de postulación"],
                detail,
            );
        }

        Self::new(
            FailureKind::Server,
            "Error al enviar la postulación",
            "Ocurrió un problema al procesar la postulación. Intente nuevamente.",
            &[],
            detail,
        )
    }

    pub(crate) fn not_ready(step: WizardStep) -> Self {
        Self::new(
            FailureKind::NotReady,
            "Postulación incompleta",
            "Complete los pasos anteriores antes de enviar la postulación.",
            &[],
            format!("submission requested from step {}", step.label()),
        )
    }

    fn new(
        kind: FailureKind,
        title: &str,
        message: &str,
        remediation: &[&str],
        detail: String,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            remediation: remediation.iter().map(|step| step.to_string()).collect(),
            detail,
        }
    }
}
