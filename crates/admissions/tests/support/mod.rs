#![allow(dead_code)]

use admissions::config::WizardConfig;
use admissions::wizard::{ApplicationWizard, Field, WizardStep};
use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

pub fn values() -> Vec<(Field, &'static str)> {
    vec![
        (Field::FirstName, "Tomás"),
        (Field::PaternalLastName, "Fuentes"),
        (Field::MaternalLastName, "Lagos"),
        (Field::Rut, "22.333.444-K"),
        (Field::BirthDate, "2019-08-20"),
        (Field::Grade, "2basico"),
        (Field::SchoolApplied, "MONTE_TABOR"),
        (Field::AdmissionPreference, "HERMANO_EN_COLEGIO"),
        (Field::CurrentSchool, "Escuela Los Aromos"),
        (Field::StudentAddressStreet, "Los Leones"),
        (Field::StudentAddressNumber, "450"),
        (Field::StudentAddressCommune, "Ñuñoa"),
        (Field::Parent1Name, "Pedro Fuentes Araya"),
        (Field::Parent1Rut, "17.888.999-0"),
        (Field::Parent1Email, "pedro@correo.cl"),
        (Field::Parent1Phone, "+56 9 5555 1234"),
        (Field::Parent1Address, "Los Leones 450"),
        (Field::Parent1Profession, "Arquitecto"),
        (Field::Parent2Name, "Camila Lagos Reyes"),
        (Field::Parent2Rut, "8.765.432-K"),
        (Field::Parent2Email, "camila@correo.cl"),
        (Field::Parent2Phone, "+56 9 5555 4321"),
        (Field::Parent2Address, "Los Leones 450"),
        (Field::Parent2Profession, "Médica"),
    ]
}

/// Fill every data step through the public API and stop on Documents.
pub fn wizard_at_documents() -> ApplicationWizard {
    let mut wizard = ApplicationWizard::new(today(), &WizardConfig::default());
    for (field, value) in values() {
        wizard.set_field(field, value).expect("editable field");
    }
    wizard
        .set_field(Field::SupporterRelation, "madre")
        .expect("relation accepted");
    wizard
        .set_field(Field::GuardianRelation, "padre")
        .expect("relation accepted");
    while wizard.step() != WizardStep::Documents {
        wizard.next().expect("step complete");
    }
    wizard
}
