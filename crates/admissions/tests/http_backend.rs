mod support;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use admissions::backend::{
    AdmissionsBackend, BackendError, EmailVerifier, HttpBackend, VerificationPurpose,
};
use admissions::config::{BackendConfig, WizardConfig};
use admissions::wizard::{
    ApplicationId, DocumentType, FailureKind, Field, StagedFile, SubmissionCoordinator,
    WizardStep,
};
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use support::{today, wizard_at_documents};

const TOKEN: &str = "secret-token";

#[derive(Debug, Clone, PartialEq)]
struct UploadedPart {
    application_id: String,
    document_type: String,
    is_required: String,
    file_name: String,
    content_type: String,
    size: usize,
}

#[derive(Default)]
struct Recorded {
    creates: Vec<Value>,
    updates: Vec<(String, Value)>,
    uploads: Vec<UploadedPart>,
}

type Shared = Arc<Mutex<Recorded>>;

fn stored_application() -> Value {
    json!({
        "student": {
            "firstName": "TOMÁS",
            "paternalLastName": "FUENTES",
            "maternalLastName": "LAGOS",
            "rut": "22.333.444-K",
            "birthDate": "2019-08-20",
            "address": {"street": "LOS LEONES", "number": "450", "commune": "ÑUÑOA"},
            "grade": "2basico",
            "currentSchool": "ESCUELA LOS AROMOS",
            "admissionPreference": "HERMANO_EN_COLEGIO",
            "applicationYear": 2027
        },
        "father": {
            "fullName": "PEDRO FUENTES ARAYA", "rut": "17.888.999-0",
            "email": "pedro@correo.cl", "phone": "+56 9 5555 1234",
            "address": "LOS LEONES 450", "profession": "ARQUITECTO"
        },
        "mother": {
            "fullName": "CAMILA LAGOS REYES", "rut": "8.765.432-K",
            "email": "camila@correo.cl", "phone": "+56 9 5555 4321",
            "address": "LOS LEONES 450", "profession": "MÉDICA"
        },
        "supporter": {
            "fullName": "CAMILA LAGOS REYES", "rut": "8.765.432-K",
            "email": "camila@correo.cl", "phone": "+56 9 5555 4321",
            "relationship": "madre"
        },
        "guardian": {
            "fullName": "PEDRO FUENTES ARAYA", "rut": "17.888.999-0",
            "email": "pedro@correo.cl", "phone": "+56 9 5555 1234",
            "relationship": "padre"
        },
        "schoolApplied": "MONTE_TABOR"
    })
}

async fn create(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["rut"] == "22.333.444-K" && body["firstName"] == "DUPLICADO" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Ya existe una postulación para este estudiante"})),
        )
            .into_response();
    }
    state.lock().expect("state mutex").creates.push(body);
    (
        StatusCode::CREATED,
        Json(json!({"id": 321, "studentName": "TOMÁS FUENTES LAGOS", "status": "PENDING"})),
    )
        .into_response()
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state
        .lock()
        .expect("state mutex")
        .updates
        .push((id.clone(), body));
    Json(json!({"id": id, "status": "PENDING"}))
}

async fn fetch(Path(_id): Path<String>) -> Json<Value> {
    Json(stored_application())
}

async fn documents(Path(id): Path<String>) -> Json<Value> {
    let document = json!({"id": 9, "documentType": "BIRTH_CERTIFICATE", "originalName": "acta.pdf"});
    if id == "wrapped" {
        Json(json!({"documents": [document]}))
    } else {
        Json(json!([document]))
    }
}

async fn upload(
    State(state): State<Shared>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut part = UploadedPart {
        application_id: id,
        document_type: String::new(),
        is_required: String::new(),
        file_name: String::new(),
        content_type: String::new(),
        size: 0,
    };
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        match field.name().unwrap_or_default() {
            "file" => {
                part.file_name = field.file_name().unwrap_or_default().to_string();
                part.content_type = field.content_type().unwrap_or_default().to_string();
                part.size = field.bytes().await.expect("file bytes").len();
            }
            "documentType" => part.document_type = field.text().await.expect("text"),
            "isRequired" => part.is_required = field.text().await.expect("text"),
            _ => {}
        }
    }

    let rejected = part.document_type == "OTHER";
    state.lock().expect("state mutex").uploads.push(part);
    if rejected {
        return (StatusCode::INTERNAL_SERVER_ERROR, "disk full").into_response();
    }
    StatusCode::CREATED.into_response()
}

async fn profile(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response();
    }
    Json(json!({
        "firstName": "Pedro",
        "lastName": "Fuentes Araya",
        "rut": "17.888.999-0",
        "email": "pedro@correo.cl"
    }))
    .into_response()
}

async fn send_code(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["type"], "APPLICATION_CONTACT");
    Json(json!({"expiresInMinutes": 10}))
}

async fn verify_code(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"verified": body["code"] == "123456"}))
}

async fn spawn_server() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Recorded::default()));
    let app = Router::new()
        .route("/api/applications", post(create))
        .route("/api/applications/:id", get(fetch).put(update))
        .route("/api/applications/:id/documents", get(documents))
        .route("/api/documents/upload/:id", post(upload))
        .route("/api/users/me", get(profile))
        .route("/api/email-verification/send", post(send_code))
        .route("/api/email-verification/resend", post(send_code))
        .route("/api/email-verification/verify", post(verify_code))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (format!("http://{addr}/api"), state)
}

fn backend(base_url: &str, token: Option<&str>) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        api_token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
    })
    .expect("client builds")
}

#[tokio::test]
async fn create_submission_posts_flat_body_and_multipart_uploads() {
    let (base_url, state) = spawn_server().await;
    let coordinator = SubmissionCoordinator::new(Arc::new(backend(&base_url, Some(TOKEN))));

    let mut wizard = wizard_at_documents();
    wizard
        .stage_document(
            DocumentType::BirthCertificate,
            StagedFile::new("acta.pdf", Some("application/pdf"), vec![0x25; 4096]),
        )
        .expect("staged");
    wizard
        .stage_document(
            DocumentType::Other,
            StagedFile::new("extra.png", None, vec![0x89; 128]),
        )
        .expect("staged");

    let receipt = coordinator
        .submit(&mut wizard)
        .await
        .expect("application saved");

    assert_eq!(receipt.application.id, ApplicationId("321".to_string()));
    assert_eq!(receipt.uploads.uploaded, vec![DocumentType::BirthCertificate]);
    assert_eq!(receipt.uploads.failed.len(), 1);
    assert!(receipt.uploads.failed[0].reason.contains("disk full"));
    assert_eq!(wizard.step(), WizardStep::Confirmation);

    let recorded = state.lock().expect("state mutex");
    let body = &recorded.creates[0];
    assert_eq!(body["firstName"], "TOMÁS");
    assert_eq!(body["parent2Name"], "CAMILA LAGOS REYES");
    assert_eq!(body["supporterRelation"], "madre");
    assert_eq!(body["guardianRut"], "17.888.999-0");
    assert_eq!(body["applicationYear"], 2027);
    assert_eq!(body["studentAddress"], "LOS LEONES 450, ÑUÑOA");
    assert!(body.get("student").is_none());

    let mut uploads = recorded.uploads.clone();
    uploads.sort_by(|a, b| a.document_type.cmp(&b.document_type));
    assert_eq!(
        uploads[0],
        UploadedPart {
            application_id: "321".to_string(),
            document_type: "BIRTH_CERTIFICATE".to_string(),
            is_required: "true".to_string(),
            file_name: "acta.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 4096,
        }
    );
    assert_eq!(uploads[1].document_type, "OTHER");
    assert_eq!(uploads[1].is_required, "false");
    assert_eq!(uploads[1].content_type, "image/png");
}

#[tokio::test]
async fn rejected_create_is_classified_from_the_body_message() {
    let (base_url, state) = spawn_server().await;
    let coordinator = SubmissionCoordinator::new(Arc::new(backend(&base_url, None)));

    let mut wizard = wizard_at_documents();
    wizard
        .set_field(Field::FirstName, "Duplicado")
        .expect("editable");

    let failure = coordinator
        .submit(&mut wizard)
        .await
        .expect_err("duplicate rejected");

    assert_eq!(failure.kind, FailureKind::DuplicateApplication);
    assert_eq!(
        failure.detail,
        "Ya existe una postulación para este estudiante"
    );
    assert!(state.lock().expect("state mutex").uploads.is_empty());
    assert_eq!(wizard.step(), WizardStep::Documents);
}

#[tokio::test]
async fn edit_mode_round_trips_through_get_and_put() {
    let (base_url, state) = spawn_server().await;
    let coordinator = SubmissionCoordinator::new(Arc::new(backend(&base_url, Some(TOKEN))));
    let id = ApplicationId("wrapped".to_string());

    let mut wizard = coordinator
        .resume(id.clone(), today(), &WizardConfig::default())
        .await
        .expect("application loads");
    assert_eq!(wizard.existing_documents().len(), 1);
    assert_eq!(wizard.store().get(Field::StudentAddressCommune), Some("ÑUÑOA"));

    while wizard.step() != WizardStep::Documents {
        wizard.next().expect("stored application is complete");
    }
    let receipt = coordinator.submit(&mut wizard).await.expect("updated");
    assert!(!receipt.created);

    let recorded = state.lock().expect("state mutex");
    let (path_id, body) = &recorded.updates[0];
    assert_eq!(path_id, "wrapped");
    assert_eq!(body["guardian"]["relationship"], "padre");
    assert_eq!(body["student"]["address"]["street"], "LOS LEONES");
    assert!(body.get("parent1Name").is_none());
}

#[tokio::test]
async fn document_listing_accepts_wrapped_and_bare_shapes() {
    let (base_url, _state) = spawn_server().await;
    let client = backend(&base_url, None);

    let wrapped = client
        .list_documents(&ApplicationId("wrapped".to_string()))
        .await
        .expect("wrapped listing");
    let bare = client
        .list_documents(&ApplicationId("12".to_string()))
        .await
        .expect("bare listing");

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped[0].kind(), Some(DocumentType::BirthCertificate));
    assert_eq!(wrapped[0].file_name.as_deref(), Some("acta.pdf"));
}

#[tokio::test]
async fn profile_requires_the_bearer_token() {
    let (base_url, _state) = spawn_server().await;

    let profile = backend(&base_url, Some(TOKEN))
        .current_profile()
        .await
        .expect("authorized profile");
    assert_eq!(profile.full_name(), "Pedro Fuentes Araya");

    match backend(&base_url, None).current_profile().await {
        Err(BackendError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected 401, got {other:?}"),
    }
}

#[tokio::test]
async fn email_verification_round_trip() {
    let (base_url, _state) = spawn_server().await;
    let client = backend(&base_url, None);
    let purpose = VerificationPurpose::ApplicationContact;

    let window = client
        .send_code("pedro@correo.cl", purpose)
        .await
        .expect("code sent");
    assert_eq!(window.expires_in_minutes, 10);
    assert!(client
        .verify_code("pedro@correo.cl", "123456", purpose)
        .await
        .expect("verified"));
    assert!(!client
        .verify_code("pedro@correo.cl", "000000", purpose)
        .await
        .expect("checked"));
    client
        .resend_code("pedro@correo.cl", purpose)
        .await
        .expect("code resent");
}

#[tokio::test]
async fn unreachable_backend_is_a_connectivity_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let coordinator =
        SubmissionCoordinator::new(Arc::new(backend(&format!("http://{addr}/api"), None)));
    let mut wizard = wizard_at_documents();

    let failure = coordinator
        .submit(&mut wizard)
        .await
        .expect_err("nothing listening");
    assert_eq!(failure.kind, FailureKind::Connectivity);
}
