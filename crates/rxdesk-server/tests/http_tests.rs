//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rxdesk_core::prescription::MockOcr;
use rxdesk_core::{AdviceEngine, OcrEngine, RecordDesk, Responder};
use rxdesk_llm::{LanguageModel, MockLanguageModel};
use rxdesk_server::{create_router, AppState, Settings};
use tower::ServiceExt;

const FORM: &str = "name=Amoxicillin+250mg&ref=ref77&dose=250mg&no_of_tablets=21\
    &lot=AX-1&issue_date=12-10-2026&exp_date=01-01-2028&daily_dose=3\
    &storage=Room&nhs=111+222+3333&pname=Ford+Prefect&dob=01-06-1990\
    &address=Guildford&doctor=Dr.+F.+Miller+(ENT)&disease=Infection";

struct TestApp {
    _dir: tempfile::TempDir,
    router: Router,
}

fn app_with(llm: Arc<dyn LanguageModel>, ocr: Arc<dyn OcrEngine>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let responder = Responder::new(AdviceEngine::default(), llm);
    let desk = RecordDesk::new(dir.path().join("hospital.db"), responder, ocr);
    let state = AppState::new(Arc::new(desk), Settings::default())
        .with_fixed_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

    TestApp {
        _dir: dir,
        router: create_router(state),
    }
}

fn app() -> TestApp {
    app_with(
        Arc::new(MockLanguageModel::new("Hello!\nHow can I help?")),
        Arc::new(MockOcr::new("Patient Name: Zaphod B\nAspirin 300mg")),
    )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn chat_post(body: serde_json::Value) -> Request<Body> {
    Request::post("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn multipart(field: &str, content: &[u8]) -> Request<Body> {
    let boundary = "rxdeskboundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"rx.png\"\r\n\
             Content-Type: image/png\r\n\r\n",
            b = boundary,
            f = field
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::post("/scan_prescription")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_add_then_list() {
    let app = app();

    let response = app.router.clone().oneshot(form_post("/add", FORM)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let (status, body) = send(&app.router, get("/patients")).await;
    assert_eq!(status, StatusCode::OK);
    let listing = json(&body);
    let patient = &listing["patients"][0];
    assert_eq!(patient["reference_no"], "ref77");
    assert_eq!(patient["patient_name"], "Ford Prefect");
    assert_eq!(patient["doctor"], "Dr. F. Miller (ENT)");
    assert_eq!(listing["doctors"][5], "Dr. F. Miller (ENT) - Busy");
}

#[tokio::test]
async fn test_duplicate_add_conflicts() {
    let app = app();
    send(&app.router, form_post("/add", FORM)).await;

    let (status, body) = send(&app.router, form_post("/add", FORM)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json(&body)["error"].as_str().unwrap().contains("ref77"));
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = app();
    send(&app.router, form_post("/add", FORM)).await;

    let updated = FORM.replace("daily_dose=3", "daily_dose=1");
    let (status, _) = send(&app.router, form_post("/update", &updated)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, body) = send(&app.router, get("/")).await;
    assert_eq!(json(&body)["patients"][0]["daily_dose"], "1");

    let (status, _) = send(&app.router, get("/delete/ref77")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, body) = send(&app.router, get("/")).await;
    assert_eq!(json(&body)["patients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_reference_not_found() {
    let app = app();

    let (status, _) = send(&app.router, get("/delete/ref404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let missing = FORM.replace("ref=ref77", "ref=ref404");
    let (status, body) = send(&app.router, form_post("/update", &missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_blank_reference_rejected() {
    let app = app();
    let blank = FORM.replace("ref=ref77", "ref=");
    let (status, _) = send(&app.router, form_post("/add", &blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_incomplete_form_rejected_as_json() {
    let app = app();
    for uri in ["/add", "/update"] {
        let (status, body) = send(&app.router, form_post(uri, "name=Aspirin&ref=ref1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].is_string());
    }

    let (_, body) = send(&app.router, get("/")).await;
    assert_eq!(json(&body)["patients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_chat_supply_returns_ref() {
    let app = app();
    send(&app.router, form_post("/add", FORM)).await;

    let (status, body) = send(
        &app.router,
        chat_post(serde_json::json!({ "message": "how many days supply for ref77", "context_ref": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reply = json(&body);
    // 21 tablets / 3 a day = 7 days, issued 7 days before the pinned date
    assert!(reply["response"].as_str().unwrap().contains("<b>finished</b>"));
    assert_eq!(reply["ref"], "ref77");
}

#[tokio::test]
async fn test_chat_general_uses_model() {
    let app = app();
    let (status, body) = send(
        &app.router,
        chat_post(serde_json::json!({ "message": "hi there" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reply = json(&body);
    assert_eq!(reply["response"], "🤖 <b>AI:</b> Hello!<br>How can I help?");
    assert!(reply.get("ref").is_none());
}

#[tokio::test]
async fn test_chat_model_failure_apologises() {
    let app = app_with(
        Arc::new(MockLanguageModel::failing("network down")),
        Arc::new(MockOcr::new("")),
    );
    let (status, body) = send(
        &app.router,
        chat_post(serde_json::json!({ "message": "what is aspirin", "context_ref": null })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["response"]
        .as_str()
        .unwrap()
        .starts_with("I'm having trouble connecting"));
}

#[tokio::test]
async fn test_scan_prescription() {
    let app = app();
    let (status, body) = send(&app.router, multipart("file", b"\x89PNG fake")).await;
    assert_eq!(status, StatusCode::OK);
    let scan = json(&body);
    assert_eq!(scan["pname"], "Zaphod B");
    assert_eq!(scan["name"], "Aspirin 300mg");
    assert!(scan["raw_text"].as_str().unwrap().contains("Aspirin"));
}

#[tokio::test]
async fn test_scan_without_file() {
    let app = app();
    let (status, body) = send(&app.router, multipart("photo", b"data")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "No file uploaded");
}

#[tokio::test]
async fn test_scan_ocr_failure() {
    let app = app_with(
        Arc::new(MockLanguageModel::new("")),
        Arc::new(MockOcr::failing("unreadable image")),
    );
    let (status, body) = send(&app.router, multipart("file", b"data")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].as_str().unwrap().contains("unreadable image"));
}

#[tokio::test]
async fn test_listing_database_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a SQLite file
    let responder = Responder::new(
        AdviceEngine::default(),
        Arc::new(MockLanguageModel::new("")),
    );
    let desk = RecordDesk::new(dir.path(), responder, Arc::new(MockOcr::new("")));
    let router = create_router(AppState::new(Arc::new(desk), Settings::default()));

    let (status, body) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Database Connection Failed.");

    let (status, _) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "ok");
}
