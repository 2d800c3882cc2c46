mod common;

use bozokbot_web::handlers::chat::{EMPTY_QUESTION_API_ERROR, EMPTY_QUESTION_MESSAGE};
use bozokbot_web::services::backend_client::CONNECTION_ANSWER;
use common::{answered_envelope, unreachable_backend_url, TestApp};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend_requests(backend: &MockServer) -> usize {
    backend
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

#[tokio::test]
async fn root_redirects_to_chat() {
    let (app, _backend) = TestApp::spawn_with_backend().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/Chat");
}

#[tokio::test]
async fn index_renders_empty_form() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    for route in ["/Chat", "/Chat/Index"] {
        let response = app.client.get(app.url(route)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let html = response.text().await.unwrap();
        assert!(html.contains("id=\"ask-form\""));
        assert!(!html.contains(EMPTY_QUESTION_MESSAGE));
    }

    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn form_rejects_blank_question_without_calling_backend() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    for question in ["", "   ", "\t\n"] {
        let response = app.ask_form(question).await;
        assert_eq!(response.status().as_u16(), 200);

        let html = response.text().await.unwrap();
        assert!(html.contains(EMPTY_QUESTION_MESSAGE));
    }

    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn form_renders_backend_answer_with_sources() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "question": "Devam zorunluluğu nedir?", "top_k": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answered_envelope()))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app.ask_form("Devam zorunluluğu nedir?").await;
    assert_eq!(response.status().as_u16(), 200);

    let html = response.text().await.unwrap();
    assert!(html.contains("Devam zorunluluğu nedir?"));
    assert!(html.contains("derslerin en az %70"));
    assert!(html.contains("onlisans_lisans_yonetmeligi.pdf"));
    assert!(html.contains("devam_yonergesi.pdf"));
    assert!(html.contains("0.1834"));
}

#[tokio::test]
async fn form_shows_error_when_backend_fails() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;

    let response = app.ask_form("Burs başvurusu ne zaman?").await;
    assert_eq!(response.status().as_u16(), 200);

    let html = response.text().await.unwrap();
    assert!(html.contains("API error: 500"));
}

#[tokio::test]
async fn api_rejects_blank_question_without_calling_backend() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    let bodies = [
        json!({ "question": "", "top_k": 5 }),
        json!({ "question": "   " }),
        json!({ "question": null }),
        json!({ "top_k": 3 }),
    ];

    for body in &bodies {
        let response = app.ask_api(body).await;
        assert_eq!(response.status().as_u16(), 400);

        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], EMPTY_QUESTION_API_ERROR);
    }

    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn form_without_body_renders_empty_question_page() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    let response = app
        .client
        .post(app.url("/Chat/Ask"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = response.text().await.unwrap();
    assert!(html.contains("id=\"ask-form\""));
    assert!(html.contains(EMPTY_QUESTION_MESSAGE));
    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn api_rejects_negative_top_k_locally() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    let response = app.ask_api(&json!({ "question": "q", "top_k": -1 })).await;

    assert_eq!(response.status().as_u16(), 400);
    let error: Value = response.json().await.unwrap();
    assert!(error["error"].is_string());
    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn api_relays_envelope_missing_success_as_failed() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Kısmi yanıt",
            "sources": []
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app.ask_api(&json!({ "question": "q" })).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["answer"], "Kısmi yanıt");
    assert_eq!(body["error"], Value::Null);
}

#[tokio::test]
async fn api_rejects_malformed_json() {
    let (app, backend) = TestApp::spawn_with_backend().await;

    let response = app
        .client
        .post(app.url("/Chat/AskApi"))
        .header("content-type", "application/json")
        .body("{\"question\":")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let error: Value = response.json().await.unwrap();
    assert!(error["error"].is_string());
    assert_eq!(backend_requests(&backend).await, 0);
}

#[tokio::test]
async fn api_relays_envelope_verbatim() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "question": "Yaz okulu var mı?", "top_k": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answered_envelope()))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app
        .ask_api(&json!({ "question": "Yaz okulu var mı?", "top_k": 3 }))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, answered_envelope());
}

#[tokio::test]
async fn api_defaults_top_k_and_accepts_camel_case() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "question": "default", "top_k": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answered_envelope()))
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(body_json(json!({ "question": "aliased", "top_k": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answered_envelope()))
        .expect(1)
        .mount(&backend)
        .await;

    let response = app.ask_api(&json!({ "question": "default" })).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .ask_api(&json!({ "question": "aliased", "topK": 7 }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn api_returns_failure_envelope_when_backend_is_down() {
    let app = TestApp::spawn(&unreachable_backend_url()).await;

    let response = app.ask_api(&json!({ "question": "q", "top_k": 10 })).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["answer"], CONNECTION_ANSWER);
    assert_eq!(body["sources"], json!([]));
    assert!(body["error"].as_str().unwrap().contains("error sending request"));
}

#[tokio::test]
async fn chat_health_reports_backend_status() {
    let (app, backend) = TestApp::spawn_with_backend().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;

    let response = app.client.get(app.url("/Chat/Health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "healthy": true }));

    let down = TestApp::spawn(&unreachable_backend_url()).await;
    let response = down.client.get(down.url("/Chat/Health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "healthy": false }));
}
