#![allow(dead_code)]

use bozokbot_web::config::{BackendSettings, ServerSettings, Settings, TelemetrySettings};
use bozokbot_web::services::metrics::init_metrics;
use bozokbot_web::startup::Application;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the front end on an ephemeral port, pointed at `backend_url`.
    pub async fn spawn(backend_url: &str) -> Self {
        init_metrics();

        let settings = Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                static_dir: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string()),
            },
            backend: backend_settings(backend_url, 5),
            telemetry: TelemetrySettings::default(),
        };

        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build test client");

        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    /// Spawn the front end in front of a fresh mock backend.
    pub async fn spawn_with_backend() -> (Self, MockServer) {
        let backend = MockServer::start().await;
        let app = Self::spawn(&backend.uri()).await;
        (app, backend)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn ask_form(&self, question: &str) -> reqwest::Response {
        self.client
            .post(self.url("/Chat/Ask"))
            .form(&[("question", question)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn ask_api(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/Chat/AskApi"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn backend_settings(base_url: &str, timeout_secs: u64) -> BackendSettings {
    BackendSettings {
        base_url: base_url.to_string(),
        timeout_secs,
    }
}

/// Address on which nothing is listening.
pub fn unreachable_backend_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn answered_envelope() -> Value {
    json!({
        "success": true,
        "answer": "Öğrenciler derslerin en az %70'ine devam etmek zorundadır.",
        "sources": [
            { "document": "onlisans_lisans_yonetmeligi.pdf", "category": "egitim", "distance": 0.1834 },
            { "document": "devam_yonergesi.pdf", "category": "devam", "distance": 0.2511 }
        ],
        "error": null
    })
}
