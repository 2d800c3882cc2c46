use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CRATE_DIR_NAME: &str = "bozokbot-web";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    /// Port 0 binds an ephemeral port.
    pub port: u16,
    /// Directory served under `/static`. Resolved next to the crate when unset.
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    /// Base address of the question-answering backend, without trailing slash.
    pub base_url: String,
    /// Upper bound for a single backend call. Answer generation is slow.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector (e.g. http://tempo:4317). Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BackendSettings {
    /// Joins the base URL and an absolute backend path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Directory holding `config/`, `templates/` and `static/` for this crate,
/// whether the binary runs from the workspace root or the crate itself.
fn crate_directory(base_path: &Path) -> PathBuf {
    if base_path.ends_with(CRATE_DIR_NAME) {
        base_path.to_path_buf()
    } else {
        base_path.join(CRATE_DIR_NAME)
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let base_path = std::env::current_dir()?;
    let crate_dir = crate_directory(&base_path);
    let configuration_directory = crate_dir.join("config");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;

    if settings.server.static_dir.is_none() {
        settings.server.static_dir = Some(crate_dir.join("static").to_string_lossy().into_owned());
    }

    Ok(settings)
}
