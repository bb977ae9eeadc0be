use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use tableside_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Sources {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

impl Sources {
    fn detect() -> Self {
        let path = detect_config_path();
        let doc = load_config_file_doc(path.as_deref());
        Self { path, doc }
    }

    fn line(&self, key: &str, value: &str, env_keys: &[&str]) -> String {
        let source = field_source(key, env_keys, self.doc.as_ref(), self.path.as_deref());
        render_line(key, value, source)
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let sources = Sources::detect();
    let payment_methods = config
        .restaurant
        .payment_methods
        .iter()
        .map(|method| method.label())
        .collect::<Vec<_>>()
        .join(", ");
    let llm_api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_key(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        sources.line("database.url", &config.database.url, &["TABLESIDE_DATABASE_URL"]),
        sources.line(
            "database.max_connections",
            &config.database.max_connections.to_string(),
            &["TABLESIDE_DATABASE_MAX_CONNECTIONS"],
        ),
        sources.line(
            "database.timeout_secs",
            &config.database.timeout_secs.to_string(),
            &["TABLESIDE_DATABASE_TIMEOUT_SECS"],
        ),
        sources.line(
            "llm.provider",
            &format!("{:?}", config.llm.provider),
            &["TABLESIDE_LLM_PROVIDER"],
        ),
        sources.line("llm.model", &config.llm.model, &["TABLESIDE_LLM_MODEL"]),
        sources.line("llm.base_url", &config.llm.base_url, &["TABLESIDE_LLM_BASE_URL"]),
        sources.line("llm.api_key", &llm_api_key, &["TABLESIDE_LLM_API_KEY", "GEMINI_API_KEY"]),
        sources.line(
            "llm.timeout_secs",
            &config.llm.timeout_secs.to_string(),
            &["TABLESIDE_LLM_TIMEOUT_SECS"],
        ),
        sources.line(
            "server.bind_address",
            &config.server.bind_address,
            &["TABLESIDE_SERVER_BIND_ADDRESS"],
        ),
        sources.line("server.port", &config.server.port.to_string(), &["TABLESIDE_SERVER_PORT"]),
        sources.line("restaurant.name", &config.restaurant.name, &["TABLESIDE_RESTAURANT_NAME"]),
        sources.line(
            "restaurant.currency",
            &config.restaurant.currency,
            &["TABLESIDE_RESTAURANT_CURRENCY"],
        ),
        sources.line("restaurant.payment_methods", &payment_methods, &[]),
        sources.line(
            "logging.level",
            &config.logging.level,
            &["TABLESIDE_LOGGING_LEVEL", "TABLESIDE_LOG_LEVEL"],
        ),
        sources.line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            &["TABLESIDE_LOGGING_FORMAT", "TABLESIDE_LOG_FORMAT"],
        ),
    ];

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("tableside.toml"), PathBuf::from("config/tableside.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters of long keys so operators can tell keys apart.
fn redact_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars = trimmed.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }

    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("***{tail}")
}
