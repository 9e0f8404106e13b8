use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use shopdesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use toml::Value;

pub fn run(options: LoadOptions) -> String {
    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let overrides = options.overrides.clone();
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(
            key_path,
            env_keys,
            is_overridden(&overrides, key_path),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        )
    };

    let greeting = config.session.greeting.as_deref().unwrap_or("<unset>");
    let timeout_secs = config.backend.timeout_secs.to_string();
    let log_format = format!("{:?}", config.logging.format);

    let fields: [(&str, &str, &[&str]); 9] = [
        ("backend.base_url", config.backend.base_url.as_str(), &["SHOPDESK_BACKEND_BASE_URL"]),
        ("backend.chat_path", config.backend.chat_path.as_str(), &["SHOPDESK_BACKEND_CHAT_PATH"]),
        (
            "backend.health_path",
            config.backend.health_path.as_str(),
            &["SHOPDESK_BACKEND_HEALTH_PATH"],
        ),
        ("backend.timeout_secs", timeout_secs.as_str(), &["SHOPDESK_BACKEND_TIMEOUT_SECS"]),
        (
            "session.customer_id",
            config.session.customer_id.as_str(),
            &["SHOPDESK_SESSION_CUSTOMER_ID"],
        ),
        ("session.channel", config.session.channel.as_str(), &["SHOPDESK_SESSION_CHANNEL"]),
        ("session.greeting", greeting, &["SHOPDESK_SESSION_GREETING"]),
        (
            "logging.level",
            config.logging.level.as_str(),
            &["SHOPDESK_LOGGING_LEVEL", "SHOPDESK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            log_format.as_str(),
            &["SHOPDESK_LOGGING_FORMAT", "SHOPDESK_LOG_FORMAT"],
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];
    lines.extend(
        fields.iter().map(|&(key, value, env_keys)| render_line(key, value, source(key, env_keys))),
    );
    lines.push(format!("- chat endpoint: {}", config.backend.chat_url()));

    lines.join("\n")
}

fn is_overridden(overrides: &ConfigOverrides, key_path: &str) -> bool {
    match key_path {
        "backend.base_url" => overrides.base_url.is_some(),
        "backend.timeout_secs" => overrides.timeout_secs.is_some(),
        "session.customer_id" => overrides.customer_id.is_some(),
        "session.greeting" => overrides.greeting.is_some(),
        "logging.level" => overrides.log_level.is_some(),
        _ => false,
    }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("shopdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/shopdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    overridden: bool,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if overridden {
        return "cli".to_string();
    }

    if let Some(env_key) = env_keys.iter().find(|env_key| env::var_os(env_key).is_some()) {
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
