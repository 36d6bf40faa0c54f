//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env.local` / `.env` files for development and environment
//! variables for production. Config precedence:
//! `FOLIO__*` env vars > `NEXT_PUBLIC_APPWRITE_*` / `VITE_APPWRITE_*` vars >
//! config.toml > defaults.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Prefixes of the flat variables written by `folio setup` and read by the
/// web dashboards. The first prefix wins when both are set.
pub const LEGACY_PREFIXES: [&str; 2] = ["NEXT_PUBLIC_APPWRITE_", "VITE_APPWRITE_"];

/// Flat variable suffix → dotted config key.
pub const LEGACY_KEYS: [(&str, &str); 12] = [
    ("ENDPOINT", "appwrite.endpoint"),
    ("PROJECT_ID", "appwrite.project"),
    ("API_KEY", "appwrite.api_key"),
    ("DATABASE_ID", "appwrite.database"),
    ("PERSONAL_COLLECTION_ID", "collections.personal"),
    ("PROJECTS_COLLECTION_ID", "collections.projects"),
    ("EXPERIENCE_COLLECTION_ID", "collections.experience"),
    ("MESSAGES_COLLECTION_ID", "collections.messages"),
    ("JOB_APPLICATIONS_COLLECTION_ID", "collections.job_applications"),
    ("CVS_COLLECTION_ID", "collections.cvs"),
    ("IMAGES_BUCKET_ID", "buckets.images"),
    ("CVS_BUCKET_ID", "buckets.cvs"),
];

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call folio_common::config::init() first.")
}

/// Initialize the global configuration from the process environment.
///
/// Should be called once at startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // .env.local first: dotenvy never overrides a variable that is already set
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let vars: HashMap<String, String> = std::env::vars().collect();
    let app_config = load_from(&vars)?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Build a configuration from an explicit variable map without touching the
/// global. `init` calls this with the process environment.
pub fn load_from(vars: &HashMap<String, String>) -> Result<AppConfig, config::ConfigError> {
    let folio_vars: config::Map<String, String> = vars
        .iter()
        .filter(|(k, _)| k.starts_with("FOLIO__"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let legacy = legacy_overrides(vars);

    let cfg = config::Config::builder()
        // Defaults
        .set_default("appwrite.endpoint", "https://cloud.appwrite.io/v1")?
        .set_default("appwrite.project", "")?
        .set_default("appwrite.database", "portfolio")?
        .set_default("collections.personal", "personal")?
        .set_default("collections.projects", "projects")?
        .set_default("collections.experience", "experience")?
        .set_default("collections.messages", "messages")?
        .set_default("collections.job_applications", "jobApplications")?
        .set_default("collections.cvs", "cvs")?
        .set_default("buckets.images", "images")?
        .set_default("buckets.cvs", "cvs")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("limits.max_upload_bytes", 10 * 1024 * 1024)? // 10MB
        .set_default("limits.list_limit", 100)?
        .set_default("poll.interval_secs", 300)? // 5 min
        .set_default("poll.state_file", ".folio/messages-poll.json")?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Dashboard-style flat variables
        .add_source(config::File::from_str(
            &legacy.to_string(),
            config::FileFormat::Json,
        ))
        // Structured environment variables (FOLIO__APPWRITE__ENDPOINT, ...)
        .add_source(
            config::Environment::with_prefix("FOLIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(folio_vars)),
        )
        .build()?;

    cfg.try_deserialize()
}

/// Translate `NEXT_PUBLIC_APPWRITE_*` / `VITE_APPWRITE_*` variables into a
/// nested JSON object keyed like [`AppConfig`].
pub fn legacy_overrides(vars: &HashMap<String, String>) -> serde_json::Value {
    let mut root = serde_json::Map::new();

    for (suffix, key) in LEGACY_KEYS {
        let Some(value) = LEGACY_PREFIXES
            .iter()
            .find_map(|prefix| vars.get(&format!("{prefix}{suffix}")))
            .filter(|v| !v.trim().is_empty())
        else {
            continue;
        };

        let (section, field) = key.split_once('.').unwrap_or((key, ""));
        let entry = root
            .entry(section.to_string())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        if let serde_json::Value::Object(map) = entry {
            map.insert(field.to_string(), serde_json::Value::String(value.clone()));
        }
    }

    serde_json::Value::Object(root)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub appwrite: AppwriteConfig,
    pub collections: CollectionsConfig,
    pub buckets: BucketsConfig,
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppwriteConfig {
    /// REST endpoint including the `/v1` suffix
    pub endpoint: String,
    /// Appwrite project ID
    pub project: String,
    /// Server API key. Required for `setup` and for admin commands.
    pub api_key: Option<String>,
    /// Database ID holding every collection
    pub database: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionsConfig {
    pub personal: String,
    pub projects: String,
    pub experience: String,
    pub messages: String,
    pub job_applications: String,
    pub cvs: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BucketsConfig {
    /// Project screenshots, company logos, avatar
    pub images: String,
    /// CV documents
    pub cvs: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
    /// Fixed `limit` passed to every list query
    pub list_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Where the last message-fetch timestamp is persisted between runs.
    pub state_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let cfg = load_from(&HashMap::new()).unwrap();
        assert_eq!(cfg.appwrite.database, "portfolio");
        assert_eq!(cfg.collections.job_applications, "jobApplications");
        assert_eq!(cfg.limits.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.poll.interval_secs, 300);
        assert!(cfg.appwrite.api_key.is_none());
    }

    #[test]
    fn next_public_wins_over_vite() {
        let cfg = load_from(&vars(&[
            ("NEXT_PUBLIC_APPWRITE_PROJECT_ID", "next"),
            ("VITE_APPWRITE_PROJECT_ID", "vite"),
            ("VITE_APPWRITE_IMAGES_BUCKET_ID", "pics"),
        ]))
        .unwrap();
        assert_eq!(cfg.appwrite.project, "next");
        assert_eq!(cfg.buckets.images, "pics");
    }

    #[test]
    fn structured_variables_override_legacy() {
        let cfg = load_from(&vars(&[
            ("NEXT_PUBLIC_APPWRITE_DATABASE_ID", "legacy-db"),
            ("FOLIO__APPWRITE__DATABASE", "folio-db"),
            ("FOLIO__SERVER__PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.appwrite.database, "folio-db");
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn blank_legacy_values_are_ignored() {
        let legacy = legacy_overrides(&vars(&[("NEXT_PUBLIC_APPWRITE_ENDPOINT", "  ")]));
        assert_eq!(legacy, serde_json::json!({}));
    }
}
