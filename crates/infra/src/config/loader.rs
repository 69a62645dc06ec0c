//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the environment when one is present
//! 2. Attempts to load from `RICHCHAT_*` environment variables
//! 3. If the required ones are missing, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON and TOML)
//! 5. Validates the result
//!
//! ## Environment Variables
//! - `RICHCHAT_AUTH_PROVIDER` (required): `azure`, `google` or `mock`
//! - `RICHCHAT_DOMAIN_ID` (required): messaging domain
//! - `RICHCHAT_AUTH_SERVICE`: authorization endpoint (Google has a default)
//! - `RICHCHAT_CLIENT_ID`, `RICHCHAT_REDIRECT_URI`, `RICHCHAT_SCOPE`
//! - `RICHCHAT_RESOURCE`, `RICHCHAT_TENANT_ID`
//! - `RICHCHAT_REFRESH_TIMEOUT_MS`: silent refresh timeout
//! - `RICHCHAT_RESOLVE_BATCH_SIZE`: identity resolution batch size (1-50)
//! - `RICHCHAT_AVATAR_URL`: placeholder avatar
//! - `RICHCHAT_DIRECTORY_BASE_URL`: directory API root override
//! - `RICHCHAT_LOG_LEVEL`, `RICHCHAT_LOG_JSON`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./richchat.toml`, `./richchat.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent directory
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use richchat_domain::constants::GOOGLE_AUTH_SERVICE;
use richchat_domain::{AppConfig, ProviderKind, Result, RichChatError};

const CONFIG_FILE_NAMES: [&str; 4] = ["richchat.toml", "richchat.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `RichChatError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `RICHCHAT_*` environment variables
///
/// Unset optional variables keep their defaults.
///
/// # Errors
/// Returns `RichChatError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();

    config.auth.provider = ProviderKind::from_str(&env_var("RICHCHAT_AUTH_PROVIDER")?)
        .map_err(RichChatError::Config)?;
    config.auth.domain_id = env_var("RICHCHAT_DOMAIN_ID")?;

    if let Some(service) = env_opt("RICHCHAT_AUTH_SERVICE") {
        config.auth.auth_service = service;
    } else if config.auth.provider == ProviderKind::Google {
        config.auth.auth_service = GOOGLE_AUTH_SERVICE.to_string();
    }
    if let Some(client_id) = env_opt("RICHCHAT_CLIENT_ID") {
        config.auth.client_id = client_id;
    }
    if let Some(redirect_uri) = env_opt("RICHCHAT_REDIRECT_URI") {
        config.auth.redirect_uri = redirect_uri;
    }
    if let Some(scope) = env_opt("RICHCHAT_SCOPE") {
        config.auth.scope = scope;
    }
    config.auth.resource = env_opt("RICHCHAT_RESOURCE");
    config.auth.tenant_id = env_opt("RICHCHAT_TENANT_ID");
    if let Some(timeout) = env_opt("RICHCHAT_REFRESH_TIMEOUT_MS") {
        config.auth.refresh_timeout_ms = timeout
            .parse::<u64>()
            .map_err(|e| RichChatError::Config(format!("Invalid refresh timeout: {e}")))?;
    }

    if let Some(batch) = env_opt("RICHCHAT_RESOLVE_BATCH_SIZE") {
        config.contacts.resolve_batch_size = batch
            .parse::<usize>()
            .map_err(|e| RichChatError::Config(format!("Invalid resolve batch size: {e}")))?;
    }
    if let Some(avatar) = env_opt("RICHCHAT_AVATAR_URL") {
        config.contacts.placeholder_avatar_url = Some(avatar);
    }
    config.contacts.directory_base_url = env_opt("RICHCHAT_DIRECTORY_BASE_URL");

    if let Some(level) = env_opt("RICHCHAT_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("RICHCHAT_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RichChatError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RichChatError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RichChatError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RichChatError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RichChatError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RichChatError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RichChatError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the working directory, its parent and the executable's directory
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.clone());
        roots.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        RichChatError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 14] = [
        "RICHCHAT_AUTH_PROVIDER",
        "RICHCHAT_DOMAIN_ID",
        "RICHCHAT_AUTH_SERVICE",
        "RICHCHAT_CLIENT_ID",
        "RICHCHAT_REDIRECT_URI",
        "RICHCHAT_SCOPE",
        "RICHCHAT_RESOURCE",
        "RICHCHAT_TENANT_ID",
        "RICHCHAT_REFRESH_TIMEOUT_MS",
        "RICHCHAT_RESOLVE_BATCH_SIZE",
        "RICHCHAT_AVATAR_URL",
        "RICHCHAT_DIRECTORY_BASE_URL",
        "RICHCHAT_LOG_LEVEL",
        "RICHCHAT_LOG_JSON",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("RICHCHAT_TEST_BOOL_YES", "Yes");
        std::env::set_var("RICHCHAT_TEST_BOOL_OFF", "off");
        assert!(env_bool("RICHCHAT_TEST_BOOL_YES", false));
        assert!(!env_bool("RICHCHAT_TEST_BOOL_OFF", true));

        std::env::remove_var("RICHCHAT_TEST_BOOL_MISSING");
        assert!(env_bool("RICHCHAT_TEST_BOOL_MISSING", true));

        std::env::remove_var("RICHCHAT_TEST_BOOL_YES");
        std::env::remove_var("RICHCHAT_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_azure() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("RICHCHAT_AUTH_PROVIDER", "Azure");
        std::env::set_var("RICHCHAT_DOMAIN_ID", "domain-1");
        std::env::set_var("RICHCHAT_AUTH_SERVICE", "https://login.microsoftonline.com/common/oauth2/v2.0/authorize");
        std::env::set_var("RICHCHAT_CLIENT_ID", "client-1");
        std::env::set_var("RICHCHAT_SCOPE", "openid https://graph.microsoft.com/User.ReadWrite");
        std::env::set_var("RICHCHAT_TENANT_ID", "tenant-1");
        std::env::set_var("RICHCHAT_RESOLVE_BATCH_SIZE", "25");
        std::env::set_var("RICHCHAT_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.auth.provider, ProviderKind::Azure);
        assert_eq!(config.auth.domain_id, "domain-1");
        assert_eq!(config.auth.tenant_id.as_deref(), Some("tenant-1"));
        assert!(config.auth.has_scope("openid"));
        assert_eq!(config.contacts.resolve_batch_size, 25);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_google_gets_default_auth_service() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("RICHCHAT_AUTH_PROVIDER", "google");
        std::env::set_var("RICHCHAT_DOMAIN_ID", "domain-1");

        let result = load_from_env();
        clear_env();

        assert_eq!(result.unwrap().auth.auth_service, GOOGLE_AUTH_SERVICE);
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("RICHCHAT_AUTH_PROVIDER", "mock");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(RichChatError::Config(msg)) if msg.contains("RICHCHAT_DOMAIN_ID")));
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("RICHCHAT_AUTH_PROVIDER", "okta");
        std::env::set_var("RICHCHAT_DOMAIN_ID", "domain-1");
        assert!(matches!(load_from_env(), Err(RichChatError::Config(_))));

        std::env::set_var("RICHCHAT_AUTH_PROVIDER", "mock");
        std::env::set_var("RICHCHAT_REFRESH_TIMEOUT_MS", "soon");
        assert!(matches!(load_from_env(), Err(RichChatError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("richchat.toml");
        std::fs::write(
            &path,
            r#"
[auth]
provider = "google"
auth_service = "https://accounts.google.com/o/oauth2/v2/auth"
client_id = "client-1"
scope = "openid https://www.googleapis.com/auth/contacts"
domain_id = "domain-1"

[contacts]
resolve_batch_size = 10
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.auth.provider, ProviderKind::Google);
        assert_eq!(config.contacts.resolve_batch_size, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "auth": { "provider": "mock", "domain_id": "d" } }"#).unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.auth.provider, ProviderKind::Mock);
        assert_eq!(config.auth.domain_id, "d");
        assert_eq!(config.auth.refresh_timeout_ms, 10_000);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/richchat.json")));
        assert!(matches!(result, Err(RichChatError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "this is": "not valid json" "#).unwrap();

        assert!(load_from_file(Some(path)).is_err());
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
