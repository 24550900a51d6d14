//! Application settings resolution.
//!
//! Settings are assembled once at startup from three layers:
//! - built-in defaults
//! - an optional `.env` file in the working directory
//! - process environment variables (these win over the file)
//!
//! The merged key/value source is deserialized with `envy` into a raw struct,
//! then validated into an immutable [`Settings`] value that is shared through
//! the router state for the lifetime of the process.

use std::{collections::HashMap, fmt, path::Path};

use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// Origins allowed when `CORS_ORIGINS` does not supply a usable list.
///
/// These are the local development frontends; production deployments are
/// expected to set `CORS_ORIGINS` explicitly.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Optional key=value file read before the process environment.
const ENV_FILE: &str = ".env";

/// Variables the resolver reads. Matching is case sensitive.
const RECOGNIZED_KEYS: &[&str] = &[
    "APP_NAME",
    "DEBUG",
    "API_V1_PREFIX",
    "DATABASE_URL",
    "SECRET_KEY",
    "ALGORITHM",
    "ACCESS_TOKEN_EXPIRE_MINUTES",
    "REFRESH_TOKEN_EXPIRE_DAYS",
    "SERVER_HOST",
    "SERVER_PORT",
    "CORS_ORIGINS",
];

/// Errors raised while resolving settings.
///
/// Every variant is fatal: the process must not start serving traffic
/// without a complete configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required value (`DATABASE_URL`, `SECRET_KEY`) is absent or blank.
    #[error("missing required configuration value: {0}")]
    MissingRequiredValue(&'static str),

    /// A value is present but could not be parsed into its expected type.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] envy::Error),

    /// A value parsed but is not acceptable.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// The `.env` file exists but could not be read.
    #[error("failed to read environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Which source produced the final CORS origin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsSource {
    /// `CORS_ORIGINS` was absent or empty.
    Defaults,
    /// `CORS_ORIGINS` supplied at least one origin.
    Environment,
    /// `CORS_ORIGINS` was set but contained only blanks and commas.
    BlankOverride,
}

/// Resolved application settings.
///
/// Built once in `main` and shared read-only behind an `Arc`.
#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    /// Enabled only by the exact string `DEBUG=True`.
    pub debug: bool,
    /// Mount point of the API routers. Empty means the root.
    pub api_prefix: String,
    pub database_url: String,
    secret_key: String,
    pub token_algorithm: Algorithm,
    pub token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Never empty.
    pub cors_origins: Vec<String>,
    pub cors_source: CorsSource,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("debug", &self.debug)
            .field("api_prefix", &self.api_prefix)
            .field("database_url", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("token_algorithm", &self.token_algorithm)
            .field("token_expiry_minutes", &self.token_expiry_minutes)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_origins", &self.cors_origins)
            .field("cors_source", &self.cors_source)
            .finish()
    }
}

/// Raw values as they appear in the environment, before validation.
///
/// Field names are matched against lowercased variable names by `envy`.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_app_name")]
    app_name: String,

    debug: Option<String>,

    #[serde(rename = "api_v1_prefix", default = "default_api_prefix")]
    api_prefix: String,

    database_url: Option<String>,

    secret_key: Option<String>,

    #[serde(rename = "algorithm", default = "default_algorithm")]
    token_algorithm: String,

    #[serde(
        rename = "access_token_expire_minutes",
        default = "default_token_expiry_minutes"
    )]
    token_expiry_minutes: i64,

    #[serde(
        rename = "refresh_token_expire_days",
        default = "default_refresh_token_expiry_days"
    )]
    refresh_token_expiry_days: i64,

    #[serde(default = "default_host")]
    server_host: String,

    #[serde(default = "default_port")]
    server_port: u16,

    cors_origins: Option<String>,
}

fn default_app_name() -> String {
    "MaidEase".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_expiry_minutes() -> i64 {
    30
}

fn default_refresh_token_expiry_days() -> i64 {
    7
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Same port the frontend targets by default.
fn default_port() -> u16 {
    8000
}

impl Settings {
    /// Resolve settings from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `SECRET_KEY` is missing
    /// - a numeric value cannot be parsed, or `ALGORITHM` is not an HMAC algorithm
    /// - `.env` exists but is malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = read_env_file(Path::new(ENV_FILE))?;

        // Variables that are not valid unicode cannot be ours; skip them.
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));

        Self::from_sources(file, env)
    }

    /// Resolve settings from explicit key/value sources.
    ///
    /// `env` entries override `file` entries with the same key.
    pub fn from_sources<F, E>(file: F, env: E) -> Result<Self, ConfigError>
    where
        F: IntoIterator<Item = (String, String)>,
        E: IntoIterator<Item = (String, String)>,
    {
        let mut merged: HashMap<String, String> = HashMap::new();
        merged.extend(file.into_iter().filter(|(key, _)| is_recognized(key)));
        merged.extend(env.into_iter().filter(|(key, _)| is_recognized(key)));

        let raw: RawSettings = envy::from_iter(merged)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let database_url = required(raw.database_url, "DATABASE_URL")?;
        let secret_key = required(raw.secret_key, "SECRET_KEY")?;

        let token_algorithm = parse_hmac_algorithm(&raw.token_algorithm)?;

        if raw.token_expiry_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "must be a positive number of minutes".to_string(),
            });
        }
        if raw.refresh_token_expiry_days <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "REFRESH_TOKEN_EXPIRE_DAYS",
                reason: "must be a positive number of days".to_string(),
            });
        }

        let (cors_origins, cors_source) = resolve_cors_origins(raw.cors_origins.as_deref());
        match cors_source {
            CorsSource::Defaults => {
                tracing::info!(origins = ?cors_origins, "CORS_ORIGINS not set, using default origins")
            }
            CorsSource::Environment => {
                tracing::info!(origins = ?cors_origins, "CORS origins loaded from CORS_ORIGINS")
            }
            CorsSource::BlankOverride => tracing::warn!(
                origins = ?cors_origins,
                "CORS_ORIGINS contained no usable origins, falling back to defaults"
            ),
        }

        Ok(Self {
            app_name: raw.app_name,
            debug: raw.debug.as_deref() == Some("True"),
            api_prefix: normalize_prefix(&raw.api_prefix),
            database_url,
            secret_key,
            token_algorithm,
            token_expiry_minutes: raw.token_expiry_minutes,
            refresh_token_expiry_days: raw.refresh_token_expiry_days,
            server_host: raw.server_host,
            server_port: raw.server_port,
            cors_origins,
            cors_source,
        })
    }

    /// Key bytes used to sign and verify bearer tokens.
    pub fn secret_key_bytes(&self) -> &[u8] {
        self.secret_key.as_bytes()
    }

    /// Address the HTTP listener binds to.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Decide the CORS origin list from the raw `CORS_ORIGINS` value.
///
/// A non-empty value is split on commas, each entry trimmed and blanks
/// dropped. If nothing survives, the defaults are used so the policy never
/// rejects every origin.
pub fn resolve_cors_origins(raw: Option<&str>) -> (Vec<String>, CorsSource) {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return (default_cors_origins(), CorsSource::Defaults);
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        (default_cors_origins(), CorsSource::BlankOverride)
    } else {
        (origins, CorsSource::Environment)
    }
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
}

/// Read `path` as key/value pairs. A missing file yields no pairs.
fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => Ok(iter.collect::<Result<Vec<_>, _>>()?),
        Err(err) if err.not_found() => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

fn is_recognized(key: &str) -> bool {
    RECOGNIZED_KEYS.contains(&key)
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingRequiredValue(key))
}

/// Tokens are signed with the shared secret, so only HMAC algorithms apply.
fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::InvalidValue {
            key: "ALGORITHM",
            reason: format!("unsupported signing algorithm `{other}`, expected HS256, HS384 or HS512"),
        }),
    }
}

/// `/api/v1/` -> `/api/v1`, `api` -> `/api`, `/` -> ``.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Settings with only the required values set, for tests in other modules.
#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings::from_sources(
        Vec::new(),
        pairs(&[
            ("DATABASE_URL", "postgres://localhost/maidease_test"),
            ("SECRET_KEY", "test-secret-key"),
        ]),
    )
    .expect("test settings resolve")
}

#[cfg(test)]
pub(crate) fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn required_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgres://localhost/maidease"),
            ("SECRET_KEY", "s3cret"),
        ]
    }

    fn resolve_with(extra: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut env = required_pairs();
        env.extend_from_slice(extra);
        Settings::from_sources(Vec::new(), pairs(&env))
    }

    #[test]
    fn test_defaults_applied() {
        let settings = resolve_with(&[]).unwrap();

        assert_eq!(settings.app_name, "MaidEase");
        assert!(!settings.debug);
        assert_eq!(settings.api_prefix, "/api/v1");
        assert_eq!(settings.token_algorithm, Algorithm::HS256);
        assert_eq!(settings.token_expiry_minutes, 30);
        assert_eq!(settings.refresh_token_expiry_days, 7);
        assert_eq!(settings.server_addr(), "0.0.0.0:8000");
        assert_eq!(settings.cors_origins, DEFAULT_CORS_ORIGINS);
        assert_eq!(settings.cors_source, CorsSource::Defaults);
    }

    #[test]
    fn test_missing_database_url() {
        let result = Settings::from_sources(Vec::new(), pairs(&[("SECRET_KEY", "s3cret")]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredValue("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_missing_secret_key() {
        let result = Settings::from_sources(
            Vec::new(),
            pairs(&[("DATABASE_URL", "postgres://localhost/maidease")]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredValue("SECRET_KEY"))
        ));
    }

    #[test]
    fn test_blank_secret_key_is_missing() {
        let result = Settings::from_sources(
            Vec::new(),
            pairs(&[
                ("DATABASE_URL", "postgres://localhost/maidease"),
                ("SECRET_KEY", "   "),
            ]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredValue("SECRET_KEY"))
        ));
    }

    #[test]
    fn test_debug_exact_match() {
        assert!(resolve_with(&[("DEBUG", "True")]).unwrap().debug);
        assert!(!resolve_with(&[("DEBUG", "true")]).unwrap().debug);
        assert!(!resolve_with(&[("DEBUG", "1")]).unwrap().debug);
        assert!(!resolve_with(&[("DEBUG", "False")]).unwrap().debug);
    }

    #[test]
    fn test_cors_unset_or_empty_uses_defaults() {
        assert_eq!(
            resolve_cors_origins(None),
            (default_cors_origins(), CorsSource::Defaults)
        );
        assert_eq!(
            resolve_cors_origins(Some("")),
            (default_cors_origins(), CorsSource::Defaults)
        );
    }

    #[test]
    fn test_cors_override_trims_and_filters() {
        let (origins, source) = resolve_cors_origins(Some("https://a.com, https://b.com,,  "));
        assert_eq!(origins, vec!["https://a.com", "https://b.com"]);
        assert_eq!(source, CorsSource::Environment);
    }

    #[test]
    fn test_cors_override_preserves_order() {
        let (origins, _) =
            resolve_cors_origins(Some("https://z.example,http://a.example:8080,https://m.example"));
        assert_eq!(
            origins,
            vec![
                "https://z.example",
                "http://a.example:8080",
                "https://m.example"
            ]
        );
    }

    #[test]
    fn test_cors_blank_override_falls_back() {
        for raw in ["  ", ",", " , ,, ", "\t,\n"] {
            let (origins, source) = resolve_cors_origins(Some(raw));
            assert_eq!(origins, default_cors_origins(), "input {raw:?}");
            assert_eq!(source, CorsSource::BlankOverride);
        }
    }

    #[test]
    fn test_cors_override_through_settings() {
        let settings = resolve_with(&[("CORS_ORIGINS", "https://maidease.app")]).unwrap();
        assert_eq!(settings.cors_origins, vec!["https://maidease.app"]);
        assert_eq!(settings.cors_source, CorsSource::Environment);

        let settings = resolve_with(&[("CORS_ORIGINS", " , ")]).unwrap();
        assert!(!settings.cors_origins.is_empty());
        assert_eq!(settings.cors_source, CorsSource::BlankOverride);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = pairs(&[
            ("DATABASE_URL", "postgres://file/db"),
            ("SECRET_KEY", "from-file"),
            ("APP_NAME", "FromFile"),
        ]);
        let env = pairs(&[("DATABASE_URL", "postgres://env/db")]);

        let settings = Settings::from_sources(file, env).unwrap();

        assert_eq!(settings.database_url, "postgres://env/db");
        assert_eq!(settings.secret_key_bytes(), b"from-file");
        assert_eq!(settings.app_name, "FromFile");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let result = Settings::from_sources(
            Vec::new(),
            pairs(&[
                ("database_url", "postgres://localhost/maidease"),
                ("SECRET_KEY", "s3cret"),
            ]),
        );
        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredValue("DATABASE_URL"))
        ));
    }

    #[test]
    fn test_optional_overrides() {
        let settings = resolve_with(&[
            ("APP_NAME", "Sparkle"),
            ("API_V1_PREFIX", "/api/v2/"),
            ("ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "15"),
            ("SERVER_PORT", "9090"),
        ])
        .unwrap();

        assert_eq!(settings.app_name, "Sparkle");
        assert_eq!(settings.api_prefix, "/api/v2");
        assert_eq!(settings.token_algorithm, Algorithm::HS512);
        assert_eq!(settings.token_expiry_minutes, 15);
        assert_eq!(settings.server_port, 9090);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = resolve_with(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "soon")]);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = resolve_with(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                ..
            })
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        let result = resolve_with(&[("ALGORITHM", "RS256")]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "ALGORITHM", .. })
        ));
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api/v1"), "/api/v1");
        assert_eq!(normalize_prefix("api/v1/"), "/api/v1");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let rendered = format!("{:?}", resolve_with(&[]).unwrap());
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("postgres://"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_read_env_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# local development").unwrap();
        writeln!(file, "DATABASE_URL=postgres://localhost/from_file").unwrap();
        writeln!(file, "SECRET_KEY=file-secret").unwrap();
        writeln!(file, "CORS_ORIGINS=https://a.com,https://b.com").unwrap();

        let file_pairs = read_env_file(file.path()).unwrap();
        let settings = Settings::from_sources(file_pairs, Vec::new()).unwrap();

        assert_eq!(settings.database_url, "postgres://localhost/from_file");
        assert_eq!(settings.cors_origins, vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pairs = read_env_file(&dir.path().join(".env")).unwrap();
        assert!(pairs.is_empty());
    }
}
