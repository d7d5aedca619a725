use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    pub log: Log,
    pub storage: Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherKind {
    Argon2,
    /// Legacy salted SHA-256, for credentials written by older deployments.
    Sha256,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    #[serde(default = "default_hasher")]
    pub hasher: HasherKind,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Name of the environment variable holding the HS256 secret.
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,
}

fn default_hasher() -> HasherKind {
    HasherKind::Argon2
}

fn default_token_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_signing_key_env() -> String {
    "STOREFRONT_JWT_SIGNING_KEY".to_string()
}

/// Upper bound on `auth.token_ttl_secs`: thirty days.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

impl Auth {
    pub fn check_token_ttl(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(anyhow!(
                "auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}, got {}",
                self.token_ttl_secs
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub tls: Option<Tls>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Deserialize)]
pub struct Storage {
    pub backend: StorageBackend,
    #[serde(default)]
    pub dsn: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

// The DSN may carry a password.
impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

impl Http {
    /// Both TLS files, when configured, must be regular files.
    pub fn check_tls_files(&self) -> Result<()> {
        let Some(tls) = &self.tls else {
            return Ok(());
        };
        for (what, path) in [("cert", &tls.cert_path), ("key", &tls.key_path)] {
            if !fs::metadata(path)?.is_file() {
                return Err(anyhow!("TLS {what} is not a regular file: {path:?}"));
            }
        }
        Ok(())
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Prefix of environment overrides, e.g. `STOREFRONT__HTTP__ADDRESS`.
pub const ENV_PREFIX: &str = "STOREFRONT";

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(env_source())
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;
    settings.auth.check_token_ttl()?;

    Ok(settings)
}

/// Same as [`parse_settings`] over an in-memory TOML document.
pub fn parse_settings_toml(toml: &str) -> Result<Settings> {
    let settings: Settings = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .add_source(env_source())
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;
    settings.auth.check_token_ttl()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    const MINIMAL: &str = r#"
[auth]
issuer = "storefront"
audience = "storefront-api"

[http]
address = "127.0.0.1:8080"

[log]
filter = "info"

[storage]
backend = "memory"
"#;

    #[test]
    fn defaults_fill_optional_fields() -> TestResult {
        let settings = parse_settings_toml(MINIMAL)?;

        assert_eq!(settings.auth.hasher, HasherKind::Argon2);
        assert_eq!(settings.auth.token_ttl_secs, 86_400);
        assert_eq!(settings.auth.signing_key_env, "STOREFRONT_JWT_SIGNING_KEY");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.max_connections, 10);
        assert!(settings.http.tls.is_none());
        settings.http.check_tls_files()?;
        Ok(())
    }

    #[test]
    fn token_ttl_is_bounded() -> TestResult {
        for ttl in [0, MAX_TOKEN_TTL_SECS + 1, u64::MAX] {
            let toml = MINIMAL.replace(
                r#"audience = "storefront-api""#,
                &format!("audience = \"storefront-api\"\ntoken_ttl_secs = {ttl}"),
            );
            assert!(parse_settings_toml(&toml).is_err(), "ttl {ttl}");
        }

        let toml = MINIMAL.replace(
            r#"audience = "storefront-api""#,
            &format!("audience = \"storefront-api\"\ntoken_ttl_secs = {MAX_TOKEN_TTL_SECS}"),
        );
        assert_eq!(parse_settings_toml(&toml)?.auth.token_ttl_secs, MAX_TOKEN_TTL_SECS);
        Ok(())
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let toml = MINIMAL.replace(r#"backend = "memory""#, r#"backend = "postgres""#);
        assert!(parse_settings_toml(&toml).is_err());
    }

    #[test]
    fn missing_tls_files_are_reported() -> TestResult {
        let toml = format!(
            "{MINIMAL}\n[http.tls]\ncert_path = \"/nonexistent/cert.pem\"\nkey_path = \"/nonexistent/key.pem\"\n"
        );
        let settings = parse_settings_toml(&toml)?;
        assert!(settings.http.check_tls_files().is_err());
        Ok(())
    }

    #[test]
    fn storage_debug_hides_the_dsn() -> TestResult {
        let toml = MINIMAL.replace(
            r#"backend = "memory""#,
            "backend = \"mysql\"\ndsn = \"mysql://shop:hunter2@db/shop\"",
        );
        let settings = parse_settings_toml(&toml)?;
        assert!(!format!("{:?}", settings.storage).contains("hunter2"));
        Ok(())
    }
}
