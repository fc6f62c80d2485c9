//! Configuration file handling and credential resolution.
//!
//! Settings live in a TOML file under the platform config directory and can
//! be overridden per-run through environment variables. Credential
//! resolution happens once at startup; a session never proceeds to the chat
//! loop without a compartment, region, and auth token.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub const ENV_COMPARTMENT_ID: &str = "OCI_COMPARTMENT_ID";
pub const ENV_REGION: &str = "OCI_REGION";
pub const ENV_AUTH_TOKEN: &str = "OCI_AUTH_TOKEN";
pub const ENV_AUTH_TOKEN_FILE: &str = "OCI_AUTH_TOKEN_FILE";

const QUICK_FIXES: &[&str] = &[
    "ocichat set compartment-id ocid1.compartment.oc1...   # Persist your compartment",
    "ocichat set region us-chicago-1                       # Persist your region",
    "export OCI_AUTH_TOKEN=...                             # Supply a token for this shell",
];

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Compartment OCID billed for inference calls.
    pub compartment_id: Option<String>,
    /// OCI region identifier, e.g. `us-chicago-1`.
    pub region: Option<String>,
    /// Bearer token for the inference endpoint. Prefer `auth_token_file`
    /// so the token does not live in the config file.
    pub auth_token: Option<String>,
    /// Path to a file holding the bearer token.
    pub auth_token_file: Option<PathBuf>,
    /// Model used when `-m` is not given.
    pub default_model: Option<String>,
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Startup failure: credentials or key material could not be resolved.
/// Not recoverable; the process must not proceed to the chat loop.
#[derive(Debug)]
pub struct CredentialError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl CredentialError {
    fn missing(field: &str, env_var: &str) -> Self {
        Self {
            message: format!(
                "No {field} configured. Set it with 'ocichat set' or the {env_var} environment variable."
            ),
            quick_fixes: QUICK_FIXES,
            exit_code: 2,
        }
    }

    fn unreadable_token_file(path: &Path, source: &std::io::Error) -> Self {
        Self {
            message: format!(
                "Could not read auth token file {}: {source}",
                path.display()
            ),
            quick_fixes: QUICK_FIXES,
            exit_code: 2,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for CredentialError {}

/// Fully-resolved credentials for one chat session.
#[derive(Clone, Debug)]
pub struct ServiceSession {
    pub compartment_id: String,
    pub region: String,
    pub auth_token: String,
}

impl ServiceSession {
    /// Inference endpoint for the session's region.
    pub fn endpoint(&self) -> String {
        format!(
            "https://inference.generativeai.{}.oci.customer-oci.com/20231130/actions/chat",
            self.region
        )
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn StdError>> {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn StdError>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
            let config: Config =
                toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                    path: config_path.clone(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn StdError>> {
        self.save_to_path(&Self::config_path())
    }

    pub(crate) fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    pub(crate) fn config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "ocichat")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    /// Resolve credentials from this config plus process environment
    /// overrides. Environment variables win over file values.
    pub fn resolve_session(&self) -> Result<ServiceSession, CredentialError> {
        self.resolve_session_with(|name| std::env::var(name).ok())
    }

    fn resolve_session_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ServiceSession, CredentialError> {
        let compartment_id = env(ENV_COMPARTMENT_ID)
            .or_else(|| self.compartment_id.clone())
            .ok_or_else(|| CredentialError::missing("compartment OCID", ENV_COMPARTMENT_ID))?;

        let region = env(ENV_REGION)
            .or_else(|| self.region.clone())
            .ok_or_else(|| CredentialError::missing("region", ENV_REGION))?;

        let auth_token = match env(ENV_AUTH_TOKEN).or_else(|| self.auth_token.clone()) {
            Some(token) => token,
            None => {
                let token_file = env(ENV_AUTH_TOKEN_FILE)
                    .map(PathBuf::from)
                    .or_else(|| self.auth_token_file.clone())
                    .ok_or_else(|| CredentialError::missing("auth token", ENV_AUTH_TOKEN))?;
                fs::read_to_string(&token_file)
                    .map_err(|source| CredentialError::unreadable_token_file(&token_file, &source))?
                    .trim()
                    .to_string()
            }
        };

        Ok(ServiceSession {
            compartment_id,
            region,
            auth_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let config = Config::load_from_path(&path).expect("defaults");
        assert!(config.compartment_id.is_none());
        assert!(config.default_model.is_none());
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let config = Config {
            compartment_id: Some("ocid1.compartment.oc1..aaaa".to_string()),
            region: Some("us-chicago-1".to_string()),
            default_model: Some("cohere.command-r-08-2024".to_string()),
            ..Default::default()
        };
        config.save_to_path(&path).expect("save");

        let loaded = Config::load_from_path(&path).expect("load");
        assert_eq!(loaded.compartment_id.as_deref(), Some("ocid1.compartment.oc1..aaaa"));
        assert_eq!(loaded.region.as_deref(), Some("us-chicago-1"));
        assert_eq!(loaded.default_model.as_deref(), Some("cohere.command-r-08-2024"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "compartment_id = [not toml").expect("write");

        let err = Config::load_from_path(&path).expect_err("parse failure");
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn resolution_fails_without_credentials() {
        let config = Config::default();
        let err = config
            .resolve_session_with(no_env)
            .expect_err("missing compartment");
        assert_eq!(err.exit_code(), 2);
        assert!(!err.quick_fixes().is_empty());
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = Config {
            compartment_id: Some("ocid1.compartment.oc1..file".to_string()),
            region: Some("us-chicago-1".to_string()),
            auth_token: Some("file-token".to_string()),
            ..Default::default()
        };

        let env: HashMap<&str, &str> = [
            (ENV_COMPARTMENT_ID, "ocid1.compartment.oc1..env"),
            (ENV_AUTH_TOKEN, "env-token"),
        ]
        .into_iter()
        .collect();

        let session = config
            .resolve_session_with(|name| env.get(name).map(|v| v.to_string()))
            .expect("resolved");
        assert_eq!(session.compartment_id, "ocid1.compartment.oc1..env");
        assert_eq!(session.region, "us-chicago-1");
        assert_eq!(session.auth_token, "env-token");
    }

    #[test]
    fn token_file_is_read_and_trimmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let token_path = dir.path().join("token");
        fs::write(&token_path, "secret-token\n").expect("write token");

        let config = Config {
            compartment_id: Some("ocid1.compartment.oc1..aaaa".to_string()),
            region: Some("eu-frankfurt-1".to_string()),
            auth_token_file: Some(token_path),
            ..Default::default()
        };

        let session = config.resolve_session_with(no_env).expect("resolved");
        assert_eq!(session.auth_token, "secret-token");
    }

    #[test]
    fn endpoint_embeds_the_region() {
        let session = ServiceSession {
            compartment_id: "ocid1.compartment.oc1..aaaa".to_string(),
            region: "sa-saopaulo-1".to_string(),
            auth_token: "t".to_string(),
        };
        assert_eq!(
            session.endpoint(),
            "https://inference.generativeai.sa-saopaulo-1.oci.customer-oci.com/20231130/actions/chat"
        );
    }
}
