//! Configuration file handling for gofinances.
//!
//! The configuration file is stored at `$GOFINANCES_HOME/config.json` and holds the storage key
//! prefix, the OAuth and profile endpoints settings, and the locations of the client secret and the
//! local store.

use crate::error::Res;
use crate::storage::{Keys, SqliteStorage};
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "gofinances";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const CONFIG_JSON: &str = "config.json";
const STORAGE_SQLITE: &str = "storage.sqlite";
const KEY_PREFIX: &str = "@gofinances";
const PROFILE_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";
const OAUTH_CALLBACK_PORT: u16 = 3030;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$GOFINANCES_HOME` and from there it loads `$GOFINANCES_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain location
/// within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories and:
    /// - Moves `secret_file`, when given, into its default location in the home directory
    /// - Creates the local store
    /// - Writes an initial `config.json` with default settings
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/gofinances`
    /// - `secret_file` - The OAuth 2.0 client credentials JSON downloaded from the Google Cloud
    ///   Console. Only optional when running in test mode.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, secret_file: Option<&Path>) -> Res<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the gofinances home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}', refusing to overwrite it",
                config_path.display()
            );
        }

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        if let Some(secret_file) = secret_file {
            let destination = secrets.join(CLIENT_SECRET_JSON);
            utils::rename(secret_file, &destination).await?;
            let content = utils::read(&destination).await?;
            utils::write_private(&destination, content).await?;
        }

        let config = Self {
            root,
            secrets,
            config_path,
            config_file: ConfigFile::default(),
        };

        // Create the store now so that a broken location is reported by `init`.
        let _ = config
            .storage()
            .await
            .context("Unable to create the local store")?;

        config.config_file.save(&config.config_path).await?;
        Ok(config)
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load the config file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The gofinances home directory is missing '{}', run 'gofinances init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The storage keys, built from the configured prefix.
    pub fn keys(&self) -> Keys {
        Keys::new(&self.config_file.key_prefix)
    }

    pub fn profile_endpoint(&self) -> &str {
        &self.config_file.profile_endpoint
    }

    pub fn oauth_callback_port(&self) -> u16 {
        self.config_file.oauth_callback_port
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves the relative
    /// path against the home directory.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve(self.config_file.client_secret_path())
    }

    /// Returns the stored `storage_path` if it is absolute, otherwise resolves the relative path
    /// against the home directory.
    pub fn storage_path(&self) -> PathBuf {
        self.resolve(self.config_file.storage_path())
    }

    /// Opens the local store.
    pub async fn storage(&self) -> Res<SqliteStorage> {
        SqliteStorage::open(self.storage_path()).await
    }

    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "gofinances",
///   "config_version": 1,
///   "key_prefix": "@gofinances",
///   "profile_endpoint": "https://www.googleapis.com/oauth2/v1/userinfo?alt=json",
///   "oauth_callback_port": 3030,
///   "client_secret_path": ".secrets/client_secret.json",
///   "storage_path": "storage.sqlite"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "gofinances"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Prefix of every storage key
    #[serde(default = "default_key_prefix")]
    key_prefix: String,

    /// Endpoint that exchanges an access token for the user's profile
    #[serde(default = "default_profile_endpoint")]
    profile_endpoint: String,

    /// Port of the local server that receives the OAuth redirect
    #[serde(default = "default_oauth_callback_port")]
    oauth_callback_port: u16,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to the home or absolute)
    /// Defaults to $GOFINANCES_HOME/.secrets/client_secret.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the SQLite store (optional, relative to the home or absolute)
    /// Defaults to $GOFINANCES_HOME/storage.sqlite if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_path: Option<PathBuf>,
}

fn default_key_prefix() -> String {
    KEY_PREFIX.to_string()
}

fn default_profile_endpoint() -> String {
    PROFILE_ENDPOINT.to_string()
}

fn default_oauth_callback_port() -> u16 {
    OAUTH_CALLBACK_PORT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            key_prefix: default_key_prefix(),
            profile_endpoint: default_profile_endpoint(),
            oauth_callback_port: default_oauth_callback_port(),
            client_secret_path: None,
            storage_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path and validates its `app_name`.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }

    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(STORAGE_SQLITE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("gofinances_home");
        let secret_source_file = dir.path().join("x.json");
        let secret_content = "12345";
        utils::write(&secret_source_file, secret_content)
            .await
            .unwrap();

        let config = Config::create(&home_dir, Some(&secret_source_file))
            .await
            .unwrap();

        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(secret_content, found_secret_content);
        assert!(!secret_source_file.exists());
        assert!(config.secrets.is_dir());
        assert!(config.storage_path().is_file());
        assert!(config.config_path.is_file());
        assert_eq!(config.keys().user(), "@gofinances:user");
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), None).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(loaded.oauth_callback_port(), 3030);
        assert_eq!(loaded.profile_endpoint(), PROFILE_ENDPOINT);
    }

    #[tokio::test]
    async fn test_config_create_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let _ = Config::create(dir.path(), None).await.unwrap();
        assert!(Config::create(dir.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("gofinances init"));
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let json = r#"{
            "app_name": "gofinances",
            "config_version": 1
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.key_prefix, KEY_PREFIX);
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
        assert_eq!(config.storage_path(), PathBuf::from(STORAGE_SQLITE));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let json = r#"{"app_name": "budget", "config_version": 1}"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("storage_path"));
    }

    #[tokio::test]
    async fn test_custom_key_prefix_and_absolute_paths() {
        let dir = TempDir::new().unwrap();
        let _ = Config::create(dir.path(), None).await.unwrap();
        let elsewhere = dir.path().join("elsewhere.sqlite");
        let json = serde_json::json!({
            "app_name": "gofinances",
            "config_version": 1,
            "key_prefix": "@app",
            "storage_path": elsewhere,
        });
        utils::write(dir.path().join(CONFIG_JSON), json.to_string())
            .await
            .unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.keys().transactions("7"), "@app:transactions_user:7");
        assert_eq!(config.storage_path(), elsewhere);
    }
}
