//! Deserialization of the `client_secret.json` file downloaded from the Google Cloud Console.

use crate::error::Res;
use crate::utils;
use anyhow::Context;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// This redirect needs to be present in the OAuth credential file, or else the loopback redirect
/// used at sign-in will be refused by Google.
const REDIRECT: &str = "http://localhost";

/// Represents the structure of the `client_secret.json` file.
///
/// The file holds OAuth 2.0 Desktop Application credentials. Google wraps the credentials in an
/// `installed` object.
///
/// Example:
/// ```json
/// {
///   "installed": {
///     "client_id": "YOUR_CLIENT_ID.apps.googleusercontent.com",
///     "client_secret": "YOUR_CLIENT_SECRET",
///     "redirect_uris": ["http://localhost"],
///     "auth_uri": "https://accounts.google.com/o/oauth2/auth",
///     "token_uri": "https://oauth2.googleapis.com/token"
///   }
/// }
/// ```
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) struct SecretFile {
    installed: InstalledCredentials,
}

impl SecretFile {
    pub(super) async fn load(path: &Path) -> Res<SecretFile> {
        utils::deserialize(path).await.with_context(|| {
            format!(
                "Unable to read the OAuth client secret at {}. Download it from the Google Cloud \
                Console and pass it to 'gofinances init --client-secret'",
                path.display()
            )
        })
    }

    pub(super) fn client_id(&self) -> &str {
        &self.installed.client_id
    }

    pub(super) fn client_secret(&self) -> &str {
        &self.installed.client_secret
    }

    pub(super) fn auth_uri(&self) -> &str {
        &self.installed.auth_uri
    }

    pub(super) fn token_uri(&self) -> &str {
        &self.installed.token_uri
    }
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
    /// Must contain "http://localhost" (without a port number)
    redirect_uris: RedirectUris,
    auth_uri: String,
    token_uri: String,
}

#[derive(Default, Debug, Clone)]
struct RedirectUris(Vec<String>);

impl Serialize for RedirectUris {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RedirectUris {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec = Vec::<String>::deserialize(deserializer)?;
        if !vec.iter().any(|s| is_valid_redirect(s)) {
            return Err(D::Error::custom(format!(
                "At least one of the redirects needs to be {REDIRECT}, but this was not found. \
                When creating the OAuth client in the Google Cloud Console, you must include \
                '{REDIRECT}'"
            )));
        }
        Ok(RedirectUris(vec))
    }
}

fn is_valid_redirect(s: &str) -> bool {
    s == REDIRECT || s == "http://127.0.0.1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn load_json(json: &str) -> Res<SecretFile> {
        let temp_dir = TempDir::new().unwrap();
        let p = temp_dir.path().join("client_secret.json");
        utils::write(&p, json).await.unwrap();
        SecretFile::load(&p).await
    }

    #[tokio::test]
    async fn test_client_secret_good_redirect() {
        let secret = load_json(
            r#"{
                "installed": {
                    "client_id": "abc.apps.googleusercontent.com",
                    "client_secret": "shh",
                    "redirect_uris": ["http://127.0.0.1", "https://example.com:4040/whatever"],
                    "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                    "token_uri": "https://oauth2.googleapis.com/token"
                }
            }"#,
        )
        .await
        .unwrap();
        assert_eq!(secret.client_id(), "abc.apps.googleusercontent.com");
        assert_eq!(secret.client_secret(), "shh");
        assert_eq!(secret.token_uri(), "https://oauth2.googleapis.com/token");
    }

    #[tokio::test]
    async fn test_client_secret_bad_redirect() {
        let err = load_json(
            r#"{
                "installed": {
                    "client_id": "abc",
                    "client_secret": "shh",
                    "redirect_uris": ["http://localhost:9900"],
                    "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                    "token_uri": "https://oauth2.googleapis.com/token"
                }
            }"#,
        )
        .await
        .unwrap_err();
        assert!(format!("{err:?}").contains("At least one of the redirects needs to be"));
    }
}
