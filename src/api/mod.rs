//! Interfaces to the outside world: the OAuth provider and the profile endpoint.
//!
//! Both are traits so that the session manager can run against Google or against the in-process
//! fakes in `test_client`. Which one is used is decided by `Mode`.

mod files;
mod oauth;
mod profile;
mod test_client;

use crate::error::Res;
use crate::Config;
use serde::{Deserialize, Serialize};

pub use oauth::GoogleAuthorizer;
pub use profile::GoogleProfileLookup;
pub use test_client::{TestAuthorizer, TestProfileLookup};

/// OAuth scopes requested at sign-in; enough to read the user's name, email and picture.
const OAUTH_SCOPES: &[&str] = &["profile", "email"];

/// When this environment variable is set and non-empty the app runs against the fakes.
const TEST_MODE_ENV: &str = "GOFINANCES_IN_TEST_MODE";

/// Whether the app talks to Google or to in-process fakes.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Google,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Reads `GOFINANCES_IN_TEST_MODE` to decide the mode.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(s) if !s.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// The result of an OAuth authorization attempt.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AuthOutcome {
    /// The user granted access.
    Success { access_token: String },
    /// The user cancelled or denied the request.
    Cancel,
}

/// Runs an OAuth authorization flow and reports its outcome.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> anyhow::Result<AuthOutcome>;
}

/// The fields of the profile endpoint's response that the app uses.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub picture: String,
}

/// Exchanges an access token for the user's profile.
#[async_trait::async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn profile(&self, access_token: &str) -> anyhow::Result<Profile>;
}

/// Creates the `Authorizer` for `mode`. In `Mode::Google` this reads the OAuth client secret.
pub(crate) async fn authorizer(config: &Config, mode: Mode) -> Res<Box<dyn Authorizer>> {
    match mode {
        Mode::Google => Ok(Box::new(
            GoogleAuthorizer::load(config.client_secret_path(), config.oauth_callback_port())
                .await?,
        )),
        Mode::Test => Ok(Box::new(TestAuthorizer::default())),
    }
}

/// Creates the `ProfileLookup` for `mode`.
pub(crate) fn profile_lookup(config: &Config, mode: Mode) -> Res<Box<dyn ProfileLookup>> {
    match mode {
        Mode::Google => Ok(Box::new(GoogleProfileLookup::new(config.profile_endpoint())?)),
        Mode::Test => Ok(Box::new(TestProfileLookup::default())),
    }
}

#[test]
fn test_profile_deserialize_partial() {
    let profile: Profile = serde_json::from_str(r#"{"id": "1", "verified_email": true}"#).unwrap();
    assert_eq!(profile.id, "1");
    assert_eq!(profile.given_name, "");
}
