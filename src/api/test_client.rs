//! Scripted implementations of `Authorizer` and `ProfileLookup`.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole app can
//! run, top-to-bottom, without talking to Google (see `Mode::Test`).

use crate::api::{AuthOutcome, Authorizer, Profile, ProfileLookup};
use anyhow::bail;
use std::sync::atomic::{AtomicUsize, Ordering};

const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// An `Authorizer` that returns a fixed outcome, or fails, without any user interaction.
#[derive(Debug)]
pub struct TestAuthorizer {
    outcome: Option<AuthOutcome>,
    calls: AtomicUsize,
}

impl TestAuthorizer {
    /// Grants access with `access_token`.
    pub fn success(access_token: impl Into<String>) -> Self {
        Self::with(Some(AuthOutcome::Success {
            access_token: access_token.into(),
        }))
    }

    /// Behaves as if the user closed the consent screen.
    pub fn cancel() -> Self {
        Self::with(Some(AuthOutcome::Cancel))
    }

    /// Fails with an error, as if the provider could not be reached.
    pub fn failing() -> Self {
        Self::with(None)
    }

    fn with(outcome: Option<AuthOutcome>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `authorize` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for TestAuthorizer {
    fn default() -> Self {
        Self::success(TEST_ACCESS_TOKEN)
    }
}

#[async_trait::async_trait]
impl Authorizer for TestAuthorizer {
    async fn authorize(&self) -> anyhow::Result<AuthOutcome> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Some(outcome) => Ok(outcome.clone()),
            None => bail!("The test authorizer was told to fail"),
        }
    }
}

/// A `ProfileLookup` that returns a fixed profile for one expected access token.
#[derive(Debug, Clone)]
pub struct TestProfileLookup {
    access_token: String,
    profile: Profile,
}

impl TestProfileLookup {
    pub fn new(access_token: impl Into<String>, profile: Profile) -> Self {
        Self {
            access_token: access_token.into(),
            profile,
        }
    }
}

impl Default for TestProfileLookup {
    fn default() -> Self {
        Self::new(
            TEST_ACCESS_TOKEN,
            Profile {
                id: "test-user".to_string(),
                email: "test.user@example.com".to_string(),
                given_name: "Test".to_string(),
                picture: "https://example.com/test-user.png".to_string(),
            },
        )
    }
}

#[async_trait::async_trait]
impl ProfileLookup for TestProfileLookup {
    async fn profile(&self, access_token: &str) -> anyhow::Result<Profile> {
        if access_token != self.access_token {
            bail!("The profile request failed with status 401 Unauthorized");
        }
        Ok(self.profile.clone())
    }
}
