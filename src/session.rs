//! The signed-in user's session.
//!
//! A `Session` is created once with `Session::init`, which restores whatever was persisted by an
//! earlier sign-in, and is then handed to whatever needs to know who the user is. Signing in and
//! out take `&mut self`, so two sign-in flows can never run on the same session at once.

use crate::api::{AuthOutcome, Authorizer, Profile, ProfileLookup};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::User;
use crate::storage::{Keys, Storage};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum SessionState {
    #[default]
    SignedOut,
    Authenticating,
    SignedIn(User),
}

/// Owns the current user identity and its persisted copy.
pub struct Session {
    storage: Arc<dyn Storage>,
    key: String,
    state: SessionState,
}

impl Session {
    /// Restores the session persisted under the user key. A missing or malformed value leaves the
    /// session signed out.
    ///
    /// # Errors
    /// Returns an error only if the storage itself cannot be read.
    pub async fn init(storage: Arc<dyn Storage>, keys: &Keys) -> Res<Self> {
        let key = keys.user();
        let stored = storage
            .get(&key)
            .await
            .context("Unable to read the stored session")?;

        let state = match stored {
            None => SessionState::SignedOut,
            Some(json) => match serde_json::from_str::<User>(&json) {
                Ok(user) if !user.id().is_empty() => {
                    debug!("Restored the session of user {}", user.id());
                    SessionState::SignedIn(user)
                }
                Ok(_) => {
                    warn!("The stored session has no user id, ignoring it");
                    SessionState::SignedOut
                }
                Err(e) => {
                    warn!("The stored session is malformed, ignoring it: {e}");
                    SessionState::SignedOut
                }
            },
        };

        Ok(Self {
            storage,
            key,
            state,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    /// Signs in through `authorizer`, then looks up the user's profile with the access token and
    /// persists the new session.
    ///
    /// Returns `Ok(None)` if the user cancelled; nothing is persisted in that case.
    ///
    /// # Errors
    /// The session is left signed out after any failure.
    /// - `ErrorType::Auth` if a user is already signed in, or if the authorization fails.
    /// - `ErrorType::Request` if the profile lookup fails.
    /// - `ErrorType::Storage` if the session cannot be saved.
    pub async fn sign_in(
        &mut self,
        authorizer: &dyn Authorizer,
        profiles: &dyn ProfileLookup,
    ) -> Result<Option<&User>> {
        if let Some(user) = self.user() {
            return Err(anyhow!(
                "Already signed in as {} <{}>, sign out first",
                user.name(),
                user.email()
            ))
            .pub_result(ErrorType::Auth);
        }

        self.state = SessionState::Authenticating;
        match self.authenticate(authorizer, profiles).await {
            Ok(Some(user)) => {
                info!("Signed in as {}", user.email());
                self.state = SessionState::SignedIn(user);
                Ok(self.user())
            }
            Ok(None) => {
                info!("Sign-in was cancelled");
                self.state = SessionState::SignedOut;
                Ok(None)
            }
            Err(e) => {
                self.state = SessionState::SignedOut;
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        authorizer: &dyn Authorizer,
        profiles: &dyn ProfileLookup,
    ) -> Result<Option<User>> {
        let outcome = authorizer
            .authorize()
            .await
            .context("Sign-in failed")
            .pub_result(ErrorType::Auth)?;
        let access_token = match outcome {
            AuthOutcome::Success { access_token } => access_token,
            AuthOutcome::Cancel => return Ok(None),
        };

        let profile = fetch_profile(profiles, &access_token)
            .await
            .context("Unable to fetch the user profile")
            .pub_result(ErrorType::Request)?;

        let user = User::new(profile.id, profile.given_name, profile.email, profile.picture);
        let json = serde_json::to_string(&user)
            .context("Unable to serialize the session")
            .pub_result(ErrorType::Internal)?;
        self.storage
            .set(&self.key, &json)
            .await
            .context("Unable to save the session")
            .pub_result(ErrorType::Storage)?;
        Ok(Some(user))
    }

    /// Removes the persisted session and clears the current user.
    ///
    /// # Errors
    /// Returns an error if the stored session cannot be removed, in which case the in-memory
    /// session is left as it was.
    pub async fn sign_out(&mut self) -> Res<()> {
        self.storage
            .remove(&self.key)
            .await
            .context("Unable to remove the stored session")?;
        if let Some(user) = self.user() {
            info!("Signed out {}", user.email());
        }
        self.state = SessionState::SignedOut;
        Ok(())
    }
}

async fn fetch_profile(profiles: &dyn ProfileLookup, access_token: &str) -> Res<Profile> {
    let profile = profiles.profile(access_token).await?;
    if profile.id.is_empty() {
        bail!("The profile response did not include a user id");
    }
    Ok(profile)
}
