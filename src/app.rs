//! The state shared by every command that works on a user's data: the loaded `Config`, the open
//! store, and the session restored from it.

use crate::error::Res;
use crate::ledger::Ledger;
use crate::model::User;
use crate::session::Session;
use crate::storage::Storage;
use crate::Config;
use anyhow::Context;
use std::sync::Arc;

pub struct App {
    config: Config,
    storage: Arc<dyn Storage>,
    session: Session,
}

impl App {
    /// Opens the store configured in `config` and restores the session.
    pub async fn open(config: Config) -> Res<Self> {
        let storage = config
            .storage()
            .await
            .context("Unable to open the local store")?;
        Self::new(config, Arc::new(storage)).await
    }

    /// Restores the session from `storage`.
    pub async fn new(config: Config, storage: Arc<dyn Storage>) -> Res<Self> {
        let session = Session::init(storage.clone(), &config.keys()).await?;
        Ok(Self {
            config,
            storage,
            session,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.storage.clone(), self.config.keys())
    }

    /// The signed-in user.
    ///
    /// # Errors
    /// Fails with a hint to run `gofinances sign-in` when nobody is signed in.
    pub fn user(&self) -> Res<&User> {
        self.session
            .user()
            .context("You are not signed in, run 'gofinances sign-in' first")
    }
}
