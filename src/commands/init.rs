use crate::api::Mode;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use std::path::Path;

/// Creates the home directory, its subdirectories and:
/// - Creates an initial `config.json` file with default settings
/// - Moves `secret_file` into its default location in the home directory
/// - Creates the local store
///
/// # Arguments
/// - `home` - The directory that will be the root of the home directory, e.g. `$HOME/gofinances`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to sign in with
///   Google. It may only be left out in `Mode::Test`.
///
/// # Errors
/// - Returns an error if the secret is missing outside of test mode, or if any file operation
///   fails.
pub async fn init(home: &Path, secret_file: Option<&Path>, mode: Mode) -> Result<Out<()>> {
    if secret_file.is_none() && mode == Mode::Google {
        return Err(anyhow!(
            "The OAuth client secret is required, pass it with --client-secret"
        ))
        .pub_result(ErrorType::Config);
    }
    let config = Config::create(home, secret_file)
        .await
        .context("Unable to create the home directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the gofinances home at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_requires_secret_with_google() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let err = init(&home, None, Mode::Google).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(!home.exists());
    }

    #[tokio::test]
    async fn test_init_test_mode() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        let out = init(&home, None, Mode::Test).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(Config::load(&home).await.is_ok());

        let err = init(&home, None, Mode::Test).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
