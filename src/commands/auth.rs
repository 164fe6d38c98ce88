//! Session command handlers:
//! - `gofinances sign-in` - Runs the Google OAuth consent flow and saves the session
//! - `gofinances sign-out` - Forgets the saved session
//! - `gofinances whoami` - Shows who is signed in

use crate::api::{self, Mode};
use crate::app::App;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::User;
use crate::Result;

/// Handles `gofinances sign-in`.
///
/// In `Mode::Google` this prints a consent URL and waits for the browser to be redirected back to
/// the local callback server. A cancelled consent is not an error; the session just stays signed
/// out.
///
/// # Errors
/// - `ErrorType::Config` if the OAuth client secret cannot be loaded.
/// - `ErrorType::Auth` if someone is already signed in, or if the authorization fails.
/// - `ErrorType::Request` if the profile lookup fails.
/// - `ErrorType::Storage` if the session cannot be saved.
pub async fn sign_in(app: &mut App, mode: Mode) -> Result<Out<User>> {
    let authorizer = api::authorizer(app.config(), mode)
        .await
        .pub_result(ErrorType::Config)?;
    let profiles = api::profile_lookup(app.config(), mode).pub_result(ErrorType::Config)?;

    let signed_in = app
        .session_mut()
        .sign_in(authorizer.as_ref(), profiles.as_ref())
        .await?
        .cloned();

    Ok(match signed_in {
        Some(user) => Out::new(
            format!("Signed in as {} <{}>", user.name(), user.email()),
            user,
        ),
        None => "Sign-in was cancelled, you are still signed out".into(),
    })
}

/// Handles `gofinances sign-out`.
///
/// # Errors
/// - `ErrorType::Storage` if the saved session cannot be removed.
pub async fn sign_out(app: &mut App) -> Result<Out<()>> {
    let was_signed_in = app.session().user().is_some();
    app.session_mut()
        .sign_out()
        .await
        .pub_result(ErrorType::Storage)?;
    Ok(if was_signed_in {
        "Signed out".into()
    } else {
        "Nobody was signed in".into()
    })
}

/// Handles `gofinances whoami`.
///
/// # Errors
/// - `ErrorType::Auth` if nobody is signed in.
pub async fn whoami(app: &App) -> Result<Out<User>> {
    let user = app.user().pub_result(ErrorType::Auth)?.clone();
    Ok(Out::new(
        format!("Signed in as {} <{}>", user.name(), user.email()),
        user,
    ))
}
