//! OAuth 2.0 sign-in with Google.
//!
//! Runs the installed-application flow:
//! - Builds the consent URL with PKCE and a CSRF state
//! - Waits on a local HTTP server for Google to redirect the browser back with a code
//! - Exchanges the code for an access token
//!
//! If the user denies access, Google redirects back with an `error` parameter and the flow
//! reports `AuthOutcome::Cancel`.

use crate::api::files::SecretFile;
use crate::api::{AuthOutcome, Authorizer, OAUTH_SCOPES};
use crate::error::Res;
use anyhow::{bail, Context};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

const SIGNED_IN_PAGE: &str =
    "<html><body><h3>Signed in to gofinances. You can close this window.</h3></body></html>";
const CANCELLED_PAGE: &str =
    "<html><body><h3>Sign-in was cancelled. You can close this window.</h3></body></html>";

/// Implements `Authorizer` with Google's OAuth 2.0 endpoints.
pub struct GoogleAuthorizer {
    secret: SecretFile,
    port: u16,
}

impl GoogleAuthorizer {
    /// Loads the client secret at `client_secret` and prepares to receive the redirect on `port`.
    pub async fn load(client_secret: impl AsRef<Path>, port: u16) -> Res<Self> {
        let secret = SecretFile::load(client_secret.as_ref()).await?;
        Ok(Self { secret, port })
    }

    fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

#[async_trait::async_trait]
impl Authorizer for GoogleAuthorizer {
    async fn authorize(&self) -> anyhow::Result<AuthOutcome> {
        let client = BasicClient::new(ClientId::new(self.secret.client_id().to_string()))
            .set_client_secret(ClientSecret::new(self.secret.client_secret().to_string()))
            .set_auth_uri(
                AuthUrl::new(self.secret.auth_uri().to_string()).context("Invalid auth_uri")?,
            )
            .set_token_uri(
                TokenUrl::new(self.secret.token_uri().to_string()).context("Invalid token_uri")?,
            )
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri()).context("Invalid redirect URI")?,
            );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .set_pkce_challenge(pkce_challenge)
            .url();

        // Bind before printing the URL so the redirect cannot arrive before we listen.
        let listener = TcpListener::bind(("127.0.0.1", self.port))
            .await
            .with_context(|| format!("Unable to listen for the OAuth redirect on port {}", self.port))?;

        info!("Open this URL in your browser to sign in with Google:\n\n{auth_url}\n");
        info!("Waiting for the redirect on {}", self.redirect_uri());

        let code = match wait_for_callback(&listener).await? {
            Callback::Denied(reason) => {
                info!("Google sign-in was not completed: {reason}");
                return Ok(AuthOutcome::Cancel);
            }
            Callback::Code { code, state } => {
                if state != *csrf_state.secret() {
                    bail!("The OAuth state returned by the redirect does not match the request");
                }
                code
            }
        };

        // Following redirects here would open the door to SSRF.
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Unable to create the HTTP client")?;

        let token = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("Failed to exchange the authorization code for an access token")?;

        debug!("Received an access token");
        Ok(AuthOutcome::Success {
            access_token: token.access_token().secret().to_string(),
        })
    }
}

/// What the browser brought back to the local redirect server.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Callback {
    Code { code: String, state: String },
    Denied(String),
}

impl Callback {
    /// Parses the query of a redirect request. Returns `None` for unrelated requests such as
    /// `/favicon.ico`.
    fn from_uri(uri: &Uri) -> Option<Self> {
        let query = uri.query()?;
        let mut code = None;
        let mut state = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "error" => return Some(Callback::Denied(value.into_owned())),
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Callback::Code {
            code: code?,
            state: state.unwrap_or_default(),
        })
    }
}

/// Serves one connection at a time on `listener` until a redirect carrying a code or an error
/// arrives.
async fn wait_for_callback(listener: &TcpListener) -> Res<Callback> {
    let captured: Arc<Mutex<Option<Callback>>> = Arc::default();
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept the OAuth redirect connection")?;
        debug!("Redirect connection from {peer}");

        let sink = captured.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let sink = sink.clone();
            async move {
                let callback = Callback::from_uri(req.uri());
                let (status, page) = match &callback {
                    Some(Callback::Code { .. }) => (StatusCode::OK, SIGNED_IN_PAGE),
                    Some(Callback::Denied(_)) => (StatusCode::OK, CANCELLED_PAGE),
                    None => (StatusCode::NOT_FOUND, ""),
                };
                if let (Some(callback), Ok(mut slot)) = (callback, sink.lock()) {
                    *slot = Some(callback);
                }
                Response::builder()
                    .status(status)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(page.to_string())
            }
        });

        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            warn!("Error while serving the OAuth redirect: {e}");
        }

        let received = captured
            .lock()
            .map_err(|_| anyhow::anyhow!("The OAuth redirect lock is poisoned"))?
            .take();
        if let Some(callback) = received {
            return Ok(callback);
        }
    }
}
