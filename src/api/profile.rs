//! Looks up the signed-in user's profile with an OAuth access token.

use crate::api::{Profile, ProfileLookup};
use crate::error::Res;
use anyhow::{bail, Context};
use tracing::trace;
use url::Url;

/// Implements `ProfileLookup` with a `GET <endpoint>?access_token=<token>` request.
pub struct GoogleProfileLookup {
    endpoint: Url,
    client: reqwest::Client,
}

impl GoogleProfileLookup {
    pub fn new(endpoint: &str) -> Res<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid profile endpoint '{endpoint}'"))?;
        Ok(Self {
            endpoint,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, access_token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("access_token", access_token);
        url
    }
}

#[async_trait::async_trait]
impl ProfileLookup for GoogleProfileLookup {
    async fn profile(&self, access_token: &str) -> anyhow::Result<Profile> {
        trace!("profile lookup at {}", self.endpoint);
        let response = self
            .client
            .get(self.url(access_token))
            .send()
            .await
            .context("Failed to send the profile request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("The profile request failed with status {status}: {body}");
        }

        response
            .json::<Profile>()
            .await
            .context("Failed to parse the profile response")
    }
}

#[test]
fn test_url_appends_token() {
    let lookup =
        GoogleProfileLookup::new("https://www.googleapis.com/oauth2/v1/userinfo?alt=json").unwrap();
    assert_eq!(
        lookup.url("a b").as_str(),
        "https://www.googleapis.com/oauth2/v1/userinfo?alt=json&access_token=a+b"
    );
}

#[test]
fn test_bad_endpoint() {
    assert!(GoogleProfileLookup::new("not a url").is_err());
}
