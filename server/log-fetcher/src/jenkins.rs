//! Minimal Jenkins HTTP client: crumb issuer, script console, console text.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{parse_listing, FailedBuild};

const DEFAULT_CRUMB_FIELD: &str = "Jenkins-Crumb";

#[derive(Debug, Clone, Deserialize)]
struct CrumbResponse {
  crumb: String,
  #[serde(rename = "crumbRequestField", default = "default_crumb_field")]
  field: String,
}

fn default_crumb_field() -> String {
  DEFAULT_CRUMB_FIELD.to_string()
}

/// CSRF token that must accompany every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
  pub field: String,
  pub value: String,
}

/// Basic-auth credentials for a Jenkins user and API token.
#[derive(Clone)]
pub struct Credentials {
  pub user: String,
  pub token: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("user", &self.user)
      .field("token", &"<redacted>")
      .finish()
  }
}

#[derive(Debug, Clone)]
pub struct JenkinsClient {
  http: Client,
  base_url: String,
  credentials: Credentials,
  crumb: Option<Crumb>,
}

impl JenkinsClient {
  pub fn new(
    base_url: &str,
    credentials: Credentials,
    request_timeout: Duration,
  ) -> Result<Self, FetchError> {
    let http = Client::builder()
      .user_agent(concat!("log-fetcher/", env!("CARGO_PKG_VERSION")))
      .connect_timeout(request_timeout)
      .timeout(request_timeout)
      .build()?;
    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      credentials,
      crumb: None,
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn authed(&self, req: RequestBuilder) -> RequestBuilder {
    let req = req.basic_auth(&self.credentials.user, Some(&self.credentials.token));
    match &self.crumb {
      Some(c) => req.header(c.field.as_str(), c.value.as_str()),
      None => req,
    }
  }

  async fn send_for_text(&self, req: RequestBuilder, url: &str) -> Result<String, FetchError> {
    let resp = self.authed(req).send().await?;
    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }
    let bytes = resp.bytes().await?;
    String::from_utf8(bytes.to_vec()).map_err(|e| FetchError::InvalidUtf8 {
      url: url.to_string(),
      reason: e.utf8_error().to_string(),
    })
  }

  /// Fetch a crumb and attach it to all later requests.
  pub async fn authenticate(&mut self) -> Result<&Crumb, FetchError> {
    let url = format!("{}/crumbIssuer/api/json", self.base_url);
    let body = self.send_for_text(self.http.get(&url), &url).await?;
    let parsed: CrumbResponse =
      serde_json::from_str(&body).map_err(|e| FetchError::Crumb(e.to_string()))?;
    debug!(field = %parsed.field, "obtained crumb");
    Ok(self.crumb.insert(Crumb {
      field: parsed.field,
      value: parsed.crumb,
    }))
  }

  /// Run `script` on the script console and parse its failed-build listing.
  pub async fn list_failed(&self, script: &str) -> Result<(Vec<FailedBuild>, usize), FetchError> {
    let url = format!("{}/scriptText", self.base_url);
    let req = self.http.post(&url).form(&[("script", script)]);
    let body = self.send_for_text(req, &url).await?;
    Ok(parse_listing(&body))
  }

  /// Download one console log. An empty body counts as a failure.
  pub async fn console_text(&self, url: &str) -> Result<String, FetchError> {
    let text = self.send_for_text(self.http.get(url), url).await?;
    if text.is_empty() {
      return Err(FetchError::EmptyBody(url.to_string()));
    }
    Ok(text)
  }
}
