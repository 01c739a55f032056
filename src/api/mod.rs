// API module - HTTP client for the router's web interface

pub mod data;
pub mod session;

use reqwest::Url;
use serde::Serialize;

use crate::config::RouterSettings;
use crate::error::{AppError, AppResult};
pub use session::SessionId;

const LOGIN_PATH: &str = "/login_sid.lua";
const DATA_PATH: &str = "/data.lua";

/// Client bound to one router's web interface.
///
/// Every request is a single round trip. Nothing is retried and no state is
/// kept between calls; the session id is passed in explicitly.
pub struct RouterClient {
    http: reqwest::Client,
    login_url: Url,
    data_url: Url,
}

impl RouterClient {
    pub fn new(settings: &RouterSettings) -> AppResult<Self> {
        let invalid_url = |reason: String| {
            AppError::Config(format!("invalid router URL {:?}: {}", settings.url, reason))
        };
        let base = Url::parse(&settings.url).map_err(|e| invalid_url(e.to_string()))?;
        let endpoint = |path: &str| base.join(path).map_err(|e| invalid_url(e.to_string()));
        let login_url = endpoint(LOGIN_PATH)?;
        let data_url = endpoint(DATA_PATH)?;

        if !settings.verify_tls && base.scheme() == "https" {
            tracing::debug!("TLS certificate verification disabled for {}", base);
        }

        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(!settings.verify_tls);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(RouterClient {
            http: builder.build()?,
            login_url,
            data_url,
        })
    }

    async fn get_login(&self, query: &[(&str, &str)]) -> AppResult<String> {
        tracing::debug!("GET {}", self.login_url);
        let body = self
            .http
            .get(self.login_url.clone())
            .query(query)
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }

    async fn post_data<T: Serialize + ?Sized>(&self, form: &T) -> AppResult<String> {
        tracing::debug!("POST {}", self.data_url);
        let response = self.http.post(self.data_url.clone()).form(form).send().await?;
        if !response.status().is_success() {
            tracing::warn!("{} answered with status {}", self.data_url, response.status());
        }
        Ok(response.text().await?)
    }
}
