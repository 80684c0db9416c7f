//! Script-less page loading over a Chrome-emulating HTTP client.
//!
//! Useful where a browser cannot be launched. Pages that render their story
//! lists client-side will simply yield no candidates.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{env_var, ScrapeOptions};
use crate::error::{Result, ScrapeError};
use crate::navigator::{LoadedPage, PageSession};

const MOBILE_UA: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36";

const MAX_REDIRECTS: usize = 3;

pub struct HttpSession {
    client: wreq::Client,
    timeout: Duration,
}

impl HttpSession {
    /// Build the client; `SOCIAL_PROOF_PROXY_URL` routes every request
    /// through a proxy when set.
    pub fn new(options: &ScrapeOptions) -> Result<Self> {
        let mut builder = wreq::Client::builder()
            .emulation(wreq_util::Emulation::Chrome131)
            .timeout(options.timeout);
        if let Some(proxy_url) = env_var("SOCIAL_PROOF_PROXY_URL") {
            builder = builder.proxy(wreq::Proxy::all(&proxy_url)?);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }

    async fn get(&self, url: &str, mobile: bool) -> Result<wreq::Response> {
        let mut request = self.client.get(url);
        if mobile {
            request = request.header("User-Agent", MOBILE_UA);
        }
        match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(resp) => Ok(resp?),
            Err(_) => Err(ScrapeError::Timeout {
                what: format!("response from {url}"),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn load(&mut self, url: &str) -> Result<LoadedPage> {
        let mut current_url = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let mut resp = self.get(&current_url, false).await?;
            if resp.status().as_u16() == 403 {
                debug!(url = %current_url, "403, retrying with mobile UA");
                resp = self.get(&current_url, true).await?;
            }

            let status = resp.status();
            if status.is_success() {
                let html = resp.text().await?;
                debug!(url = %current_url, bytes = html.len(), "fetched");
                return Ok(LoadedPage {
                    url: current_url,
                    html,
                });
            }

            if status.is_redirection() {
                let location = resp
                    .headers()
                    .get("location")
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string);
                let Some(location) = location else {
                    warn!(
                        url = %current_url,
                        status = status.as_u16(),
                        "redirect without Location"
                    );
                    break;
                };
                let next_url = Url::parse(&current_url)
                    .and_then(|base| base.join(&location))
                    .map(|u| u.to_string())
                    .unwrap_or(location);
                debug!(from = %current_url, to = %next_url, "redirect");
                current_url = next_url;
                continue;
            }

            return Err(ScrapeError::Http {
                status: status.as_u16(),
                url: current_url,
            });
        }

        Err(ScrapeError::Navigation {
            url: url.to_string(),
            message: format!("gave up after {MAX_REDIRECTS} redirects"),
        })
    }

    async fn close(&mut self) {
        info!("http session closed");
    }
}
