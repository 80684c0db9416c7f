//! Page loading.
//!
//! A [`PageSession`] turns a URL into rendered HTML; everything after that
//! runs host-side. [`ChromeSession`] drives headless Chromium: it blocks
//! heavy and tracking resources, waits for navigation, races a set of
//! content-ready selectors, scrolls half the page to trigger lazy loading
//! and lets late content settle before capturing the DOM.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::select_ok;
use headless_chrome::browser::tab::{RequestInterceptor, RequestPausedDecision};
use headless_chrome::browser::transport::{SessionId, Transport};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::FailRequest;
use headless_chrome::protocol::cdp::Network::ErrorReason;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{Engine, ScrapeOptions};
use crate::error::{Result, ScrapeError};
use crate::fetch::HttpSession;

/// Selectors signalling that story content has rendered.
pub const READY_SELECTORS: &[&str] = &[
    "article",
    "[class*='card']",
    "[class*='slide']",
    "[class*='post']",
    "main h2",
    "main",
];

/// Interval between DOM queries while waiting for a ready selector.
const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Pixels per auto-scroll step.
const SCROLL_STEP_PX: u64 = 400;
/// Pause between scroll steps.
const SCROLL_PAUSE: Duration = Duration::from_millis(100);
/// Upper bound on scroll steps regardless of page height.
const MAX_SCROLL_STEPS: u64 = 40;

const TRACKING_DOMAINS: &[&str] = &[
    "google-analytics.com",
    "googletagmanager.com",
    "googlesyndication.com",
    "doubleclick.net",
    "facebook.net",
    "connect.facebook.com",
    "scorecardresearch.com",
    "amazon-adsystem.com",
    "adnxs.com",
    "criteo.com",
    "taboola.com",
    "outbrain.com",
    "hotjar.com",
    "chartbeat.com",
    "quantserve.com",
    "moatads.com",
];

const BLOCKED_RESOURCE_TYPES: &[&str] = &["Image", "Font", "Media", "Ping", "Manifest"];

/// Rendered page content captured host-side.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// One browsing session, alive for a single pipeline attempt.
#[async_trait]
pub trait PageSession: Send {
    async fn load(&mut self, url: &str) -> Result<LoadedPage>;

    /// Release the session. Called on every exit path of an attempt.
    async fn close(&mut self);
}

/// Opens sessions; one call per pipeline attempt.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, options: &ScrapeOptions) -> Result<Box<dyn PageSession>>;
}

/// Launches the session kind selected by [`ScrapeOptions::engine`].
pub struct DefaultLauncher;

#[async_trait]
impl SessionLauncher for DefaultLauncher {
    async fn launch(&self, options: &ScrapeOptions) -> Result<Box<dyn PageSession>> {
        match options.engine {
            Engine::Chrome => Ok(Box::new(ChromeSession::launch(options).await?)),
            Engine::Http => Ok(Box::new(HttpSession::new(options)?)),
        }
    }
}

/// Whether a request should be failed before it leaves the browser.
///
/// Images are never needed as bytes (their URLs stay in the DOM), fonts and
/// media never are, tracking hosts are dropped outright and stylesheets are
/// only kept when served from the page's own site.
pub fn should_block(resource_type: &str, request_url: &str, page_host: Option<&str>) -> bool {
    if BLOCKED_RESOURCE_TYPES.contains(&resource_type) {
        return true;
    }
    let host = Url::parse(request_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    if TRACKING_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    {
        return true;
    }
    if resource_type == "Stylesheet" {
        return match page_host {
            Some(page) => !same_site(&host, page),
            None => true,
        };
    }
    false
}

fn same_site(a: &str, b: &str) -> bool {
    fn site(host: &str) -> String {
        let parts: Vec<&str> = host.trim_start_matches("www.").split('.').collect();
        let n = parts.len();
        if n >= 2 {
            format!("{}.{}", parts[n - 2], parts[n - 1])
        } else {
            host.to_string()
        }
    }
    site(a) == site(b)
}

/// Scroll steps needed to traverse half of `scroll_height`.
pub fn half_page_scroll_steps(scroll_height: u64) -> u64 {
    (scroll_height / 2).div_ceil(SCROLL_STEP_PX).min(MAX_SCROLL_STEPS)
}

/// Run `check` every `interval` until it succeeds. Gives up once `deadline`
/// passes or `cancel` is set, whichever comes first.
pub fn poll_until(
    deadline: Instant,
    interval: Duration,
    cancel: &AtomicBool,
    mut check: impl FnMut() -> bool,
) -> bool {
    loop {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        if check() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(interval.min(deadline - now));
    }
}

struct ResourceBlocker {
    page_host: Mutex<Option<String>>,
}

impl RequestInterceptor for ResourceBlocker {
    fn intercept(
        &self,
        _transport: Arc<Transport>,
        _session_id: SessionId,
        event: RequestPausedEvent,
    ) -> RequestPausedDecision {
        let resource_type = format!("{:?}", event.params.resource_Type);
        let page_host = self.page_host.lock().ok().and_then(|h| h.clone());
        if should_block(&resource_type, &event.params.request.url, page_host.as_deref()) {
            debug!(url = %event.params.request.url, resource_type, "blocked request");
            RequestPausedDecision::Fail(FailRequest {
                request_id: event.params.request_id,
                error_reason: ErrorReason::BlockedByClient,
            })
        } else {
            RequestPausedDecision::Continue(None)
        }
    }
}

pub struct ChromeSession {
    // dropping the browser terminates the Chromium process
    browser: Option<Browser>,
    tab: Arc<Tab>,
    blocker: Arc<ResourceBlocker>,
    timeout: Duration,
    selector_timeout: Duration,
    settle_delay: Duration,
}

impl ChromeSession {
    pub async fn launch(options: &ScrapeOptions) -> Result<Self> {
        let headless = options.headless;
        let timeout = options.timeout;

        let (browser, tab, blocker) = tokio::task::spawn_blocking(move || {
            let launch_options = LaunchOptions::default_builder()
                .headless(headless)
                .window_size(Some((1366, 900)))
                .idle_browser_timeout(timeout * 4)
                .build()
                .map_err(|e| ScrapeError::Launch(e.to_string()))?;
            let browser =
                Browser::new(launch_options).map_err(|e| ScrapeError::Launch(e.to_string()))?;
            let tab = browser
                .new_tab()
                .map_err(|e| ScrapeError::Launch(e.to_string()))?;
            tab.set_default_timeout(timeout);

            let blocker = Arc::new(ResourceBlocker {
                page_host: Mutex::new(None),
            });
            tab.enable_fetch(None, None)
                .map_err(|e| ScrapeError::Browser(e.to_string()))?;
            tab.enable_request_interception(blocker.clone())
                .map_err(|e| ScrapeError::Browser(e.to_string()))?;

            Ok::<_, ScrapeError>((browser, tab, blocker))
        })
        .await??;

        info!(headless, "chrome session launched");
        Ok(Self {
            browser: Some(browser),
            tab,
            blocker,
            timeout,
            selector_timeout: options.selector_timeout,
            settle_delay: options.settle_delay,
        })
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        if let Ok(mut host) = self.blocker.page_host.lock() {
            *host = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string));
        }

        let tab = self.tab.clone();
        let target = url.to_string();
        let navigation = tokio::task::spawn_blocking(move || {
            tab.navigate_to(&target)
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| ScrapeError::Navigation {
                    url: target.clone(),
                    message: e.to_string(),
                })
        });

        match tokio::time::timeout(self.timeout, navigation).await {
            Ok(joined) => joined?,
            Err(_) => Err(ScrapeError::Timeout {
                what: format!("navigation to {url}"),
                secs: self.timeout.as_secs(),
            }),
        }
    }

    /// First content-ready selector to appear; individual misses are silent.
    async fn race_ready_selectors(&self, url: &str) -> Result<&'static str> {
        let cancel = Arc::new(AtomicBool::new(false));
        let deadline = Instant::now() + self.selector_timeout;
        let waits = READY_SELECTORS.iter().map(|&selector| {
            let tab = self.tab.clone();
            let cancel = cancel.clone();
            Box::pin(async move {
                let found = tokio::task::spawn_blocking(move || {
                    poll_until(deadline, SELECTOR_POLL, &cancel, || {
                        tab.find_element(selector).is_ok()
                    })
                })
                .await
                .unwrap_or(false);
                if found {
                    Ok(selector)
                } else {
                    Err(())
                }
            })
        });

        let winner = select_ok(waits).await;
        // the losing waits run on blocking threads and stop at their next poll
        cancel.store(true, Ordering::Relaxed);
        match winner {
            Ok((selector, _rest)) => Ok(selector),
            Err(()) => Err(ScrapeError::NoContent(url.to_string())),
        }
    }

    async fn auto_scroll(&self) -> Result<()> {
        let tab = self.tab.clone();
        let height = tokio::task::spawn_blocking(move || {
            tab.evaluate("document.body ? document.body.scrollHeight : 0", false)
                .ok()
                .and_then(|obj| obj.value)
                .and_then(|v| v.as_u64())
                .unwrap_or(0)
        })
        .await?;

        let steps = half_page_scroll_steps(height);
        debug!(height, steps, "auto-scrolling");
        for _ in 0..steps {
            let tab = self.tab.clone();
            tokio::task::spawn_blocking(move || {
                let _ = tab.evaluate(&format!("window.scrollBy(0, {SCROLL_STEP_PX})"), false);
            })
            .await?;
            tokio::time::sleep(SCROLL_PAUSE).await;
        }
        Ok(())
    }

    async fn capture(&self) -> Result<String> {
        let tab = self.tab.clone();
        tokio::task::spawn_blocking(move || {
            tab.get_content().map_err(|e| ScrapeError::Browser(e.to_string()))
        })
        .await?
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn load(&mut self, url: &str) -> Result<LoadedPage> {
        self.navigate(url).await?;

        let selector = self.race_ready_selectors(url).await?;
        debug!(url, selector, "content ready");

        self.auto_scroll().await?;
        tokio::time::sleep(self.settle_delay).await;

        let html = self.capture().await?;
        Ok(LoadedPage {
            url: self.tab.get_url(),
            html,
        })
    }

    async fn close(&mut self) {
        let tab = self.tab.clone();
        let closed = tokio::task::spawn_blocking(move || tab.close(true)).await;
        if let Ok(Err(e)) = closed {
            warn!(error = %e, "failed to close tab");
        }
        self.browser.take();
        info!("chrome session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_heavy_resource_types() {
        assert!(should_block("Image", "https://cdn.example.com/a.jpg", Some("example.com")));
        assert!(should_block("Font", "https://fonts.example.com/a.woff2", None));
        assert!(!should_block("Document", "https://www.example.com/", Some("www.example.com")));
        assert!(!should_block("Script", "https://www.example.com/app.js", Some("www.example.com")));
    }

    #[test]
    fn blocks_tracking_hosts() {
        assert!(should_block("Script", "https://www.google-analytics.com/analytics.js", None));
        assert!(should_block("XHR", "https://securepubads.g.doubleclick.net/x", None));
        assert!(!should_block("Script", "https://notdoubleclick.net.example.com/x", None));
    }

    #[test]
    fn keeps_only_first_party_stylesheets() {
        let page = Some("www.whowhatwear.com");
        assert!(!should_block("Stylesheet", "https://static.whowhatwear.com/main.css", page));
        assert!(should_block("Stylesheet", "https://cdn.thirdparty.com/widget.css", page));
    }

    #[test]
    fn cancelled_wait_stops_without_polling() {
        let cancel = AtomicBool::new(true);
        let mut calls = 0;
        let deadline = Instant::now() + Duration::from_secs(15);
        let started = Instant::now();
        assert!(!poll_until(deadline, Duration::from_millis(5), &cancel, || {
            calls += 1;
            true
        }));
        assert_eq!(calls, 0);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn wait_succeeds_once_the_check_passes() {
        let cancel = AtomicBool::new(false);
        let mut calls = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        assert!(poll_until(deadline, Duration::from_millis(1), &cancel, || {
            calls += 1;
            calls == 3
        }));
        assert_eq!(calls, 3);
    }

    #[test]
    fn wait_gives_up_at_the_deadline() {
        let cancel = AtomicBool::new(false);
        let mut calls = 0;
        let deadline = Instant::now() + Duration::from_millis(30);
        assert!(!poll_until(deadline, Duration::from_millis(5), &cancel, || {
            calls += 1;
            false
        }));
        assert!(calls >= 2);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn cancelling_from_another_thread_ends_a_long_wait() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let deadline = Instant::now() + Duration::from_secs(15);
        let started = Instant::now();
        let waiter = std::thread::spawn(move || {
            poll_until(deadline, Duration::from_millis(5), &flag, || false)
        });
        std::thread::sleep(Duration::from_millis(20));
        cancel.store(true, Ordering::Relaxed);
        assert!(!waiter.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn scroll_covers_half_the_page() {
        assert_eq!(half_page_scroll_steps(0), 0);
        assert_eq!(half_page_scroll_steps(800), 1);
        assert_eq!(half_page_scroll_steps(4000), 5);
        assert_eq!(half_page_scroll_steps(1_000_000), MAX_SCROLL_STEPS);
    }
}
