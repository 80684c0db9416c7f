use std::time::Duration;

pub(crate) fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// How pages are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Headless Chromium with resource blocking, waits and auto-scroll.
    #[default]
    Chrome,
    /// Browser-emulating HTTP fetch, no script execution.
    Http,
}

/// Per-invocation parameters of the pipeline.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub item_limit: usize,
    /// Per-navigation timeout.
    pub timeout: Duration,
    /// Whole-pipeline attempts before falling back to synthetic items.
    pub retry_attempts: u32,
    pub headless: bool,
    pub engine: Engine,
    /// Bounds of the randomized pause between URL visits.
    pub polite_delay: (Duration, Duration),
    /// Pause after scrolling so late content can settle.
    pub settle_delay: Duration,
    /// Per-selector bound of the content-ready race.
    pub selector_timeout: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            item_limit: 12,
            timeout: Duration::from_secs(30),
            retry_attempts: 2,
            headless: true,
            engine: Engine::Chrome,
            polite_delay: (Duration::from_millis(1500), Duration::from_millis(3000)),
            settle_delay: Duration::from_secs(1),
            selector_timeout: Duration::from_secs(15),
        }
    }
}

impl ScrapeOptions {
    /// Defaults overridden by `SOCIAL_PROOF_*` environment variables.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(limit) = env_var("SOCIAL_PROOF_ITEM_LIMIT").and_then(|v| v.parse().ok()) {
            options.item_limit = limit;
        }
        if let Some(secs) =
            env_var("SOCIAL_PROOF_TIMEOUT_SECS").and_then(|v| v.parse::<f64>().ok())
        {
            if secs > 0.0 {
                options.timeout = Duration::from_secs_f64(secs);
            }
        }
        if let Some(retries) = env_var("SOCIAL_PROOF_RETRIES").and_then(|v| v.parse().ok()) {
            options.retry_attempts = retries;
        }
        if let Some(headless) = env_var("SOCIAL_PROOF_HEADLESS") {
            options.headless = !matches!(headless.to_lowercase().as_str(), "0" | "false" | "no");
        }
        if let Some(engine) = env_var("SOCIAL_PROOF_ENGINE") {
            if engine.eq_ignore_ascii_case("http") {
                options.engine = Engine::Http;
            }
        }
        options
    }

    pub fn with_item_limit(mut self, limit: usize) -> Self {
        self.item_limit = limit;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Drop every artificial pause; useful for tests and local replays.
    pub fn without_delays(mut self) -> Self {
        self.polite_delay = (Duration::ZERO, Duration::ZERO);
        self.settle_delay = Duration::ZERO;
        self
    }
}

/// Where the pipeline looks for stories.
#[derive(Debug, Clone)]
pub struct SourcePlan {
    pub primary_urls: Vec<String>,
    pub fallback_urls: Vec<String>,
    /// Search endpoint taking a `q` parameter.
    pub slideshow_search_url: String,
    pub slideshow_queries: Vec<String>,
}

impl Default for SourcePlan {
    fn default() -> Self {
        Self {
            primary_urls: vec![
                "https://www.whowhatwear.com/celebrity-style".to_string(),
                "https://www.whowhatwear.com/fashion/celebrity".to_string(),
                "https://www.whowhatwear.com/celebrity-street-style".to_string(),
            ],
            fallback_urls: vec![
                "https://www.harpersbazaar.com/celebrity/red-carpet-dresses/".to_string(),
                "https://www.elle.com/fashion/celebrity-style/".to_string(),
                "https://www.vogue.com/fashion/celebrity-style".to_string(),
                "https://www.instyle.com/celebrity".to_string(),
            ],
            slideshow_search_url: "https://www.whowhatwear.com/search".to_string(),
            slideshow_queries: vec![
                "celebrity outfits".to_string(),
                "red carpet looks".to_string(),
                "street style celebrities".to_string(),
            ],
        }
    }
}

/// Heuristic weights of the confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Base score when the name resolves to a reference entry.
    pub reference_match: f64,
    /// Added when that match was exact rather than fuzzy.
    pub exact_bonus: f64,
    /// Added when the context carries an action word.
    pub action_bonus: f64,
    /// Added when the context carries an outfit keyword.
    pub outfit_keyword_bonus: f64,
    /// Non-exact items must score strictly above this.
    pub acceptance_threshold: f64,
    /// Items at or above this count toward a round's early exit.
    pub high_quality: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            reference_match: 0.5,
            exact_bonus: 0.3,
            action_bonus: 0.2,
            outfit_keyword_bonus: 0.1,
            acceptance_threshold: 0.6,
            high_quality: 0.8,
        }
    }
}
