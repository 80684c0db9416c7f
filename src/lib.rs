//! Social proof extraction: "who wore what" records scraped from editorial
//! fashion pages, with celebrity identity resolution, outfit attribute
//! parsing and confidence scoring. The pipeline degrades to synthetic items
//! instead of failing.

pub mod confidence;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod identity;
pub mod item;
pub mod mock;
pub mod navigator;
pub mod orchestrator;
pub mod outfit;
pub mod rank;
pub mod report;
pub mod vocabulary;

#[cfg(feature = "python")]
mod python;

use std::sync::Arc;

pub use crate::config::{Engine, ScoringWeights, ScrapeOptions, SourcePlan};
pub use crate::error::{Result, ScrapeError};
pub use crate::item::SocialProofItem;
pub use crate::navigator::{DefaultLauncher, LoadedPage, PageSession, SessionLauncher};
pub use crate::orchestrator::{backoff_delay, Orchestrator};
pub use crate::vocabulary::Vocabulary;

/// Run the pipeline with the built-in vocabulary and sources.
pub async fn extract_social_proof(options: ScrapeOptions) -> Vec<SocialProofItem> {
    extract_social_proof_with(options, &Vocabulary::default(), SourcePlan::default()).await
}

/// Run the pipeline against caller-supplied reference data and sources.
pub async fn extract_social_proof_with(
    options: ScrapeOptions,
    vocab: &Vocabulary,
    plan: SourcePlan,
) -> Vec<SocialProofItem> {
    Orchestrator::new(
        Arc::new(DefaultLauncher),
        vocab,
        ScoringWeights::default(),
        plan,
        options,
    )
    .run()
    .await
}
