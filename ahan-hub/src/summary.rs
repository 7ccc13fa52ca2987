//! Text generation for recitation summaries and media synopses
//!
//! No generator backend is wired in; the disabled generator answers every
//! request with a fixed fallback text.

use async_trait::async_trait;
use tracing::warn;

pub const SUMMARY_FALLBACK: &str = "Could not generate summary at this time.";
pub const SYNOPSIS_FALLBACK: &str = "A thrilling adventure awaits in this new series!";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_recitation_summary(&self, surah_name: &str) -> String;

    async fn generate_media_synopsis(&self, title: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTextGenerator;

#[async_trait]
impl TextGenerator for DisabledTextGenerator {
    async fn generate_recitation_summary(&self, surah_name: &str) -> String {
        warn!("Text generation is disabled; no summary for '{}'", surah_name);
        SUMMARY_FALLBACK.to_string()
    }

    async fn generate_media_synopsis(&self, title: &str) -> String {
        warn!("Text generation is disabled; no synopsis for '{}'", title);
        SYNOPSIS_FALLBACK.to_string()
    }
}
