//! Episode list schema validation
//!
//! Admins author a media entry's episodes as a JSON array. Parsing never
//! panics and never leaks a serde error type: the result is either the
//! episode list or a human-readable reason.

use ahan_common::models::Episode;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeInput {
    number: Option<u32>,
    title: Option<String>,
    video_url: Option<String>,
    synopsis: Option<String>,
}

/// Parse an episode list text block.
///
/// - Blank text is an empty list.
/// - `number` defaults to the 1-based position; numbers must be positive and unique.
/// - `title` and `videoUrl` are required and non-blank.
/// - Blank `synopsis` is dropped.
pub fn parse_episode_list(text: &str) -> Result<Vec<Episode>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let inputs: Vec<EpisodeInput> = serde_json::from_str(text)
        .map_err(|e| format!("Episodes must be a JSON array of objects: {}", e))?;

    let mut seen = HashSet::new();
    let mut episodes = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.into_iter().enumerate() {
        let position = index + 1;
        let number = match input.number {
            Some(0) => return Err(format!("Episode {}: number must be at least 1", position)),
            Some(n) => n,
            None => position as u32,
        };

        if !seen.insert(number) {
            return Err(format!("Episode number {} appears more than once", number));
        }

        let title = non_blank(input.title)
            .ok_or_else(|| format!("Episode {}: title is required", position))?;
        let video_url = non_blank(input.video_url)
            .ok_or_else(|| format!("Episode {}: videoUrl is required", position))?;

        episodes.push(Episode {
            number,
            title,
            video_url,
            synopsis: non_blank(input.synopsis),
        });
    }

    Ok(episodes)
}

/// Inverse of `parse_episode_list`, used to prefill the edit form
pub fn format_episode_list(episodes: &[Episode]) -> String {
    if episodes.is_empty() {
        return String::new();
    }
    serde_json::to_string_pretty(episodes).unwrap_or_default()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
