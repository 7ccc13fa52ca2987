//! Catalog data model
//!
//! Field names on the wire use camelCase (`englishName`, `videoUrl`, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Entity, EntityKind};

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

// ========================================
// Recitations
// ========================================

/// Recitation entry (one surah), keyed by its sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recitation {
    pub number: u32,
    #[serde(flatten)]
    pub details: RecitationDetails,
}

/// Every recitation field except the immutable sequence number
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecitationDetails {
    pub name: String,
    pub english_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name_translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revelation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_ayahs: Option<u32>,
    pub audio_url: String,
}

impl Entity for Recitation {
    const KIND: EntityKind = EntityKind::Recitation;
    type Id = u32;
    type Draft = Recitation;
    type Patch = RecitationDetails;

    fn id(&self) -> &u32 {
        &self.number
    }

    fn assign_id(draft: &Recitation) -> u32 {
        draft.number
    }

    fn from_draft(_id: u32, draft: Recitation) -> Self {
        draft
    }

    fn apply_patch(&mut self, patch: RecitationDetails) {
        self.details = patch;
    }

    fn sort_key(&self) -> Option<i64> {
        Some(i64::from(self.number))
    }
}

// ========================================
// Media (anime series)
// ========================================

/// One episode of a media entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// 1-based, unique within the owning media entry
    pub number: u32,
    pub title: String,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub id: String,
    #[serde(flatten)]
    pub details: MediaDetails,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    pub title: String,
    pub image_url: String,
    pub synopsis: String,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Entity for MediaEntry {
    const KIND: EntityKind = EntityKind::Media;
    type Id = String;
    type Draft = MediaDetails;
    type Patch = MediaDetails;

    fn id(&self) -> &String {
        &self.id
    }

    fn assign_id(_draft: &MediaDetails) -> String {
        generated_id()
    }

    fn from_draft(id: String, details: MediaDetails) -> Self {
        Self { id, details }
    }

    fn apply_patch(&mut self, patch: MediaDetails) {
        self.details = patch;
    }
}

// ========================================
// Radio stations
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    #[serde(flatten)]
    pub details: StationDetails,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDetails {
    pub name: String,
    pub genre: String,
    /// Never empty for a stored station
    pub tracks: Vec<Track>,
}

impl Entity for Station {
    const KIND: EntityKind = EntityKind::Station;
    type Id = String;
    type Draft = StationDetails;
    type Patch = StationDetails;

    fn id(&self) -> &String {
        &self.id
    }

    fn assign_id(_draft: &StationDetails) -> String {
        generated_id()
    }

    fn from_draft(id: String, details: StationDetails) -> Self {
        Self { id, details }
    }

    fn apply_patch(&mut self, patch: StationDetails) {
        self.details = patch;
    }
}

// ========================================
// Live TV channels
// ========================================

/// How a channel's stream is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    #[default]
    Embed,
    Hls,
}

impl std::str::FromStr for StreamKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "embed" => Ok(StreamKind::Embed),
            "hls" => Ok(StreamKind::Hls),
            other => Err(crate::Error::Validation(format!(
                "stream type must be 'embed' or 'hls', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    #[serde(flatten)]
    pub details: ChannelDetails,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetails {
    pub name: String,
    pub logo_url: String,
    pub stream_url: String,
    pub category: String,
    #[serde(default, rename = "streamType")]
    pub stream_kind: StreamKind,
}

impl Entity for Channel {
    const KIND: EntityKind = EntityKind::Channel;
    type Id = String;
    type Draft = ChannelDetails;
    type Patch = ChannelDetails;

    fn id(&self) -> &String {
        &self.id
    }

    fn assign_id(_draft: &ChannelDetails) -> String {
        generated_id()
    }

    fn from_draft(id: String, details: ChannelDetails) -> Self {
        Self { id, details }
    }

    fn apply_patch(&mut self, patch: ChannelDetails) {
        self.details = patch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_stream_kind_defaults_to_embed() {
        let json = r#"{"id":"c1","name":"News","logoUrl":"l","streamUrl":"s","category":"News"}"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.details.stream_kind, StreamKind::Embed);
    }

    #[test]
    fn test_recitation_wire_shape() {
        let recitation = Recitation {
            number: 1,
            details: RecitationDetails {
                name: "الفاتحة".to_string(),
                english_name: "Al-Faatiha".to_string(),
                english_name_translation: Some("The Opening".to_string()),
                revelation_type: None,
                number_of_ayahs: Some(7),
                audio_url: "https://example.com/001.mp3".to_string(),
            },
        };

        let value = serde_json::to_value(&recitation).unwrap();
        assert_eq!(value["number"], 1);
        assert_eq!(value["englishName"], "Al-Faatiha");
        assert_eq!(value["numberOfAyahs"], 7);
        assert!(value.get("revelationType").is_none());
    }

    #[test]
    fn test_stream_kind_parse() {
        assert_eq!("".parse::<StreamKind>().unwrap(), StreamKind::Embed);
        assert_eq!("HLS".parse::<StreamKind>().unwrap(), StreamKind::Hls);
        assert!("rtmp".parse::<StreamKind>().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let draft = MediaDetails::default();
        assert_ne!(MediaEntry::assign_id(&draft), MediaEntry::assign_id(&draft));
    }
}
