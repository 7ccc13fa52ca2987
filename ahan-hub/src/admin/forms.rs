//! Admin form payloads and their validation
//!
//! Every field arrives as a string (or is absent) so that a half-filled form
//! reaches validation instead of failing deserialization.

use ahan_common::models::{
    Channel, ChannelDetails, MediaDetails, MediaEntry, Recitation, RecitationDetails, Station,
    StationDetails, StreamKind, Track,
};
use ahan_common::{Entity, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::episodes::{format_episode_list, parse_episode_list};
use super::{AdminWorkspace, Editor};
use crate::catalog::CatalogEntity;

/// Form for one entity kind
pub trait AdminForm:
    Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Entity: CatalogEntity;

    /// Validate for `create`
    fn to_draft(&self) -> Result<<Self::Entity as Entity>::Draft>;

    /// Validate for `update`. The identifier is never part of the payload.
    fn to_patch(&self) -> Result<<Self::Entity as Entity>::Patch>;

    /// Prefill for editing an existing record
    fn from_record(record: &Self::Entity) -> Self;

    /// This form's editor within a session workspace
    fn editor_mut(workspace: &mut AdminWorkspace) -> &mut Editor<Self>;
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ========================================
// Recitations
// ========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecitationForm {
    pub number: Option<u32>,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub revelation_type: String,
    pub number_of_ayahs: Option<u32>,
    pub audio_url: String,
}

impl RecitationForm {
    fn details(&self) -> Result<RecitationDetails> {
        Ok(RecitationDetails {
            name: required("name", &self.name)?,
            english_name: required("englishName", &self.english_name)?,
            english_name_translation: optional(&self.english_name_translation),
            revelation_type: optional(&self.revelation_type),
            number_of_ayahs: self.number_of_ayahs,
            audio_url: required("audioUrl", &self.audio_url)?,
        })
    }
}

impl AdminForm for RecitationForm {
    type Entity = Recitation;

    fn to_draft(&self) -> Result<Recitation> {
        let number = match self.number {
            Some(n) if n > 0 => n,
            Some(_) => return Err(Error::Validation("number must be at least 1".to_string())),
            None => return Err(Error::Validation("number is required".to_string())),
        };
        Ok(Recitation {
            number,
            details: self.details()?,
        })
    }

    fn to_patch(&self) -> Result<RecitationDetails> {
        self.details()
    }

    fn from_record(record: &Recitation) -> Self {
        let details = &record.details;
        Self {
            number: Some(record.number),
            name: details.name.clone(),
            english_name: details.english_name.clone(),
            english_name_translation: details.english_name_translation.clone().unwrap_or_default(),
            revelation_type: details.revelation_type.clone().unwrap_or_default(),
            number_of_ayahs: details.number_of_ayahs,
            audio_url: details.audio_url.clone(),
        }
    }

    fn editor_mut(workspace: &mut AdminWorkspace) -> &mut Editor<Self> {
        &mut workspace.recitations
    }
}

// ========================================
// Media
// ========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaForm {
    pub title: String,
    pub image_url: String,
    pub synopsis: String,
    /// JSON array of episodes, see `parse_episode_list`
    pub episodes: String,
}

/// Placeholder cover for entries created without one
pub fn placeholder_image_url(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/500/700", seed)
}

/// Synopsis for entries created without one
pub fn placeholder_synopsis(title: &str) -> String {
    format!(
        "A thrilling adventure awaits in the world of \"{}\". More details coming soon!",
        title
    )
}

impl MediaForm {
    fn details(&self) -> Result<MediaDetails> {
        let title = required("title", &self.title)?;
        let episodes = parse_episode_list(&self.episodes).map_err(Error::Validation)?;

        let image_url = optional(&self.image_url).unwrap_or_else(|| {
            placeholder_image_url(&chrono::Utc::now().timestamp_millis().to_string())
        });
        let synopsis = optional(&self.synopsis).unwrap_or_else(|| placeholder_synopsis(&title));

        Ok(MediaDetails {
            title,
            image_url,
            synopsis,
            episodes,
        })
    }
}

impl AdminForm for MediaForm {
    type Entity = MediaEntry;

    fn to_draft(&self) -> Result<MediaDetails> {
        self.details()
    }

    fn to_patch(&self) -> Result<MediaDetails> {
        self.details()
    }

    fn from_record(record: &MediaEntry) -> Self {
        Self {
            title: record.details.title.clone(),
            image_url: record.details.image_url.clone(),
            synopsis: record.details.synopsis.clone(),
            episodes: format_episode_list(&record.details.episodes),
        }
    }

    fn editor_mut(workspace: &mut AdminWorkspace) -> &mut Editor<Self> {
        &mut workspace.media
    }
}

// ========================================
// Stations
// ========================================

/// A station is authored with a single stream URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationForm {
    pub name: String,
    pub genre: String,
    pub stream_url: String,
}

impl StationForm {
    /// The stream becomes the station's only track, titled after the station
    fn details(&self) -> Result<StationDetails> {
        let name = required("name", &self.name)?;
        let genre = required("genre", &self.genre)?;
        let stream_url = required("streamUrl", &self.stream_url)?;

        Ok(StationDetails {
            tracks: vec![Track {
                title: name.clone(),
                artist: genre.clone(),
                audio_url: stream_url,
            }],
            name,
            genre,
        })
    }
}

impl AdminForm for StationForm {
    type Entity = Station;

    fn to_draft(&self) -> Result<StationDetails> {
        self.details()
    }

    fn to_patch(&self) -> Result<StationDetails> {
        self.details()
    }

    fn from_record(record: &Station) -> Self {
        Self {
            name: record.details.name.clone(),
            genre: record.details.genre.clone(),
            stream_url: record
                .details
                .tracks
                .first()
                .map(|track| track.audio_url.clone())
                .unwrap_or_default(),
        }
    }

    fn editor_mut(workspace: &mut AdminWorkspace) -> &mut Editor<Self> {
        &mut workspace.stations
    }
}

// ========================================
// Channels
// ========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelForm {
    pub name: String,
    pub logo_url: String,
    pub stream_url: String,
    pub category: String,
    /// "embed" (default when blank) or "hls"
    pub stream_type: String,
}

impl ChannelForm {
    fn details(&self) -> Result<ChannelDetails> {
        Ok(ChannelDetails {
            name: required("name", &self.name)?,
            logo_url: required("logoUrl", &self.logo_url)?,
            stream_url: required("streamUrl", &self.stream_url)?,
            category: required("category", &self.category)?,
            stream_kind: self.stream_type.parse::<StreamKind>()?,
        })
    }
}

impl AdminForm for ChannelForm {
    type Entity = Channel;

    fn to_draft(&self) -> Result<ChannelDetails> {
        self.details()
    }

    fn to_patch(&self) -> Result<ChannelDetails> {
        self.details()
    }

    fn from_record(record: &Channel) -> Self {
        let details = &record.details;
        Self {
            name: details.name.clone(),
            logo_url: details.logo_url.clone(),
            stream_url: details.stream_url.clone(),
            category: details.category.clone(),
            stream_type: match details.stream_kind {
                StreamKind::Embed => "embed".to_string(),
                StreamKind::Hls => "hls".to_string(),
            },
        }
    }

    fn editor_mut(workspace: &mut AdminWorkspace) -> &mut Editor<Self> {
        &mut workspace.channels
    }
}
