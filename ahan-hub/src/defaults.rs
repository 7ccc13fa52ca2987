//! Bundled default dataset used to seed empty collections

use ahan_common::models::{
    Channel, ChannelDetails, MediaDetails, MediaEntry, Recitation, Station, StationDetails,
};
use ahan_common::{Entity, Error, Result};
use serde::Deserialize;

const BUNDLED_DEFAULTS: &str = include_str!("../data/defaults.json");

/// Seed payloads for all four collections. Store-assigned ids are absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefaultDataset {
    pub recitations: Vec<Recitation>,
    pub media: Vec<MediaDetails>,
    pub stations: Vec<StationDetails>,
    pub channels: Vec<ChannelDetails>,
}

impl DefaultDataset {
    /// Parse the dataset compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_DEFAULTS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json)
            .map_err(|e| Error::Internal(format!("Invalid default dataset: {}", e)))?;

        if let Some(station) = dataset.stations.iter().find(|s| s.tracks.is_empty()) {
            return Err(Error::Internal(format!(
                "Default station '{}' has no tracks",
                station.name
            )));
        }

        Ok(dataset)
    }
}

/// Entities that have a slice of the default dataset
pub trait Seeded: Entity {
    fn defaults(dataset: &DefaultDataset) -> Vec<Self::Draft>;
}

impl Seeded for Recitation {
    fn defaults(dataset: &DefaultDataset) -> Vec<Recitation> {
        dataset.recitations.clone()
    }
}

impl Seeded for MediaEntry {
    fn defaults(dataset: &DefaultDataset) -> Vec<MediaDetails> {
        dataset.media.clone()
    }
}

impl Seeded for Station {
    fn defaults(dataset: &DefaultDataset) -> Vec<StationDetails> {
        dataset.stations.clone()
    }
}

impl Seeded for Channel {
    fn defaults(dataset: &DefaultDataset) -> Vec<ChannelDetails> {
        dataset.channels.clone()
    }
}
