//! Catalog entity abstraction
//!
//! Every catalog collection (recitations, media, stations, channels) is one
//! `Entity` type. Stores, seeding, the catalog mirror and the admin editors are
//! all generic over it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// One of the four catalog collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Recitation,
    Media,
    Station,
    Channel,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Recitation,
        EntityKind::Media,
        EntityKind::Station,
        EntityKind::Channel,
    ];

    /// Collection name in the document store and in URL paths
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Recitation => "recitations",
            EntityKind::Media => "media",
            EntityKind::Station => "stations",
            EntityKind::Channel => "channels",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for EntityKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == s)
            .ok_or_else(|| crate::Error::NotFound(format!("collection '{}'", s)))
    }
}

/// A record type stored in one catalog collection
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Identifier; rendered with `Display` as the document key
    type Id: Clone + Debug + PartialEq + Display + FromStr + Send + Sync + 'static;

    /// Payload for `create`
    type Draft: Clone + Debug + Send + Sync + 'static;

    /// Payload for `update`; never carries the identifier
    type Patch: Clone + Debug + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Identifier for a new record. Caller-supplied ids come from the draft,
    /// store-assigned ids are generated here.
    fn assign_id(draft: &Self::Draft) -> Self::Id;

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Listing order key. `None` means insertion order.
    fn sort_key(&self) -> Option<i64> {
        None
    }

    /// Parse an identifier from a URL path segment
    fn parse_id(raw: &str) -> Option<Self::Id> {
        raw.parse().ok()
    }
}
