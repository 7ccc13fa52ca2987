//! Catalog snapshot and the pure mutation reducer

use ahan_common::models::{Channel, MediaEntry, Recitation, Station};
use ahan_common::Entity;
use serde::Serialize;

/// In-memory mirror of all four collections
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    pub recitations: Vec<Recitation>,
    pub media: Vec<MediaEntry>,
    pub stations: Vec<Station>,
    pub channels: Vec<Channel>,
}

/// A confirmed change to one collection
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<E: Entity> {
    /// Replace the whole collection with what the store returned
    Loaded(Vec<E>),
    Created(E),
    Updated(E),
    Deleted(E::Id),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationEvent {
    Recitation(Mutation<Recitation>),
    Media(Mutation<MediaEntry>),
    Station(Mutation<Station>),
    Channel(Mutation<Channel>),
}

/// Compute the next snapshot. Never touches a store.
pub fn apply(current: &CatalogSnapshot, event: MutationEvent) -> CatalogSnapshot {
    let mut next = current.clone();
    match event {
        MutationEvent::Recitation(mutation) => reduce(&mut next.recitations, mutation),
        MutationEvent::Media(mutation) => reduce(&mut next.media, mutation),
        MutationEvent::Station(mutation) => reduce(&mut next.stations, mutation),
        MutationEvent::Channel(mutation) => reduce(&mut next.channels, mutation),
    }
    next
}

fn reduce<E: Entity>(records: &mut Vec<E>, mutation: Mutation<E>) {
    match mutation {
        Mutation::Loaded(loaded) => {
            *records = loaded;
            sort_keyed(records);
        }
        Mutation::Created(record) => {
            // Identifiers stay unique even if a create is reflected twice
            records.retain(|existing| existing.id() != record.id());
            records.insert(0, record);
            sort_keyed(records);
        }
        Mutation::Updated(record) => {
            // A record deleted while the update was in flight stays deleted
            if let Some(slot) = records.iter_mut().find(|existing| existing.id() == record.id()) {
                *slot = record;
            }
        }
        Mutation::Deleted(id) => {
            records.retain(|existing| existing.id() != &id);
        }
    }
}

/// Collections with a sort key are kept in key order; stable, so head
/// insertion still decides among equal keys.
fn sort_keyed<E: Entity>(records: &mut [E]) {
    if records.iter().any(|record| record.sort_key().is_some()) {
        records.sort_by_key(|record| record.sort_key());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahan_common::models::{MediaDetails, RecitationDetails};

    fn recitation(number: u32) -> Recitation {
        Recitation {
            number,
            details: RecitationDetails {
                name: format!("Surah {}", number),
                english_name: format!("Surah {}", number),
                audio_url: format!("https://example.com/{:03}.mp3", number),
                ..Default::default()
            },
        }
    }

    fn media(id: &str, title: &str) -> MediaEntry {
        MediaEntry {
            id: id.to_string(),
            details: MediaDetails {
                title: title.to_string(),
                ..Default::default()
            },
        }
    }

    fn with_media(entries: Vec<MediaEntry>) -> CatalogSnapshot {
        CatalogSnapshot {
            media: entries,
            ..Default::default()
        }
    }

    #[test]
    fn test_created_media_goes_to_head() {
        let current = with_media(vec![media("a", "A"), media("b", "B")]);
        let next = apply(&current, MutationEvent::Media(Mutation::Created(media("c", "C"))));

        let ids: Vec<&str> = next.media.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(next.media.len(), current.media.len() + 1);
    }

    #[test]
    fn test_created_recitation_is_resorted() {
        let current = CatalogSnapshot {
            recitations: vec![recitation(1), recitation(3)],
            ..Default::default()
        };
        let next = apply(
            &current,
            MutationEvent::Recitation(Mutation::Created(recitation(2))),
        );

        let numbers: Vec<u32> = next.recitations.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_updated_replaces_in_place() {
        let current = with_media(vec![media("a", "A"), media("b", "B"), media("c", "C")]);
        let next = apply(
            &current,
            MutationEvent::Media(Mutation::Updated(media("b", "B2"))),
        );

        assert_eq!(next.media.len(), 3);
        assert_eq!(next.media[1], media("b", "B2"));
        assert_eq!(next.media[0], current.media[0]);
        assert_eq!(next.media[2], current.media[2]);
    }

    #[test]
    fn test_updated_unknown_id_is_ignored() {
        let current = with_media(vec![media("a", "A")]);
        let next = apply(
            &current,
            MutationEvent::Media(Mutation::Updated(media("zzz", "Ghost"))),
        );
        assert_eq!(next, current);
    }

    #[test]
    fn test_deleted_removes_exactly_one() {
        let current = with_media(vec![media("a", "A"), media("b", "B")]);
        let next = apply(
            &current,
            MutationEvent::Media(Mutation::Deleted("a".to_string())),
        );

        assert_eq!(next.media.len(), 1);
        assert!(next.media.iter().all(|m| m.id != "a"));
    }

    #[test]
    fn test_loaded_replaces_and_sorts() {
        let current = CatalogSnapshot {
            recitations: vec![recitation(9)],
            ..Default::default()
        };
        let next = apply(
            &current,
            MutationEvent::Recitation(Mutation::Loaded(vec![recitation(4), recitation(2)])),
        );

        let numbers: Vec<u32> = next.recitations.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_apply_leaves_other_collections_alone() {
        let current = CatalogSnapshot {
            recitations: vec![recitation(1)],
            media: vec![media("a", "A")],
            ..Default::default()
        };
        let next = apply(
            &current,
            MutationEvent::Media(Mutation::Deleted("a".to_string())),
        );
        assert_eq!(next.recitations, current.recitations);
    }
}
