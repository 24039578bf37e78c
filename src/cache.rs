//! # Daily Render Cache
//!
//! Holds the result of the most recent refresh so that taps and repeated
//! updates on the same day skip the network and the transform.
//!
//! The cache is an ordinary value owned by the host and passed to whoever
//! needs it. Entries are immutable and shared through `Arc`; a refresh builds a
//! complete [`CacheEntry`] first and then swaps it in under a write lock, so a
//! reader sees either the old entry or the new one, never a mix.

use crate::PokemonInfo;
use chrono::NaiveDate;
use image::RgbaImage;
use std::sync::{Arc, PoisonError, RwLock};

/// One day's rendered Pokémon.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Calendar date the entry was computed for
    pub date: NaiveDate,
    /// Name, number and description
    pub info: PokemonInfo,
    /// Dot-matrix image, absent when the sprite could not be fetched or decoded
    pub image: Option<Arc<RgbaImage>>,
}

impl CacheEntry {
    /// Valid only for the same day, the same id, and with an image present.
    pub fn is_valid_for(&self, today: NaiveDate, pokemon_id: u32) -> bool {
        self.date == today && self.info.id == pokemon_id && self.image.is_some()
    }
}

/// Single-entry cache scoped to the host's lifetime.
#[derive(Debug, Default)]
pub struct DailyCache {
    entry: RwLock<Option<Arc<CacheEntry>>>,
}

impl DailyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current entry if it is valid for `(today, pokemon_id)`.
    pub fn get_valid(&self, today: NaiveDate, pokemon_id: u32) -> Option<Arc<CacheEntry>> {
        self.current()
            .filter(|entry| entry.is_valid_for(today, pokemon_id))
    }

    /// The current entry regardless of validity.
    pub fn current(&self) -> Option<Arc<CacheEntry>> {
        // A panicking writer cannot leave a half-built entry behind, so a
        // poisoned lock still holds a consistent value.
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the entry, returning the shared handle to the new one.
    pub fn store(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&entry));
        entry
    }
}
