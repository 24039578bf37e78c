//! # Offline Fallback Values
//!
//! When the metadata fetch fails the widget still has to show something. The
//! order of preference is:
//!
//! 1. The persisted name and description, if they belong to the requested id
//! 2. `"Unknown"` with an empty description
//!
//! A missing sprite has no fallback image; the image page shows a placeholder
//! until the next successful refresh.

use crate::state::SavedInfo;
use crate::PokemonInfo;

/// Name shown when nothing is known about the Pokémon.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder info for `id`.
pub fn unknown(id: u32) -> PokemonInfo {
    PokemonInfo {
        id,
        name: UNKNOWN_NAME.to_string(),
        description: String::new(),
    }
}

/// Persisted info when it is for `id`, otherwise [`unknown`].
pub fn for_id(id: u32, saved: &SavedInfo) -> PokemonInfo {
    if saved.id == Some(id) {
        PokemonInfo {
            id,
            name: saved.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            description: saved.description.clone().unwrap_or_default(),
        }
    } else {
        unknown(id)
    }
}

/// Whatever was persisted last, filling gaps with `today_id`, `"Unknown"` and `""`.
///
/// Used by taps, which never fetch and so show the last refreshed text even
/// if it is from a previous day.
pub fn from_saved(saved: &SavedInfo, today_id: u32) -> PokemonInfo {
    PokemonInfo {
        id: saved.id.unwrap_or(today_id),
        name: saved.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        description: saved.description.clone().unwrap_or_default(),
    }
}
