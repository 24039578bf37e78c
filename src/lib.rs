//! # Pokémon Matrix Widget Core Library
//!
//! This library provides the building blocks of the "Pokémon of the day" widget:
//! a deterministic daily selection, a dot-matrix re-rendering of the day's sprite,
//! and the small amount of host-side plumbing (fetching, caching, page state) that
//! a home-screen widget needs around them.
//!
//! ## Design Philosophy
//!
//! ### Pure Core
//! - **[`daily`]**: maps a calendar date to a Pokédex number. No I/O, no clock reads
//!   beyond the date it is handed, no hidden seed.
//! - **[`dot_matrix`]**: maps a sprite to a dot-matrix image. Output size depends only
//!   on the grid and cell parameters, never on the source size.
//!
//! Both are safe to call from any thread; neither owns shared state.
//!
//! ### Host Collaborators
//! - **[`pokeapi`]**: sprite and metadata fetching behind the [`pokeapi::PokemonSource`] trait
//! - **[`cache`]**: explicit one-entry daily cache, swapped atomically
//! - **[`state`]**: small durable key-value store (page index, last rendered info)
//! - **[`pager`]**: the three-page tap state machine
//! - **[`refresh`]**: two-phase compute/hand-back pipeline
//! - **[`widget`]**: view composition and tap handling
//! - **[`renderer`]**: widget faces drawn with embedded-graphics, plus an ASCII preview
//!
//! ### Data Flow
//! 1. **Select**: `daily::select_id(today, MAX_ID)`
//! 2. **Fetch**: sprite bytes + name/description for that id
//! 3. **Render**: `dot_matrix::render` on a blocking worker
//! 4. **Hand back**: an immutable [`cache::CacheEntry`] is swapped into the cache and
//!    the widget face is composed from it
//!
//! Any fetch failure degrades to the values in [`fallback`]; nothing in the
//! pipeline is fatal to the host.

use serde::{Deserialize, Serialize};

// Module declarations
pub mod cache;
pub mod config;
pub mod daily;
pub mod dot_matrix;
pub mod fallback;
pub mod pager;
pub mod pokeapi;
pub mod refresh;
pub mod renderer;
pub mod state;
pub mod widget;

/// Name and description of a single Pokémon, keyed by its Pokédex number.
///
/// `name` is display-cased (`"pikachu"` → `"Pikachu"`), `description` is the
/// first English flavor text with line and form feeds flattened to spaces.
///
/// # Example
/// ```
/// use pokemon_matrix_lib::PokemonInfo;
///
/// let info = PokemonInfo {
///     id: 25,
///     name: "Pikachu".to_string(),
///     description: "When several of these POKéMON gather...".to_string(),
/// };
///
/// assert_eq!(info.number_label(), "#025");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonInfo {
    /// Pokédex number
    pub id: u32,
    /// Display name
    pub name: String,
    /// Flavor text, may be empty
    pub description: String,
}

impl PokemonInfo {
    /// `#` followed by the id zero-padded to three digits (`#007`, `#151`, `#1025`).
    pub fn number_label(&self) -> String {
        format!("#{:03}", self.id)
    }
}
