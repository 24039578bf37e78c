//! # Daily Refresh Pipeline
//!
//! A refresh runs in two phases:
//!
//! 1. **Compute** ([`compute`]): fetch sprite and metadata concurrently, decode
//!    and render the sprite on a blocking worker. Touches no shared state.
//! 2. **Hand back** ([`refresh`]): apply fallbacks, swap the finished
//!    [`CacheEntry`] into the [`DailyCache`], persist the metadata, and return
//!    the shared entry for display.
//!
//! Fetch and decode failures only degrade the result (no image, fallback
//! text). The only errors a refresh returns are invalid settings, which are
//! checked before any network work starts.

use crate::cache::{CacheEntry, DailyCache};
use crate::config::{Config, ConfigError};
use crate::daily::{self, SelectError};
use crate::dot_matrix::{self, DotMatrixParams, RenderError};
use crate::fallback;
use crate::pokeapi::PokemonSource;
use crate::state::StateStore;
use crate::PokemonInfo;
use chrono::NaiveDate;
use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

/// Invalid refresh settings.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a refresh needs besides its collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshSettings {
    /// Highest id in the daily rotation
    pub max_id: u32,
    /// Dot-matrix parameters
    pub params: DotMatrixParams,
    /// Nearest-neighbour scale applied after rendering
    pub output_scale: f32,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            max_id: daily::MAX_ID,
            params: DotMatrixParams::widget(),
            output_scale: 1.0,
        }
    }
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Result<Self, RefreshError> {
        Ok(Self {
            max_id: config.selection.max_id,
            params: config.render.params()?,
            output_scale: config.render.output_scale,
        })
    }

    /// Reject settings the selector or the transform would refuse.
    pub fn validate(&self) -> Result<(), RefreshError> {
        daily::check_max_id(self.max_id)?;
        dot_matrix::scaled_size(self.params.canvas_size()?, self.output_scale)?;
        Ok(())
    }
}

/// Result of the compute phase.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    /// Metadata, `None` when the fetch failed
    pub info: Option<PokemonInfo>,
    /// Rendered sprite, `None` when fetch, decode or render failed
    pub image: Option<Arc<RgbaImage>>,
}

/// Compute phase: fetch and render one Pokémon.
pub async fn compute<S: PokemonSource>(source: &S, pokemon_id: u32, settings: &RefreshSettings) -> Fetched {
    let (sprite, info) = tokio::join!(source.fetch_sprite(pokemon_id), source.fetch_info(pokemon_id));

    let image = match sprite {
        Ok(bytes) => render_sprite(bytes, settings.params, settings.output_scale).await,
        Err(e) => {
            log::warn!("Sprite fetch for #{} failed: {}", pokemon_id, e);
            None
        }
    };

    let info = info
        .map_err(|e| log::warn!("Metadata fetch for #{} failed: {}", pokemon_id, e))
        .ok();

    Fetched { info, image }
}

/// Decode and transform on a blocking worker.
async fn render_sprite(bytes: Vec<u8>, params: DotMatrixParams, output_scale: f32) -> Option<Arc<RgbaImage>> {
    let job = tokio::task::spawn_blocking(move || {
        let sprite = dot_matrix::decode_sprite(&bytes)?;
        dot_matrix::render_scaled(&sprite, &params, output_scale)
    });

    match job.await {
        Ok(Ok(image)) => Some(Arc::new(image)),
        Ok(Err(e)) => {
            log::warn!("Sprite render failed: {}", e);
            None
        }
        Err(e) => {
            log::warn!("Render worker failed: {}", e);
            None
        }
    }
}

/// Full refresh for `date`: reuse a valid cache entry or compute and hand back a new one.
pub async fn refresh<S: PokemonSource>(
    source: &S,
    cache: &DailyCache,
    store: &mut StateStore,
    date: NaiveDate,
    settings: &RefreshSettings,
) -> Result<Arc<CacheEntry>, RefreshError> {
    settings.validate()?;
    let pokemon_id = daily::select_id(date, settings.max_id)?;

    if let Some(entry) = cache.get_valid(date, pokemon_id) {
        log::debug!("Cache hit for {} (#{})", date, pokemon_id);
        return Ok(entry);
    }

    log::info!("Refreshing Pokémon of the day for {}: #{}", date, pokemon_id);
    let fetched = compute(source, pokemon_id, settings).await;

    let info = match fetched.info {
        Some(info) => {
            if let Err(e) = store.save_info(&info) {
                log::warn!("Could not persist Pokémon info: {}", e);
            }
            info
        }
        None => fallback::for_id(pokemon_id, &store.load_info()),
    };

    let entry = cache.store(CacheEntry {
        date,
        info,
        image: fetched.image,
    });
    log::info!(
        "Pokémon of the day: {} {} (image: {})",
        entry.info.number_label(),
        entry.info.name,
        if entry.image.is_some() { "yes" } else { "no" }
    );
    Ok(entry)
}
