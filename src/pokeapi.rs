//! # PokeAPI Sprite and Metadata Fetching
//!
//! This module handles all network operations of the widget. Every call is a
//! single unauthenticated GET with no retry; callers treat any error as "not
//! available" and fall back (see [`crate::fallback`]).
//!
//! ## Data Sources
//!
//! ### Sprites
//! - **URL**: `{sprite_base_url}/{id}.png`, by default the PokeAPI sprite
//!   repository on GitHub
//! - **Format**: 96×96 RGBA PNG
//!
//! ### Metadata
//! Two chained requests against the data API:
//! 1. `{api_base_url}/pokemon/{id}` for the name
//! 2. `{api_base_url}/pokemon-species/{id}` for the flavor text
//!
//! The description is the first English flavor-text entry, with the line
//! feeds and form feeds of the game text flattened to spaces.

use crate::config::ApiConfig;
use crate::PokemonInfo;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching sprites or metadata.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, or non-success status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("unexpected response: {0}")]
    Json(#[from] serde_json::Error),
}

/// The fetch capability the refresh pipeline depends on.
pub trait PokemonSource {
    /// Raw sprite bytes for a Pokédex number.
    fn fetch_sprite(&self, id: u32) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Display name and description for a Pokédex number.
    fn fetch_info(&self, id: u32) -> impl Future<Output = Result<PokemonInfo, FetchError>> + Send;
}

/// `GET /pokemon/{id}`, only the fields the widget reads.
#[derive(Debug, Deserialize)]
pub struct PokemonResponse {
    pub name: String,
}

/// `GET /pokemon-species/{id}`, only the fields the widget reads.
#[derive(Debug, Deserialize)]
pub struct SpeciesResponse {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
}

/// One localized flavor text.
#[derive(Debug, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// PokeAPI `{ name, url }` reference.
#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

/// HTTP client for the PokeAPI sprite repository and data API.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    sprite_base_url: String,
    api_base_url: String,
}

impl PokeApiClient {
    /// Build a client from the `[api]` configuration section.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pokemon-matrix-widget/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            sprite_base_url: config.sprite_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sprite URL for a Pokédex number.
    pub fn sprite_url(&self, id: u32) -> String {
        format!("{}/{}.png", self.sprite_base_url, id)
    }

    /// Basic entry URL, source of the name.
    pub fn pokemon_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}", self.api_base_url, id)
    }

    /// Species entry URL, source of the flavor text.
    pub fn species_url(&self, id: u32) -> String {
        format!("{}/pokemon-species/{}", self.api_base_url, id)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        log::debug!("GET {}", url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl PokemonSource for PokeApiClient {
    async fn fetch_sprite(&self, id: u32) -> Result<Vec<u8>, FetchError> {
        self.get_bytes(&self.sprite_url(id)).await
    }

    async fn fetch_info(&self, id: u32) -> Result<PokemonInfo, FetchError> {
        let pokemon = self.get_bytes(&self.pokemon_url(id)).await?;
        let species = self.get_bytes(&self.species_url(id)).await?;
        parse_info(id, &pokemon, &species)
    }
}

/// Build [`PokemonInfo`] from the basic and species response bodies.
pub fn parse_info(id: u32, pokemon_body: &[u8], species_body: &[u8]) -> Result<PokemonInfo, FetchError> {
    let pokemon: PokemonResponse = serde_json::from_slice(pokemon_body)?;
    let species: SpeciesResponse = serde_json::from_slice(species_body)?;
    Ok(PokemonInfo {
        id,
        name: display_name(&pokemon.name),
        description: english_flavor_text(&species),
    })
}

/// Upper-case the first character: `"pikachu"` → `"Pikachu"`.
pub fn display_name(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First English flavor text, normalized; empty when there is none.
pub fn english_flavor_text(species: &SpeciesResponse) -> String {
    species
        .flavor_text_entries
        .iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| normalize_flavor_text(&entry.flavor_text))
        .unwrap_or_default()
}

/// Replace the line feeds and form feeds embedded in game text with spaces.
pub fn normalize_flavor_text(text: &str) -> String {
    text.replace(['\n', '\u{000c}'], " ")
}
