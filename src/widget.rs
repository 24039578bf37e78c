//! # Widget Host
//!
//! The home-screen side of the widget: which page each instance shows, what
//! is on that page, and how taps and scheduled updates change it.
//!
//! - **Full update** ([`update_widgets`]): refresh today's Pokémon (cache first),
//!   then compose each instance's current page.
//! - **Tap** ([`handle_tap`]): move one instance to the next or previous page.
//!   Taps never touch the network; the image is shown only if the cache is
//!   valid for today, and the text comes from the persisted state.

use crate::cache::DailyCache;
use crate::fallback;
use crate::pager::{Page, Tap};
use crate::pokeapi::PokemonSource;
use crate::refresh::{self, RefreshError, RefreshSettings};
use crate::state::StateStore;
use crate::PokemonInfo;
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};
use std::sync::Arc;

/// Colour of the current page's indicator dot.
pub const ACTIVE_DOT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// Colour of the other indicator dots, `0x55FFFFFF`.
pub const INACTIVE_DOT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0x55]);

/// Everything one widget instance displays.
#[derive(Debug, Clone)]
pub struct WidgetView {
    pub widget_id: u32,
    pub page: Page,
    /// Dot-matrix sprite, only meaningful on the image page
    pub image: Option<Arc<RgbaImage>>,
    /// Upper-cased name
    pub name: String,
    /// `#` and the zero-padded Pokédex number
    pub number: String,
    pub description: String,
}

impl WidgetView {
    pub fn compose(
        widget_id: u32,
        page: Page,
        info: &PokemonInfo,
        image: Option<Arc<RgbaImage>>,
    ) -> Self {
        Self {
            widget_id,
            page,
            image,
            name: info.name.to_uppercase(),
            number: info.number_label(),
            description: info.description.clone(),
        }
    }

    /// Indicator colours for the three pages, current page highlighted.
    pub fn page_dots(&self) -> [Rgba<u8>; 3] {
        Page::ALL.map(|page| {
            if page == self.page {
                ACTIVE_DOT
            } else {
                INACTIVE_DOT
            }
        })
    }
}

/// Full update of the given widget instances.
pub async fn update_widgets<S: PokemonSource>(
    source: &S,
    cache: &DailyCache,
    store: &mut StateStore,
    today: NaiveDate,
    settings: &RefreshSettings,
    widget_ids: &[u32],
) -> Result<Vec<WidgetView>, RefreshError> {
    let entry = refresh::refresh(source, cache, store, today, settings).await?;

    Ok(widget_ids
        .iter()
        .map(|&widget_id| {
            WidgetView::compose(widget_id, store.page(widget_id), &entry.info, entry.image.clone())
        })
        .collect())
}

/// Advance or rewind one widget instance and compose its new page.
pub fn handle_tap(
    cache: &DailyCache,
    store: &mut StateStore,
    widget_id: u32,
    tap: Tap,
    today: NaiveDate,
    today_id: u32,
) -> WidgetView {
    let image = cache
        .get_valid(today, today_id)
        .and_then(|entry| entry.image.clone());
    let info = fallback::from_saved(&store.load_info(), today_id);

    let page = store.page(widget_id).after(tap);
    if let Err(e) = store.set_page(widget_id, page) {
        log::warn!("Could not persist page for widget {}: {}", widget_id, e);
    }
    log::debug!("Widget {} now on {:?}", widget_id, page);

    WidgetView::compose(widget_id, page, &info, image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mew() -> PokemonInfo {
        PokemonInfo {
            id: 151,
            name: "Mew".to_string(),
            description: "So rare that it is still said to be a mirage.".to_string(),
        }
    }

    #[test]
    fn test_compose_formats_text() {
        let view = WidgetView::compose(4, Page::Name, &mew(), None);
        assert_eq!(view.name, "MEW");
        assert_eq!(view.number, "#151");
        assert_eq!(view.widget_id, 4);

        let small = PokemonInfo { id: 7, ..mew() };
        assert_eq!(WidgetView::compose(4, Page::Name, &small, None).number, "#007");
        let large = PokemonInfo { id: 1025, ..mew() };
        assert_eq!(WidgetView::compose(4, Page::Name, &large, None).number, "#1025");
    }

    #[test]
    fn test_page_dots_follow_page() {
        let dots = WidgetView::compose(1, Page::Image, &mew(), None).page_dots();
        assert_eq!(dots, [ACTIVE_DOT, INACTIVE_DOT, INACTIVE_DOT]);
        let dots = WidgetView::compose(1, Page::Description, &mew(), None).page_dots();
        assert_eq!(dots, [INACTIVE_DOT, INACTIVE_DOT, ACTIVE_DOT]);
    }
}
