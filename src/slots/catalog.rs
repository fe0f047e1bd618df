//! Game catalog and its paginated inline keyboard

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::t_lang;

/// Games offered by the slot bot, in menu order
pub const GAMES: &[&str] = &[
    "Sweet Bonanza",
    "Gates of Olympus",
    "Sugar Rush",
    "Big Bass Bonanza",
    "The Dog House",
    "Starlight Princess",
    "Wanted Dead or a Wild",
    "Book of Dead",
    "Razor Shark",
    "Fruit Party",
    "Wild West Gold",
    "Madame Destiny Megaways",
    "Money Train 3",
    "Mental",
    "Zeus vs Hades",
    "Dog House Megaways",
    "Gems Bonanza",
    "Chaos Crew",
];

pub const GAMES_PER_PAGE: usize = 6;

const PAGE_CALLBACK_PREFIX: &str = "slots_page:";
const GAME_CALLBACK_PREFIX: &str = "slots_game:";

/// A decoded button press on the catalog keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    Page(usize),
    Game(usize),
}

/// Number of catalog pages
pub fn page_count() -> usize {
    GAMES.len().div_ceil(GAMES_PER_PAGE).max(1)
}

/// Clamp a page number into the catalog range
pub fn clamp_page(page: usize) -> usize {
    page.min(page_count() - 1)
}

/// Games on one page with their catalog indices
pub fn games_on_page(page: usize) -> impl Iterator<Item = (usize, &'static str)> {
    let start = clamp_page(page) * GAMES_PER_PAGE;
    GAMES
        .iter()
        .copied()
        .enumerate()
        .skip(start)
        .take(GAMES_PER_PAGE)
}

/// Keyboard with one button per game and a navigation row
pub fn create_catalog_keyboard(page: usize, language_code: Option<&str>) -> InlineKeyboardMarkup {
    let page = clamp_page(page);

    let mut rows: Vec<Vec<InlineKeyboardButton>> = games_on_page(page)
        .map(|(index, game)| {
            vec![InlineKeyboardButton::callback(
                format!("🎰 {game}"),
                format!("{GAME_CALLBACK_PREFIX}{index}"),
            )]
        })
        .collect();

    let mut navigation = Vec::new();
    if page > 0 {
        navigation.push(InlineKeyboardButton::callback(
            t_lang("slots-prev", language_code),
            format!("{PAGE_CALLBACK_PREFIX}{}", page - 1),
        ));
    }
    if page + 1 < page_count() {
        navigation.push(InlineKeyboardButton::callback(
            t_lang("slots-next", language_code),
            format!("{PAGE_CALLBACK_PREFIX}{}", page + 1),
        ));
    }
    if !navigation.is_empty() {
        rows.push(navigation);
    }

    InlineKeyboardMarkup::new(rows)
}

/// Decode catalog callback data, rejecting out-of-range values
pub fn parse_catalog_callback(data: &str) -> Option<CatalogAction> {
    if let Some(raw) = data.strip_prefix(PAGE_CALLBACK_PREFIX) {
        return raw
            .parse::<usize>()
            .ok()
            .filter(|page| *page < page_count())
            .map(CatalogAction::Page);
    }
    data.strip_prefix(GAME_CALLBACK_PREFIX)
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|index| *index < GAMES.len())
        .map(CatalogAction::Game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_page_has_only_next() {
        let data = callback_data(&create_catalog_keyboard(0, Some("en")));
        assert_eq!(data.len(), GAMES_PER_PAGE + 1);
        assert_eq!(data.first().map(String::as_str), Some("slots_game:0"));
        assert_eq!(data.last().map(String::as_str), Some("slots_page:1"));
    }

    #[test]
    fn test_last_page_has_only_prev() {
        let last = page_count() - 1;
        let data = callback_data(&create_catalog_keyboard(last, Some("en")));
        assert_eq!(data.last(), Some(&format!("slots_page:{}", last - 1)));
        assert!(!data.contains(&format!("slots_page:{}", last + 1)));
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(parse_catalog_callback("slots_page:1"), Some(CatalogAction::Page(1)));
        assert_eq!(parse_catalog_callback("slots_game:5"), Some(CatalogAction::Game(5)));
        assert_eq!(parse_catalog_callback("slots_game:999"), None);
        assert_eq!(parse_catalog_callback("slots_page:99"), None);
        assert_eq!(parse_catalog_callback("q:720"), None);
    }
}
