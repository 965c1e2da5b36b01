use crate::core::text::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};

/// Placeholder for a field none of the strategies could fill.
pub const NOT_AVAILABLE: &str = "N/A";

/// One way of pulling a field out of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Collapsed text of the first element matching the selector.
    Text(&'static str),
    /// Attribute value of the first element matching the selector.
    Attr(&'static str, &'static str),
}

impl Strategy {
    fn apply(&self, card: &ElementRef<'_>) -> Option<String> {
        let (css, attr) = match self {
            Strategy::Text(css) => (css, None),
            Strategy::Attr(css, attr) => (css, Some(*attr)),
        };
        let selector = Selector::parse(css).ok()?;
        let element = card.select(&selector).next()?;

        let value = match attr {
            Some(attr) => collapse_whitespace(element.value().attr(attr)?),
            None => collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")),
        };
        (!value.is_empty()).then_some(value)
    }
}

/// Card fields as extracted, before validation and link normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub link: String,
}

impl RawCard {
    pub fn has_valid_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty() && title != NOT_AVAILABLE
    }
}

/// Selector data for one listing site. Every list is tried in order.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub results: &'static [&'static str],
    pub cards: &'static [&'static str],
    pub title: &'static [Strategy],
    pub company: &'static [Strategy],
    pub location: &'static [Strategy],
    pub link: &'static [Strategy],
    pub description: &'static [&'static str],
    pub auto_scroll: bool,
    pub filter_by_location: bool,
}

impl SiteProfile {
    /// Selector group matching any results container.
    pub fn results_selector(&self) -> String {
        self.results.join(", ")
    }

    /// Extracts up to `limit` cards using the first card selector that matches anything.
    pub fn extract_cards(&self, html: &str, limit: usize) -> Vec<RawCard> {
        let document = Html::parse_document(html);

        for css in self.cards {
            let Ok(selector) = Selector::parse(css) else {
                continue;
            };
            let cards: Vec<RawCard> = document
                .select(&selector)
                .take(limit)
                .map(|card| RawCard {
                    title: first_match(&card, self.title),
                    company: first_match(&card, self.company),
                    location: first_match(&card, self.location),
                    link: first_match(&card, self.link),
                })
                .collect();
            if !cards.is_empty() {
                return cards;
            }
        }
        Vec::new()
    }
}

fn first_match(card: &ElementRef<'_>, strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy.apply(card))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Whether a card's location is relevant for the accepted list.
///
/// Unknown locations and remote work are always accepted, as is everything when
/// no locations are configured.
pub fn location_accepted(location: &str, accepted: &[String]) -> bool {
    let location = location.trim().to_lowercase();
    if location.is_empty() || location == "n/a" || location == "unknown" {
        return true;
    }
    if location.contains("remote") || location.contains("work from home") {
        return true;
    }
    let mut places = accepted
        .iter()
        .map(|place| place.trim().to_lowercase())
        .filter(|place| !place.is_empty())
        .peekable();
    places.peek().is_none() || places.any(|place| location.contains(&place))
}
