//! Selector driven extraction from the restaurant's listing and menu pages.
//!
//! Every extraction follows the same shape: apply one selector to a parsed
//! page and hand the matches to a collector. A selector that matches nothing
//! is never an error, the collector decides what "nothing" means.
mod listing_page;
mod menu_page;
mod static_selector;

use scraper::{element_ref::Select, ElementRef, Html};
use url::Url;

pub use listing_page::find_daily_menu_link;
pub use menu_page::MenuContent;
pub use static_selector::StaticSelector;

/// A fetched page, kept as text so it can be held across await points.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: String,
}

impl Page {
    pub const fn new(url: Url, body: String) -> Self {
        Self { url, body }
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[cfg(test)]
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Applies `selector` to `document` and lets `collect` turn the matches into a value.
pub fn select_with<'a, 'b, T>(
    document: &'a Html,
    selector: &'b StaticSelector,
    collect: impl FnOnce(Select<'a, 'b>) -> T,
) -> T {
    tracing::trace!(selector = selector.css(), "selecting");
    collect(document.root_element().select(selector))
}

/// All text below `element`, in document order.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
