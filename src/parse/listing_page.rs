use url::Url;

use super::{select_with, Page};
use crate::{daily_url::DailyUrl, static_selector};

/// Article page holding one day's menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuPageRef(Url);

impl MenuPageRef {
    pub const fn url(&self) -> &Url {
        &self.0
    }
}

/// Scans the entry headings of a listing page for the first one whose link
/// points below `daily`. Only the first anchor of a heading is its entry link.
/// `None` means nothing was posted for that day.
pub fn find_daily_menu_link(listing: &Page, daily: &DailyUrl) -> Option<MenuPageRef> {
    static_selector!(ENTRY_HEADING_SELECTOR <- "h3.title");
    static_selector!(ANCHOR_SELECTOR <- "a");
    let document = listing.document();
    let link = select_with(&document, &ENTRY_HEADING_SELECTOR, |mut headings| {
        headings.find_map(|heading| {
            let anchor = heading.select(&ANCHOR_SELECTOR).next()?;
            let href = anchor.attr("href")?;
            let url = listing.url().join(href).ok()?;
            url.as_str().contains(daily.as_str()).then_some(url)
        })
    });
    tracing::info!(
        "Daily menu URL is {}",
        link.as_ref().map_or("<none>", Url::as_str)
    );
    link.map(MenuPageRef)
}
