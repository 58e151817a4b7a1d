//! One scrape-compose-send run.
//!
//! Stages run strictly in order and nothing is shared between runs: every run
//! gets its own [`Fetcher`] and politeness state.

use std::fmt::{self, Display, Formatter};

use tracing::{info_span, Instrument};

use crate::{
    calendar::ResolvedDate,
    daily_url::{DailyUrl, SiteRoot},
    error::Result,
    fetch::Fetcher,
    notify::{Template, Webhook},
    parse::{find_daily_menu_link, MenuContent},
};

/// How a run ended. Only [`Outcome::Published`] attempted a delivery.
#[derive(Debug)]
pub enum Outcome {
    NoContentExpected,
    MenuNotFound(DailyUrl),
    Published {
        body_text: String,
        delivery: Result<()>,
    },
}

impl Outcome {
    /// What the trigger answers: the body text, or why nothing was posted.
    pub fn response_text(&self) -> String {
        match self {
            Self::Published { body_text, .. } => body_text.clone(),
            other => format!("No posting: {other}"),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContentExpected => write!(f, "no lunch on the weekend"),
            Self::MenuNotFound(daily) => write!(f, "no lunch menu URL was found on {daily}"),
            Self::Published { delivery: Ok(()), .. } => write!(f, "menu posted"),
            Self::Published {
                delivery: Err(e), ..
            } => write!(f, "menu scraped but not delivered: {e}"),
        }
    }
}

pub struct Pipeline<'a> {
    site: &'a SiteRoot,
    template: &'a Template,
    fetcher: Fetcher,
    webhook: &'a Webhook,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        site: &'a SiteRoot,
        template: &'a Template,
        fetcher: Fetcher,
        webhook: &'a Webhook,
    ) -> Self {
        Self {
            site,
            template,
            fetcher,
            webhook,
        }
    }

    /// Errors only when a page can't be fetched. A failed delivery is part of
    /// the [`Outcome`], not an error of the run.
    pub async fn run(&self, date: &ResolvedDate) -> Result<Outcome> {
        let span = info_span!("run", date = %date.instant().date_naive());
        self.run_inner(date).instrument(span).await
    }

    async fn run_inner(&self, date: &ResolvedDate) -> Result<Outcome> {
        let Some(daily) = self.site.daily_url(date) else {
            tracing::info!("No posting: no lunch on the weekend");
            return Ok(Outcome::NoContentExpected);
        };

        tracing::info!("Get article data from {}", self.fetcher.allowed_host());
        let listing = self.fetcher.visit(daily.url()).await?;
        let Some(menu_ref) = find_daily_menu_link(&listing, &daily) else {
            tracing::info!("No posting: no lunch menu URL was found");
            return Ok(Outcome::MenuNotFound(daily));
        };

        let menu_page = self.fetcher.visit(menu_ref.url()).await?;
        let menu = MenuContent::from_page(&menu_page);
        let body_text = menu.body_text.clone();

        let document = self.template.compose(date, menu, menu_ref.url());
        tracing::info!("Post a message for {}", document.pre_text);
        let delivery = self.webhook.send(&document).await;
        if let Err(e) = &delivery {
            tracing::error!("error: {e}");
        }

        Ok(Outcome::Published {
            body_text,
            delivery,
        })
    }
}
