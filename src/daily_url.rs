use std::fmt::{self, Display, Formatter};

use url::Url;

use crate::{calendar::ResolvedDate, error::Error};

pub const DEFAULT_SITE_ROOT: &str = "http://xn--jvrr89ebqs6yg.tokyo/";

/// Domain root of the restaurant site. Always an http(s) url with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRoot(Url);

impl SiteRoot {
    pub fn parse(s: &str) -> Result<Self, Error> {
        let url = Url::parse(s)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!("site root {url} is not http(s)")));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(Error::config(format!("site root {url} has no host")));
        }
        Ok(Self(url))
    }

    pub const fn url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Listing page for `date`, or `None` on weekends when nothing is posted.
    pub fn daily_url(&self, date: &ResolvedDate) -> Option<DailyUrl> {
        if date.is_weekend() {
            tracing::info!("It is the weekend");
            return None;
        }
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .expect("site root is a base url")
            .pop_if_empty()
            .extend([
                date.year().to_string(),
                format!("{:02}", date.month()),
                format!("{:02}", date.day()),
            ]);
        tracing::info!("Today's URL is {url}");
        Some(DailyUrl(url))
    }
}

impl Default for SiteRoot {
    fn default() -> Self {
        Self::parse(DEFAULT_SITE_ROOT).expect("default site root is valid")
    }
}

/// `<root>/YYYY/MM/DD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUrl(Url);

impl DailyUrl {
    pub const fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for DailyUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
