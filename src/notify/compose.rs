use url::Url;

use crate::{calendar::ResolvedDate, parse::MenuContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Primary,
    Danger,
}

impl ActionStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub url: String,
    pub style: ActionStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub link: String,
    pub icon: String,
}

/// Everything one webhook message says, independent of the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDocument {
    pub pre_text: String,
    pub title: String,
    pub title_link: String,
    pub body_text: String,
    pub image_url: String,
    pub author: Author,
    pub primary_action: Action,
    pub secondary_action: Option<Action>,
    pub footer: String,
    pub color: String,
    pub timestamp: i64,
}

impl NotificationDocument {
    /// Buttons in display order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        std::iter::once(&self.primary_action).chain(self.secondary_action.as_ref())
    }

    /// Plain-text summary for clients that can't render attachments.
    pub fn fallback(&self) -> String {
        format!("{} {}", self.pre_text, self.title)
    }
}

/// Fixed wording and branding of the message.
#[derive(Debug, Clone)]
pub struct Template {
    pub color: String,
    pub footer: String,
    pub pre_text_suffix: String,
    pub author: Author,
    pub primary_label: String,
    pub secondary_label: String,
    pub secondary_url: Option<Url>,
    /// Last weekday (Sun=0..Sat=6) the secondary action is offered on.
    pub secondary_last_weekday: u32,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            color: "#36a64f".into(),
            footer: "税込800円 11:00-14:00".into(),
            pre_text_suffix: "のランチです！".into(),
            author: Author {
                name: "フェアビンデン GO!".into(),
                link: crate::daily_url::DEFAULT_SITE_ROOT.into(),
                icon: "http://flickr.com/icons/bobby.jpg".into(),
            },
            primary_label: "今日のランチ🍚".into(),
            secondary_label: "やっぱり会社の弁当🍱".into(),
            secondary_url: None,
            secondary_last_weekday: 4,
        }
    }
}

impl Template {
    /// Points the author link at the site the menu comes from.
    #[must_use]
    pub fn with_site(mut self, site: &crate::daily_url::SiteRoot) -> Self {
        self.author.link = site.url().to_string();
        self
    }

    pub fn compose(
        &self,
        date: &ResolvedDate,
        menu: MenuContent,
        menu_url: &Url,
    ) -> NotificationDocument {
        let secondary_action = if date.weekday_index() <= self.secondary_last_weekday {
            self.secondary_url.as_ref().map(|url| Action {
                label: self.secondary_label.clone(),
                url: url.to_string(),
                style: ActionStyle::Danger,
            })
        } else {
            None
        };
        if secondary_action.is_none() {
            tracing::info!("No secondary action on {}", date.weekday());
        }

        NotificationDocument {
            pre_text: format!("{}{}", date.japanese(), self.pre_text_suffix),
            title: menu.title,
            title_link: menu_url.to_string(),
            body_text: menu.body_text,
            image_url: menu.image_url,
            author: self.author.clone(),
            primary_action: Action {
                label: self.primary_label.clone(),
                url: menu_url.to_string(),
                style: ActionStyle::Primary,
            },
            secondary_action,
            footer: self.footer.clone(),
            color: self.color.clone(),
            timestamp: date.timestamp(),
        }
    }
}
