//! Slack compatible incoming-webhook json.
use serde::Serialize;

use super::compose::{Action, NotificationDocument};

#[derive(Debug, Serialize)]
pub struct Payload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<&'a str>,
    pub attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Attachment<'a> {
    pub fallback: String,
    pub color: &'a str,
    pub pretext: &'a str,
    pub author_name: &'a str,
    pub author_link: &'a str,
    pub author_icon: &'a str,
    pub title: &'a str,
    pub title_link: &'a str,
    pub text: &'a str,
    pub image_url: &'a str,
    pub footer: &'a str,
    pub ts: i64,
    pub actions: Vec<Button<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Button<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub url: &'a str,
    pub style: &'static str,
}

impl<'a> From<&'a Action> for Button<'a> {
    fn from(action: &'a Action) -> Self {
        Self {
            kind: "button",
            text: &action.label,
            url: &action.url,
            style: action.style.as_str(),
        }
    }
}

impl<'a> From<&'a NotificationDocument> for Attachment<'a> {
    fn from(doc: &'a NotificationDocument) -> Self {
        Self {
            fallback: doc.fallback(),
            color: &doc.color,
            pretext: &doc.pre_text,
            author_name: &doc.author.name,
            author_link: &doc.author.link,
            author_icon: &doc.author.icon,
            title: &doc.title,
            title_link: &doc.title_link,
            text: &doc.body_text,
            image_url: &doc.image_url,
            footer: &doc.footer,
            ts: doc.timestamp,
            actions: doc.actions().map(Button::from).collect(),
        }
    }
}

impl<'a> Payload<'a> {
    pub fn new(doc: &'a NotificationDocument) -> Self {
        Self {
            username: None,
            channel: None,
            attachments: vec![Attachment::from(doc)],
        }
    }
}
