use reqwest::{redirect, Client, Proxy};
use tracing::instrument;
use url::Url;

use super::{compose::NotificationDocument, payload::Payload};
use crate::error::{Error, Result};

/// Incoming webhook a run posts its message to.
#[derive(Debug, Clone)]
pub struct Webhook {
    client: Client,
    url: Option<Url>,
    username: Option<String>,
    channel: Option<String>,
}

impl Webhook {
    /// A redirect from the webhook means the token is wrong, so redirects are never followed.
    pub fn new(url: Option<Url>, proxy: Option<&Url>) -> Result<Self> {
        let mut builder = Client::builder().redirect(redirect::Policy::none());
        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            url,
            username: None,
            channel: None,
        })
    }

    #[must_use]
    pub fn with_overrides(mut self, username: Option<String>, channel: Option<String>) -> Self {
        self.username = username;
        self.channel = channel;
        self
    }

    #[instrument(skip_all, fields(title = %document.title))]
    pub async fn send(&self, document: &NotificationDocument) -> Result<()> {
        let url = self.url.as_ref().ok_or(Error::MissingWebhook)?;
        let payload = Payload {
            username: self.username.as_deref(),
            channel: self.channel.as_deref(),
            ..Payload::new(document)
        };
        let res = self.client.post(url.clone()).json(&payload).send().await?;

        let status = res.status();
        if status.is_redirection() {
            return Err(Error::Redirect(url.clone()));
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::Status {
                url: url.clone(),
                status,
            });
        }
        tracing::info!("Posted message, status {status}");
        Ok(())
    }
}
