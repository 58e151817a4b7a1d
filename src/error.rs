use reqwest::StatusCode;
use std::fmt::{self, Display, Formatter};
use url::Url;

#[derive(Debug)]
pub enum Error {
    Request(reqwest::Error),
    Status { url: Url, status: StatusCode },
    ForeignHost(Url),
    Redirect(Url),
    MissingWebhook,
    Config(String),
    Json(serde_json::Error),
    Url(url::ParseError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "Request error: {e}"),
            Self::Status { url, status } => write!(f, "Unexpected status {status} from {url}"),
            Self::ForeignHost(url) => write!(f, "Refusing to leave the site for {url}"),
            Self::Redirect(url) => write!(f, "Incorrect token (redirected to {url})"),
            Self::MissingWebhook => write!(f, "No webhook URL configured"),
            Self::Config(msg) => write!(f, "Config error: {msg}"),
            Self::Json(e) => write!(f, "Json error: {e}"),
            Self::Url(e) => write!(f, "Url error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
