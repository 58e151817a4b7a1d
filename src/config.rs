use std::{env, net::SocketAddr, str::FromStr};

use url::Url;

use crate::{
    calendar::{Calendar, DEFAULT_CUTOFF_HOUR, DEFAULT_UTC_OFFSET_HOURS},
    daily_url::{SiteRoot, DEFAULT_SITE_ROOT},
    error::{Error, Result},
    notify::Template,
};

/// Deployment stage, picks which webhook secret is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Staging,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PRD" => Ok(Self::Production),
            "STG" => Ok(Self::Staging),
            other => Err(Error::config(format!(
                "ENV must be either PRD or STG, got {other:?}"
            ))),
        }
    }
}

impl Environment {
    const fn webhook_var(self) -> &'static str {
        match self {
            Self::Production => "WEBHOOK_URL_PRD",
            Self::Staging => "WEBHOOK_URL_STG",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub environment: Option<Environment>,
    pub webhook_url: Option<Url>,
    pub webhook_proxy: Option<Url>,
    pub webhook_username: Option<String>,
    pub webhook_channel: Option<String>,
    pub site_root: SiteRoot,
    pub calendar: Calendar,
    pub template: Template,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("PORT").unwrap_or_else(|| "18082".to_string());
        let addr = SocketAddr::from_str(&format!("{host}:{port}"))
            .map_err(|e| Error::config(format!("invalid listen address {host}:{port}: {e}")))?;

        let environment = match var("ENV").as_deref().map(Environment::from_str) {
            Some(Ok(environment)) => Some(environment),
            Some(Err(e)) => {
                log::error!("{e}");
                None
            }
            None => {
                log::error!("ENV is not set, the value must be either PRD or STG");
                None
            }
        };
        let webhook_url = environment
            .and_then(|environment| var(environment.webhook_var()))
            .map(|url| parse_url("webhook url", &url))
            .transpose()?;
        if environment.is_some() && webhook_url.is_none() {
            log::warn!("no webhook url configured for {environment:?}");
        }

        let site_root = match var("SITE_ROOT") {
            Some(root) => SiteRoot::parse(&root)?,
            None => SiteRoot::parse(DEFAULT_SITE_ROOT)?,
        };

        let offset_hours = var("UTC_OFFSET_HOURS")
            .map_or(Ok(DEFAULT_UTC_OFFSET_HOURS), |v| v.parse::<i32>());
        let offset = match offset_hours.ok().and_then(Calendar::offset_from_hours) {
            Some(offset) => offset,
            None => {
                log::warn!("invalid UTC_OFFSET_HOURS, falling back to +{DEFAULT_UTC_OFFSET_HOURS}");
                Calendar::default_offset()
            }
        };
        let cutoff_hour = parse_number(&var, "CUTOFF_HOUR", DEFAULT_CUTOFF_HOUR)?;
        if cutoff_hour > 24 {
            return Err(Error::config(format!("CUTOFF_HOUR {cutoff_hour} is not an hour")));
        }

        let template = Template {
            secondary_url: var("SECONDARY_ACTION_URL")
                .map(|url| parse_url("secondary action url", &url))
                .transpose()?,
            secondary_last_weekday: parse_number(
                &var,
                "SECONDARY_ACTION_LAST_WEEKDAY",
                Template::default().secondary_last_weekday,
            )?,
            ..Template::default()
        }
        .with_site(&site_root);

        Ok(Self {
            addr,
            environment,
            webhook_url,
            webhook_proxy: var("WEBHOOK_PROXY")
                .map(|url| parse_url("webhook proxy", &url))
                .transpose()?,
            webhook_username: var("WEBHOOK_USERNAME"),
            webhook_channel: var("WEBHOOK_CHANNEL"),
            site_root,
            calendar: Calendar::new(offset, cutoff_hour),
            template,
        })
    }
}

fn parse_url(what: &str, s: &str) -> Result<Url> {
    Url::parse(s).map_err(|e| Error::config(format!("invalid {what} {s:?}: {e}")))
}

fn parse_number(var: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    var(key).map_or(Ok(default), |v| {
        v.parse()
            .map_err(|e| Error::config(format!("invalid {key} {v:?}: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr, "127.0.0.1:18082".parse().unwrap());
        assert_eq!(config.environment, None);
        assert_eq!(config.webhook_url, None);
        assert_eq!(config.site_root, SiteRoot::default());
        assert_eq!(config.template.secondary_last_weekday, 4);
        assert_eq!(config.template.secondary_url, None);
    }

    #[test]
    fn test_environment_selects_webhook() {
        let vars = [
            ("ENV", "STG"),
            ("WEBHOOK_URL_PRD", "https://hooks.example.com/prd"),
            ("WEBHOOK_URL_STG", "https://hooks.example.com/stg"),
        ];
        let config = load(&vars).unwrap();
        assert_eq!(config.environment, Some(Environment::Staging));
        assert_eq!(
            config.webhook_url.unwrap().as_str(),
            "https://hooks.example.com/stg"
        );

        let vars = [("ENV", "PRD"), vars[1], vars[2]];
        let config = load(&vars).unwrap();
        assert_eq!(
            config.webhook_url.unwrap().as_str(),
            "https://hooks.example.com/prd"
        );
    }

    #[test]
    fn test_unknown_environment_does_not_abort() {
        let config = load(&[
            ("ENV", "DEV"),
            ("WEBHOOK_URL_PRD", "https://hooks.example.com/prd"),
        ])
        .unwrap();
        assert_eq!(config.environment, None);
        assert_eq!(config.webhook_url, None);
    }

    #[test]
    fn test_bad_offset_falls_back() {
        let config = load(&[("UTC_OFFSET_HOURS", "tokyo")]).unwrap();
        assert_eq!(config.calendar.offset(), Calendar::default_offset());
        let config = load(&[("UTC_OFFSET_HOURS", "99")]).unwrap();
        assert_eq!(config.calendar.offset(), Calendar::default_offset());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(load(&[("SITE_ROOT", "not a url")]).is_err());
        assert!(load(&[("CUTOFF_HOUR", "noon")]).is_err());
        assert!(load(&[("SECONDARY_ACTION_URL", "::")]).is_err());
        assert!(load(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn test_site_root_feeds_author_link() {
        let config = load(&[
            ("SITE_ROOT", "https://lunch.example.com/"),
            ("SECONDARY_ACTION_URL", "https://bento.example.com/"),
            ("SECONDARY_ACTION_LAST_WEEKDAY", "3"),
        ])
        .unwrap();
        assert_eq!(config.template.author.link, "https://lunch.example.com/");
        assert_eq!(config.template.secondary_last_weekday, 3);
        assert!(config.template.secondary_url.is_some());
    }
}
