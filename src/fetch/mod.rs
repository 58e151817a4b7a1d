use std::{num::NonZeroU32, time::Duration};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::keyed::HashMapStateStore,
    Jitter, Quota, RateLimiter,
};
use reqwest::{redirect, Client};
use tokio::sync::Mutex;
use tracing::{instrument, Level};
use url::Url;

use crate::{
    error::{Error, Result},
    parse::Page,
};

/// Minimum spacing between two requests to the same host.
static REQUEST_DELAY: Duration = Duration::from_secs(1);
/// Extra random delay added on top of `REQUEST_DELAY`.
static DELAY_JITTER: Duration = Duration::from_secs(1);
const MAX_REDIRECTS: usize = 10;

type HostLimiter =
    RateLimiter<String, HashMapStateStore<String>, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub fn make_client() -> Client {
    Client::builder()
        .gzip(true)
        .redirect(redirect::Policy::custom(|attempt| {
            let same_host = attempt
                .previous()
                .first()
                .is_some_and(|first| first.host_str() == attempt.url().host_str());
            if !same_host {
                attempt.stop()
            } else if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else {
                attempt.follow()
            }
        }))
        .build()
        .expect("client creation should succeed")
}

fn host_limiter() -> HostLimiter {
    let quota = Quota::with_period(REQUEST_DELAY)
        .expect("request delay is non-zero")
        .allow_burst(NonZeroU32::MIN);
    RateLimiter::hashmap(quota)
}

/// Sequential, polite page fetcher bound to a single host.
///
/// The next request to a host waits `REQUEST_DELAY` plus jitter counted from
/// the moment the previous response was fully read. Every run builds its own
/// fetcher so politeness state never leaks between runs. Revisits are not
/// deduplicated.
pub struct Fetcher {
    client: Client,
    allowed_host: String,
    limiter: Mutex<HostLimiter>,
}

impl Fetcher {
    pub fn new(client: Client, allowed_host: impl Into<String>) -> Self {
        Self {
            client,
            allowed_host: allowed_host.into(),
            limiter: Mutex::new(host_limiter()),
        }
    }

    pub fn allowed_host(&self) -> &str {
        &self.allowed_host
    }

    #[instrument(skip_all, fields(url = %url), level = Level::DEBUG)]
    pub async fn visit(&self, url: &Url) -> Result<Page> {
        let host = match url.host_str() {
            Some(host) if host == self.allowed_host => host.to_owned(),
            _ => return Err(Error::ForeignHost(url.clone())),
        };
        let mut limiter = self.limiter.lock().await;
        limiter
            .until_key_ready_with_jitter(&host, Jitter::up_to(DELAY_JITTER))
            .await;

        let res = self.fetch(url).await;
        // the cell is taken once the response is done, so the delay runs from here
        *limiter = host_limiter();
        if limiter.check_key(&host).is_err() {
            log::warn!("fresh limiter for {host} was not ready");
        }
        res
    }

    async fn fetch(&self, url: &Url) -> Result<Page> {
        let start = std::time::Instant::now();
        let res = self.client.get(url.clone()).send().await?;
        let status = res.status();
        if status.is_redirection() {
            // the redirect policy stopped on a different host
            let target = res
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| url.join(loc).ok())
                .unwrap_or_else(|| url.clone());
            return Err(Error::ForeignHost(target));
        }
        if !status.is_success() {
            return Err(Error::Status {
                url: url.clone(),
                status,
            });
        }
        let final_url = res.url().clone();
        let body = res.text().await?;
        log::trace!("Got text of {final_url} in \t {:?}", start.elapsed());
        Ok(Page::new(final_url, body))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Instant};

    use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/").parse().unwrap()
    }

    fn site() -> Router {
        Router::new()
            .route("/page", get(|| async { "<p>hello</p>" }))
            .route(
                "/away",
                get(|| async {
                    (
                        axum::http::StatusCode::FOUND,
                        [(header::LOCATION, "http://example.invalid/")],
                    )
                        .into_response()
                }),
            )
            .route(
                "/missing",
                get(|| async { axum::http::StatusCode::NOT_FOUND }),
            )
    }

    #[tokio::test]
    async fn test_visit_returns_body() {
        let root = serve(site()).await;
        let fetcher = Fetcher::new(make_client(), root.host_str().unwrap());
        let page = fetcher.visit(&root.join("page").unwrap()).await.unwrap();
        assert_eq!(page.body(), "<p>hello</p>");
        assert_eq!(page.url().path(), "/page");
    }

    #[tokio::test]
    async fn test_revisits_are_spaced() {
        let root = serve(site()).await;
        let fetcher = Fetcher::new(make_client(), root.host_str().unwrap());
        let url = root.join("page").unwrap();
        let start = Instant::now();
        fetcher.visit(&url).await.unwrap();
        fetcher.visit(&url).await.unwrap();
        assert!(start.elapsed() >= REQUEST_DELAY);
    }

    #[derive(Default)]
    struct Arrivals(Mutex<Vec<Instant>>);

    const SLOW_PAGE: Duration = Duration::from_millis(1500);

    async fn slow(State(arrivals): State<Arc<Arrivals>>) -> &'static str {
        arrivals.0.lock().await.push(Instant::now());
        tokio::time::sleep(SLOW_PAGE).await;
        "<p>slow</p>"
    }

    async fn fast(State(arrivals): State<Arc<Arrivals>>) -> &'static str {
        arrivals.0.lock().await.push(Instant::now());
        "<p>fast</p>"
    }

    #[tokio::test]
    async fn test_delay_counts_from_end_of_slow_page() {
        let arrivals = Arc::new(Arrivals::default());
        let app = Router::new()
            .route("/slow", get(slow))
            .route("/fast", get(fast))
            .with_state(Arc::clone(&arrivals));
        let root = serve(app).await;
        let fetcher = Fetcher::new(make_client(), root.host_str().unwrap());

        fetcher.visit(&root.join("slow").unwrap()).await.unwrap();
        fetcher.visit(&root.join("fast").unwrap()).await.unwrap();

        let arrivals = arrivals.0.lock().await;
        assert_eq!(arrivals.len(), 2);
        assert!(arrivals[1].duration_since(arrivals[0]) >= SLOW_PAGE + REQUEST_DELAY);
    }

    #[tokio::test]
    async fn test_rejects_foreign_host() {
        let fetcher = Fetcher::new(make_client(), "127.0.0.1");
        let url: Url = "http://example.invalid/2024/06/27".parse().unwrap();
        assert!(matches!(
            fetcher.visit(&url).await,
            Err(Error::ForeignHost(_))
        ));
    }

    #[tokio::test]
    async fn test_does_not_follow_cross_host_redirect() {
        let root = serve(site()).await;
        let fetcher = Fetcher::new(make_client(), root.host_str().unwrap());
        let res = fetcher.visit(&root.join("away").unwrap()).await;
        assert!(matches!(res, Err(Error::ForeignHost(url)) if url.host_str() == Some("example.invalid")));
    }

    #[tokio::test]
    async fn test_status_error() {
        let root = serve(site()).await;
        let fetcher = Fetcher::new(make_client(), root.host_str().unwrap());
        let res = fetcher.visit(&root.join("missing").unwrap()).await;
        assert!(matches!(
            res,
            Err(Error::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
    }
}
