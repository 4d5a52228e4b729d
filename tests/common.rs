//! Common test utilities and fixtures
//!
//! Shared functionality used across all test modules: an in-memory
//! [`Transport`] and builders for search envelopes and manifests.

use async_trait::async_trait;
use nasa_media::net::{Response, Transport};
use nasa_media::{Config, MediaApi};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub const SEARCH_URL: &str = "https://images-api.nasa.gov/search";

#[derive(Default)]
struct Route {
    queued: VecDeque<Response>,
    fallback: Option<Response>,
    delay: Duration,
}

/// Transport answering from canned responses keyed by exact URL.
///
/// Unknown URLs answer 404. A route with queued responses answers them in
/// order and then keeps repeating the last one.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: Value) {
        self.respond_seq(url, vec![(status, body)]);
    }

    pub fn respond_seq(&self, url: &str, responses: Vec<(u16, Value)>) {
        let mut routes = self.routes.lock();
        let route = routes.entry(url.to_string()).or_default();
        for (status, body) in responses {
            let response = Response::new(status, body.to_string());
            route.fallback = Some(response.clone());
            route.queued.push_back(response);
        }
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        self.routes
            .lock()
            .entry(url.to_string())
            .or_default()
            .delay = delay;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> nasa_media::Result<Response> {
        self.calls.lock().push(url.to_string());

        let (response, delay) = {
            let mut routes = self.routes.lock();
            match routes.get_mut(url) {
                Some(route) => {
                    let response = route
                        .queued
                        .pop_front()
                        .or_else(|| route.fallback.clone())
                        .unwrap_or_else(|| Response::new(404, "null"));
                    (response, route.delay)
                }
                None => (Response::new(404, "null"), Duration::ZERO),
            }
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(response)
    }
}

/// Config with fast retries for tests.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        retry_delay_ms: 1,
        rate_limit_ms: 0,
        ..Config::default()
    }
}

/// A client over `transport` with [`test_config`].
#[allow(dead_code)]
pub fn fake_api(transport: &Arc<FakeTransport>) -> MediaApi {
    MediaApi::with_transport(Arc::clone(transport), &test_config())
}

/// Manifest href for a fixture item.
#[allow(dead_code)]
pub fn manifest_href(nasa_id: &str) -> String {
    format!("https://images-assets.nasa.gov/{}/collection.json", nasa_id)
}

/// One raw search item of the given media type.
#[allow(dead_code)]
pub fn raw_item(media_type: &str, nasa_id: &str, title: &str) -> Value {
    json!({
        "href": manifest_href(nasa_id),
        "data": [{
            "title": title,
            "description": format!("Description of {}", title),
            "media_type": media_type,
            "nasa_id": nasa_id,
            "keywords": ["NASA", title],
        }],
        "links": [
            {"href": format!("https://images-assets.nasa.gov/{}/thumb.jpg", nasa_id), "rel": "preview"},
            {"href": format!("https://images-assets.nasa.gov/{}/small.jpg", nasa_id), "rel": "alternate", "size": 2000},
            {"href": format!("https://images-assets.nasa.gov/{}/orig.jpg", nasa_id), "rel": "canonical", "size": 90000},
        ],
    })
}

/// A search envelope; `next` becomes the single page link.
#[allow(dead_code)]
pub fn envelope(items: Vec<Value>, next: Option<&str>) -> Value {
    let total_hits = items.len();
    let mut collection = json!({
        "items": items,
        "metadata": {"total_hits": total_hits},
    });
    if let Some(href) = next {
        collection["links"] = json!([{"href": href, "prompt": "Next", "rel": "next"}]);
    }
    json!({ "collection": collection })
}

/// Search URL for a plain text query.
#[allow(dead_code)]
pub fn search_url(text: &str) -> String {
    url::Url::parse_with_params(SEARCH_URL, &[("q", text)])
        .unwrap()
        .to_string()
}
