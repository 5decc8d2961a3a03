//! In-memory fetcher and listing builders for crawler unit tests

use crate::crawler::fetcher::Fetcher;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// A fetcher that replays scripted responses per URL
///
/// Each URL has a queue of responses consumed in order; the last response
/// repeats forever. Unknown URLs answer `HttpStatus(404)`.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, FetchError>>>>,
    hits: Mutex<HashMap<String, u32>>,
    latency: Duration,
    interrupt: Option<(String, Arc<AtomicBool>)>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A page that always answers with `body`
    pub(crate) fn page(self, url: &str, body: impl Into<String>) -> Self {
        self.script(url, vec![Ok(body.into())])
    }

    pub(crate) fn script(self, url: &str, responses: Vec<Result<String, FetchError>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into_iter().collect());
        self
    }

    /// Delay applied to every response
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets `flag` whenever `url` is fetched, as a Ctrl+C arriving mid-request
    pub(crate) fn interrupt_on(mut self, url: &str, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some((url.to_string(), flag));
        self
    }

    pub(crate) fn hits(&self, url: &str) -> u32 {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn next_response(&self, url: &str) -> Result<String, FetchError> {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Err(FetchError::HttpStatus(404))),
            None => Err(FetchError::HttpStatus(404)),
        }
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        if let Some((target, flag)) = &self.interrupt {
            if target == url.as_str() {
                flag.store(true, Ordering::SeqCst);
            }
        }

        if !self.latency.is_zero() {
            if self.latency >= timeout {
                tokio::time::sleep(timeout).await;
                return Err(FetchError::Timeout);
            }
            tokio::time::sleep(self.latency).await;
        }

        self.next_response(url.as_str())
    }
}

/// Renders an nginx-style `<pre>` listing
///
/// Each entry is `(href, trailing text)`; the trailing text is what the
/// server prints after the link on the same line (date, size).
pub(crate) fn pre_listing(entries: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><head><title>Index of /</title></head><body><h1>Index of /</h1><hr><pre>\
         <a href=\"../\">../</a>\n",
    );
    for (href, trailing) in entries {
        html.push_str(&format!("<a href=\"{}\">{}</a>{}\n", href, href, trailing));
    }
    html.push_str("</pre><hr></body></html>");
    html
}
