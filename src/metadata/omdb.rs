//! OMDb API client.
//!
//! One GET per lookup, keyed by IMDb id when one is known and by title
//! (plus year) otherwise. Every failure is reported as a miss.

use super::{EnrichmentRecord, LookupOutcome, LookupQuery, MetadataLookup};
use crate::config::OmdbSettings;
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::blocking::{Client, Request};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use std::cell::Cell;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// OMDb's placeholder for fields it has no value for.
const NOT_AVAILABLE: &str = "N/A";

lazy_static! {
    static ref NON_TITLE_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9\s]").unwrap();
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Render a cross-reference id the way OMDb expects it: `tt` followed by a
/// zero-padded 7 digit number. Formatting such as an existing `tt` prefix
/// or a trailing `.0` is stripped first. Returns `None` when no digits are left.
pub fn normalize_imdb_id(raw: &str) -> Option<String> {
    let integral = raw.trim().split('.').next().unwrap_or_default();
    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let number: u64 = digits.parse().ok()?;
    Some(format!("tt{:07}", number))
}

/// Drop everything but ASCII letters, digits and whitespace.
pub fn sanitize_title(title: &str) -> String {
    NON_TITLE_CHARS.replace_all(title, "").into_owned()
}

/// What a single request is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKey {
    ImdbId(String),
    Title { title: String, year: Option<i32> },
}

impl RequestKey {
    pub fn for_query(query: &LookupQuery) -> Self {
        if let Some(imdb_id) = query.imdb_ref.as_deref().and_then(normalize_imdb_id) {
            return RequestKey::ImdbId(imdb_id);
        }
        RequestKey::Title {
            title: sanitize_title(&query.title),
            year: query.year,
        }
    }

    fn params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("apikey", api_key.to_string())];
        match self {
            RequestKey::ImdbId(id) => params.push(("i", id.clone())),
            RequestKey::Title { title, year } => {
                params.push(("t", title.clone()));
                if let Some(year) = year {
                    params.push(("y", year.to_string()));
                }
            }
        }
        params
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

#[derive(Deserialize)]
struct OmdbReply {
    #[serde(rename = "Response", deserialize_with = "deserialize_flag")]
    response: bool,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "BoxOffice")]
    box_office: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != NOT_AVAILABLE)
}

/// Decode an OMDb reply body.
pub fn parse_reply(body: &str) -> Result<LookupOutcome, LookupError> {
    let reply: OmdbReply = serde_json::from_str(body)?;
    if !reply.response {
        debug!(
            "OMDb reported no match: {}",
            reply.error.as_deref().unwrap_or("no reason given")
        );
        return Ok(LookupOutcome::NotFound);
    }

    debug!(
        "OMDb match: {}",
        reply.title.as_deref().unwrap_or("<untitled>")
    );
    Ok(LookupOutcome::Matched(EnrichmentRecord {
        director: present(reply.director),
        plot: present(reply.plot),
        box_office: present(reply.box_office),
        imdb_id: present(reply.imdb_id),
    }))
}

pub struct OmdbClient {
    client: Client,
    endpoint: String,
    api_key: String,
    request_interval: Duration,
    last_request: Cell<Option<Instant>>,
}

impl OmdbClient {
    pub fn new(settings: &OmdbSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            request_interval: settings.request_interval,
            last_request: Cell::new(None),
        })
    }

    fn rate_limit(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.request_interval {
                std::thread::sleep(self.request_interval - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    pub fn build_request(&self, key: &RequestKey) -> Result<Request, LookupError> {
        Ok(self
            .client
            .get(&self.endpoint)
            .query(&key.params(&self.api_key))
            .build()?)
    }

    fn fetch(&self, key: &RequestKey) -> Result<LookupOutcome, LookupError> {
        let request = self.build_request(key)?;
        self.rate_limit();

        let response = self.client.execute(request)?;
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let body = response.text()?;
        parse_reply(&body)
    }
}

impl MetadataLookup for OmdbClient {
    fn lookup(&self, query: &LookupQuery) -> LookupOutcome {
        let key = RequestKey::for_query(query);
        match &key {
            RequestKey::ImdbId(id) => debug!("Searching OMDb by IMDb id {}", id),
            RequestKey::Title { title, year } => {
                debug!("Searching OMDb by title {:?} (year {:?})", title, year)
            }
        }

        match self.fetch(&key) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("OMDb lookup failed for {:?}: {}", query.title, e);
                LookupOutcome::NotFound
            }
        }
    }
}
