use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::Config;
use crate::error::{Kind, WrapNetworkError};
use crate::Error;

/// Maximum number of characters of the probe body shown to the operator
pub const PREVIEW_LIMIT: usize = 200;

/// A 200 answer of the reachability probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResponse {
    status: u16,
    body: String,
}

impl ProbeResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn preview(&self) -> String {
        preview(&self.body, PREVIEW_LIMIT)
    }
}

/// Shorten `body` to `limit` characters, appending `...` only when something was cut
pub fn preview(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Single unauthenticated GET on the probe url, bounded by the probe timeout
pub fn probe(config: &Config) -> Result<ProbeResponse, Error> {
    let url = config.probe_url().as_str();
    debug!("probing {} with a {:?} timeout", url, config.probe_timeout());

    let client = Client::builder()
        .timeout(config.probe_timeout())
        .build()
        .network_err("could not build http client")?;

    let response = client
        .get(url)
        .send()
        .network_err(&format!("GET {} failed", url))?;

    let status = response.status();
    let body = response
        .text()
        .network_err("could not read probe response")?;

    if status != StatusCode::OK {
        return Err(Error::new(Kind::HttpStatus {
            status: status.as_u16(),
            body,
        }));
    }

    Ok(ProbeResponse {
        status: status.as_u16(),
        body,
    })
}
