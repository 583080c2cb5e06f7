// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use cidb_app::{Proxy, Record};
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::RestError;

/// Primary key column the backend assumes when no `Primary-Key` header is sent.
pub const DEFAULT_PRIMARY_KEY: &str = "id";
pub const PRIMARY_KEY_HEADER: &str = "Primary-Key";
const JSON: &str = "application/json";

/// Where a database lives: `{base_url}/{service}/{database}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    service: String,
    database: String,
}

impl Endpoint {
    pub fn new(base_url: &str, service: &str, database: &str) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("server.base_url must not be empty");
        }
        let base = Url::parse(trimmed).with_context(|| format!("parse base URL {trimmed:?}"))?;
        if !matches!(base.scheme(), "http" | "https") {
            bail!(
                "server.base_url must use http or https, got {:?} -- use e.g. http://localhost:8080",
                base.scheme()
            );
        }
        if base.cannot_be_a_base() {
            bail!("server.base_url {trimmed:?} cannot hold a path");
        }
        let service = path_segment("server.service", service)?;
        let database = path_segment("server.database", database)?;
        Ok(Self {
            base,
            service,
            database,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection_url(&self, table: &str) -> Result<Url> {
        self.url_for(&[table])
    }

    pub fn record_url(&self, table: &str, key: &str) -> Result<Url> {
        self.url_for(&[table, key])
    }

    pub fn find_url(&self, table: &str, column: &str, value: &str) -> Result<Url> {
        self.url_for(&[table, column, value])
    }

    fn url_for(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow!("base URL {} cannot hold a path", self.base))?;
            segments.pop_if_empty();
            segments.push(&self.service);
            segments.push(&self.database);
            segments.extend(tail);
        }
        Ok(url)
    }
}

fn path_segment(label: &str, value: &str) -> Result<String> {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        bail!("{label} must not be empty");
    }
    if trimmed.contains('/') {
        bail!("{label} must be a single path segment, got {value:?}");
    }
    Ok(trimmed.to_owned())
}

#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Endpoint,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            bail!("server.timeout must be positive");
        }
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            endpoint,
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn proxy<R: Record>(&self) -> RestProxy<R> {
        RestProxy {
            client: self.clone(),
            record: PhantomData,
        }
    }

    fn request<R: Record>(&self, method: Method, url: Url) -> RequestBuilder {
        let mut request = self.http.request(method, url).header(ACCEPT, JSON);
        if R::PRIMARY_KEY != DEFAULT_PRIMARY_KEY {
            request = request.header(PRIMARY_KEY_HEADER, R::PRIMARY_KEY);
        }
        request
    }

    fn execute(
        &self,
        method: &Method,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Vec<Value>, RestError> {
        debug!(%method, %url, "sending request");
        let response = request.send().map_err(|source| {
            warn!(%method, %url, error = %source, "request failed");
            RestError::Connect {
                url: self.endpoint.base_url().to_owned(),
                source,
            }
        })?;

        let status = response.status();
        let count = response
            .headers()
            .get("Content-Count")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        debug!(
            %method,
            %url,
            status = status.as_u16(),
            count = count.as_deref(),
            "response received"
        );

        let body = response.text().map_err(|error| RestError::Decode {
            what: format!("{method} {url} body"),
            detail: error.to_string(),
        })?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }
        read_envelope(&body)
    }
}

/// `Proxy` over the backend's REST routes for one table.
#[derive(Debug, Clone)]
pub struct RestProxy<R> {
    client: Client,
    record: PhantomData<fn() -> R>,
}

impl<R: Record> RestProxy<R> {
    fn send(&self, method: Method, url: Url, body: Option<&R>) -> Result<Vec<Value>, RestError> {
        let mut request = self.client.request::<R>(method.clone(), url.clone());
        if let Some(record) = body {
            request = request.json(record);
        }
        self.client.execute(&method, &url, request)
    }

    fn decode(&self, cells: Vec<Value>) -> Result<Vec<R>, RestError> {
        cells
            .into_iter()
            .map(|cell| {
                serde_json::from_value(cell).map_err(|error| RestError::Decode {
                    what: format!("{} row", R::TABLE),
                    detail: error.to_string(),
                })
            })
            .collect()
    }

    fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }
}

impl<R: Record> Proxy<R> for RestProxy<R> {
    fn read_all(&self) -> Result<Vec<R>> {
        let url = self.endpoint().collection_url(R::TABLE)?;
        let cells = self.send(Method::GET, url, None)?;
        Ok(self.decode(cells)?)
    }

    fn find_by(&self, column: &str, value: &str) -> Result<Vec<R>> {
        let url = self.endpoint().find_url(R::TABLE, column, value)?;
        match self.send(Method::GET, url, None) {
            Ok(cells) => Ok(self.decode(cells)?),
            Err(error) if error.is_not_found() => {
                debug!(table = R::TABLE, column, value, "find matched nothing");
                Ok(Vec::new())
            }
            Err(error) => Err(error.into()),
        }
    }

    fn create(&self, record: &R) -> Result<Option<R>> {
        let url = self.endpoint().collection_url(R::TABLE)?;
        let cells = self.send(Method::POST, url, Some(record))?;
        Ok(self.decode(cells)?.into_iter().next())
    }

    fn update(&self, key: R::Key, record: &R) -> Result<()> {
        let url = self.endpoint().record_url(R::TABLE, &key.to_string())?;
        self.send(Method::PUT, url, Some(record))?;
        Ok(())
    }

    fn destroy(&self, key: R::Key) -> Result<()> {
        let url = self.endpoint().record_url(R::TABLE, &key.to_string())?;
        self.send(Method::DELETE, url, None)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    cells: Vec<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "SQLState")]
    sql_state: Option<String>,
}

fn default_success() -> bool {
    true
}

impl Envelope {
    fn describe(&self) -> Option<String> {
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())?;
        Some(match self.sql_state.as_deref() {
            Some(state) if !state.is_empty() => format!("{message} [SQLState {state}]"),
            _ => message.to_owned(),
        })
    }
}

/// Reads a success body. An empty body counts as success with no rows.
fn read_envelope(body: &str) -> Result<Vec<Value>, RestError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let envelope: Envelope = serde_json::from_str(body).map_err(|error| RestError::Decode {
        what: "response envelope".to_owned(),
        detail: error.to_string(),
    })?;
    if !envelope.success {
        return Err(RestError::Rejected {
            message: envelope
                .describe()
                .unwrap_or_else(|| "no reason given".to_owned()),
        });
    }
    Ok(envelope.cells)
}

fn clean_error_response(status: StatusCode, body: &str) -> RestError {
    let status_code = status.as_u16();
    if let Ok(envelope) = serde_json::from_str::<Envelope>(body)
        && let Some(message) = envelope.describe()
    {
        return RestError::Status {
            status: status_code,
            message,
        };
    }

    let trimmed = body.trim();
    let message = if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        trimmed.to_owned()
    } else {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    };
    RestError::Status {
        status: status_code,
        message,
    }
}
