use std::{
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::time::sleep;

use crate::error::{Result, SeedError};

pub mod datasets {
    /// # Stop details
    ///
    /// Code, coordinates and bilingual name of every stop of the network.
    pub const STOP_DETAILS: &str = "https://data.stib-mivb.brussels/api/explore/v2.1/catalog/datasets/stop-details-production/records";

    pub const STOP_DETAILS_FIELDS: &[&str] = &["gpscoordinates", "id", "name"];

    /// # Stops by line
    ///
    /// One record per line and direction, with the destination and the ordered
    /// list of stops served.
    pub const STOPS_BY_LINE: &str = "https://data.stib-mivb.brussels/api/explore/v2.1/catalog/datasets/stops-by-line-production/records";

    pub const STOPS_BY_LINE_FIELDS: &[&str] = &["destination", "direction", "lineid", "points"];
}

/// One data row of a source, header excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based position in the source. For files the header is row 1.
    pub number: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new<S: Into<String>>(number: usize, fields: Vec<S>) -> Self {
        Self {
            number,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn expect_arity(&self, expected: usize) -> Result<()> {
        if self.fields.len() != expected {
            return Err(SeedError::Arity {
                row: self.number,
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }
}

/// Where the rows of a stage come from.
#[derive(Debug, Clone)]
pub enum Source {
    File(PathBuf),
    Api(ApiSource),
}

impl Source {
    pub async fn read(&self) -> Result<Vec<RawRow>> {
        match self {
            Self::File(path) => read_csv_file(path),
            Self::Api(api) => api.read().await,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Api(api) => write!(f, "api {}", api.url),
        }
    }
}

pub fn read_csv_file(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path).map_err(|source| SeedError::Io {
        path: path.to_owned(),
        source,
    })?;
    read_csv(file)
}

/// Reads a whole `;`-separated file. The first record is the header and is
/// dropped; arity is left to the consumer.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 {
            continue;
        }
        rows.push(RawRow {
            number: index + 1,
            fields: record.iter().map(str::to_owned).collect(),
        });
    }
    Ok(rows)
}

/// Performs one authorized GET and hands back the status and the raw body.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str, api_key: &str) -> Result<(StatusCode, Vec<u8>)>;
}

#[async_trait]
impl Fetch for reqwest::Client {
    async fn get(&self, url: &str, api_key: &str) -> Result<(StatusCode, Vec<u8>)> {
        let request_error = |source: reqwest::Error| SeedError::Request {
            url: url.to_owned(),
            source,
        };
        let response = reqwest::Client::get(self, url)
            .header(AUTHORIZATION, api_key)
            .send()
            .await
            .map_err(request_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(request_error)?;
        Ok((status, body.to_vec()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub total_count: usize,
    pub results: Vec<Map<String, Value>>,
}

/// A paginated JSON dataset. Records are flattened into rows holding `fields`
/// in order.
#[derive(Debug, Clone)]
pub struct ApiSource {
    pub url: String,
    pub fields: &'static [&'static str],
    pub api_key: String,
    pub page_size: usize,
    pub page_delay: Duration,
}

impl ApiSource {
    pub fn new<U: Into<String>, K: Into<String>>(
        url: U,
        fields: &'static [&'static str],
        api_key: K,
    ) -> Self {
        Self {
            url: url.into(),
            fields,
            api_key: api_key.into(),
            page_size: 100,
            page_delay: Duration::from_millis(500),
        }
    }

    pub fn page_url(&self, offset: usize) -> String {
        format!("{}?limit={}&offset={}", self.url, self.page_size, offset)
    }

    /// Fetches every page over HTTP.
    pub async fn read(&self) -> Result<Vec<RawRow>> {
        self.read_with(&reqwest::Client::new()).await
    }

    /// Fetches every page through `fetch`. The total reported by the first
    /// page decides when to stop; any failing page aborts the whole read.
    pub async fn read_with<F: Fetch>(&self, fetch: &F) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        let mut offset = 0;
        let mut total_count = None;

        loop {
            let url = self.page_url(offset);
            log::info!("Requesting '{url}'.");

            let (status, body) = fetch.get(&url, &self.api_key).await?;
            if !status.is_success() {
                return Err(SeedError::Status { url, status });
            }

            let page = decode_page(&url, &body)?;
            let total_count = *total_count.get_or_insert(page.total_count);

            if page.results.is_empty() && offset < total_count {
                log::warn!(
                    "empty page at offset {offset} of {total_count}, stopping early."
                );
                break;
            }

            for record in &page.results {
                rows.push(self.flatten(rows.len() + 1, record)?);
            }

            offset += self.page_size;
            if offset >= total_count {
                break;
            }

            sleep(self.page_delay).await;
        }

        Ok(rows)
    }

    pub fn flatten(&self, number: usize, record: &Map<String, Value>) -> Result<RawRow> {
        let fields = self
            .fields
            .iter()
            .filter_map(|name| record.get(*name))
            .map(|value| match value {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>();

        let row = RawRow { number, fields };
        row.expect_arity(self.fields.len())?;
        Ok(row)
    }
}

pub fn decode_page(url: &str, body: &[u8]) -> Result<Page> {
    serde_json::from_slice(body).map_err(|source| SeedError::Page {
        url: url.to_owned(),
        source,
    })
}
