//! HTTP client for the Ecclesia JSON API, usable anywhere a
//! [`DataService`] is.

use std::time::Duration;

use anyhow::Context as _;
use ecclesia_core::{
  store::{DataService, Failure},
  table::{Query, Row, Table},
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The server answered with a non-success status.
  #[error("{message} ({status})")]
  Status { status: StatusCode, message: String },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Query-string pairs for a select.
fn query_params(query: &Query) -> Vec<(String, String)> {
  let mut params: Vec<_> = query
    .eq
    .iter()
    .map(|(column, value)| (column.clone(), value.clone()))
    .collect();
  if let Some(column) = &query.order_by {
    params.push(("order".to_owned(), column.clone()));
  }
  if query.lineage {
    params.push(("lineage".to_owned(), "true".to_owned()));
  }
  params
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Turn a non-success response into [`ClientError::Status`], using the
  /// server's `{"error": ...}` body when there is one.
  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.canonical_reason().unwrap_or("request failed").to_owned(),
    };
    Err(ClientError::Status { status, message })
  }

  async fn json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    Ok(Self::check(resp).await?.json().await?)
  }

  /// `GET /api/{table}/{id}/tree`; a 404 reads as `None`.
  async fn tree(&self, table: Table, id: Uuid) -> Result<Option<Row>> {
    let resp = self
      .client
      .get(self.url(&format!("/{table}/{id}/tree")))
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Self::json(resp).await.map(Some)
  }
}

impl DataService for ApiClient {
  type Error = ClientError;

  fn failure(err: &ClientError) -> Failure {
    match err {
      ClientError::Status { status, .. } => match *status {
        StatusCode::NOT_FOUND => Failure::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Failure::Invalid,
        StatusCode::CONFLICT => Failure::Conflict,
        _ => Failure::Internal,
      },
      ClientError::Http(_) => Failure::Internal,
    }
  }

  async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>> {
    tracing::debug!(%table, ?query, "select");
    let resp = self
      .client
      .get(self.url(&format!("/{table}")))
      .query(&query_params(query))
      .send()
      .await?;
    Self::json(resp).await
  }

  async fn insert(&self, table: Table, row: Row) -> Result<Row> {
    let resp = self
      .client
      .post(self.url(&format!("/{table}")))
      .json(&row)
      .send()
      .await?;
    Self::json(resp).await
  }

  async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row> {
    let resp = self
      .client
      .patch(self.url(&format!("/{table}/{id}")))
      .json(&patch)
      .send()
      .await?;
    Self::json(resp).await
  }

  async fn delete(&self, table: Table, id: Uuid) -> Result<()> {
    let resp = self
      .client
      .delete(self.url(&format!("/{table}/{id}")))
      .send()
      .await?;
    Self::check(resp).await?;
    Ok(())
  }

  async fn region_tree(&self, region_id: Uuid) -> Result<Option<Row>> {
    self.tree(Table::Regions, region_id).await
  }

  async fn district_tree(&self, district_id: Uuid) -> Result<Option<Row>> {
    self.tree(Table::Districts, district_id).await
  }
}
