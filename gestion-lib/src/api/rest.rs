//! REST operations on [`GestionClient`].

use log::debug;
use reqwest::Method;
use reqwest::Response;
use url::Url;

use super::ListBody;
use super::Page;
use super::Resource;
use crate::GestionClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::grid::PageRequest;
use crate::model::DEFAULT_ID_KEY;
use crate::model::Row;

/// Response header carrying the total row count of a paged list.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

impl GestionClient {
    /// Fetches every row of a collection.
    pub async fn list(&self, resource: &Resource) -> Result<Vec<Row>, Error> {
        let url = self.collection_url(resource)?;
        let response = self.request(Method::GET, url, None).await?;
        let body: ListBody = read_json(response).await?;
        let (items, _) = body.into_parts();
        rows_from_json(items)
    }

    /// Fetches one page of a collection.
    ///
    /// The total comes from the `X-Total-Count` header, else from a
    /// `{ "data": [...], "total": n }` body, else from the row count.
    pub async fn page(&self, resource: &Resource, request: PageRequest) -> Result<Page, Error> {
        let mut url = self.collection_url(resource)?;
        url.query_pairs_mut()
            .append_pair("page", &request.page.to_string())
            .append_pair("limit", &request.page_size.to_string());

        let response = self.request(Method::GET, url, None).await?;
        let header_total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        let body: ListBody = read_json(response).await?;
        let (items, body_total) = body.into_parts();
        let rows = rows_from_json(items)?;
        let total = header_total.or(body_total).unwrap_or(rows.len());
        Ok(Page { rows, total })
    }

    /// Fetches one row by id.
    pub async fn get(&self, resource: &Resource, id: &str) -> Result<Row, Error> {
        let url = self.item_url(resource, id)?;
        let response = self.request(Method::GET, url, None).await?;
        let value: serde_json::Value = read_json(response).await?;
        row_from_json(value)
    }

    /// Creates a row and returns the server's copy.
    ///
    /// If the server answers without a body, the submitted row is returned.
    pub async fn create(&self, resource: &Resource, row: &Row) -> Result<Row, Error> {
        let url = self.collection_url(resource)?;
        let response = self.request(Method::POST, url, Some(row.to_json())).await?;
        echo_or_parse(response, row).await
    }

    /// Replaces a row and returns the server's copy.
    pub async fn update(&self, resource: &Resource, id: &str, row: &Row) -> Result<Row, Error> {
        let url = self.item_url(resource, id)?;
        let response = self.request(Method::PUT, url, Some(row.to_json())).await?;
        echo_or_parse(response, row).await
    }

    /// Deletes a row.
    pub async fn delete(&self, resource: &Resource, id: &str) -> Result<(), Error> {
        let url = self.item_url(resource, id)?;
        self.request(Method::DELETE, url, None).await?;
        Ok(())
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn collection_url(&self, resource: &Resource) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url().trim_end_matches('/'), resource.path());
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    fn item_url(&self, resource: &Resource, id: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}/{}",
            self.base_url().trim_end_matches('/'),
            resource.path(),
            urlencoding::encode(id)
        );
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Sends one request with the bearer token. No retries.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response, Error> {
        let token = self.token_provider().get_token(self.base_url()).await?;

        debug!("{} {}", method, url);
        let mut request = self
            .http_client()
            .request(method, url)
            .bearer_auth(&token.access_token);

        if let Some(timeout) = self.timeout() {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!("request failed with HTTP {}", status.as_u16());
            Err(Error::Api(ApiError::http(status.as_u16(), body)))
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ApiError {
        match self.timeout() {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(e),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
}

async fn echo_or_parse(response: Response, submitted: &Row) -> Result<Row, Error> {
    let text = response.text().await.map_err(ApiError::from)?;
    if text.trim().is_empty() {
        return Ok(submitted.clone());
    }
    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| ApiError::parse_with_body(e.to_string(), text.clone()))?;
    row_from_json(value)
}

fn row_from_json(value: serde_json::Value) -> Result<Row, Error> {
    match value {
        serde_json::Value::Object(map) => Ok(Row::from_json_object(map, DEFAULT_ID_KEY)?),
        other => Err(Error::Api(ApiError::parse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        )))),
    }
}

fn rows_from_json(items: Vec<serde_json::Value>) -> Result<Vec<Row>, Error> {
    items.into_iter().map(row_from_json).collect()
}

/// Parses a list body: a bare JSON array or a `{ "data": [...] }` envelope.
///
/// Used for rows loaded from files as well as HTTP responses.
pub fn parse_rows(text: &str) -> Result<Vec<Row>, Error> {
    let body: ListBody =
        serde_json::from_str(text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))?;
    rows_from_json(body.into_parts().0)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
