//! Pure Google Sheets v4 REST client.
//!
//! A minimal client for the handful of Sheets operations a row-per-record
//! store needs: read a range, write a range, insert a row at a given index and
//! delete a block of rows. Authenticates with a service-account key or a
//! pre-issued bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheets_client::{Auth, ServiceAccountKey, SheetsClient};
//!
//! let key = ServiceAccountKey::from_file("service-account.json")?;
//! let client = SheetsClient::new(Auth::service_account(key));
//!
//! let rows = client.get_values(spreadsheet_id, "Sheet1!A1:E").await?;
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{Auth, ServiceAccountKey};
pub use error::{Result, SheetsError};
pub use types::{delete_rows_request, insert_row_requests, ValueRange};

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use types::SpreadsheetMeta;

const BASE_URL: &str = "https://sheets.googleapis.com/v4";

pub struct SheetsClient {
    client: reqwest::Client,
    auth: Auth,
    base_url: String,
}

impl SheetsClient {
    pub fn new(auth: Auth) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point at a different API root (emulators, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// `{base}/spreadsheets/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::Config(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Config("base URL cannot have a path".into()))?
            .push("spreadsheets")
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T> {
        let token = self.auth.access_token(&self.client).await?;

        let mut request = self.client.request(method.clone(), url.clone()).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(%method, path = url.path(), status = status.as_u16(), "Sheets API error");
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        resp.json()
            .await
            .map_err(|e| SheetsError::Parse(e.to_string()))
    }

    /// Numeric id of the worksheet tab named `title`.
    pub async fn sheet_id(&self, spreadsheet_id: &str, title: &str) -> Result<i64> {
        let mut url = self.url(&[spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");

        let meta: SpreadsheetMeta = self.call(Method::GET, url, None).await?;

        meta.sheets
            .into_iter()
            .find(|s| s.properties.title == title)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| SheetsError::Config(format!("worksheet not found: {}", title)))
    }

    /// Read a range (A1 notation). Empty ranges yield no rows.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&[spreadsheet_id, "values", range])?;
        let values: ValueRange = self.call(Method::GET, url, None).await?;
        Ok(values.into_string_rows())
    }

    /// Overwrite a range with `rows`, stored verbatim (`RAW`).
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<()> {
        let mut url = self.url(&[spreadsheet_id, "values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });

        let _: Value = self.call(Method::PUT, url, Some(&body)).await?;
        Ok(())
    }

    /// Apply structural requests atomically.
    pub async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<Value>) -> Result<()> {
        let target = format!("{}:batchUpdate", spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = json!({ "requests": requests });
        let _: Value = self.call(Method::POST, url, Some(&body)).await?;
        Ok(())
    }

    /// Insert a row at 0-based `row_index`, shifting later rows down.
    pub async fn insert_row(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        row_index: usize,
        cells: &[String],
    ) -> Result<()> {
        tracing::debug!(sheet_id, row_index, "Inserting row");
        self.batch_update(spreadsheet_id, insert_row_requests(sheet_id, row_index, cells))
            .await
    }

    /// Delete rows `[start_index, end_index)` (0-based), shifting later rows up.
    pub async fn delete_rows(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        start_index: usize,
        end_index: usize,
    ) -> Result<()> {
        tracing::debug!(sheet_id, start_index, end_index, "Deleting rows");
        self.batch_update(
            spreadsheet_id,
            vec![delete_rows_request(sheet_id, start_index, end_index)],
        )
        .await
    }
}
