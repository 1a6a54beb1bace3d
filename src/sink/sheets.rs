use reqwest::blocking::{Client, Response};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::error::{KpiError, Result};
use crate::routes::ClearScope;
use crate::sink::{A1Range, SheetValue, Sink};

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Google Sheets v4 REST client. Authentication is a pre-issued bearer
/// token; obtaining and refreshing it happens elsewhere.
pub struct SheetsSink {
    client: Client,
    token: String,
    base_url: String,
}

impl SheetsSink {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("kpi-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the token from the environment variable named in settings.
    pub fn from_env(var: &str) -> Result<Self> {
        let token = std::env::var(var).map_err(|_| {
            KpiError::Settings(format!("environment variable {var} is not set (Sheets bearer token)"))
        })?;
        Self::new(token)
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| KpiError::Settings(format!("bad Sheets base URL {}: {e}", self.base_url)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| KpiError::Settings(format!("bad Sheets base URL {}", self.base_url)))?;
            path.pop_if_empty();
            for s in segments {
                path.push(s);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

fn check(resp: Response) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_default();
    Err(KpiError::Sheets {
        status: status.as_u16(),
        body,
    })
}

impl Sink for SheetsSink {
    fn append(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        let url = self.endpoint(
            &["spreadsheets", spreadsheet, "values", &format!("{range}:append")],
            &[("valueInputOption", "USER_ENTERED"), ("insertDataOption", "INSERT_ROWS")],
        )?;
        debug!(%url, rows = rows.len(), "sheets append");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()?;
        check(resp)
    }

    fn clear(&mut self, spreadsheet: &str, range: &A1Range, scope: ClearScope) -> Result<()> {
        let resp = match scope {
            ClearScope::Range => {
                let url = self.endpoint(
                    &["spreadsheets", spreadsheet, "values", &format!("{range}:clear")],
                    &[],
                )?;
                debug!(%url, "sheets clear range");
                self.client
                    .post(url)
                    .bearer_auth(&self.token)
                    .json(&json!({}))
                    .send()?
            }
            ClearScope::Sheet { sheet_id } => {
                let url = self.endpoint(&["spreadsheets", &format!("{spreadsheet}:batchUpdate")], &[])?;
                info!(spreadsheet, sheet_id, "clearing sheet values");
                let body = json!({
                    "requests": [{
                        "updateCells": {
                            "range": { "sheetId": sheet_id },
                            "fields": "userEnteredValue"
                        }
                    }]
                });
                self.client
                    .post(url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()?
            }
        };
        check(resp)
    }

    fn write(&mut self, spreadsheet: &str, range: &A1Range, rows: &[Vec<SheetValue>]) -> Result<()> {
        let url = self.endpoint(
            &["spreadsheets", spreadsheet, "values", &range.to_string()],
            &[("valueInputOption", "USER_ENTERED")],
        )?;
        debug!(%url, rows = rows.len(), "sheets write");
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()?;
        check(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_sheet_names() {
        let sink = SheetsSink::new("t").unwrap();
        let range = A1Range::parse("With Orders!A1:Q1").unwrap();
        let url = sink
            .endpoint(
                &["spreadsheets", "abc", "values", &format!("{range}:append")],
                &[("valueInputOption", "USER_ENTERED")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'With%20Orders'!A1:Q1:append?valueInputOption=USER_ENTERED"
        );
    }

    #[test]
    fn test_batch_update_endpoint() {
        let sink = SheetsSink::with_base_url("t", "http://localhost:9/v4/").unwrap();
        let url = sink.endpoint(&["spreadsheets", "abc:batchUpdate"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9/v4/spreadsheets/abc:batchUpdate");
    }

    #[test]
    fn test_from_env_requires_token() {
        let err = SheetsSink::from_env("KPI_RELAY_TEST_TOKEN_THAT_IS_NEVER_SET").err().unwrap();
        assert!(matches!(err, KpiError::Settings(_)));
    }
}
