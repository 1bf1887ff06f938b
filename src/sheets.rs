//! Reads the raw cell grid from a Google Sheets named range.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{PipelineError, Result};
use crate::table::RawGrid;

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Authorized read-only handle on the Sheets API, valid for one run.
pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
}

/// Shape of a `values.get` response. The server omits `values` entirely for
/// an empty range, and drops trailing empty cells within rows.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsClient {
    pub(crate) fn new(http: reqwest::Client, token: String) -> Self {
        SheetsClient { http, token }
    }

    /// Fetch the full grid for `range` (typically a sheet name). An empty or
    /// missing range comes back as a zero-row grid, not an error.
    pub async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<RawGrid> {
        let url = values_url(spreadsheet_id, range)?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PipelineError::SourceUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(PipelineError::SourceUnavailable(format!(
                "{status}: {detail}"
            )));
        }

        let value_range: ValueRange = resp
            .json()
            .await
            .map_err(|e| PipelineError::SourceUnavailable(format!("decoding response: {e}")))?;
        debug!(rows = value_range.values.len(), "fetched source grid");
        Ok(value_range.values)
    }
}

fn values_url(spreadsheet_id: &str, range: &str) -> Result<Url> {
    let mut url = Url::parse(SHEETS_ENDPOINT)
        .map_err(|e| PipelineError::SourceUnavailable(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| PipelineError::SourceUnavailable("invalid sheets endpoint".into()))?
        .extend([spreadsheet_id, "values", range]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_with_rows_deserializes() {
        let vr: ValueRange = serde_json::from_str(
            r#"{"range":"Sheet1!A1:C2","majorDimension":"ROWS",
                "values":[["id","name"],["1","Ann"]]}"#,
        )
        .unwrap();
        assert_eq!(vr.values.len(), 2);
        assert_eq!(vr.values[0][1], "name");
    }

    #[test]
    fn missing_values_field_means_empty_grid() {
        let vr: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!A1:Z1000"}"#).unwrap();
        assert!(vr.values.is_empty());
    }

    #[test]
    fn range_is_escaped_into_the_path() {
        let url = values_url("abc123", "My Sheet").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/My%20Sheet"
        );
    }
}
