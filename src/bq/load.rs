//! Append load job: rows go up as newline-delimited JSON through the media
//! upload endpoint, then we poll the job until it reaches a terminal state.
//!
//! The job runs with `autodetect: true`, so BigQuery infers its own schema
//! for the payload independently of the one used at table creation. The two
//! can diverge for malformed columns; when they do, the job fails and the
//! remote error detail is surfaced as-is.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use tokio::time::sleep;
use tracing::{debug, info};

use super::{SinkClient, TableRef};
use crate::error::{PipelineError, Result};
use crate::table::{Column, ColumnValues, NormalizedTable};

const UPLOAD_ENDPOINT: &str = "https://bigquery.googleapis.com/upload/bigquery/v2";
const JOBS_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: Option<JobReference>,
    status: Option<JobStatus>,
    statistics: Option<JobStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    state: String,
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorProto {
    reason: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatistics {
    load: Option<LoadStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStatistics {
    // int64 fields come back as decimal strings
    output_rows: Option<String>,
}

/// Submit one append-only load job for the whole table and block until the
/// remote job finishes. Strictly additive: existing rows are never touched.
pub async fn append_rows(
    sink: &SinkClient,
    table: &NormalizedTable,
    dest: &TableRef,
) -> Result<()> {
    let payload = encode_rows(table);
    let boundary = boundary();
    let body = multipart_body(&boundary, &job_config(dest).to_string(), &payload);
    // the job runs under the credential's project, wherever the table lives
    let url = format!(
        "{UPLOAD_ENDPOINT}/projects/{}/jobs?uploadType=multipart",
        sink.project_id
    );

    debug!(rows = table.row_count, "submitting load job");
    let resp = sink
        .http
        .post(&url)
        .bearer_auth(&sink.token)
        .header(
            CONTENT_TYPE,
            format!("multipart/related; boundary={boundary}"),
        )
        .body(body)
        .send()
        .await
        .map_err(|e| PipelineError::LoadJob(e.to_string()))?;

    let job = read_job(resp).await?;
    let job_ref = job
        .job_reference
        .ok_or_else(|| PipelineError::LoadJob("job response carried no job reference".into()))?;

    let done = wait_for_completion(sink, &job_ref).await?;
    if let Some(err) = done.status.as_ref().and_then(|s| s.error_result.as_ref()) {
        return Err(PipelineError::LoadJob(format!(
            "job {}: {} ({})",
            job_ref.job_id,
            err.message.as_deref().unwrap_or("no message"),
            err.reason.as_deref().unwrap_or("no reason"),
        )));
    }

    let loaded = done
        .statistics
        .and_then(|s| s.load)
        .and_then(|l| l.output_rows)
        .unwrap_or_else(|| "0".to_string());
    info!(job_id = %job_ref.job_id, rows = %loaded, "load job finished");
    Ok(())
}

async fn wait_for_completion(sink: &SinkClient, job_ref: &JobReference) -> Result<Job> {
    let url = format!(
        "{JOBS_ENDPOINT}/projects/{}/jobs/{}",
        sink.project_id, job_ref.job_id
    );
    // bounded only by the remote job lifetime; the scheduler owns any timeout
    loop {
        let mut req = sink.http.get(&url).bearer_auth(&sink.token);
        if let Some(location) = &job_ref.location {
            req = req.query(&[("location", location)]);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| PipelineError::LoadJob(e.to_string()))?;
        let job = read_job(resp).await?;

        match job.status.as_ref().map(|s| s.state.as_str()) {
            Some("DONE") => return Ok(job),
            state => {
                debug!(job_id = %job_ref.job_id, state = ?state, "load job still running");
                sleep(POLL_INTERVAL).await;
            }
        }
    }
}

async fn read_job(resp: reqwest::Response) -> Result<Job> {
    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().await.unwrap_or_default();
        return Err(PipelineError::LoadJob(format!("{status}: {detail}")));
    }
    resp.json::<Job>()
        .await
        .map_err(|e| PipelineError::LoadJob(format!("decoding job response: {e}")))
}

fn job_config(dest: &TableRef) -> Value {
    json!({
        "configuration": {
            "load": {
                "destinationTable": {
                    "projectId": dest.project,
                    "datasetId": dest.dataset,
                    "tableId": dest.table,
                },
                "sourceFormat": "NEWLINE_DELIMITED_JSON",
                "autodetect": true,
                "writeDisposition": "WRITE_APPEND",
            }
        }
    })
}

/// One JSON object per row; empty cells omit their key. A zero-row table
/// encodes to an empty payload, which still makes a valid (no-op) job.
pub(crate) fn encode_rows(table: &NormalizedTable) -> String {
    let mut out = String::new();
    for row in 0..table.row_count {
        let mut obj = Map::new();
        for col in &table.columns {
            if let Some(value) = cell_value(col, row) {
                obj.insert(col.name.clone(), value);
            }
        }
        out.push_str(&Value::Object(obj).to_string());
        out.push('\n');
    }
    out
}

fn cell_value(col: &Column, row: usize) -> Option<Value> {
    match &col.values {
        ColumnValues::Integer(v) => v[row].map(|n| Value::Number(n.into())),
        // non-finite floats have no JSON form; they load as NULL
        ColumnValues::Float(v) => v[row]
            .map(|f| Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)),
        ColumnValues::Boolean(v) => v[row].map(Value::Bool),
        ColumnValues::Date(v) => v[row].map(|d| Value::String(d.to_string())),
        ColumnValues::DateTime(v) => {
            v[row].map(|dt| Value::String(dt.format(DATETIME_FORMAT).to_string()))
        }
        ColumnValues::Text(v) => v[row].as_ref().map(|s| Value::String(s.clone())),
    }
}

static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

/// Fresh boundary per submission so cell text can never echo the framing.
fn boundary() -> String {
    let seq = JOB_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "sheetsink_{}_{}_{seq}",
        std::process::id(),
        Utc::now().timestamp_micros()
    )
}

fn multipart_body(boundary: &str, config: &str, payload: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {config}\r\n\
         --{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {payload}\r\n\
         --{boundary}--"
    )
}
