//! BigQuery side of the pipeline: identifiers, schema mapping, dataset/table
//! provisioning and the append load job.

pub mod load;
pub mod provision;
pub mod schema;

use std::fmt;

use gcp_bigquery_client::Client;

use crate::error::{PipelineError, Result};

/// Authorized BigQuery handle for one run. The typed client covers the
/// dataset/table API; the raw token drives the load-job media upload, which
/// the client crate does not model.
pub struct SinkClient {
    pub bq: Client,
    pub project_id: String,
    pub(crate) http: reqwest::Client,
    pub(crate) token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub project: String,
    pub dataset: String,
}

/// Fully qualified `project.dataset.table` destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    /// Parse a dotted identifier. Exactly three non-empty segments; the
    /// dataset reference is the first two.
    pub fn parse(id: &str) -> Result<Self> {
        let parts: Vec<&str> = id.split('.').collect();
        match parts.as_slice() {
            [project, dataset, table]
                if !project.is_empty() && !dataset.is_empty() && !table.is_empty() =>
            {
                Ok(TableRef {
                    project: project.to_string(),
                    dataset: dataset.to_string(),
                    table: table.to_string(),
                })
            }
            _ => Err(PipelineError::Config(format!(
                "table id `{id}` is not of the form project.dataset.table"
            ))),
        }
    }

    pub fn dataset_ref(&self) -> DatasetRef {
        DatasetRef {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
        }
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.dataset)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_segments() {
        let r = TableRef::parse("gsbq-demo.gsbq_dataset.sample_table").unwrap();
        assert_eq!(r.project, "gsbq-demo");
        assert_eq!(r.dataset, "gsbq_dataset");
        assert_eq!(r.table, "sample_table");
        assert_eq!(r.dataset_ref().to_string(), "gsbq-demo.gsbq_dataset");
        assert_eq!(r.to_string(), "gsbq-demo.gsbq_dataset.sample_table");
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "a.b", "a.b.c.d", "a..c", ".b.c", "a.b."] {
            assert!(
                matches!(TableRef::parse(bad), Err(PipelineError::Config(_))),
                "`{bad}` should not parse"
            );
        }
    }
}
