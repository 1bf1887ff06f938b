//! Fetch-or-create provisioning for the destination dataset and table.
//!
//! Check-then-create is not atomic; two overlapping runs can both see "not
//! found" and race on the create. The scheduler is expected to serialize
//! invocations, so the race is accepted rather than guarded against.

use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::model::{dataset::Dataset, table::Table, table_schema::TableSchema};
use tracing::{debug, info};

use super::{DatasetRef, SinkClient, TableRef};
use crate::error::{PipelineError, Result};

/// Make sure the dataset exists, creating it with default settings if the
/// fetch reports not-found. Any other fetch or create failure is fatal.
pub async fn ensure_dataset(sink: &SinkClient, dataset: &DatasetRef) -> Result<()> {
    match sink.bq.dataset().get(&dataset.project, &dataset.dataset).await {
        Ok(_) => {
            debug!("dataset {dataset} already exists");
            Ok(())
        }
        Err(err) if is_not_found(&err) => {
            sink.bq
                .dataset()
                .create(Dataset::new(&dataset.project, &dataset.dataset))
                .await
                .map_err(|e| provisioning_error(&dataset.to_string(), e))?;
            info!("dataset {dataset} created");
            Ok(())
        }
        Err(err) => Err(provisioning_error(&dataset.to_string(), err)),
    }
}

/// Same pattern for the table, using the schema mapped from the normalized
/// source. An existing table is left untouched; its schema is never diffed
/// or migrated.
pub async fn ensure_table(
    sink: &SinkClient,
    table: &TableRef,
    schema: TableSchema,
) -> Result<()> {
    match sink
        .bq
        .table()
        .get(&table.project, &table.dataset, &table.table, None)
        .await
    {
        Ok(_) => {
            debug!("table {table} already exists");
            Ok(())
        }
        Err(err) if is_not_found(&err) => {
            sink.bq
                .table()
                .create(Table::new(
                    &table.project,
                    &table.dataset,
                    &table.table,
                    schema,
                ))
                .await
                .map_err(|e| provisioning_error(&table.to_string(), e))?;
            info!("table {table} created");
            Ok(())
        }
        Err(err) => Err(provisioning_error(&table.to_string(), err)),
    }
}

fn is_not_found(err: &BQError) -> bool {
    matches!(err, BQError::ResponseError { error } if error.error.code == 404)
}

fn provisioning_error(resource: &str, err: BQError) -> PipelineError {
    PipelineError::Provisioning {
        resource: resource.to_string(),
        detail: err.to_string(),
    }
}
