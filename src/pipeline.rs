//! One sequential run: authenticate, read, normalize, provision, load.
//!
//! Every stage is blocking with respect to the next and any error aborts the
//! remainder. There is no retry or resume; the scheduler decides whether to
//! invoke again.

use tracing::info;

use crate::auth;
use crate::bq::{load, provision, schema, TableRef};
use crate::config::Config;
use crate::error::Result;
use crate::table::NormalizedTable;

pub async fn run(cfg: &Config) -> Result<()> {
    let dest = TableRef::parse(&cfg.table_id)?;

    info!(key = %cfg.credentials_path.display(), "authenticating");
    let (sheets, sink) = auth::authenticate(&cfg.credentials_path).await?;

    info!(spreadsheet = %cfg.spreadsheet_id, range = %cfg.range, "reading source range");
    let grid = sheets.read_range(&cfg.spreadsheet_id, &cfg.range).await?;

    let table = NormalizedTable::from_grid(grid)?;
    info!(
        rows = table.row_count,
        columns = table.columns.len(),
        "normalized source grid"
    );

    provision::ensure_dataset(&sink, &dest.dataset_ref()).await?;
    provision::ensure_table(&sink, &dest, schema::table_schema(&table)).await?;

    load::append_rows(&sink, &table, &dest).await?;
    info!(table = %dest, "run complete");
    Ok(())
}
