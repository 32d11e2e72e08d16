use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use csv_async::AsyncWriterBuilder;
use tokio::fs::File as AsyncFile;
use tokio::io::BufWriter;

use crate::batch::update_prices::BatchReport;

/// Write one CSV line per product of a batch run.
pub async fn write_report(report: &BatchReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = AsyncFile::create(path)
        .await
        .with_context(|| format!("Failed to create report {}", path.display()))?;

    let mut csv_writer = AsyncWriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .double_quote(true)
        .create_writer(BufWriter::new(file));

    csv_writer
        .write_record(&["id", "name", "url", "old_price", "new_price", "status", "failure", "checked_at"])
        .await?;

    for item in &report.outcomes {
        let checked_at = item.checked_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        csv_writer
            .write_record(&[
                item.id.as_str(),
                item.name.as_str(),
                item.url.as_str(),
                item.old_price.as_deref().unwrap_or_default(),
                item.new_price.as_deref().unwrap_or_default(),
                item.status.as_str(),
                item.failure.as_deref().unwrap_or_default(),
                checked_at.as_str(),
            ])
            .await?;
    }

    csv_writer.flush().await.context("Failed to flush report")?;

    Ok(())
}
