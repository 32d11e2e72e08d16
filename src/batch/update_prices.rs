use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::batch::run_paced::{run_paced, BatchOptions};
use crate::catalog::{Product, ProductRepository};
use crate::scraping::PriceExtractor;

/// Which products a batch run touches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", content = "ids", rename_all = "kebab-case")]
pub enum Selection {
    All,
    #[serde(rename = "no-price")]
    WithoutPrice,
    #[serde(rename = "select")]
    Selected(Vec<String>),
}

impl Selection {
    pub fn includes(&self, product: &Product) -> bool {
        match self {
            Selection::All => true,
            Selection::WithoutPrice => !product.has_price(),
            Selection::Selected(ids) => ids.iter().any(|id| id == &product.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Updated,
    Unchanged,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Updated => "updated",
            OutcomeStatus::Unchanged => "unchanged",
            OutcomeStatus::Failed => "failed",
        }
    }
}

/// Per-product result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceOutcome {
    pub id: String,
    pub name: String,
    pub url: String,
    pub old_price: Option<String>,
    pub new_price: Option<String>,
    pub status: OutcomeStatus,
    pub checked_at: DateTime<Utc>,
    /// Failure kind when status is failed: `fetch_failed`, `blocked` or `no_match`
    /// from extraction, `removed` or `storage` when the new price could not be saved.
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub outcomes: Vec<PriceOutcome>,
}

impl BatchReport {
    fn record(&mut self, outcome: PriceOutcome) {
        match outcome.status {
            OutcomeStatus::Updated => self.updated += 1,
            OutcomeStatus::Unchanged => self.unchanged += 1,
            OutcomeStatus::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Re-extract the price of every selected product and persist the changes.
///
/// Each new price is written to `repo` as soon as it is extracted, touching only
/// that product's price, so edits made to the catalog while the batch runs are
/// kept and an interrupted run keeps the prices it already found. Failed
/// extractions leave the stored price untouched.
pub async fn update_prices(
    repo: Arc<dyn ProductRepository>,
    extractor: &PriceExtractor,
    selection: &Selection,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let products = repo.list().await.context("Failed to load products")?;
    let total = products.len();

    let targets: Vec<Product> = products
        .into_iter()
        .filter(|product| selection.includes(product))
        .collect();

    info!(selected = targets.len(), total, "Starting price update");

    let outcomes = run_paced(targets, options, |product| {
        let repo = repo.clone();
        let extractor = extractor.clone();
        async move { check_price(repo.as_ref(), &extractor, product).await }
    })
    .await;

    let mut report = BatchReport::default();
    for outcome in outcomes {
        report.record(outcome);
    }

    info!(
        updated = report.updated,
        unchanged = report.unchanged,
        failed = report.failed,
        "Price update finished"
    );

    Ok(report)
}

async fn check_price(repo: &dyn ProductRepository, extractor: &PriceExtractor, product: Product) -> PriceOutcome {
    let result = extractor.fetch_price(&product.url).await;
    let checked_at = Utc::now();
    let old_price = product.price.clone();

    let found = match result {
        Ok(found) => found.normalized_price,
        Err(failure) => {
            let kind = failure.kind().to_string();
            return build_outcome(&product, old_price, None, OutcomeStatus::Failed, Some(kind), checked_at);
        }
    };

    if old_price.as_deref() == Some(found.as_str()) {
        return build_outcome(&product, old_price, Some(found), OutcomeStatus::Unchanged, None, checked_at);
    }

    match repo.set_price(&product.id, &found).await {
        Ok(true) => build_outcome(&product, old_price, Some(found), OutcomeStatus::Updated, None, checked_at),
        Ok(false) => {
            warn!(id = %product.id, "Product removed during price update");
            build_outcome(
                &product,
                old_price,
                Some(found),
                OutcomeStatus::Failed,
                Some("removed".to_string()),
                checked_at,
            )
        }
        Err(e) => {
            error!(id = %product.id, error = %e, "Failed to save updated price");
            build_outcome(
                &product,
                old_price,
                Some(found),
                OutcomeStatus::Failed,
                Some("storage".to_string()),
                checked_at,
            )
        }
    }
}

fn build_outcome(
    product: &Product,
    old_price: Option<String>,
    new_price: Option<String>,
    status: OutcomeStatus,
    failure: Option<String>,
    checked_at: DateTime<Utc>,
) -> PriceOutcome {
    PriceOutcome {
        id: product.id.clone(),
        name: product.name.clone(),
        url: product.url.clone(),
        old_price,
        new_price,
        status,
        checked_at,
        failure,
    }
}

/// Console summary for the CLI.
pub fn print_summary(report: &BatchReport) {
    for (position, item) in report.outcomes.iter().enumerate() {
        println!("[{}/{}] {}", position + 1, report.outcomes.len(), item.name);
        println!("  URL: {}", item.url);

        let old = item.old_price.as_deref().unwrap_or("Sin precio");
        match item.status {
            OutcomeStatus::Updated => println!(
                "{}",
                format!("  Price updated: {} -> {}", old, item.new_price.as_deref().unwrap_or_default()).green()
            ),
            OutcomeStatus::Unchanged => println!("{}", format!("  Price unchanged: {}", old).yellow()),
            OutcomeStatus::Failed => println!(
                "{}",
                format!(
                    "  Could not extract price ({})",
                    item.failure.as_deref().unwrap_or("unknown")
                )
                .red()
            ),
        }
    }

    println!();
    println!("{}", format!("Prices updated: {}", report.updated).green());
    println!("{}", format!("Unchanged: {}", report.unchanged).yellow());
    println!("{}", format!("Failed: {}", report.failed).red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_from_json() {
        let all: Selection = serde_json::from_str(r#"{"mode": "all"}"#).unwrap();
        let missing: Selection = serde_json::from_str(r#"{"mode": "no-price"}"#).unwrap();
        let some: Selection = serde_json::from_str(r#"{"mode": "select", "ids": ["1", "3"]}"#).unwrap();

        assert_eq!(all, Selection::All);
        assert_eq!(missing, Selection::WithoutPrice);
        assert_eq!(some, Selection::Selected(vec!["1".to_string(), "3".to_string()]));
    }
}
