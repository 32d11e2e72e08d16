use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::batch::run_paced::{run_paced, BatchOptions};
use crate::catalog::ProductRepository;
use crate::scraping::PriceExtractor;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    pub updated: usize,
    pub failed: usize,
}

/// Fill in product images from their retailer pages.
///
/// With `only_missing`, products that already have an image are skipped. Each
/// image is saved as soon as it is found, without touching other fields.
pub async fn update_images(
    repo: Arc<dyn ProductRepository>,
    extractor: &PriceExtractor,
    only_missing: bool,
    options: &BatchOptions,
) -> Result<ImageReport> {
    let products = repo.list().await.context("Failed to load products")?;

    let targets: Vec<(String, String)> = products
        .into_iter()
        .filter(|product| !only_missing || !product.has_image())
        .map(|product| (product.id, product.url))
        .collect();

    let results = run_paced(targets, options, |(id, url)| {
        let repo = repo.clone();
        let extractor = extractor.clone();
        async move {
            let image = match extractor.fetch_image(&url).await {
                Ok(image) => image,
                Err(failure) => {
                    warn!(id = %id, failure = %failure, "No image extracted");
                    return false;
                }
            };

            match repo.set_image(&id, &image).await {
                Ok(true) => {
                    info!(id = %id, image = %image, "Image found");
                    true
                }
                Ok(false) => {
                    warn!(id = %id, "Product removed during image update");
                    false
                }
                Err(e) => {
                    error!(id = %id, error = %e, "Failed to save product image");
                    false
                }
            }
        }
    })
    .await;

    let mut report = ImageReport::default();
    for saved in results {
        if saved {
            report.updated += 1;
        } else {
            report.failed += 1;
        }
    }

    Ok(report)
}
