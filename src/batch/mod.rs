//! Batch drivers over the whole catalog.

pub mod run_paced;
pub mod update_images;
pub mod update_prices;
pub mod write_report;

pub use run_paced::{run_paced, BatchOptions};
pub use update_images::{update_images, ImageReport};
pub use update_prices::{print_summary, update_prices, BatchReport, OutcomeStatus, PriceOutcome, Selection};
pub use write_report::write_report;
