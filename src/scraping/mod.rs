//! Price extraction from retailer product pages.

pub mod classify_domain;
pub mod error;
pub mod evaluate_rules;
pub mod extract_image_url;
pub mod fetch_page;
pub mod fetch_price;
pub mod normalize_price;
pub mod rule_set;
pub mod static_fetcher;

pub use error::{ExtractionFailure, FetchError};
pub use fetch_page::{HttpFetcher, PageFetcher};
pub use fetch_price::{ExtractionResult, PriceExtractor};
pub use rule_set::{RuleBook, RuleSet};
pub use static_fetcher::StaticFetcher;
