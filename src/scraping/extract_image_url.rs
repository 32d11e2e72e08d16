use std::sync::LazyLock;

use htmlentity::entity::{decode, ICodedDataTrait};
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::error;

/// Amazon gallery data, tried before any metadata.
const AMAZON_PATTERNS: &[&str] = &[
    r#""hiRes":"([^"]+)""#,
    r#""large":"([^"]+)""#,
    r#"id="landingImage"[^>]*src="([^"]+)""#,
    r#"<img[^>]*id="imgBlkFront"[^>]*src="([^"]+)""#,
];

/// (selector, attribute) pairs tried after the Amazon patterns.
const METADATA_SELECTORS: &[(&str, &str)] = &[
    (r#"meta[property="og:image"]"#, "content"),
    (r#"meta[name="twitter:image"]"#, "content"),
    (r#"meta[property="product:image"]"#, "content"),
    (r#"img[class*="product"]"#, "src"),
];

const PRODUCT_IMG_SRC: &str = r#"(?i)<img[^>]*src="([^"]*product[^"]*\.(?:jpg|jpeg|png|webp))""#;

const AMAZON_SIZE_SEGMENT: &str = r"\._.*?_\.";

#[derive(Debug, Clone, Error)]
pub enum ImageRuleError {
    #[error("invalid image pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid image selector `{selector}`: {reason}")]
    Selector { selector: &'static str, reason: String },
}

struct ImageRules {
    amazon: Vec<Regex>,
    metadata: Vec<(Selector, &'static str)>,
    product_img: Regex,
    amazon_size: Regex,
}

impl ImageRules {
    fn new() -> Result<Self, ImageRuleError> {
        let amazon = AMAZON_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = METADATA_SELECTORS
            .iter()
            .map(|(css, attr)| {
                Selector::parse(css)
                    .map(|selector| (selector, *attr))
                    .map_err(|e| ImageRuleError::Selector {
                        selector: *css,
                        reason: format!("{:?}", e),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            amazon,
            metadata,
            product_img: Regex::new(PRODUCT_IMG_SRC)?,
            amazon_size: Regex::new(AMAZON_SIZE_SEGMENT)?,
        })
    }
}

static IMAGE_RULES: LazyLock<Result<ImageRules, ImageRuleError>> = LazyLock::new(ImageRules::new);

/// Compile the image rules now and report the first broken one.
///
/// Called once at startup so a bad pattern stops the process instead of
/// silently turning every lookup into "no image".
pub fn check_image_rules() -> Result<(), ImageRuleError> {
    IMAGE_RULES.as_ref().map(|_| ()).map_err(Clone::clone)
}

/// Find the main product image of a page.
///
/// Amazon's embedded gallery JSON is checked first, then Open Graph / Twitter /
/// product metadata, then `<img>` tags that look like product shots.
pub fn extract_image_url(html: &str) -> Option<String> {
    let rules = match IMAGE_RULES.as_ref() {
        Ok(rules) => rules,
        Err(e) => {
            error!(error = %e, "Image rules failed to compile");
            return None;
        }
    };

    let found = rules
        .amazon
        .iter()
        .find_map(|regex| capture(regex, html))
        .or_else(|| from_metadata(&rules.metadata, html))
        .or_else(|| capture(&rules.product_img, html))?;

    Some(clean_image_url(&rules.amazon_size, &found))
}

fn capture(regex: &Regex, html: &str) -> Option<String> {
    regex
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn from_metadata(selectors: &[(Selector, &'static str)], html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    selectors.iter().find_map(|(selector, attr)| {
        document
            .select(selector)
            .find_map(|element| element.value().attr(attr))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Decode entities and strip Amazon's `._AC_SX679_.` resize segment.
fn clean_image_url(size_segment: &Regex, raw: &str) -> String {
    let decoded = decode(raw.as_bytes()).to_string().unwrap_or_else(|_| raw.to_string());

    if !decoded.contains("amazon") {
        return decoded;
    }

    size_segment.replace(&decoded, ".").into_owned()
}
