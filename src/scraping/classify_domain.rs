use tracing::debug;
use url::Url;

use crate::scraping::rule_set::{DomainRule, RuleBook, RuleSet};

/// Result of matching a hostname against the [`RuleBook`].
#[derive(Debug, Clone, Copy)]
pub enum Classification<'a> {
    /// A retailer-specific rule set applies; the generic set is still the fallback.
    Domain(&'a RuleSet),
    /// No retailer matched; only the generic set applies.
    Generic,
    /// Known redirector, nothing should be fetched.
    Blocked { fragment: &'a str },
}

/// Lower-cased hostname of `url`, if it has one.
pub fn hostname(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Walk the table top to bottom; the first entry whose fragment is contained in
/// the hostname wins.
pub fn classify_domain<'a>(book: &'a RuleBook, host: &str) -> Classification<'a> {
    let host = host.to_lowercase();

    for entry in book.domains() {
        if !host.contains(entry.fragment()) {
            continue;
        }

        debug!(host = %host, fragment = entry.fragment(), "Domain classified");

        return match entry {
            DomainRule::Scrape { rules, .. } => Classification::Domain(rules),
            DomainRule::Blocked { fragment } => Classification::Blocked { fragment },
        };
    }

    debug!(host = %host, "No retailer matched, using generic rules");
    Classification::Generic
}
