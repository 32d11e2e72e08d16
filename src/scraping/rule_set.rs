//! Per-retailer price patterns.
//!
//! Each [`RuleSet`] is an ordered list of regular expressions with exactly one
//! capture group. The first pattern that captures a non-empty token wins; list
//! position is the only tie-breaker.
//!
//! Retailer markup changes without notice. When a domain stops resolving,
//! capture a page sample, adjust the patterns here and add a fixture test.

use regex::Regex;

/// Name of the catch-all rule set.
pub const GENERIC: &str = "generic";

/// Hosts that only redirect elsewhere and never carry a price.
pub const DEFAULT_BLOCKED_HOSTS: &[&str] = &["share.google"];

const THOMANN: &[&str] = &[
    r#""price":"([0-9]+[.,][0-9]+)""#,
    r#""price":\s*"([0-9]+[.,][0-9]+)""#,
    r#"data-current-price="([0-9]+[.,][0-9]+)""#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*data-price[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)<div[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)currentPrice[^}]*value[^:]*:\s*([0-9]+[.,][0-9]+)"#,
];

const CASA_DEL_LIBRO: &[&str] = &[
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#"(?i)<div[^>]*class="[^"]*precio[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#""price":\s*"?([0-9]+[.,][0-9]+)"?"#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
];

const AGAPEA: &[&str] = &[
    r#"(?i)<span[^>]*id="[^"]*precio[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#"(?i)<div[^>]*class="[^"]*precio[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#""price":\s*"?([0-9]+[.,][0-9]+)"?"#,
];

const GNG: &[&str] = &[
    r#""price":\s*"([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#"data-product-price="([0-9]+[.,][0-9]+)""#,
];

const ZARA: &[&str] = &[
    r#""price":\s*([0-9]+)"#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
];

const COLD_CULTURE: &[&str] = &[
    r#""price":\s*"([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"data-product-price="([0-9]+[.,][0-9]+)""#,
];

const GAME: &[&str] = &[
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)\s*€"#,
    r#""price":\s*"?([0-9]+[.,][0-9]+)"?"#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
];

const PC_COMPONENTES: &[&str] = &[
    r#""price":"([0-9]+[.,][0-9]+)""#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*id="[^"]*precio[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)<div[^>]*class="[^"]*precio[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)precio-actual[^>]*>\s*([0-9]+[.,][0-9]+)"#,
];

const IDEALO: &[&str] = &[
    r#""price":"([0-9]+[.,][0-9]+)""#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)bestPrice[^}]*amount[^:]*:\s*([0-9]+[.,][0-9]+)"#,
];

const AMAZON: &[&str] = &[
    r#"<span class="a-price-whole">([^<]+)</span>"#,
    r#"<span class="a-offscreen">([^<]+)</span>"#,
    r#""priceAmount":([0-9.,]+)"#,
    r#"data-a-color="price">([^<]+)<"#,
];

const GENERIC_PATTERNS: &[&str] = &[
    r#""price":"([0-9]+[.,][0-9]+)""#,
    r#""price":\s*"?([0-9]+[.,][0-9]+)"?"#,
    r#"data-price="([0-9]+[.,][0-9]+)""#,
    r#"(?i)<span[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)<div[^>]*class="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)<span[^>]*id="[^"]*price[^"]*"[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)precio[^>]*>\s*([0-9]+[.,][0-9]+)"#,
    r#"(?i)price[^>]*>\s*([0-9]+[.,][0-9]+)"#,
];

/// Retailers in classification order: (rule set name, host fragment, patterns).
const RETAILERS: &[(&str, &str, &[&str])] = &[
    ("thomann", "thomann", THOMANN),
    ("casadellibro", "casadellibro", CASA_DEL_LIBRO),
    ("agapea", "agapea", AGAPEA),
    ("gng", "gng.la", GNG),
    ("zara", "zara.com", ZARA),
    ("coldculture", "coldculture", COLD_CULTURE),
    ("game", "game.es", GAME),
    ("pccomponentes", "pccomponentes", PC_COMPONENTES),
    ("idealo", "idealo", IDEALO),
    ("amazon", "amazon", AMAZON),
];

/// An ordered list of compiled patterns for one retailer (or the generic fallback).
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    patterns: Vec<Regex>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            patterns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One entry of the classification table.
#[derive(Debug, Clone)]
pub enum DomainRule {
    /// Hosts containing the fragment are scraped with the rule set.
    Scrape { fragment: String, rules: RuleSet },
    /// Hosts containing the fragment are refused without fetching.
    Blocked { fragment: String },
}

impl DomainRule {
    pub fn fragment(&self) -> &str {
        match self {
            DomainRule::Scrape { fragment, .. } | DomainRule::Blocked { fragment } => fragment,
        }
    }
}

/// The full classification table plus the generic fallback.
#[derive(Debug, Clone)]
pub struct RuleBook {
    domains: Vec<DomainRule>,
    generic: RuleSet,
}

impl RuleBook {
    /// Build the table shipped with the application.
    pub fn builtin() -> Result<Self, regex::Error> {
        let mut domains = Vec::with_capacity(RETAILERS.len() + DEFAULT_BLOCKED_HOSTS.len());

        for (name, fragment, patterns) in RETAILERS {
            domains.push(DomainRule::Scrape {
                fragment: fragment.to_string(),
                rules: RuleSet::new(*name, patterns)?,
            });
        }

        for host in DEFAULT_BLOCKED_HOSTS {
            domains.push(DomainRule::Blocked {
                fragment: host.to_string(),
            });
        }

        Ok(Self {
            domains,
            generic: RuleSet::new(GENERIC, GENERIC_PATTERNS)?,
        })
    }

    /// Build a table from explicit parts. Order of `domains` is the check order.
    pub fn new(domains: Vec<DomainRule>, generic: RuleSet) -> Self {
        Self { domains, generic }
    }

    /// Append extra blocked host fragments after the built-in entries.
    /// Fragments already present are ignored.
    pub fn with_blocked_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for host in hosts {
            let fragment = host.into().trim().to_lowercase();
            if fragment.is_empty() || self.domains.iter().any(|d| d.fragment() == fragment) {
                continue;
            }
            self.domains.push(DomainRule::Blocked { fragment });
        }
        self
    }

    pub fn domains(&self) -> &[DomainRule] {
        &self.domains
    }

    pub fn generic(&self) -> &RuleSet {
        &self.generic
    }

    /// Look up a domain rule set by name.
    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        if name == GENERIC {
            return Some(&self.generic);
        }
        self.domains.iter().find_map(|d| match d {
            DomainRule::Scrape { rules, .. } if rules.name() == name => Some(rules),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_compiles_in_order() {
        let book = RuleBook::builtin().unwrap();
        let fragments: Vec<&str> = book.domains().iter().map(|d| d.fragment()).collect();

        assert_eq!(
            fragments,
            vec![
                "thomann",
                "casadellibro",
                "agapea",
                "gng.la",
                "zara.com",
                "coldculture",
                "game.es",
                "pccomponentes",
                "idealo",
                "amazon",
                "share.google",
            ]
        );
        assert_eq!(book.generic().len(), 8);
        assert_eq!(book.rule_set("thomann").unwrap().len(), 7);
    }

    #[test]
    fn every_pattern_has_one_capture_group() {
        let book = RuleBook::builtin().unwrap();
        let sets = book
            .domains()
            .iter()
            .filter_map(|d| match d {
                DomainRule::Scrape { rules, .. } => Some(rules),
                DomainRule::Blocked { .. } => None,
            })
            .chain(std::iter::once(book.generic()));

        for set in sets {
            for pattern in set.patterns() {
                // captures_len counts the implicit whole-match group
                assert_eq!(pattern.captures_len(), 2, "{} / {}", set.name(), pattern);
            }
        }
    }

    #[test]
    fn extra_blocked_hosts_are_appended_once() {
        let book = RuleBook::builtin()
            .unwrap()
            .with_blocked_hosts(["bit.ly", " Share.Google ", ""]);

        let blocked: Vec<&str> = book
            .domains()
            .iter()
            .filter(|d| matches!(d, DomainRule::Blocked { .. }))
            .map(|d| d.fragment())
            .collect();

        assert_eq!(blocked, vec!["share.google", "bit.ly"]);
    }
}
