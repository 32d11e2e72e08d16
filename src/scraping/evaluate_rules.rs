use tracing::debug;

use crate::scraping::classify_domain::Classification;
use crate::scraping::rule_set::{RuleBook, RuleSet};

/// A token captured by one pattern of one rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule_set: String,
    pub pattern_index: usize,
    pub token: String,
}

/// What the evaluator did for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: Option<RuleMatch>,
    /// Rule set names in the order they were run.
    pub attempted: Vec<String>,
}

/// Run the patterns of `rules` in order against `html`.
///
/// Each pattern gets a single leftmost match; the first one whose capture is
/// non-empty after trimming wins.
pub fn first_match(rules: &RuleSet, html: &str) -> Option<RuleMatch> {
    rules
        .patterns()
        .iter()
        .enumerate()
        .find_map(|(index, regex)| {
            let token = regex
                .captures(html)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|token| !token.is_empty())?;

            debug!(rule_set = rules.name(), pattern = index, token = token, "Pattern matched");

            Some(RuleMatch {
                rule_set: rules.name().to_string(),
                pattern_index: index,
                token: token.to_string(),
            })
        })
}

/// Evaluate the classified rule set, then the generic one if it produced nothing.
///
/// Blocked classifications never reach this point; they are treated like
/// `Generic` if they do.
pub fn evaluate_rules(book: &RuleBook, classification: Classification<'_>, html: &str) -> Evaluation {
    let mut attempted = Vec::with_capacity(2);

    if let Classification::Domain(rules) = classification {
        attempted.push(rules.name().to_string());
        if let Some(matched) = first_match(rules, html) {
            return Evaluation {
                matched: Some(matched),
                attempted,
            };
        }
        debug!(rule_set = rules.name(), "Retailer rules exhausted, falling back to generic");
    }

    let generic = book.generic();
    attempted.push(generic.name().to_string());

    Evaluation {
        matched: first_match(generic, html),
        attempted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::classify_domain::classify_domain;

    #[test]
    fn earlier_pattern_wins_over_longer_capture() {
        let rules = RuleSet::new("test", &[r"short=(\d+)", r"long=(\d+)"]).unwrap();
        let html = "long=123456789 short=1";

        let matched = first_match(&rules, html).unwrap();
        assert_eq!(matched.pattern_index, 0);
        assert_eq!(matched.token, "1");
    }

    #[test]
    fn blank_capture_moves_to_next_pattern() {
        let rules = RuleSet::new("test", &[r"<b>([^<]*)</b>", r"<i>([^<]+)</i>"]).unwrap();
        let html = "<b>   </b><i> 12,50 </i>";

        let matched = first_match(&rules, html).unwrap();
        assert_eq!(matched.pattern_index, 1);
        assert_eq!(matched.token, "12,50");
    }

    #[test]
    fn retailer_rules_run_before_generic() {
        let book = RuleBook::builtin().unwrap();
        let html = r#"<div data-current-price="129,00"></div><span class="price">99,00</span>"#;

        let eval = evaluate_rules(&book, classify_domain(&book, "www.thomann.de"), html);
        let matched = eval.matched.unwrap();

        assert_eq!(matched.rule_set, "thomann");
        assert_eq!(matched.token, "129,00");
        assert_eq!(eval.attempted, vec!["thomann"]);
    }

    #[test]
    fn falls_back_to_generic() {
        let book = RuleBook::builtin().unwrap();
        // Agapea rules need a trailing euro sign, the generic span rule does not
        let html = r#"<span class="price-tag">15,20</span>"#;

        let eval = evaluate_rules(&book, classify_domain(&book, "www.agapea.com"), html);

        assert_eq!(eval.attempted, vec!["agapea", "generic"]);
        assert_eq!(eval.matched.unwrap().token, "15,20");
    }

    #[test]
    fn exhaustion_records_both_sets() {
        let book = RuleBook::builtin().unwrap();
        let html = "<html><body>Sin stock</body></html>";

        let eval = evaluate_rules(&book, classify_domain(&book, "www.idealo.es"), html);

        assert!(eval.matched.is_none());
        assert_eq!(eval.attempted, vec!["idealo", "generic"]);
    }
}
