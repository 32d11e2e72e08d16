use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use wishlist_prices::scraping::rule_set::DomainRule;
use wishlist_prices::scraping::{ExtractionFailure, PriceExtractor, RuleBook, RuleSet, StaticFetcher};

fn extractor(fetcher: &StaticFetcher) -> PriceExtractor {
    PriceExtractor::new(RuleBook::builtin().unwrap(), Arc::new(fetcher.clone()))
}

/// (url, page, expected price, rule set, pattern index)
const FIXTURES: &[(&str, &str, &str, &str, usize)] = &[
    (
        "https://www.thomann.de/es/harley_benton_sc_450.htm",
        r#"<script>window.product = {"price":"349.00"};</script>"#,
        "349,00€",
        "thomann",
        0,
    ),
    (
        "https://www.casadellibro.com/libro-el-nombre-del-viento/9788401352836/1154371",
        r#"<span class="final-price">18,90 €</span>"#,
        "18,90€",
        "casadellibro",
        0,
    ),
    (
        "https://www.agapea.com/libros/la-historia-interminable-9788420482880-i.htm",
        r#"<span id="precio-libro">21,75 €</span>"#,
        "21,75€",
        "agapea",
        0,
    ),
    (
        "https://gng.la/products/camiseta",
        r#"<button data-product-price="45.00">Comprar</button>"#,
        "45,00€",
        "gng",
        2,
    ),
    (
        "https://www.zara.com/es/es/chaqueta-p0001.html",
        r#"<span class="money-amount price-current">39,95 €</span>"#,
        "39,95€",
        "zara",
        2,
    ),
    (
        "https://coldculture.com/products/hoodie",
        r#"{"offers": {"price": "65.00"}}"#,
        "65,00€",
        "coldculture",
        0,
    ),
    (
        "https://www.game.es/videojuegos/ps5/zelda",
        r#"<span class="buy--price">59,99 €</span>"#,
        "59,99€",
        "game",
        0,
    ),
    (
        "https://www.pccomponentes.com/teclado-mecanico",
        r#"<span id="precio-main">89,90</span>"#,
        "89,90€",
        "pccomponentes",
        2,
    ),
    (
        "https://www.idealo.es/precios/123.html",
        r#"{"bestPrice":{"currency":"EUR","amount": 42.50}}"#,
        "42,50€",
        "idealo",
        3,
    ),
    (
        "https://www.amazon.es/dp/B0ABC12345",
        r#"<span class="a-price-whole">1.299,</span><span class="a-price-fraction">00</span>"#,
        "1299€",
        "amazon",
        0,
    ),
];

#[tokio::test]
async fn every_retailer_fixture_resolves() {
    let fetcher = FIXTURES
        .iter()
        .fold(StaticFetcher::new(), |fetcher, (url, html, ..)| fetcher.with_page(url, *html));
    let extractor = extractor(&fetcher);

    for (url, _, price, rule_set, pattern_index) in FIXTURES {
        let found = extractor
            .fetch_price(url)
            .await
            .unwrap_or_else(|e| panic!("{}: {}", url, e));

        assert_eq!(found.normalized_price, *price, "{}", url);
        assert_eq!(found.rule_set, *rule_set, "{}", url);
        assert_eq!(found.pattern_index, *pattern_index, "{}", url);
    }

    assert_eq!(fetcher.call_count(), FIXTURES.len());
}

/// One page per (rule set, pattern) that only the given pattern can resolve:
/// (rule set, url, page, expected price, pattern index).
const PATTERN_FIXTURES: &[(&str, &str, &str, &str, usize)] = &[
    ("thomann", "https://www.thomann.de/es/a.htm", r#"{"price":"349.00"}"#, "349,00€", 0),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"{"price": "349.00"}"#, "349,00€", 1),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"<div data-current-price="129,00"></div>"#, "129,00€", 2),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"<button data-price="99,00">Comprar</button>"#, "99,00€", 3),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"<span data-price-label>75,50</span>"#, "75,50€", 4),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"<div class="price-box">45,00</div>"#, "45,00€", 5),
    ("thomann", "https://www.thomann.de/es/a.htm", r#"{"currentPrice":{"value": 59.90}}"#, "59,90€", 6),
    ("casadellibro", "https://www.casadellibro.com/libro/1", r#"<span class="final-price">18,90 €</span>"#, "18,90€", 0),
    ("casadellibro", "https://www.casadellibro.com/libro/1", r#"<div class="precio">9,45 €</div>"#, "9,45€", 1),
    ("casadellibro", "https://www.casadellibro.com/libro/1", r#"{"price": 21.50}"#, "21,50€", 2),
    ("casadellibro", "https://www.casadellibro.com/libro/1", r#"<div data-price="12,00"></div>"#, "12,00€", 3),
    ("agapea", "https://www.agapea.com/libros/1", r#"<span id="precio-libro">21,75 €</span>"#, "21,75€", 0),
    ("agapea", "https://www.agapea.com/libros/1", r#"<div class="precio-final">19,00 €</div>"#, "19,00€", 1),
    ("agapea", "https://www.agapea.com/libros/1", r#"{"price": "17.10"}"#, "17,10€", 2),
    ("gng", "https://gng.la/products/1", r#"{"price": "45.00"}"#, "45,00€", 0),
    ("gng", "https://gng.la/products/1", r#"<span class="price-item">39,00 €</span>"#, "39,00€", 1),
    ("gng", "https://gng.la/products/1", r#"<button data-product-price="45.00">Comprar</button>"#, "45,00€", 2),
    ("zara", "https://www.zara.com/es/es/p1.html", r#"{"price": 2995}"#, "2995€", 0),
    ("zara", "https://www.zara.com/es/es/p1.html", r#"<div data-price="39.95"></div>"#, "39,95€", 1),
    ("zara", "https://www.zara.com/es/es/p1.html", r#"<span class="money-amount price-current">39,95 €</span>"#, "39,95€", 2),
    ("coldculture", "https://coldculture.com/products/1", r#"{"price": "65.00"}"#, "65,00€", 0),
    ("coldculture", "https://coldculture.com/products/1", r#"<span class="price">70,00</span>"#, "70,00€", 1),
    ("coldculture", "https://coldculture.com/products/1", r#"<button data-product-price="80.00">Comprar</button>"#, "80,00€", 2),
    ("game", "https://www.game.es/producto/1", r#"<span class="buy--price">59,99 €</span>"#, "59,99€", 0),
    ("game", "https://www.game.es/producto/1", r#"{"price": 49.95}"#, "49,95€", 1),
    ("game", "https://www.game.es/producto/1", r#"<div data-price="29,95"></div>"#, "29,95€", 2),
    ("pccomponentes", "https://www.pccomponentes.com/teclado", r#"{"price":"899.00"}"#, "899,00€", 0),
    ("pccomponentes", "https://www.pccomponentes.com/teclado", r#"<div data-price="899.00"></div>"#, "899,00€", 1),
    ("pccomponentes", "https://www.pccomponentes.com/teclado", r#"<span id="precio-main">89,90</span>"#, "89,90€", 2),
    ("pccomponentes", "https://www.pccomponentes.com/teclado", r#"<div class="precio-main">79,90</div>"#, "79,90€", 3),
    ("pccomponentes", "https://www.pccomponentes.com/teclado", r#"<p data-role="precio-actual">69,90</p>"#, "69,90€", 4),
    ("idealo", "https://www.idealo.es/precios/1.html", r#"{"price":"42.50"}"#, "42,50€", 0),
    ("idealo", "https://www.idealo.es/precios/1.html", r#"<div data-price="42.50"></div>"#, "42,50€", 1),
    ("idealo", "https://www.idealo.es/precios/1.html", r#"<span class="price">42,50</span>"#, "42,50€", 2),
    ("idealo", "https://www.idealo.es/precios/1.html", r#"{"bestPrice":{"currency":"EUR","amount": 42.50}}"#, "42,50€", 3),
    ("amazon", "https://www.amazon.es/dp/B0ABC12345", r#"<span class="a-price-whole">1.299,</span>"#, "1299€", 0),
    ("amazon", "https://www.amazon.es/dp/B0ABC12345", r#"<span class="a-offscreen">24,99 €</span>"#, "24,99€", 1),
    ("amazon", "https://www.amazon.es/dp/B0ABC12345", r#"{"priceAmount":24.99}"#, "24,99€", 2),
    ("amazon", "https://www.amazon.es/dp/B0ABC12345", r#"<span data-a-color="price">19,99 €</span>"#, "19,99€", 3),
    ("generic", "https://tienda.example.com/p/1", r#"{"price":"19.99"}"#, "19,99€", 0),
    ("generic", "https://tienda.example.com/p/1", r#"{"price": 19.99}"#, "19,99€", 1),
    ("generic", "https://tienda.example.com/p/1", r#"<div data-price="19,99"></div>"#, "19,99€", 2),
    ("generic", "https://tienda.example.com/p/1", r#"<span class="price">19,99</span>"#, "19,99€", 3),
    ("generic", "https://tienda.example.com/p/1", r#"<div class="price">19,99</div>"#, "19,99€", 4),
    ("generic", "https://tienda.example.com/p/1", r#"<span id="price-now">19,99</span>"#, "19,99€", 5),
    ("generic", "https://tienda.example.com/p/1", r#"<p class="precio">19,99</p>"#, "19,99€", 6),
    ("generic", "https://tienda.example.com/p/1", r#"<p class="price">19,99</p>"#, "19,99€", 7),
];

#[test]
fn every_builtin_pattern_resolves_its_own_fixture() {
    let extractor = extractor(&StaticFetcher::new());

    for (rule_set, url, html, price, pattern_index) in PATTERN_FIXTURES {
        let found = extractor
            .extract_from_html(url, html)
            .unwrap_or_else(|e| panic!("{} #{}: {}", rule_set, pattern_index, e));

        assert_eq!(found.rule_set, *rule_set, "{}", html);
        assert_eq!(found.pattern_index, *pattern_index, "{}", html);
        assert_eq!(found.normalized_price, *price, "{}", html);
    }

    let mut covered: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for (rule_set, _, _, _, pattern_index) in PATTERN_FIXTURES {
        covered.entry(*rule_set).or_default().insert(*pattern_index);
    }

    let book = RuleBook::builtin().unwrap();
    let mut sets: Vec<&RuleSet> = book
        .domains()
        .iter()
        .filter_map(|domain| match domain {
            DomainRule::Scrape { rules, .. } => Some(rules),
            DomainRule::Blocked { .. } => None,
        })
        .collect();
    sets.push(book.generic());

    for set in sets {
        let indices = covered.get(set.name()).cloned().unwrap_or_default();
        assert_eq!(
            indices,
            (0..set.len()).collect::<BTreeSet<_>>(),
            "patterns of {} without a fixture",
            set.name()
        );
    }
}

#[tokio::test]
async fn unknown_domain_uses_generic_rules() {
    let url = "https://tienda.example.com/producto/42";
    let fetcher = StaticFetcher::new().with_page(url, r#"<div class="product-price">24.95</div>"#);

    let found = extractor(&fetcher).fetch_price(url).await.unwrap();

    assert_eq!(found.normalized_price, "24,95€");
    assert_eq!(found.rule_set, "generic");
}

#[tokio::test]
async fn retailer_without_match_falls_back_to_generic() {
    let url = "https://www.thomann.de/es/cable.htm";
    let fetcher = StaticFetcher::new().with_page(url, r#"<p class="precio">12,50</p>"#);

    let found = extractor(&fetcher).fetch_price(url).await.unwrap();

    assert_eq!(found.rule_set, "generic");
    assert_eq!(found.normalized_price, "12,50€");
}

#[tokio::test]
async fn first_listed_pattern_beats_later_ones() {
    let url = "https://www.thomann.de/es/some_guitar.htm";
    let html = r#"<div data-current-price="129,00"></div>
        <span class="price">99,00</span>"#;
    let fetcher = StaticFetcher::new().with_page(url, html);

    let found = extractor(&fetcher).fetch_price(url).await.unwrap();

    assert_eq!(found.normalized_price, "129,00€");
}

#[tokio::test]
async fn page_without_prices_tries_retailer_then_generic() {
    let url = "https://www.idealo.es/precios/999.html";
    let fetcher = StaticFetcher::new().with_page(url, "<html><body><h1>Agotado</h1></body></html>");

    let failure = extractor(&fetcher).fetch_price(url).await.unwrap_err();

    assert_eq!(
        failure,
        ExtractionFailure::NoMatch {
            attempted: vec!["idealo".to_string(), "generic".to_string()],
        }
    );
}

#[tokio::test]
async fn http_errors_are_fetch_failures_not_no_match() {
    let not_found = "https://www.game.es/producto-retirado";
    let broken = "https://www.game.es/error";
    let fetcher = StaticFetcher::new()
        .with_status(not_found, 404)
        .with_status(broken, 500);
    let extractor = extractor(&fetcher);

    for url in [not_found, broken] {
        let failure = extractor.fetch_price(url).await.unwrap_err();
        assert!(matches!(failure, ExtractionFailure::FetchFailed { .. }), "{}", url);
        assert!(failure.is_retryable());
    }
}

#[tokio::test]
async fn share_links_are_blocked_without_fetching() {
    let fetcher = StaticFetcher::new();

    let failure = extractor(&fetcher)
        .fetch_price("https://share.google/aBcDeF")
        .await
        .unwrap_err();

    assert!(matches!(failure, ExtractionFailure::Blocked { .. }));
    assert!(!failure.is_retryable());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn configured_blocked_hosts_are_honoured() {
    let fetcher = StaticFetcher::new();
    let book = RuleBook::builtin()
        .unwrap()
        .with_blocked_hosts(["bit.ly".to_string()]);
    let extractor = PriceExtractor::new(book, Arc::new(fetcher.clone()));

    let failure = extractor.fetch_price("https://bit.ly/3xyz").await.unwrap_err();

    assert!(matches!(failure, ExtractionFailure::Blocked { .. }));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn same_page_gives_same_result() {
    let url = "https://www.casadellibro.com/libro/1";
    let fetcher = StaticFetcher::new().with_page(url, r#"<div class="precio">9,45 €</div>"#);
    let extractor = extractor(&fetcher);

    let first = extractor.fetch_price(url).await.unwrap();
    let second = extractor.fetch_price(url).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn image_discovery_reuses_the_fetcher() {
    let url = "https://www.zara.com/es/es/abrigo-p02.html";
    let fetcher = StaticFetcher::new().with_page(
        url,
        r#"<head><meta property="og:image" content="https://static.zara.net/photos/abrigo.jpg"></head>"#,
    );
    let extractor = extractor(&fetcher);

    assert_eq!(
        extractor.fetch_image(url).await.unwrap(),
        "https://static.zara.net/photos/abrigo.jpg"
    );
    assert!(matches!(
        extractor.fetch_image("https://share.google/x").await,
        Err(ExtractionFailure::Blocked { .. })
    ));
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn custom_rule_book() {
    let url = "https://www.fnac.es/a123/libro";
    let fetcher = StaticFetcher::new().with_page(url, r#"<strong class="userPrice">22,70 €</strong>"#);
    let book = RuleBook::new(
        vec![DomainRule::Scrape {
            fragment: "fnac".to_string(),
            rules: RuleSet::new("fnac", &[r#"userPrice">([0-9]+,[0-9]{2})"#]).unwrap(),
        }],
        RuleSet::new("generic", &[]).unwrap(),
    );

    let found = PriceExtractor::new(book, Arc::new(fetcher)).fetch_price(url).await.unwrap();

    assert_eq!(found.rule_set, "fnac");
    assert_eq!(found.normalized_price, "22,70€");
}
