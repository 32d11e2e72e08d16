use htmlentity::entity::{decode, ICodedDataTrait};

/// The only currency the catalog displays.
pub const CURRENCY_SYMBOL: char = '€';

/// Decimal separator used in every stored and displayed price (Spanish locale).
pub const DECIMAL_SEPARATOR: char = ',';

/// Turn a captured token into the display form `<amount>€`.
///
/// Entities are decoded and all whitespace removed. When the remaining amount is
/// made only of digits and separators it is rewritten with a comma decimal
/// separator and no grouping; otherwise it is kept as captured. The euro sign is
/// always moved to the end.
pub fn normalize_price(raw: &str) -> String {
    let decoded = decode(raw.as_bytes()).to_string().unwrap_or_else(|_| raw.to_string());

    let amount: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && *c != CURRENCY_SYMBOL)
        .collect();

    let amount = canonical_amount(&amount).unwrap_or(amount);

    format!("{}{}", amount, CURRENCY_SYMBOL)
}

/// Rewrite `1.299,00`, `1,299.00`, `129.5` or `129,` into the canonical form.
///
/// A last separator followed by one or two digits is the decimal mark; any other
/// separator is grouping and is dropped. Returns `None` for anything that is not
/// purely numeric.
fn canonical_amount(amount: &str) -> Option<String> {
    if !amount.chars().any(|c| c.is_ascii_digit())
        || !amount.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let Some(pos) = amount.rfind(['.', ',']) else {
        return Some(amount.to_string());
    };

    let integer: String = amount[..pos].chars().filter(char::is_ascii_digit).collect();
    let fraction = &amount[pos + 1..];

    let result = match fraction.len() {
        0 => integer,
        1 | 2 if !integer.is_empty() => format!("{}{}{}", integer, DECIMAL_SEPARATOR, fraction),
        1 | 2 => format!("0{}{}", DECIMAL_SEPARATOR, fraction),
        _ => format!("{}{}", integer, fraction),
    };

    Some(result)
}
