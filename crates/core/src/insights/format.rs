use rust_decimal::{Decimal, RoundingStrategy};

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

/// Two-decimal amount with comma thousands separators, e.g. `R$ 12,345.60`.
pub fn currency(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{symbol} {grouped}.{cents}")
}

/// First `limit` names joined by commas, with an ellipsis when more were left out.
pub fn name_list<'a>(names: impl IntoIterator<Item = &'a str>, limit: usize) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    let mut shown = names.iter().take(limit).copied().collect::<Vec<_>>().join(", ");
    if names.len() > limit {
        shown.push_str(", ...");
    }
    shown
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{currency, name_list, percent, signed_percent};

    #[test]
    fn percentages_use_one_decimal() {
        assert_eq!(percent(30.0), "30.0%");
        assert_eq!(signed_percent(50.0), "+50.0%");
        assert_eq!(signed_percent(-12.345), "-12.3%");
        assert_eq!(signed_percent(0.0), "+0.0%");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency("R$", Decimal::new(1234567, 1)), "R$ 123,456.70");
        assert_eq!(currency("R$", Decimal::new(999, 0)), "R$ 999.00");
        assert_eq!(currency("$", Decimal::new(1000, 0)), "$ 1,000.00");
        assert_eq!(currency("$", Decimal::ZERO), "$ 0.00");
        assert_eq!(currency("$", Decimal::new(-25005, 1)), "-$ 2,500.50");
    }

    #[test]
    fn name_list_truncates_with_ellipsis() {
        assert_eq!(name_list(["A", "B"], 3), "A, B");
        assert_eq!(name_list(["A", "B", "C"], 3), "A, B, C");
        assert_eq!(name_list(["A", "B", "C", "D"], 3), "A, B, C, ...");
    }
}
