use std::collections::BTreeSet;

use super::rules::{InsightRule, RuleContext};
use crate::domain::insight::Insight;

/// Runs `rules` in order, keeps the first card of each kind and truncates to `cap`.
///
/// Output order is rule order. Nothing is re-sorted by severity.
pub fn select(rules: &[InsightRule], ctx: &RuleContext<'_>, cap: usize) -> Vec<Insight> {
    let mut seen = BTreeSet::new();
    rules
        .iter()
        .filter_map(|rule| rule(ctx))
        .filter(|insight| seen.insert(insight.kind))
        .take(cap)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::select;
    use crate::domain::insight::{Insight, InsightIcon, InsightKind, InsightTag};
    use crate::domain::store::StoreRoster;
    use crate::insights::aggregate::{AggregateSnapshot, Totals};
    use crate::insights::rules::{InsightRule, RuleContext};

    fn card(kind: InsightKind, title: &str) -> Insight {
        Insight {
            kind,
            title: title.to_string(),
            description: String::new(),
            tag: InsightTag::Info,
            icon: InsightIcon::Award,
            metric: None,
            action: None,
        }
    }

    fn first_trend(_: &RuleContext<'_>) -> Option<Insight> {
        Some(card(InsightKind::Trend, "first"))
    }

    fn second_trend(_: &RuleContext<'_>) -> Option<Insight> {
        Some(card(InsightKind::Trend, "second"))
    }

    fn nothing(_: &RuleContext<'_>) -> Option<Insight> {
        None
    }

    fn store(_: &RuleContext<'_>) -> Option<Insight> {
        Some(card(InsightKind::StoreLoss, "store"))
    }

    fn seller(_: &RuleContext<'_>) -> Option<Insight> {
        Some(card(InsightKind::SellerLoss, "seller"))
    }

    fn run(rules: &[InsightRule], cap: usize) -> Vec<Insight> {
        let snapshot = AggregateSnapshot::default();
        let roster = StoreRoster::default();
        let ctx = RuleContext {
            snapshot: &snapshot,
            current: Totals::default(),
            prior: Totals::default(),
            roster: &roster,
            weekday_min_visits: None,
            currency_symbol: "$",
        };
        select(rules, &ctx, cap)
    }

    #[test]
    fn keeps_rule_order_and_skips_empty_rules() {
        let selected = run(&[seller, nothing, store], 8);
        let titles: Vec<&str> = selected.iter().map(|insight| insight.title.as_str()).collect();
        assert_eq!(titles, vec!["seller", "store"]);
    }

    #[test]
    fn duplicate_kinds_keep_the_first_card() {
        let selected = run(&[first_trend, second_trend, store], 8);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title, "first");
    }

    #[test]
    fn truncates_to_cap() {
        let selected = run(&[first_trend, store, seller], 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].kind, InsightKind::StoreLoss);
        assert!(run(&[first_trend], 0).is_empty());
    }
}
