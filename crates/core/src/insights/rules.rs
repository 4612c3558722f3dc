//! Insight rules.
//!
//! Each rule is a pure function over one [`RuleContext`] and yields at most one
//! card. Rules never look at each other's output; the missing-ticket and
//! conversion-lift rules stay exclusive because they test the same roster
//! predicate from opposite sides.

use rust_decimal::Decimal;

use super::aggregate::{weekday_name, AggregateSnapshot, Rollup, Totals};
use super::format;
use crate::domain::insight::{Insight, InsightIcon, InsightKind, InsightTag};
use crate::domain::store::StoreRoster;

/// How many store names the missing-ticket card lists before eliding the rest.
pub const MISSING_TICKET_NAME_LIMIT: usize = 3;

/// Conversion lift modelled by the projection card: one percentage point.
pub fn conversion_lift_rate() -> Decimal {
    Decimal::new(1, 2)
}

pub type InsightRule = fn(&RuleContext<'_>) -> Option<Insight>;

/// Everything a rule may read for one generation run.
#[derive(Clone, Debug)]
pub struct RuleContext<'a> {
    pub snapshot: &'a AggregateSnapshot,
    pub current: Totals,
    pub prior: Totals,
    pub roster: &'a StoreRoster,
    /// Minimum visits before a weekday can be called weak. `None` disables the floor.
    pub weekday_min_visits: Option<u64>,
    pub currency_symbol: &'a str,
}

impl RuleContext<'_> {
    fn money(&self, amount: Decimal) -> String {
        format::currency(self.currency_symbol, amount)
    }
}

/// Week-over-week relative change of the conversion rate, in percent.
pub fn trend_delta(current_rate: f64, prior_rate: f64) -> f64 {
    if prior_rate > 0.0 {
        (current_rate - prior_rate) / prior_rate * 100.0
    } else if current_rate > 0.0 {
        100.0
    } else {
        0.0
    }
}

pub fn trend(ctx: &RuleContext<'_>) -> Option<Insight> {
    if ctx.snapshot.is_empty() {
        return None;
    }

    let current_rate = ctx.current.conversion_rate();
    let prior_rate = ctx.prior.conversion_rate();
    let delta = trend_delta(current_rate, prior_rate);
    let improving = delta >= 0.0;

    let title = if improving {
        format!("Conversion up {} vs last week", format::percent(delta))
    } else {
        format!("Conversion down {} vs last week", format::percent(delta.abs()))
    };

    Some(Insight {
        kind: InsightKind::Trend,
        title,
        description: format!(
            "Conversion was {} over the last 7 days, against {} in the previous 7 days.",
            format::percent(current_rate),
            format::percent(prior_rate)
        ),
        tag: if improving { InsightTag::Info } else { InsightTag::Alert },
        icon: if improving { InsightIcon::TrendingUp } else { InsightIcon::TrendingDown },
        metric: Some(format::signed_percent(delta)),
        action: (!improving)
            .then(|| "Review what changed in the sales routine this week.".to_string()),
    })
}

pub fn store_loss(ctx: &RuleContext<'_>) -> Option<Insight> {
    let (store_id, rollup) = max_loss(ctx.snapshot.by_store.iter())?;
    let store_name = ctx.roster.store_name(store_id);

    let description = match ctx.roster.ticket_for(store_id) {
        Some(ticket) => format!(
            "{} visits did not convert at {store_name} in the last 7 days. At an average \
             ticket of {}, that is about {} in missed revenue.",
            rollup.lost,
            ctx.money(ticket),
            ctx.money(rollup.lost_value)
        ),
        None => format!(
            "{} visits did not convert at {store_name} in the last 7 days. Configure the \
             store's average ticket to estimate the missed revenue.",
            rollup.lost
        ),
    };

    Some(Insight {
        kind: InsightKind::StoreLoss,
        title: format!("{store_name} is losing the most sales"),
        description,
        tag: InsightTag::Alert,
        icon: InsightIcon::Store,
        metric: Some(ctx.money(rollup.lost_value)),
        action: Some(format!("Check the service flow at {store_name}.")),
    })
}

pub fn seller_loss(ctx: &RuleContext<'_>) -> Option<Insight> {
    let (seller_id, rollup) = max_loss(ctx.snapshot.by_seller.iter())?;
    let seller_name = ctx.roster.seller_name(seller_id);
    let store_name = ctx
        .snapshot
        .seller_store(seller_id)
        .map(|store_id| ctx.roster.store_name(store_id))
        .unwrap_or("an unassigned store");

    Some(Insight {
        kind: InsightKind::SellerLoss,
        title: format!("{seller_name} has the most missed sales"),
        description: format!(
            "{seller_name} ({store_name}) attended {} visits and closed {} in the last 7 days, \
             leaving {} opportunities worth about {}.",
            rollup.visits,
            rollup.sales,
            rollup.lost,
            ctx.money(rollup.lost_value)
        ),
        tag: InsightTag::Alert,
        icon: InsightIcon::User,
        metric: Some(ctx.money(rollup.lost_value)),
        action: Some(format!("Schedule a coaching session with {seller_name}.")),
    })
}

pub fn weak_weekday(ctx: &RuleContext<'_>) -> Option<Insight> {
    let (weekday, totals) =
        ctx.snapshot.by_weekday.iter().fold(None, |weakest: Option<(&u32, &Totals)>, entry| {
            match weakest {
                Some(current) if current.1.conversion_rate() <= entry.1.conversion_rate() => {
                    Some(current)
                }
                _ => Some(entry),
            }
        })?;

    if let Some(min_visits) = ctx.weekday_min_visits {
        if totals.visits < min_visits {
            return None;
        }
    }

    let name = weekday_name(*weekday);
    let rate = totals.conversion_rate();

    Some(Insight {
        kind: InsightKind::WeakWeekday,
        title: format!("{name} is the weakest day"),
        description: format!(
            "{name} converted {} ({} sales out of {} visits) in the last 7 days, the lowest \
             rate of the week.",
            format::percent(rate),
            totals.sales,
            totals.visits
        ),
        tag: InsightTag::Opportunity,
        icon: InsightIcon::Calendar,
        metric: Some(format::percent(rate)),
        action: Some(format!("Reinforce the team or plan a promotion for {name}.")),
    })
}

pub fn missing_ticket(ctx: &RuleContext<'_>) -> Option<Insight> {
    let missing = ctx.roster.stores_missing_ticket();
    if missing.is_empty() {
        return None;
    }

    let names = format::name_list(
        missing.iter().map(|store| store.name.as_str()),
        MISSING_TICKET_NAME_LIMIT,
    );

    Some(Insight {
        kind: InsightKind::MissingTicket,
        title: "Average ticket not configured".to_string(),
        description: format!(
            "Set the average ticket for {names} so missed sales can be valued and projected."
        ),
        tag: InsightTag::Alert,
        icon: InsightIcon::AlertTriangle,
        metric: Some(missing.len().to_string()),
        action: Some("Open the store settings and fill in the average ticket.".to_string()),
    })
}

/// Revenue from a uniform one-point conversion lift over the current visits.
pub fn conversion_lift_value(ctx: &RuleContext<'_>) -> Decimal {
    let lift = conversion_lift_rate();
    ctx.snapshot
        .by_store
        .iter()
        .map(|(store_id, rollup)| {
            let ticket = ctx.roster.ticket_for(store_id).unwrap_or(Decimal::ZERO);
            Decimal::from(rollup.visits) * lift * ticket
        })
        .sum()
}

pub fn conversion_lift(ctx: &RuleContext<'_>) -> Option<Insight> {
    if !ctx.roster.stores_missing_ticket().is_empty() || ctx.snapshot.by_store.is_empty() {
        return None;
    }

    let value = conversion_lift_value(ctx);

    Some(Insight {
        kind: InsightKind::ConversionLift,
        title: format!("+1 point of conversion is worth {}", ctx.money(value)),
        description: format!(
            "Converting one percentage point more of the {} visits from the last 7 days would \
             add about {} in revenue.",
            ctx.current.visits,
            ctx.money(value)
        ),
        tag: InsightTag::Opportunity,
        icon: InsightIcon::Target,
        metric: Some(ctx.money(value)),
        action: Some("Set a weekly conversion goal with the team.".to_string()),
    })
}

pub fn top_seller(ctx: &RuleContext<'_>) -> Option<Insight> {
    let (seller_id, rollup) = ctx.snapshot.by_seller.iter().fold(
        None,
        |best: Option<(&_, &Rollup)>, entry| match best {
            Some(current) if current.1.ranking_ratio() >= entry.1.ranking_ratio() => Some(current),
            _ => Some(entry),
        },
    )?;
    let seller_name = ctx.roster.seller_name(seller_id);
    let rate = rollup.conversion_rate();

    Some(Insight {
        kind: InsightKind::TopSeller,
        title: "Best conversion on the team".to_string(),
        description: format!(
            "{seller_name} converted {} of {} visits in the last 7 days. Share what is working \
             with the rest of the team.",
            format::percent(rate),
            rollup.visits
        ),
        tag: InsightTag::Info,
        icon: InsightIcon::Award,
        metric: Some(format::percent(rate)),
        action: None,
    })
}

pub fn lowest_store(ctx: &RuleContext<'_>) -> Option<Insight> {
    let (store_id, rollup) = ctx.snapshot.by_store.iter().fold(
        None,
        |lowest: Option<(&_, &Rollup)>, entry| match lowest {
            Some(current) if current.1.ranking_ratio() <= entry.1.ranking_ratio() => Some(current),
            _ => Some(entry),
        },
    )?;
    let store_name = ctx.roster.store_name(store_id);
    let rate = rollup.conversion_rate();

    Some(Insight {
        kind: InsightKind::LowestStore,
        title: format!("{store_name} has the lowest conversion"),
        description: format!(
            "{store_name} converted {} of {} visits in the last 7 days, the lowest rate among \
             your stores.",
            format::percent(rate),
            rollup.visits
        ),
        tag: InsightTag::Alert,
        icon: InsightIcon::TrendingDown,
        metric: Some(format::percent(rate)),
        action: Some(format!("Compare the routine at {store_name} with your best store.")),
    })
}

/// Entry with the highest lost value; lost count and then key order break ties.
fn max_loss<'a, K: 'a>(
    entries: impl Iterator<Item = (&'a K, &'a Rollup)>,
) -> Option<(&'a K, &'a Rollup)> {
    entries.fold(None, |best, entry| match best {
        Some((_, current))
            if (current.lost_value, current.lost) >= (entry.1.lost_value, entry.1.lost) =>
        {
            best
        }
        _ => Some(entry),
    })
}
