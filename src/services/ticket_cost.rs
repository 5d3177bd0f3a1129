//! Ticket cost aggregation.
//!
//! All money is integer cents. Each line is rounded to whole cents on
//! its own (half-up), then the rounded lines are summed, so a ticket's
//! total is reproducible from its stored rows alone. Totals are always
//! computed on demand, never cached.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{ticket_line_item, ticket_part_usage};

/// Breakdown returned alongside a ticket total.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct TicketTotal {
    pub labor_cents: i64,
    pub parts_cents: i64,
    pub total_cents: i64,
}

fn round_to_cents(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}

/// Cost of one labor/service line: quantity times unit price, rounded
/// half-up to whole cents.
pub fn line_item_cost_cents(line: &ticket_line_item::Model) -> i64 {
    round_to_cents(line.quantity * Decimal::from(line.unit_price_cents))
}

/// Cost of one part usage: quantity times the captured unit cost, with
/// the line's markup applied, rounded half-up to whole cents.
pub fn part_usage_cost_cents(usage: &ticket_part_usage::Model) -> i64 {
    let base = Decimal::from(usage.quantity) * Decimal::from(usage.unit_cost_cents);
    let multiplier = Decimal::ONE + usage.markup_percent / Decimal::ONE_HUNDRED;
    round_to_cents(base * multiplier)
}

/// Totals a ticket from its stored lines. Pure and deterministic: the
/// same rows always produce the same breakdown.
pub fn compute_total(
    line_items: &[ticket_line_item::Model],
    part_usages: &[ticket_part_usage::Model],
) -> TicketTotal {
    let labor_cents = line_items
        .iter()
        .map(line_item_cost_cents)
        .fold(0i64, i64::saturating_add);
    let parts_cents = part_usages
        .iter()
        .map(part_usage_cost_cents)
        .fold(0i64, i64::saturating_add);

    TicketTotal {
        labor_cents,
        parts_cents,
        total_cents: labor_cents.saturating_add(parts_cents),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price_cents: i64) -> ticket_line_item::Model {
        ticket_line_item::Model {
            id: 1,
            ticket_id: 1,
            service_id: None,
            line_type: "adhoc".into(),
            description: "labor".into(),
            quantity,
            unit_price_cents,
            created_at: Utc::now(),
        }
    }

    fn usage(quantity: i32, unit_cost_cents: i64, markup: Decimal) -> ticket_part_usage::Model {
        ticket_part_usage::Model {
            ticket_id: 1,
            part_id: 1,
            quantity,
            unit_cost_cents,
            markup_percent: markup,
            warranty_months: None,
            installed_by_mechanic_id: None,
            attached_at: Utc::now(),
        }
    }

    #[test]
    fn standard_brake_job_totals() {
        let lines = vec![line(dec!(2), 3500)];
        let usages = vec![usage(1, 2500, dec!(30.0))];

        let total = compute_total(&lines, &usages);
        assert_eq!(total.labor_cents, 7000);
        assert_eq!(total.parts_cents, 3250);
        assert_eq!(total.total_cents, 10250);
    }

    #[test]
    fn empty_ticket_totals_zero() {
        let total = compute_total(&[], &[]);
        assert_eq!(total.total_cents, 0);
    }

    #[rstest]
    #[case(dec!(1.5), 101, 152)] // 151.5 rounds up
    #[case(dec!(0.5), 101, 51)] // 50.5 rounds up
    #[case(dec!(0.25), 100, 25)] // exact
    fn fractional_quantity_rounds_half_up_per_line(
        #[case] quantity: Decimal,
        #[case] unit_price_cents: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(line_item_cost_cents(&line(quantity, unit_price_cents)), expected);
    }

    #[rstest]
    #[case(1, 333, dec!(15.0), 383)] // 382.95 rounds up
    #[case(1, 250, dec!(1.0), 253)] // 252.5 rounds up
    #[case(3, 1000, dec!(0.0), 3000)] // zero markup passes the base through
    fn markup_rounds_half_up_per_line(
        #[case] quantity: i32,
        #[case] unit_cost_cents: i64,
        #[case] markup: Decimal,
        #[case] expected: i64,
    ) {
        assert_eq!(part_usage_cost_cents(&usage(quantity, unit_cost_cents, markup)), expected);
    }

    #[test]
    fn lines_round_independently_before_summing() {
        // Two lines of 50.5 cents each round to 51 + 51 = 102, not
        // round(101.0) = 101.
        let lines = vec![line(dec!(0.5), 101), line(dec!(0.5), 101)];
        let total = compute_total(&lines, &[]);
        assert_eq!(total.labor_cents, 102);
    }

    #[test]
    fn oversized_lines_saturate_instead_of_wrapping() {
        let lines = vec![line(dec!(99999999), i64::MAX / 2), line(dec!(2), i64::MAX / 2)];
        let total = compute_total(&lines, &[]);
        assert_eq!(total.total_cents, i64::MAX);
    }
}
