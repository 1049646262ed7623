//! Opening and closing amounts of a rental.
//!
//! Day counts are whole-day differences between dates. The fine and the
//! additional amount are computed independently; each one is zero on the
//! side of the expected end date it does not cover.

use super::money::Money;
use super::pricing::Plan;
use super::rental::{Rental, Settlement};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

/// Flat charge per day a motorcycle is returned late, whatever the plan.
pub const LATE_FEE_PER_DAY: Money = Money::from_scaled(dec!(50.00));

pub fn whole_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Amount charged when a rental is opened.
pub fn total_amount(plan: Plan, start_date: NaiveDate, end_date: NaiveDate) -> Money {
    plan.daily_rate().times(whole_days_between(start_date, end_date))
}

/// Fine for returning before the expected end date.
pub fn fine(plan: Plan, expected_end_date: NaiveDate, return_date: NaiveDate) -> Money {
    if return_date >= expected_end_date {
        return Money::ZERO;
    }
    let early_days = whole_days_between(return_date, expected_end_date);
    let unused_amount = plan.daily_rate().times(early_days);
    unused_amount.percent(plan.fine_percentage())
}

/// Surcharge for returning after the expected end date.
pub fn additional_amount(expected_end_date: NaiveDate, return_date: NaiveDate) -> Money {
    if return_date <= expected_end_date {
        return Money::ZERO;
    }
    LATE_FEE_PER_DAY.times(whole_days_between(expected_end_date, return_date))
}

/// Closing amounts of `rental` returned on `return_date`.
///
/// The base charge uses the rate captured at opening times the days actually
/// used, so it differs from the opening total on early or late returns.
pub fn final_settlement(rental: &Rental, return_date: NaiveDate) -> Settlement {
    let effective_days = whole_days_between(rental.start_date, return_date);
    let base_amount = rental.daily_rate.times(effective_days);
    let fine_amount = fine(rental.plan, rental.expected_end_date, return_date);
    let additional_amount = additional_amount(rental.expected_end_date, return_date);

    Settlement {
        rental_id: rental.id,
        return_date,
        base_amount,
        fine_amount,
        additional_amount,
        total_amount: base_amount + fine_amount + additional_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::courier::CourierId;
    use crate::domain::motorcycle::MotorcycleId;
    use crate::domain::rental::{RentalId, RentalStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active_rental(plan: Plan, start: NaiveDate) -> Rental {
        let end = start + chrono::Days::new(plan.days() as u64);
        Rental {
            id: RentalId(1),
            courier_id: CourierId(1),
            motorcycle_id: MotorcycleId(1),
            start_date: start,
            end_date: end,
            expected_end_date: end,
            return_date: None,
            plan,
            daily_rate: plan.daily_rate(),
            total_amount: total_amount(plan, start, end),
            fine_amount: None,
            additional_amount: None,
            status: RentalStatus::Active,
        }
    }

    #[test]
    fn test_total_amount_for_weekly_plan() {
        let total = total_amount(Plan::Days7, date(2024, 1, 2), date(2024, 1, 9));
        assert_eq!(total, Money::new(dec!(210.00)));
    }

    #[test]
    fn test_fine_on_early_return() {
        let fine = fine(Plan::Days7, date(2024, 1, 9), date(2024, 1, 7));
        assert_eq!(fine, Money::new(dec!(12.00)));
        assert_eq!(additional_amount(date(2024, 1, 9), date(2024, 1, 7)), Money::ZERO);
    }

    #[test]
    fn test_fifteen_day_plan_fine() {
        // 28.00 x 5 unused days x 40%
        let fine = fine(Plan::Days15, date(2024, 3, 16), date(2024, 3, 11));
        assert_eq!(fine, Money::new(dec!(56.00)));
    }

    #[test]
    fn test_long_plans_never_fine() {
        for plan in [Plan::Days30, Plan::Days45, Plan::Days50] {
            assert_eq!(fine(plan, date(2024, 6, 30), date(2024, 6, 1)), Money::ZERO);
        }
    }

    #[test]
    fn test_additional_amount_on_late_return() {
        let expected = date(2024, 2, 1);
        let returned = date(2024, 2, 4);
        assert_eq!(additional_amount(expected, returned), Money::new(dec!(150.00)));
        assert_eq!(fine(Plan::Days30, expected, returned), Money::ZERO);
    }

    #[test]
    fn test_on_time_return_has_no_extras() {
        let expected = date(2024, 1, 9);
        assert_eq!(fine(Plan::Days7, expected, expected), Money::ZERO);
        assert_eq!(additional_amount(expected, expected), Money::ZERO);
    }

    #[test]
    fn test_final_settlement_early_return() {
        let rental = active_rental(Plan::Days7, date(2024, 1, 2));
        let settlement = final_settlement(&rental, date(2024, 1, 7));

        assert_eq!(settlement.base_amount, Money::new(dec!(150.00)));
        assert_eq!(settlement.fine_amount, Money::new(dec!(12.00)));
        assert_eq!(settlement.additional_amount, Money::ZERO);
        assert_eq!(settlement.total_amount, Money::new(dec!(162.00)));
    }

    #[test]
    fn test_final_settlement_late_return() {
        let rental = active_rental(Plan::Days30, date(2024, 1, 2));
        assert_eq!(rental.expected_end_date, date(2024, 2, 1));

        let settlement = final_settlement(&rental, date(2024, 2, 4));
        // 22.00 x 33 days used + 3 late days x 50.00
        assert_eq!(settlement.base_amount, Money::new(dec!(726.00)));
        assert_eq!(settlement.additional_amount, Money::new(dec!(150.00)));
        assert_eq!(settlement.total_amount, Money::new(dec!(876.00)));
    }

    #[test]
    fn test_final_settlement_uses_captured_rate() {
        let mut rental = active_rental(Plan::Days7, date(2024, 1, 2));
        rental.daily_rate = Money::new(dec!(25.00));

        let settlement = final_settlement(&rental, date(2024, 1, 9));
        assert_eq!(settlement.base_amount, Money::new(dec!(175.00)));
        assert_eq!(settlement.total_amount, Money::new(dec!(175.00)));
    }
}
