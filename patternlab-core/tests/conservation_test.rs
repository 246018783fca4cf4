//! Ledger conservation property tests.
//!
//! For any sequence of fills, no value is created or destroyed except by
//! commission: cash plus the signed notional of every fill equals the
//! initial capital minus cumulative commission, and the position equals the
//! sum of signed fill quantities.

use chrono::NaiveDate;
use patternlab_core::domain::{Direction, FillEvent};
use patternlab_core::{NaivePortfolio, Portfolio};
use proptest::prelude::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn fill(buy: bool, quantity: u64, price: f64, commission: f64) -> FillEvent {
    FillEvent {
        symbol: "ABC".to_string(),
        datetime: day(),
        exchange: "SIMULATED".to_string(),
        quantity,
        direction: if buy { Direction::Buy } else { Direction::Sell },
        fill_cost: price * quantity as f64,
        commission,
    }
}

proptest! {
    #[test]
    fn cash_plus_signed_notional_is_conserved(
        fills in prop::collection::vec(
            (any::<bool>(), 0u64..500, 1.0f64..1000.0, 0.0f64..5.0),
            0..64,
        )
    ) {
        let initial_capital = 1_000_000.0;
        let mut pf = NaivePortfolio::new(vec!["ABC".to_string()], day(), initial_capital);

        let mut signed_notional = 0.0;
        let mut total_commission = 0.0;
        let mut signed_quantity: i64 = 0;

        for (buy, quantity, price, commission) in fills {
            let event = fill(buy, quantity, price, commission);
            let sign = event.direction.sign();
            signed_notional += sign as f64 * event.fill_cost;
            total_commission += commission;
            signed_quantity += sign * quantity as i64;
            pf.update_fill(&event).unwrap();
        }

        let expected_cash = initial_capital - signed_notional - total_commission;
        prop_assert!((pf.cash() - expected_cash).abs() < 1e-6);
        prop_assert!((pf.cumulative_commission() - total_commission).abs() < 1e-9);
        prop_assert_eq!(pf.position("ABC"), signed_quantity);
    }

    #[test]
    fn round_trip_at_one_price_costs_only_commission(
        quantity in 1u64..1000,
        price in 1.0f64..500.0,
        commission in 0.0f64..5.0,
    ) {
        let initial_capital = 1_000_000.0;
        let mut pf = NaivePortfolio::new(vec!["ABC".to_string()], day(), initial_capital);

        pf.update_fill(&fill(true, quantity, price, commission)).unwrap();
        pf.update_fill(&fill(false, quantity, price, commission)).unwrap();

        prop_assert_eq!(pf.position("ABC"), 0);
        let expected = initial_capital - 2.0 * commission;
        prop_assert!((pf.cash() - expected).abs() < 1e-6);
    }
}
