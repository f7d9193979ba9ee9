//! Property tests for the raw partition format.
//!
//! 1. Parquet round trip: any normalized table decodes back unchanged
//! 2. Decimal comma: every finite float written with a comma parses back exactly

use b3_datahub::normalizer::parse_locale_decimal;
use b3_datahub::util::parquet_utils::{decode, encode};
use b3_datahub::Record;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_finite() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL | prop::num::f64::ZERO
}

fn arb_symbol() -> impl Strategy<Value = String> {
    "\\PC{1,12}".prop_filter("symbol must not be blank", |s| !s.trim().is_empty())
}

fn arb_trade_date() -> impl Strategy<Value = NaiveDate> {
    (-40_000i64..40_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn arb_table() -> impl Strategy<Value = Vec<Record>> {
    (
        arb_trade_date(),
        prop::collection::vec((arb_symbol(), arb_finite(), arb_finite()), 0..40),
    )
        .prop_map(|(trade_date, rows)| {
            rows.into_iter()
                .map(|(symbol, price, change_pct)| Record { symbol, price, change_pct, trade_date })
                .collect()
        })
}

// ── 1. Parquet round trip ────────────────────────────────────────────

proptest! {
    #[test]
    fn decode_inverts_encode(table in arb_table()) {
        let bytes = encode(&table).unwrap();
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(decoded, table);
    }
}

// ── 2. Decimal comma ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn comma_decimal_parses_back_exactly(x in arb_finite()) {
        let text = format!("{}", x).replace('.', ",");
        prop_assert_eq!(parse_locale_decimal(&text), Some(x));
    }

    #[test]
    fn surrounding_whitespace_is_ignored(x in arb_finite()) {
        let text = format!("  {}\t", x).replace('.', ",");
        prop_assert_eq!(parse_locale_decimal(&text), Some(x));
    }
}
