use fincalc_core::config::SolverConfig;
use fincalc_core::fixed_income::bonds::{bond_price, yield_to_maturity, BondInput, YtmInput};
use fincalc_core::fixed_income::duration::{convexity, duration};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ten_year_semiannual(market_rate: Decimal) -> BondInput {
    BondInput {
        face_value: dec!(1000),
        coupon_rate: dec!(0.05),
        market_rate,
        years: dec!(10),
        frequency: 2,
    }
}

#[test]
fn test_bond_price_scenario() {
    let price = bond_price(&ten_year_semiannual(dec!(0.04))).unwrap();
    assert!((price - dec!(1081.76)).abs() < dec!(0.01), "got {price}");
}

#[test]
fn test_price_equals_face_when_coupon_equals_yield() {
    for frequency in [1, 2, 4, 12] {
        for coupon in [dec!(0.02), dec!(0.05), dec!(0.11)] {
            let input = BondInput {
                face_value: dec!(1000),
                coupon_rate: coupon,
                market_rate: coupon,
                years: dec!(7),
                frequency,
            };
            let price = bond_price(&input).unwrap();
            assert!(
                (price - dec!(1000)).abs() < dec!(0.0000001),
                "freq={frequency}, coupon={coupon}: {price}"
            );
        }
    }
}

#[test]
fn test_price_strictly_decreasing_in_yield() {
    let prices: Vec<Decimal> = (0..=20)
        .map(|bp| ten_year_semiannual(Decimal::from(bp) / dec!(200)))
        .map(|input| bond_price(&input).unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_ytm_inverts_price() {
    let config = SolverConfig::default();
    for market_rate in [dec!(0.01), dec!(0.045), dec!(0.09), dec!(0.2)] {
        let price = bond_price(&ten_year_semiannual(market_rate)).unwrap();
        let solved = yield_to_maturity(
            &YtmInput {
                face_value: dec!(1000),
                coupon_rate: dec!(0.05),
                years: dec!(10),
                frequency: 2,
                price,
            },
            &config,
        )
        .unwrap();
        assert!(
            (solved.ytm - market_rate).abs() < dec!(0.000001),
            "expected {market_rate}, got {}",
            solved.ytm
        );
    }
}

#[test]
fn test_modified_below_macaulay_for_positive_yield() {
    for market_rate in [dec!(0.001), dec!(0.03), dec!(0.08), dec!(0.15)] {
        for frequency in [1, 2, 12] {
            let input = BondInput {
                frequency,
                ..ten_year_semiannual(market_rate)
            };
            let d = duration(&input).unwrap();
            assert!(
                d.modified_duration < d.macaulay_duration,
                "y={market_rate}, f={frequency}: {d:?}"
            );
            assert!(d.macaulay_duration <= input.years);
        }
    }
}

#[test]
fn test_par_bond_reference_measures() {
    let input = ten_year_semiannual(dec!(0.05));
    let d = duration(&input).unwrap();
    assert!((d.macaulay_duration - dec!(7.9894)).abs() < dec!(0.0001), "{d:?}");
    assert!((d.modified_duration - dec!(7.7946)).abs() < dec!(0.0001), "{d:?}");

    let c = convexity(&input).unwrap();
    assert!((c - dec!(77.3562)).abs() < dec!(0.0001), "convexity {c}");
}
