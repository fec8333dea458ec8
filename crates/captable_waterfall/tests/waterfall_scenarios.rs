//! End-to-end waterfall scenarios and allocation properties.

use captable_core::types::{ClassId, Date, Money};
use captable_model::share_class::ShareClass;
use captable_model::snapshot::CapTableSnapshot;
use captable_waterfall::{Election, WaterfallEngine};
use proptest::prelude::*;

fn dollars(amount: f64) -> Money {
    Money::from_dollars(amount).unwrap()
}

fn as_of() -> Date {
    Date::from_ymd(2024, 6, 15).unwrap()
}

fn id(s: &str) -> ClassId {
    ClassId::new(s)
}

fn snapshot(classes: Vec<ShareClass>) -> CapTableSnapshot {
    CapTableSnapshot::new(classes, as_of()).unwrap()
}

/// Common (1000 sh) + Series A (1x non-participating, 500 sh, $1M).
fn two_class_table() -> CapTableSnapshot {
    snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-a", "Series A", 500.0, dollars(1_000_000.0), 2_000.0, 1),
    ])
}

#[test]
fn low_exit_goes_entirely_to_the_preference() {
    let result = WaterfallEngine::new()
        .allocate(&two_class_table(), dollars(500_000.0))
        .unwrap();

    assert_eq!(result.proceeds_of(&id("series-a")).unwrap(), dollars(500_000.0));
    assert_eq!(result.proceeds_of(&id("common")).unwrap(), Money::ZERO);
    assert_eq!(result.election_of(&id("series-a")), Some(Election::Preferred));
    assert!(result.converged);
}

#[test]
fn high_exit_converts_and_splits_pro_rata() {
    let result = WaterfallEngine::new()
        .allocate(&two_class_table(), dollars(5_000_000.0))
        .unwrap();

    // $1M preference vs 500/1500 × $5M ≈ $1,666,667: conversion wins
    assert_eq!(result.election_of(&id("series-a")), Some(Election::Converted));
    assert_eq!(
        result.proceeds_of(&id("series-a")).unwrap(),
        Money::from_cents(166_666_667)
    );
    assert_eq!(
        result.proceeds_of(&id("common")).unwrap(),
        Money::from_cents(333_333_333)
    );
    assert_eq!(result.total_proceeds(), dollars(5_000_000.0));
}

#[test]
fn participating_cap_binds_at_large_exits() {
    // $2M invested, 2x cap, small enough stake that converting pays
    // less than the cap
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-b", "Series B", 200.0, dollars(2_000_000.0), 10_000.0, 1)
            .with_participation(Some(2.0)),
    ]);

    let result = WaterfallEngine::new()
        .allocate(&table, dollars(20_000_000.0))
        .unwrap();

    assert_eq!(result.proceeds_of(&id("series-b")).unwrap(), dollars(4_000_000.0));
    assert_eq!(result.proceeds_of(&id("common")).unwrap(), dollars(16_000_000.0));
    assert_eq!(result.total_proceeds(), dollars(20_000_000.0));
}

#[test]
fn uncapped_participation_double_dips() {
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-b", "Series B", 1_000.0, dollars(1_000_000.0), 1_000.0, 1)
            .with_participation(None),
    ]);

    let result = WaterfallEngine::new()
        .allocate(&table, dollars(3_000_000.0))
        .unwrap();

    // $1M preference + half of the $2M residual
    assert_eq!(result.proceeds_of(&id("series-b")).unwrap(), dollars(2_000_000.0));
    assert_eq!(result.proceeds_of(&id("common")).unwrap(), dollars(1_000_000.0));
}

#[test]
fn pari_passu_classes_share_a_shortfall_by_invested() {
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-a", "Series A", 500.0, dollars(2_000_000.0), 4_000.0, 1)
            .with_pari_passu(),
        ShareClass::preferred("series-a2", "Series A-2", 250.0, dollars(1_000_000.0), 4_000.0, 1)
            .with_pari_passu(),
    ]);

    let result = WaterfallEngine::new()
        .allocate(&table, dollars(900_000.0))
        .unwrap();

    // 2:1 by invested
    assert_eq!(result.proceeds_of(&id("series-a")).unwrap(), dollars(600_000.0));
    assert_eq!(result.proceeds_of(&id("series-a2")).unwrap(), dollars(300_000.0));
    assert_eq!(result.proceeds_of(&id("common")).unwrap(), Money::ZERO);
}

#[test]
fn senior_rank_fully_paid_before_junior_sees_a_cent() {
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("seed", "Seed", 300.0, dollars(500_000.0), 1_666.67, 2),
        ShareClass::preferred("series-a", "Series A", 500.0, dollars(3_000_000.0), 6_000.0, 1),
    ]);

    let result = WaterfallEngine::new()
        .allocate(&table, dollars(3_000_000.0))
        .unwrap();

    assert_eq!(result.proceeds_of(&id("series-a")).unwrap(), dollars(3_000_000.0));
    assert_eq!(result.proceeds_of(&id("seed")).unwrap(), Money::ZERO);
}

#[test]
fn multiple_scales_the_preference() {
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-a", "Series A", 100.0, dollars(1_000_000.0), 10_000.0, 1)
            .with_multiple(2.0),
    ]);

    let result = WaterfallEngine::new()
        .allocate(&table, dollars(2_500_000.0))
        .unwrap();

    assert_eq!(result.proceeds_of(&id("series-a")).unwrap(), dollars(2_000_000.0));
    assert_eq!(result.proceeds_of(&id("common")).unwrap(), dollars(500_000.0));
}

#[test]
fn proceeds_are_monotone_in_exit_value() {
    // 50/50 as-converted split and even-cent exits keep every split
    // exact, so monotonicity holds cent-for-cent
    let table = snapshot(vec![
        ShareClass::common("common", "Founders", 1_000.0),
        ShareClass::preferred("series-a", "Series A", 1_000.0, dollars(1_000_000.0), 1_000.0, 1),
    ]);
    let engine = WaterfallEngine::new();

    let exits: Vec<Money> = (0..=60).map(|step| dollars(100_000.0 * step as f64)).collect();
    let mut previous: Option<Vec<Money>> = None;
    for exit in exits {
        let result = engine.allocate(&table, exit).unwrap();
        let proceeds: Vec<Money> = result.outcomes.iter().map(|o| o.proceeds).collect();
        if let Some(prior) = previous {
            for (now, before) in proceeds.iter().zip(&prior) {
                assert!(now >= before, "proceeds decreased as exit grew");
            }
        }
        previous = Some(proceeds);
    }
}

fn arb_preferred(index: u32) -> impl Strategy<Value = ShareClass> {
    (
        1_000u32..500_000,
        10_000u32..5_000_000,
        prop_oneof![Just(1.0f64), Just(1.5), Just(2.0)],
        prop_oneof![Just(None), Just(Some(2.0f64)), Just(Some(3.0))],
        any::<bool>(),
    )
        .prop_map(move |(shares, invested, multiple, cap, participating)| {
            let invested = Money::from_dollars(invested as f64).unwrap();
            let price = invested.to_dollars() / shares as f64;
            let class = ShareClass::preferred(
                format!("series-{}", index),
                format!("Series {}", index),
                shares as f64,
                invested,
                price,
                index,
            )
            .with_multiple(multiple);
            if participating {
                class.with_participation(cap)
            } else {
                class
            }
        })
}

fn arb_table() -> impl Strategy<Value = CapTableSnapshot> {
    (1usize..=4).prop_flat_map(|count| {
        let preferred: Vec<_> = (1..=count as u32).map(arb_preferred).collect();
        (10_000u32..2_000_000, preferred).prop_map(|(common_shares, preferred)| {
            let mut classes = vec![ShareClass::common(
                "common",
                "Founders",
                common_shares as f64,
            )];
            classes.extend(preferred);
            snapshot(classes)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn allocation_conserves_the_exit_value(
        table in arb_table(),
        exit_dollars in 0u32..50_000_000,
    ) {
        let exit = dollars(exit_dollars as f64);
        let result = WaterfallEngine::new().allocate(&table, exit).unwrap();
        prop_assert_eq!(result.total_proceeds(), exit);
    }

    #[test]
    fn no_class_receives_negative_proceeds(
        table in arb_table(),
        exit_dollars in 0u32..50_000_000,
    ) {
        let exit = dollars(exit_dollars as f64);
        let result = WaterfallEngine::new().allocate(&table, exit).unwrap();
        for outcome in &result.outcomes {
            prop_assert!(outcome.proceeds >= Money::ZERO);
        }
    }

    #[test]
    fn pari_passu_split_is_proportional_to_invested(
        invested_a in 100_000u32..5_000_000,
        invested_b in 100_000u32..5_000_000,
        pool_fraction in 0.05f64..0.95,
    ) {
        let invested_a = dollars(invested_a as f64);
        let invested_b = dollars(invested_b as f64);
        // Tiny as-converted stakes keep both classes on their
        // preference at every pool size in range
        let table = snapshot(vec![
            ShareClass::common("common", "Founders", 1_000_000.0),
            ShareClass::preferred("a", "A", 5.0, invested_a, invested_a.to_dollars() / 5.0, 1)
                .with_pari_passu(),
            ShareClass::preferred("b", "B", 5.0, invested_b, invested_b.to_dollars() / 5.0, 1)
                .with_pari_passu(),
        ]);

        // Insufficient pool: strictly below the combined 1x claims
        let total = invested_a + invested_b;
        let pool = total.mul_f64(pool_fraction).unwrap();
        let result = WaterfallEngine::new().allocate(&table, pool).unwrap();

        let paid_a = result.proceeds_of(&id("a")).unwrap();
        let paid_b = result.proceeds_of(&id("b")).unwrap();
        prop_assert_eq!(paid_a + paid_b, pool);

        let expected_a = pool.to_dollars() * invested_a.ratio(total);
        prop_assert!((paid_a.to_dollars() - expected_a).abs() <= 0.01);
    }
}
