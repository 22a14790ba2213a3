use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};

use rental_pricing::analysis::delay_report::link_consecutive_rentals;
use rental_pricing::analysis::{
    build_report, load_delay_records, simulate_thresholds, AnalysisError, CheckinType,
    ConsecutiveRental, CheckoutStatus, RentalState, ThresholdOptions, ThresholdScope,
};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn export() -> std::path::PathBuf {
    fixture("delay_export.csv")
}

#[test]
fn test_report_from_export() {
    let records = load_delay_records(&export()).unwrap();
    let report = build_report(
        &records,
        Some(ThresholdOptions {
            max_threshold: 150,
            scope: ThresholdScope::Mobile,
        }),
    );

    assert_eq!(report.total_rentals, 9);
    assert_eq!(report.checkout_status.late, 3);
    assert_eq!(report.delay_repartition.mobile_and_late, 2);
    assert_eq!(report.delay_repartition.connect_and_late, 1);

    // 10 (tras 900) y 14 (tras 903) se quedan sin margen
    assert_eq!(report.impact.consecutive_rentals, 3);
    assert_eq!(report.impact.impacted, 2);
    assert_eq!(report.impact.impacted_canceled, 1);
    assert_eq!(report.impact_status.late_and_impacting, 2);
    assert_eq!(report.impacted_canceled_gaps, vec![-60.0]);

    let sim = report.threshold.expect("threshold sweep requested");
    assert_eq!(sim.late_avoided[44], 0);
    assert_eq!(sim.late_avoided[45], 1);
    assert_eq!(sim.late_avoided[119], 1);
    assert_eq!(sim.late_avoided[120], 2);
    assert!(sim.location_missed.iter().all(|&m| m == 0));
}

#[test]
fn test_all_scope_counts_missed_rentals() {
    let records = load_delay_records(&export()).unwrap();
    let pairs = link_consecutive_rentals(&records);
    let sim = simulate_thresholds(&pairs, ThresholdScope::All, 40);

    // 11 (tras 901) tenía 40 min reales de margen planificado 30
    assert_eq!(sim.location_missed[30], 0);
    assert_eq!(sim.location_missed[31], 1);
}

#[test]
fn test_workbook_and_csv_exports_agree() {
    let from_csv = load_delay_records(&export()).unwrap();
    let from_xlsx = load_delay_records(&fixture("delay_export.xlsx")).unwrap();

    assert_eq!(from_xlsx.len(), 9);
    // Ids numéricos de la hoja llegan como float (900.0) y celdas vacías como nulos
    assert_eq!(from_xlsx[1].previous_ended_rental_id, Some(900));
    assert_eq!(from_xlsx[1].delay_at_checkout_in_minutes, None);
    assert_eq!(from_xlsx[2].checkin_type, CheckinType::Connect);
    assert_eq!(
        serde_json::to_value(&from_xlsx).unwrap(),
        serde_json::to_value(&from_csv).unwrap()
    );

    let report = build_report(&from_xlsx, None);
    assert_eq!(report.impact.impacted, 2);
    assert_eq!(report.impacted_canceled_gaps, vec![-60.0]);
}

#[test]
fn test_missing_workbook_is_a_workbook_error() {
    let err = load_delay_records(Path::new("does/not/exist.xlsx")).unwrap_err();
    assert!(matches!(err, AnalysisError::Workbook { .. }));
}

#[test]
fn test_missing_export_is_an_io_error() {
    let err = load_delay_records(Path::new("does/not/exist.csv")).unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
}

fn random_pairs(rng: &mut StdRng, n: usize) -> Vec<ConsecutiveRental> {
    (0..n)
        .map(|i| {
            let previous_checkin_type = if rng.gen_bool(0.5) {
                CheckinType::Mobile
            } else {
                CheckinType::Connect
            };
            let gap = if rng.gen_bool(0.9) {
                Some(f64::from(rng.gen_range(0..=24u32) * 30))
            } else {
                None
            };
            ConsecutiveRental {
                rental_id: i as i64,
                car_id: rng.gen_range(0..50),
                checkin_type: CheckinType::Mobile,
                state: if rng.gen_bool(0.2) {
                    RentalState::Canceled
                } else {
                    RentalState::Ended
                },
                time_delta_with_previous_rental_in_minutes: gap,
                previous_rental_id: 10_000 + i as i64,
                previous_checkin_type,
                previous_delay_at_checkout_in_minutes: rng.gen_range(-300.0..600.0),
                previous_checkout_status: CheckoutStatus::InTime,
            }
        })
        .collect()
}

#[test]
fn test_threshold_curves_are_monotonic() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let pairs = random_pairs(&mut rng, 200);
        for scope in [ThresholdScope::Mobile, ThresholdScope::Connect, ThresholdScope::All] {
            let sim = simulate_thresholds(&pairs, scope, 240);
            assert_eq!(sim.late_avoided[0], 0);
            assert_eq!(sim.location_missed[0], 0);
            assert!(sim.late_avoided.windows(2).all(|w| w[0] <= w[1]));
            assert!(sim.location_missed.windows(2).all(|w| w[0] <= w[1]));

            let impacted = pairs
                .iter()
                .filter(|p| scope.includes(p.previous_checkin_type))
                .filter(|p| p.is_impacted() == Some(true))
                .count();
            assert!(sim.late_avoided.iter().all(|&avoided| avoided <= impacted));
        }
    }
}

#[test]
fn test_scoped_curves_add_up_to_all() {
    let mut rng = StdRng::seed_from_u64(11);
    let pairs = random_pairs(&mut rng, 300);
    let mobile = simulate_thresholds(&pairs, ThresholdScope::Mobile, 120);
    let connect = simulate_thresholds(&pairs, ThresholdScope::Connect, 120);
    let all = simulate_thresholds(&pairs, ThresholdScope::All, 120);

    for t in 0..120 {
        assert_eq!(mobile.late_avoided[t] + connect.late_avoided[t], all.late_avoided[t]);
        assert_eq!(
            mobile.location_missed[t] + connect.location_missed[t],
            all.location_missed[t]
        );
    }
}
