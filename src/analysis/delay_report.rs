//! Análisis de retrasos al devolver el coche
//!
//! Clasifica cada alquiler como tardío o a tiempo, enlaza cada alquiler con
//! el anterior del mismo coche y mide cuántos alquileres se ven afectados
//! (y cancelados) porque el anterior devolvió el coche tarde.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::analysis::delay_record::{CheckinType, DelayRecord, RentalState};
use crate::analysis::stats::{mean, percentage};
use crate::analysis::threshold::{simulate_thresholds, ThresholdSimulation};
use crate::analysis::ThresholdScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    InTime,
    Late,
    LateAndImpacting,
}

impl CheckoutStatus {
    pub fn of(record: &DelayRecord) -> Self {
        if record.is_late() {
            CheckoutStatus::Late
        } else {
            CheckoutStatus::InTime
        }
    }
}

/// Alquiler enlazado con el alquiler anterior del mismo coche
#[derive(Debug, Clone, Serialize)]
pub struct ConsecutiveRental {
    pub rental_id: i64,
    pub car_id: i64,
    pub checkin_type: CheckinType,
    pub state: RentalState,
    pub time_delta_with_previous_rental_in_minutes: Option<f64>,
    pub previous_rental_id: i64,
    pub previous_checkin_type: CheckinType,
    pub previous_delay_at_checkout_in_minutes: f64,
    pub previous_checkout_status: CheckoutStatus,
}

impl ConsecutiveRental {
    /// Margen real entre alquileres: margen planificado menos el retraso anterior
    pub fn realized_gap(&self) -> Option<f64> {
        self.gap_with_floor(f64::NEG_INFINITY)
    }

    /// Margen real si el margen planificado no pudiera bajar de `floor`
    pub fn gap_with_floor(&self, floor: f64) -> Option<f64> {
        self.time_delta_with_previous_rental_in_minutes
            .map(|gap| gap.max(floor) - self.previous_delay_at_checkout_in_minutes)
    }

    /// `Some(true)` si el retraso anterior se comió todo el margen
    pub fn is_impacted(&self) -> Option<bool> {
        self.realized_gap().map(|gap| gap < 0.0)
    }

    pub fn is_canceled(&self) -> bool {
        self.state == RentalState::Canceled
    }
}

/// Enlazar cada alquiler con su predecesor por identificador.
///
/// Se descartan los alquileres sin predecesor conocido y aquellos cuyo
/// predecesor no tiene retraso registrado. Ante ids duplicados gana la
/// primera aparición.
pub fn link_consecutive_rentals(records: &[DelayRecord]) -> Vec<ConsecutiveRental> {
    let mut by_id: HashMap<i64, &DelayRecord> = HashMap::with_capacity(records.len());
    for record in records {
        by_id.entry(record.rental_id).or_insert(record);
    }

    records
        .iter()
        .filter_map(|record| {
            let previous = by_id.get(&record.previous_ended_rental_id?)?;
            let previous_delay = previous.delay_at_checkout_in_minutes?;
            Some(ConsecutiveRental {
                rental_id: record.rental_id,
                car_id: record.car_id,
                checkin_type: record.checkin_type,
                state: record.state,
                time_delta_with_previous_rental_in_minutes: record
                    .time_delta_with_previous_rental_in_minutes,
                previous_rental_id: previous.rental_id,
                previous_checkin_type: previous.checkin_type,
                previous_delay_at_checkout_in_minutes: previous_delay,
                previous_checkout_status: CheckoutStatus::of(previous),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub in_time: usize,
    pub late: usize,
    pub late_and_impacting: usize,
}

impl StatusCounts {
    fn add(&mut self, status: CheckoutStatus) {
        match status {
            CheckoutStatus::InTime => self.in_time += 1,
            CheckoutStatus::Late => self.late += 1,
            CheckoutStatus::LateAndImpacting => self.late_and_impacting += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DelayRepartition {
    pub in_time: usize,
    pub mobile_and_late: usize,
    pub connect_and_late: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckinTypeStats {
    pub checkin_type: CheckinType,
    pub rentals: usize,
    pub late: usize,
    pub late_rate_pct: Option<f64>,
    pub mean_late_delay_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactSummary {
    pub consecutive_rentals: usize,
    pub impacted: usize,
    pub impacted_canceled: usize,
    pub non_impacted: usize,
    pub non_impacted_canceled: usize,
    pub total_canceled: usize,
    /// Cancelaciones sin causa aparente (entre los no afectados)
    pub baseline_cancel_rate_pct: Option<f64>,
    pub impacted_cancel_rate_pct: Option<f64>,
    /// Parte de todos los alquileres cancelada por retrasos, descontando la tasa base
    pub delay_attributed_cancel_share_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DelayReport {
    pub total_rentals: usize,
    pub checkout_status: StatusCounts,
    pub delay_repartition: DelayRepartition,
    pub by_checkin_type: Vec<CheckinTypeStats>,
    pub impact: ImpactSummary,
    pub impact_status: StatusCounts,
    pub impacted_canceled_gaps: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdSimulation>,
}

/// Parámetros del simulador de umbral
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdOptions {
    pub max_threshold: u32,
    pub scope: ThresholdScope,
}

pub fn checkin_type_stats(records: &[DelayRecord], checkin_type: CheckinType) -> CheckinTypeStats {
    let of_type: Vec<&DelayRecord> = records
        .iter()
        .filter(|r| r.checkin_type == checkin_type)
        .collect();
    let late: Vec<f64> = of_type
        .iter()
        .filter(|r| r.is_late())
        .filter_map(|r| r.delay_at_checkout_in_minutes)
        .collect();

    CheckinTypeStats {
        checkin_type,
        rentals: of_type.len(),
        late: late.len(),
        late_rate_pct: percentage(late.len(), of_type.len()),
        mean_late_delay_minutes: mean(late),
    }
}

pub fn summarize_impact(pairs: &[ConsecutiveRental], total_rentals: usize) -> ImpactSummary {
    let mut impacted = 0;
    let mut impacted_canceled = 0;
    let mut non_impacted = 0;
    let mut non_impacted_canceled = 0;
    for pair in pairs {
        match pair.is_impacted() {
            Some(true) => {
                impacted += 1;
                impacted_canceled += usize::from(pair.is_canceled());
            }
            Some(false) => {
                non_impacted += 1;
                non_impacted_canceled += usize::from(pair.is_canceled());
            }
            None => {}
        }
    }

    let baseline = percentage(non_impacted_canceled, non_impacted);
    // Sin tasa base no se descuenta nada
    let attributed = impacted_canceled as f64 * (1.0 - baseline.unwrap_or(0.0) / 100.0);

    ImpactSummary {
        consecutive_rentals: pairs.len(),
        impacted,
        impacted_canceled,
        non_impacted,
        non_impacted_canceled,
        total_canceled: pairs.iter().filter(|p| p.is_canceled()).count(),
        baseline_cancel_rate_pct: baseline,
        impacted_cancel_rate_pct: percentage(impacted_canceled, impacted),
        delay_attributed_cancel_share_pct: percentage(attributed, total_rentals as f64),
    }
}

/// Estado de cada alquiler tras marcar los que retrasaron al siguiente.
///
/// Un alquiler es `LateAndImpacting` si es el predecesor de al menos un
/// alquiler afectado. La búsqueda es por identificador, no por posición.
pub fn impact_statuses(records: &[DelayRecord], pairs: &[ConsecutiveRental]) -> Vec<CheckoutStatus> {
    let impacting: HashSet<i64> = pairs
        .iter()
        .filter(|p| p.is_impacted() == Some(true))
        .map(|p| p.previous_rental_id)
        .collect();

    records
        .iter()
        .map(|record| {
            if impacting.contains(&record.rental_id) {
                CheckoutStatus::LateAndImpacting
            } else {
                CheckoutStatus::of(record)
            }
        })
        .collect()
}

/// Recalcular el informe completo
pub fn build_report(records: &[DelayRecord], threshold: Option<ThresholdOptions>) -> DelayReport {
    let mut checkout_status = StatusCounts::default();
    let mut delay_repartition = DelayRepartition::default();
    for record in records {
        let status = CheckoutStatus::of(record);
        checkout_status.add(status);
        match (status, record.checkin_type) {
            (CheckoutStatus::Late, CheckinType::Mobile) => delay_repartition.mobile_and_late += 1,
            (CheckoutStatus::Late, CheckinType::Connect) => delay_repartition.connect_and_late += 1,
            _ => delay_repartition.in_time += 1,
        }
    }

    let pairs = link_consecutive_rentals(records);

    let mut impact_status = StatusCounts::default();
    for status in impact_statuses(records, &pairs) {
        impact_status.add(status);
    }

    let mut impacted_canceled_gaps: Vec<f64> = pairs
        .iter()
        .filter(|p| p.is_canceled())
        .filter_map(|p| p.realized_gap())
        .filter(|gap| *gap < 0.0)
        .collect();
    impacted_canceled_gaps.sort_by(f64::total_cmp);

    DelayReport {
        total_rentals: records.len(),
        checkout_status,
        delay_repartition,
        by_checkin_type: vec![
            checkin_type_stats(records, CheckinType::Mobile),
            checkin_type_stats(records, CheckinType::Connect),
        ],
        impact: summarize_impact(&pairs, records.len()),
        impact_status,
        impacted_canceled_gaps,
        threshold: threshold
            .filter(|opts| opts.max_threshold > 0)
            .map(|opts| simulate_thresholds(&pairs, opts.scope, opts.max_threshold)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        rental_id: i64,
        checkin_type: CheckinType,
        state: RentalState,
        delay: Option<f64>,
        previous: Option<i64>,
        gap: Option<f64>,
    ) -> DelayRecord {
        DelayRecord {
            rental_id,
            car_id: 1,
            checkin_type,
            state,
            delay_at_checkout_in_minutes: delay,
            previous_ended_rental_id: previous,
            time_delta_with_previous_rental_in_minutes: gap,
        }
    }

    fn fleet() -> Vec<DelayRecord> {
        use CheckinType::*;
        use RentalState::*;
        vec![
            // Predecesor muy tarde: 120 min de retraso
            record(900, Mobile, Ended, Some(120.0), None, None),
            // Margen de 60 min -> afectado y cancelado
            record(10, Mobile, Canceled, None, Some(900), Some(60.0)),
            // Predecesor a tiempo
            record(901, Connect, Ended, Some(-10.0), None, None),
            // Margen de 30 min -> no afectado
            record(11, Connect, Ended, Some(5.0), Some(901), Some(30.0)),
            // Predecesor sin retraso registrado -> descartado
            record(902, Mobile, Ended, None, None, None),
            record(12, Mobile, Ended, Some(-3.0), Some(902), Some(0.0)),
            // Predecesor inexistente -> descartado
            record(13, Connect, Canceled, None, Some(777), Some(90.0)),
        ]
    }

    #[test]
    fn test_links_by_identifier_and_drops_unknown_delays() {
        let pairs = link_consecutive_rentals(&fleet());
        let ids: Vec<i64> = pairs.iter().map(|p| p.rental_id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(pairs[0].realized_gap(), Some(-60.0));
        assert_eq!(pairs[0].previous_checkout_status, CheckoutStatus::Late);
        assert_eq!(pairs[1].realized_gap(), Some(40.0));
    }

    #[test]
    fn test_checkin_type_stats() {
        let records = fleet();
        let mobile = checkin_type_stats(&records, CheckinType::Mobile);
        assert_eq!(mobile.rentals, 4);
        assert_eq!(mobile.late, 1);
        assert_eq!(mobile.late_rate_pct, Some(25.0));
        assert_eq!(mobile.mean_late_delay_minutes, Some(120.0));

        let connect = checkin_type_stats(&records, CheckinType::Connect);
        assert_eq!(connect.late, 1);
        assert_eq!(connect.mean_late_delay_minutes, Some(5.0));
    }

    #[test]
    fn test_impact_summary() {
        let records = fleet();
        let pairs = link_consecutive_rentals(&records);
        let impact = summarize_impact(&pairs, records.len());
        assert_eq!(impact.impacted, 1);
        assert_eq!(impact.impacted_canceled, 1);
        assert_eq!(impact.non_impacted, 1);
        assert_eq!(impact.baseline_cancel_rate_pct, Some(0.0));
        assert_eq!(impact.impacted_cancel_rate_pct, Some(100.0));
        let share = impact.delay_attributed_cancel_share_pct.unwrap();
        assert!((share - 100.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_predecessor_of_impacted_rental_is_late_and_impacting() {
        let records = fleet();
        let pairs = link_consecutive_rentals(&records);
        let statuses = impact_statuses(&records, &pairs);
        assert_eq!(statuses[0], CheckoutStatus::LateAndImpacting);
        assert_eq!(statuses[1], CheckoutStatus::InTime);
        assert_eq!(statuses[3], CheckoutStatus::Late);
    }

    #[test]
    fn test_build_report_counts() {
        let report = build_report(&fleet(), None);
        assert_eq!(report.total_rentals, 7);
        assert_eq!(report.checkout_status.late, 2);
        assert_eq!(report.checkout_status.in_time, 5);
        assert_eq!(report.delay_repartition.mobile_and_late, 1);
        assert_eq!(report.delay_repartition.connect_and_late, 1);
        assert_eq!(report.impact_status.late_and_impacting, 1);
        assert_eq!(report.impacted_canceled_gaps, vec![-60.0]);
        assert!(report.threshold.is_none());
    }

    #[test]
    fn test_empty_table_has_no_rates() {
        let report = build_report(&[], Some(ThresholdOptions { max_threshold: 3, scope: ThresholdScope::All }));
        assert_eq!(report.total_rentals, 0);
        assert!(report.by_checkin_type.iter().all(|s| s.late_rate_pct.is_none()));
        assert!(report.impact.baseline_cancel_rate_pct.is_none());
        assert_eq!(report.threshold.unwrap().late_avoided, vec![0, 0, 0]);
    }
}
