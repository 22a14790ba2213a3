//! Simulación de un umbral mínimo entre alquileres
//!
//! Para cada umbral `t` el margen planificado entre dos alquileres del mismo
//! coche pasa a ser `max(margen, t)`. Se cuentan los alquileres afectados que
//! dejan de estarlo (retrasos evitados) y los alquileres que tenían margen
//! suficiente pero quedan por debajo del umbral (alquileres perdidos).

use serde::Serialize;

use crate::analysis::delay_report::ConsecutiveRental;
use crate::analysis::ThresholdScope;

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdSimulation {
    pub scope: ThresholdScope,
    pub thresholds: Vec<u32>,
    pub late_avoided: Vec<usize>,
    pub location_missed: Vec<usize>,
}

/// Un punto de la curva de umbral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPoint {
    pub threshold: u32,
    pub late_avoided: usize,
    pub location_missed: usize,
}

impl ThresholdSimulation {
    pub fn points(&self) -> impl Iterator<Item = ThresholdPoint> + '_ {
        self.thresholds
            .iter()
            .zip(&self.late_avoided)
            .zip(&self.location_missed)
            .map(|((&threshold, &late_avoided), &location_missed)| ThresholdPoint {
                threshold,
                late_avoided,
                location_missed,
            })
    }
}

/// Barrer los umbrales `0..max_threshold` sobre los alquileres del alcance
pub fn simulate_thresholds(
    pairs: &[ConsecutiveRental],
    scope: ThresholdScope,
    max_threshold: u32,
) -> ThresholdSimulation {
    let scoped: Vec<&ConsecutiveRental> = pairs
        .iter()
        .filter(|p| scope.includes(p.previous_checkin_type))
        .collect();
    let impacted_without_threshold = scoped
        .iter()
        .filter(|p| p.is_impacted() == Some(true))
        .count();

    let mut thresholds = Vec::with_capacity(max_threshold as usize);
    let mut late_avoided = Vec::with_capacity(max_threshold as usize);
    let mut location_missed = Vec::with_capacity(max_threshold as usize);

    for threshold in 0..max_threshold {
        let floor = f64::from(threshold);

        let still_impacted = scoped
            .iter()
            .filter(|p| p.gap_with_floor(floor).map_or(false, |gap| gap < 0.0))
            .count();

        // Solo pierden hueco los alquileres que ya tenían margen suficiente
        let missed = scoped
            .iter()
            .filter(|p| p.is_impacted() == Some(false))
            .filter(|p| {
                p.time_delta_with_previous_rental_in_minutes
                    .map_or(false, |gap| gap < floor)
            })
            .count();

        thresholds.push(threshold);
        late_avoided.push(impacted_without_threshold.saturating_sub(still_impacted));
        location_missed.push(missed);
    }

    ThresholdSimulation {
        scope,
        thresholds,
        late_avoided,
        location_missed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::delay_report::CheckoutStatus;
    use crate::analysis::delay_record::{CheckinType, RentalState};

    fn pair(previous_checkin_type: CheckinType, gap: Option<f64>, previous_delay: f64) -> ConsecutiveRental {
        ConsecutiveRental {
            rental_id: 1,
            car_id: 1,
            checkin_type: CheckinType::Mobile,
            state: RentalState::Ended,
            time_delta_with_previous_rental_in_minutes: gap,
            previous_rental_id: 0,
            previous_checkin_type,
            previous_delay_at_checkout_in_minutes: previous_delay,
            previous_checkout_status: CheckoutStatus::InTime,
        }
    }

    #[test]
    fn test_threshold_sweep() {
        let pairs = vec![
            // Afectado: margen 30, retraso 50 -> se evita con t > 50
            pair(CheckinType::Mobile, Some(30.0), 50.0),
            // No afectado: margen 20 -> se pierde con t > 20
            pair(CheckinType::Mobile, Some(20.0), 0.0),
            // Margen desconocido: nunca cuenta
            pair(CheckinType::Mobile, None, 100.0),
            // Fuera del alcance mobile
            pair(CheckinType::Connect, Some(0.0), 10.0),
        ];
        let sim = simulate_thresholds(&pairs, ThresholdScope::Mobile, 60);
        assert_eq!(sim.thresholds.len(), 60);
        assert_eq!(sim.late_avoided[0], 0);
        assert_eq!(sim.late_avoided[50], 0);
        assert_eq!(sim.late_avoided[51], 1);
        assert_eq!(sim.location_missed[20], 0);
        assert_eq!(sim.location_missed[21], 1);
        assert_eq!(sim.location_missed[59], 1);
    }

    #[test]
    fn test_scope_selects_previous_checkin_type() {
        let pairs = vec![
            pair(CheckinType::Mobile, Some(30.0), 50.0),
            pair(CheckinType::Connect, Some(0.0), 10.0),
        ];
        let connect = simulate_thresholds(&pairs, ThresholdScope::Connect, 12);
        assert_eq!(connect.late_avoided[11], 1);
        let all = simulate_thresholds(&pairs, ThresholdScope::All, 60);
        assert_eq!(all.late_avoided[59], 2);
    }

    #[test]
    fn test_points_zip_the_three_series() {
        let pairs = vec![pair(CheckinType::Mobile, Some(5.0), 0.0)];
        let sim = simulate_thresholds(&pairs, ThresholdScope::Mobile, 7);
        let last = sim.points().last().unwrap();
        assert_eq!(
            last,
            ThresholdPoint {
                threshold: 6,
                late_avoided: 0,
                location_missed: 1
            }
        );
    }
}
