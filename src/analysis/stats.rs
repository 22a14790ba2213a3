//! Estadísticas descriptivas básicas

use num_traits::ToPrimitive;

/// `part / whole * 100`, o `None` si el total es cero
pub fn percentage<N: ToPrimitive>(part: N, whole: N) -> Option<f64> {
    let whole = whole.to_f64()?;
    if whole == 0.0 {
        return None;
    }
    Some(part.to_f64()? / whole * 100.0)
}

/// Media aritmética, o `None` si no hay valores
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator,
    I::Item: ToPrimitive,
{
    let (sum, count) = values
        .into_iter()
        .filter_map(|v| v.to_f64())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Redondear a dos decimales para la salida por consola
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
