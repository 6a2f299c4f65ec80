use crate::calibration::CalibrationEntry;

/// Interpolates between a hot row and the next colder row.
///
/// `sample` must lie in `hot.raw..=cold.raw` and `cold.raw` must be
/// greater than `hot.raw`. The result is anchored at the cold row and
/// division truncates toward zero, so fractional results lean toward
/// `cold.temperature`.
pub fn interpolate(hot: CalibrationEntry, cold: CalibrationEntry, sample: u32) -> i32 {
    let span = i128::from(hot.temperature) - i128::from(cold.temperature);
    let distance = i128::from(cold.raw - sample);
    let width = i128::from(cold.raw - hot.raw);

    // Lies between the two row temperatures, so it fits back in i32.
    (i128::from(cold.temperature) + span * distance / width) as i32
}
