// Math helpers shared by the extractors, mapping channels and interpolator.
//
// Every helper is total: degenerate ranges and empty inputs produce a
// well-defined value instead of NaN.

/// Linearly remap `value` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// The result is not clamped; callers clamp at the point of production.
/// A zero-width input range maps everything to `out_min`.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let normalized = (value - in_min) / span;
    out_min + normalized * (out_max - out_min)
}

/// Linear interpolation with `t` clamped to [0, 1].
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Hermite smoothstep between two edges.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let span = edge1 - edge0;
    if span == 0.0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / span).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Root mean square of a buffer (0.0 for an empty buffer).
pub fn rms(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f32 = data.iter().map(|&x| x * x).sum();
    (sum / data.len() as f32).sqrt()
}

/// Normalize a decibel value into [0, 1] against the analyser's dB window.
///
/// `-inf` normalizes to 0.0. An empty dB window (min == max) yields 0.0.
pub fn normalize_decibels(value: f32, min_db: f32, max_db: f32) -> f32 {
    let span = max_db - min_db;
    if span == 0.0 || value.is_nan() {
        return 0.0;
    }
    ((value - min_db) / span).clamp(0.0, 1.0)
}

/// Frame-rate-independent blend factor: `1 - e^(-speed * dt / 1000)`.
///
/// # Arguments
/// * `speed` - Interpolation speed (higher converges faster)
/// * `dt_ms` - Elapsed time since the previous frame in milliseconds
///
/// # Returns
/// Blend factor in [0, 1]
pub fn time_lerp_factor(speed: f32, dt_ms: f32) -> f32 {
    (1.0 - (-speed * dt_ms / 1000.0).exp()).clamp(0.0, 1.0)
}
