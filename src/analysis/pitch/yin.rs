// YIN module - cumulative-mean-normalized difference pitch detection
//
// Algorithm (de Cheveigné & Kawahara, 2002):
// 1. Difference function d(τ) = Σ (x[i] - x[i+τ])² over the first half
// 2. Cumulative mean normalization d'(τ) = d(τ)·τ / Σ_{j≤τ} d(j), d'(0) = 1
// 3. Absolute threshold: first τ in range with d'(τ) < threshold, then walk
//    down to the local minimum that follows it
// 4. Parabolic interpolation over d'(τ-1), d'(τ), d'(τ+1)

use super::PitchEstimate;

pub(super) fn detect(
    data: &[f32],
    sample_rate: f32,
    min_frequency: f32,
    max_frequency: f32,
    threshold: f32,
) -> PitchEstimate {
    let half_size = data.len() / 2;
    if half_size < 3 {
        return PitchEstimate::NONE;
    }

    let yin_buffer = cumulative_mean_normalized_difference(data, half_size);

    let min_period = (sample_rate / max_frequency).floor() as usize;
    let max_period = (sample_rate / min_frequency).floor() as usize;
    let search_start = min_period.max(2);
    let search_end = half_size.min(max_period);

    let mut best_tau = None;
    let mut tau = search_start;
    while tau < search_end {
        if yin_buffer[tau] < threshold {
            while tau + 1 < half_size && yin_buffer[tau + 1] < yin_buffer[tau] {
                tau += 1;
            }
            best_tau = Some(tau);
            break;
        }
        tau += 1;
    }

    let Some(best_tau) = best_tau else {
        return PitchEstimate::NONE;
    };
    let confidence = 1.0 - yin_buffer[best_tau];

    let s0 = yin_buffer[best_tau - 1];
    let s1 = yin_buffer[best_tau];
    let s2 = if best_tau + 1 < half_size {
        yin_buffer[best_tau + 1]
    } else {
        s1
    };
    let curvature = 2.0 * (s0 - 2.0 * s1 + s2);
    let denominator = if curvature != 0.0 { curvature } else { 1.0 };
    let better_tau = best_tau as f32 + (s0 - s2) / denominator;

    PitchEstimate {
        frequency: (sample_rate / better_tau).clamp(min_frequency, max_frequency),
        confidence: confidence.clamp(0.0, 1.0),
    }
}

fn cumulative_mean_normalized_difference(data: &[f32], half_size: usize) -> Vec<f32> {
    let mut yin_buffer = vec![0.0f32; half_size];

    for (tau, slot) in yin_buffer.iter_mut().enumerate() {
        *slot = (0..half_size)
            .map(|i| {
                let delta = data[i] - data[i + tau];
                delta * delta
            })
            .sum();
    }

    yin_buffer[0] = 1.0;
    let mut running_sum = 0.0f32;
    for tau in 1..half_size {
        running_sum += yin_buffer[tau];
        yin_buffer[tau] = if running_sum > 0.0 {
            yin_buffer[tau] * tau as f32 / running_sum
        } else {
            1.0
        };
    }

    yin_buffer
}
