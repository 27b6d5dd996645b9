// Autocorrelation module - normalized cross-correlation pitch detection
//
// For every lag τ in [sr/max_freq, min(sr/min_freq, N/2)]:
//   r(τ) = Σ x[i]·x[i+τ] / sqrt(Σ x[i]² · Σ x[i+τ]²)
// The lag with the highest r wins. Integer multiples of the true period
// correlate almost as well as the period itself, so among local maxima the
// shortest lag within OCTAVE_TOLERANCE of the best score is reported.

use super::PitchEstimate;

/// Fraction of the best correlation a shorter lag needs to be preferred
const OCTAVE_TOLERANCE: f32 = 0.98;

pub(super) fn detect(
    data: &[f32],
    sample_rate: f32,
    min_frequency: f32,
    max_frequency: f32,
    threshold: f32,
) -> PitchEstimate {
    let buffer_size = data.len();
    let min_period = ((sample_rate / max_frequency).floor() as usize).max(1);
    let max_period = ((sample_rate / min_frequency).floor() as usize).min(buffer_size / 2);

    if min_period > max_period {
        return PitchEstimate::NONE;
    }

    let correlations: Vec<f32> = (min_period..=max_period)
        .map(|period| normalized_correlation(data, period))
        .collect();

    let (best_index, best_correlation) = correlations
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, r)| {
            if r > best.1 {
                (i, r)
            } else {
                best
            }
        });

    if best_correlation <= 0.0 || best_correlation < threshold {
        return PitchEstimate::NONE;
    }

    let floor = (best_correlation * OCTAVE_TOLERANCE).max(threshold);
    let chosen = (0..correlations.len())
        .find(|&i| correlations[i] >= floor && is_local_peak(&correlations, i))
        .unwrap_or(best_index);

    let period = min_period + chosen;
    PitchEstimate {
        frequency: (sample_rate / period as f32).clamp(min_frequency, max_frequency),
        confidence: correlations[chosen].clamp(0.0, 1.0),
    }
}

fn normalized_correlation(data: &[f32], period: usize) -> f32 {
    let mut correlation = 0.0f32;
    let mut norm1 = 0.0f32;
    let mut norm2 = 0.0f32;

    for i in 0..data.len() - period {
        let a = data[i];
        let b = data[i + period];
        correlation += a * b;
        norm1 += a * a;
        norm2 += b * b;
    }

    let denominator = (norm1 * norm2).sqrt();
    correlation / if denominator > 0.0 { denominator } else { 1.0 }
}

fn is_local_peak(values: &[f32], i: usize) -> bool {
    let left_ok = i == 0 || values[i] >= values[i - 1];
    let right_ok = i + 1 >= values.len() || values[i] >= values[i + 1];
    left_ok && right_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::generate_sine_wave;

    #[test]
    fn test_prefers_fundamental_over_subharmonic() {
        // 220 Hz at 44.1 kHz: lag 401 lines up with two periods slightly
        // better than lag 200 lines up with one
        let signal = generate_sine_wave(44100, 220.0, 2048, 0.8);
        let estimate = detect(&signal, 44100.0, 80.0, 600.0, 0.8);
        assert!(
            (estimate.frequency - 220.0).abs() / 220.0 < 0.02,
            "Expected ~220 Hz, got {} Hz",
            estimate.frequency
        );
    }

    #[test]
    fn test_silence_has_no_pitch() {
        let estimate = detect(&[0.0; 2048], 44100.0, 80.0, 600.0, 0.0);
        assert_eq!(estimate, PitchEstimate::NONE);
    }

    #[test]
    fn test_buffer_too_short() {
        let signal = generate_sine_wave(44100, 220.0, 64, 0.8);
        assert_eq!(detect(&signal, 44100.0, 80.0, 600.0, 0.5), PitchEstimate::NONE);
    }

    #[test]
    fn test_local_peak_edges() {
        let values = [0.9, 0.5, 0.7, 0.6];
        assert!(is_local_peak(&values, 0));
        assert!(!is_local_peak(&values, 1));
        assert!(is_local_peak(&values, 2));
        assert!(!is_local_peak(&values, 3));
    }
}
