//! Signal generators shared by the unit tests.

use rand::Rng;

/// Generate a pure sine wave
pub fn generate_sine_wave(
    sample_rate: u32,
    frequency: f32,
    duration_samples: usize,
    amplitude: f32,
) -> Vec<f32> {
    (0..duration_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate digital silence
pub fn generate_silence(duration_samples: usize) -> Vec<f32> {
    vec![0.0; duration_samples]
}

/// Generate white noise in [-amplitude, amplitude]
pub fn generate_white_noise(duration_samples: usize, amplitude: f32) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..duration_samples)
        .map(|_| rng.gen_range(-amplitude..=amplitude))
        .collect()
}

/// Spectrum with every bin at the same decibel level
pub fn flat_spectrum(bins: usize, db: f32) -> Vec<f32> {
    vec![db; bins]
}
