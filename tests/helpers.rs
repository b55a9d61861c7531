//! Test helper utilities for generating synthetic I/Q signals

use std::f64::consts::TAU;

/// Generate a complex sine wave at a specific frequency
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `num_samples` - Number of samples to generate
///
/// # Returns
/// Vector of complex samples as interleaved I/Q bytes (format: Cu8)
pub fn generate_sine_wave_cu8(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 2);
    let angular_freq = TAU * frequency / sample_rate;

    for n in 0..num_samples {
        let phase = angular_freq * n as f64;
        let i = phase.cos();
        let q = phase.sin();

        // Convert from [-1, 1] to [0, 255] for Cu8 format
        let i_byte = ((i + 1.0) * 127.5) as u8;
        let q_byte = ((q + 1.0) * 127.5) as u8;

        buffer.push(i_byte);
        buffer.push(q_byte);
    }

    buffer
}

/// Generate a complex sine wave at a specific frequency (Cf32 format)
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `num_samples` - Number of samples to generate
///
/// # Returns
/// Vector of complex samples as interleaved I/Q bytes (format: Cf32, little-endian)
pub fn generate_sine_wave_cf32(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 8);
    let angular_freq = TAU * frequency / sample_rate;

    for n in 0..num_samples {
        let phase = angular_freq * n as f64;
        let i = phase.cos() as f32;
        let q = phase.sin() as f32;

        buffer.extend_from_slice(&i.to_le_bytes());
        buffer.extend_from_slice(&q.to_le_bytes());
    }

    buffer
}

/// Generate a DC signal (constant value) in Cu8 format
///
/// # Arguments
/// * `num_samples` - Number of samples to generate
/// * `i_value` - I component value in [-1, 1]
/// * `q_value` - Q component value in [-1, 1]
pub fn generate_dc_signal_cu8(num_samples: usize, i_value: f64, q_value: f64) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(num_samples * 2);

    let i_byte = ((i_value + 1.0) * 127.5).clamp(0.0, 255.0) as u8;
    let q_byte = ((q_value + 1.0) * 127.5).clamp(0.0, 255.0) as u8;

    for _ in 0..num_samples {
        buffer.push(i_byte);
        buffer.push(q_byte);
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sine_wave_cu8_length() {
        let samples = generate_sine_wave_cu8(1000.0, 96000.0, 100);
        assert_eq!(samples.len(), 200); // 100 samples * 2 bytes per sample
    }

    #[test]
    fn test_generate_sine_wave_cu8_dc() {
        // 0 Hz tone: I stays at full scale, Q at the midpoint
        let samples = generate_sine_wave_cu8(0.0, 96000.0, 10);
        for i in (0..samples.len()).step_by(2) {
            assert_eq!(samples[i], 255, "I component should be 255 for DC signal");
            assert!(
                (samples[i + 1] as i16 - 127).abs() <= 1,
                "Q component should be ~127 for DC signal"
            );
        }
    }

    #[test]
    fn test_generate_sine_wave_cf32_length() {
        let samples = generate_sine_wave_cf32(1000.0, 96000.0, 100);
        assert_eq!(samples.len(), 800); // 100 samples * 8 bytes per sample
    }

    #[test]
    fn test_generate_dc_signal_cu8_center() {
        let samples = generate_dc_signal_cu8(50, 0.0, 0.0);
        assert_eq!(samples.len(), 100);
        for &byte in &samples {
            assert_eq!(byte, 127);
        }
    }
}
