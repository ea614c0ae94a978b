// Zero-phase Butterworth low-pass filtering
// Cascaded second-order sections, run forward then backward like `filtfilt`

use std::f64::consts::PI;

use crate::signal::SignalError;

/// Filter order used by the preprocessor
pub const FILTER_ORDER: usize = 4;

/// One second-order IIR section with a0 normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    /// Low-pass section from the pre-warped analog frequency `k` and pole quality `q`
    fn lowpass(k: f64, q: f64) -> Self {
        let k2 = k * k;
        let norm = 1.0 / (1.0 + k / q + k2);
        let b0 = k2 * norm;

        Biquad {
            b0,
            b1: 2.0 * b0,
            b2: b0,
            a1: 2.0 * (k2 - 1.0) * norm,
            a2: (1.0 - k / q + k2) * norm,
        }
    }

    /// Delay-line state that holds the output at `level` for a constant input of `level`
    /// Valid because every low-pass section has unit DC gain
    fn steady_state(&self, level: f64) -> [f64; 2] {
        let z2 = (self.b2 - self.a2) * level;
        let z1 = (self.b1 - self.a1) * level + z2;
        [z1, z2]
    }

    /// Filter in place (transposed direct form II)
    fn process(&self, signal: &mut [f64], state: [f64; 2]) {
        let [mut z1, mut z2] = state;

        for sample in signal.iter_mut() {
            let x = *sample;
            let y = self.b0 * x + z1;
            z1 = self.b1 * x - self.a1 * y + z2;
            z2 = self.b2 * x - self.a2 * y;
            *sample = y;
        }
    }
}

/// Butterworth low-pass filter designed with the bilinear transform
#[derive(Debug, Clone)]
pub struct ButterworthLowpass {
    order: usize,
    sections: Vec<Biquad>,
}

impl ButterworthLowpass {
    /// Design a low-pass filter
    ///
    /// # Arguments
    /// * `order` - Filter order (even, >= 2)
    /// * `cutoff_hz` - Cutoff frequency in Hz, below Nyquist
    /// * `sample_rate_hz` - Sampling rate in Hz
    pub fn new(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self, SignalError> {
        if order < 2 || order % 2 != 0 {
            return Err(SignalError::InvalidOrder(order));
        }

        let nyquist_hz = 0.5 * sample_rate_hz;
        if !(cutoff_hz > 0.0 && cutoff_hz < nyquist_hz) {
            return Err(SignalError::InvalidCutoff {
                cutoff_hz,
                nyquist_hz,
            });
        }

        // Pre-warp so the digital response is -3 dB exactly at the cutoff
        let k = (PI * cutoff_hz / sample_rate_hz).tan();

        let sections = (0..order / 2)
            .map(|i| {
                let theta = PI * (2 * i + 1) as f64 / (2 * order) as f64;
                let q = 1.0 / (2.0 * theta.cos());
                Biquad::lowpass(k, q)
            })
            .collect();

        Ok(ButterworthLowpass { order, sections })
    }

    /// Filter order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of samples added at each end before filtering
    fn pad_len(&self, signal_len: usize) -> usize {
        (3 * (self.order + 1)).min(signal_len.saturating_sub(1))
    }

    fn run_cascade(&self, signal: &mut [f64]) {
        for section in &self.sections {
            let Some(&first) = signal.first() else {
                return;
            };
            section.process(signal, section.steady_state(first));
        }
    }

    /// Apply the filter forward and backward for zero phase lag
    /// The signal is padded by odd extension so the ends do not ring
    pub fn filtfilt(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n < 2 {
            return signal.to_vec();
        }

        let pad = self.pad_len(n);
        let first = signal[0];
        let last = signal[n - 1];

        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        self.run_cascade(&mut extended);
        extended.reverse();
        self.run_cascade(&mut extended);
        extended.reverse();

        extended[pad..pad + n].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq_hz * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_sections_have_unit_dc_gain() {
        let filter = ButterworthLowpass::new(4, 15.0, 100.0).unwrap();
        assert_eq!(filter.order(), 4);
        assert_eq!(filter.sections.len(), 2);

        for s in &filter.sections {
            let gain = (s.b0 + s.b1 + s.b2) / (1.0 + s.a1 + s.a2);
            assert!((gain - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_signal_unchanged() {
        let filter = ButterworthLowpass::new(4, 15.0, 100.0).unwrap();
        let signal = vec![0.42; 200];
        let filtered = filter.filtfilt(&signal);

        assert_eq!(filtered.len(), signal.len());
        for v in filtered {
            assert!((v - 0.42).abs() < 1e-9);
        }
    }

    #[test]
    fn test_passband_preserved() {
        let fs = 100.0;
        let filter = ButterworthLowpass::new(4, 15.0, fs).unwrap();
        let signal = sine(2.0, fs, 1000);
        let filtered = filter.filtfilt(&signal);

        // Compare away from the ends
        for i in 200..800 {
            assert!(
                (filtered[i] - signal[i]).abs() < 0.01,
                "sample {} differs: {} vs {}",
                i,
                filtered[i],
                signal[i]
            );
        }
    }

    #[test]
    fn test_stopband_attenuated() {
        let fs = 100.0;
        let filter = ButterworthLowpass::new(4, 15.0, fs).unwrap();
        let signal = sine(40.0, fs, 1000);
        let filtered = filter.filtfilt(&signal);

        let peak = filtered[200..800]
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!(peak < 0.01, "40 Hz leaked through with amplitude {}", peak);
    }

    #[test]
    fn test_zero_phase_keeps_peak_location() {
        let fs = 100.0;
        let filter = ButterworthLowpass::new(4, 15.0, fs).unwrap();

        // Smooth pulse centered on sample 150
        let signal: Vec<f64> = (0..300)
            .map(|i| {
                let t = (i as f64 - 150.0) / 10.0;
                (-t * t).exp()
            })
            .collect();
        let filtered = filter.filtfilt(&signal);

        let peak_idx = filtered
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_idx, 150);
    }

    #[test]
    fn test_short_signals() {
        let filter = ButterworthLowpass::new(4, 15.0, 100.0).unwrap();
        assert!(filter.filtfilt(&[]).is_empty());
        assert_eq!(filter.filtfilt(&[1.5]), vec![1.5]);

        // Padding shrinks to fit, output keeps the input length
        let filtered = filter.filtfilt(&[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(filtered.len(), 4);
        assert!(filtered.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_invalid_design_rejected() {
        assert!(matches!(
            ButterworthLowpass::new(4, 60.0, 100.0),
            Err(SignalError::InvalidCutoff { .. })
        ));
        assert!(matches!(
            ButterworthLowpass::new(3, 10.0, 100.0),
            Err(SignalError::InvalidOrder(3))
        ));
    }
}
