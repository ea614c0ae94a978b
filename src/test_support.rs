// Synthetic drop-jump trajectories shared by unit tests

use std::f64::consts::PI;

const G: f64 = 9.81;

/// Uniform time axis starting at zero
pub(crate) fn time_axis(len: usize, fs: f64) -> Vec<f64> {
    (0..len).map(|i| i as f64 / fs).collect()
}

/// Toe height for one drop jump, 3.5 s long:
/// 0.5 s standing on a 0.4 m box, a smooth 0.3 s drop to the floor,
/// 0.25 s of ground contact, a ballistic flight reaching `flight_height`,
/// then standing still until the end
pub(crate) fn drop_jump_position(fs: f64, flight_height: f64) -> Vec<f64> {
    let samples = |secs: f64| (secs * fs).round() as usize;
    let total = samples(3.5);
    let drop_n = samples(0.3);
    let v0 = (2.0 * G * flight_height).sqrt();

    let mut position = vec![0.4; samples(0.5)];
    position.extend((0..drop_n).map(|k| 0.2 * (1.0 + (PI * k as f64 / drop_n as f64).cos())));
    position.extend(vec![0.0; samples(0.25)]);

    for k in 0.. {
        let tau = k as f64 / fs;
        let height = v0 * tau - 0.5 * G * tau * tau;
        if k > 0 && height <= 0.0 {
            break;
        }
        position.push(height.max(0.0));
    }

    position.resize(total, 0.0);
    position
}
