// Signal processing module
// Low-pass filtering, velocity and ground-level estimation for toe trajectories

pub mod filter;
pub mod preprocess;

pub use filter::{ButterworthLowpass, FILTER_ORDER};
pub use preprocess::{
    gradient, ground_level, preprocess_limb, sample_interval, LimbSignal, SignalError,
    TrialSignals,
};
