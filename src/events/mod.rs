// Event detection module
// Ground contact, toe-off and landing detection with plausibility gates

pub mod detector;
pub mod types;

pub use detector::{detect_jumps, validate_flight, GateFailure, JumpDetector};
pub use types::{JumpEvent, Limb};
