// Jump event types
// Limb identity and the ground-contact / toe-off / landing triple

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which foot a signal or metric belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Limb {
    Left,
    Right,
}

impl Limb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Limb::Left => "Left",
            Limb::Right => "Right",
        }
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reactive jump as three sample indices
/// GC = ground contact after the drop, TO = toe-off, LD = landing
///
/// The detector always fills every slot. Slots are optional so metrics
/// computed downstream can treat a missing index as an unset value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JumpEvent {
    pub gc: Option<usize>,
    pub to: Option<usize>,
    pub ld: Option<usize>,
}

impl JumpEvent {
    /// Create a fully assigned jump event
    pub fn new(gc: usize, to: usize, ld: usize) -> Self {
        JumpEvent {
            gc: Some(gc),
            to: Some(to),
            ld: Some(ld),
        }
    }

    /// All three indices assigned
    pub fn is_complete(&self) -> bool {
        self.gc.is_some() && self.to.is_some() && self.ld.is_some()
    }

    /// gc < to < ld for every pair of assigned indices
    pub fn is_ordered(&self) -> bool {
        let ordered = |a: Option<usize>, b: Option<usize>| match (a, b) {
            (Some(a), Some(b)) => a < b,
            _ => true,
        };
        ordered(self.gc, self.to) && ordered(self.to, self.ld) && ordered(self.gc, self.ld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limb_display() {
        assert_eq!(Limb::Left.to_string(), "Left");
        assert_eq!(Limb::Right.as_str(), "Right");
    }

    #[test]
    fn test_jump_event_ordering() {
        let jump = JumpEvent::new(10, 35, 80);
        assert!(jump.is_complete());
        assert!(jump.is_ordered());

        let bad = JumpEvent::new(35, 10, 80);
        assert!(!bad.is_ordered());
    }

    #[test]
    fn test_partial_jump_event() {
        let jump = JumpEvent {
            gc: None,
            to: Some(20),
            ld: Some(40),
        };
        assert!(!jump.is_complete());
        assert!(jump.is_ordered());
    }
}
