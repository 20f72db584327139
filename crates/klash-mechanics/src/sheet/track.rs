//! Bounded resource tracks (hit points, wounds).
//!
//! A track holds a value in `0..=max`. Proposed values outside that range
//! are rejected rather than clamped, so a failed update never half-applies.

use serde::Serialize;

use crate::error::{MechError, MechResult};

/// A named resource bounded by `0..=max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Display name of the track.
    pub name: &'static str,
    /// Current value.
    pub current: u32,
    /// Maximum value.
    pub max: u32,
}

impl Track {
    /// Create a track with a starting value, clamped into range.
    pub fn new(name: &'static str, current: u32, max: u32) -> Self {
        Self {
            name,
            current: current.min(max),
            max,
        }
    }

    /// Replace the current value. Values outside `0..=max` are rejected and
    /// leave the track unchanged.
    pub fn set(&mut self, value: i64) -> MechResult<u32> {
        match u32::try_from(value) {
            Ok(v) if v <= self.max => {
                self.current = v;
                Ok(v)
            }
            _ => Err(MechError::OutOfRange {
                resource: self.name,
                value,
                max: self.max,
            }),
        }
    }

    /// Move the current value by `delta`, with the same rejection rule as
    /// [`Track::set`]. Returns the new value.
    pub fn adjust(&mut self, delta: i64) -> MechResult<u32> {
        self.set(i64::from(self.current) + delta)
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}/{}", self.name, self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_initial() {
        let t = Track::new("wounds", 100, 6);
        assert_eq!(t.current, 6);
    }

    #[test]
    fn set_within_bounds() {
        let mut t = Track::new("hp", 5, 5);
        assert_eq!(t.set(0), Ok(0));
        assert_eq!(t.current, 0);
        assert_eq!(t.set(5), Ok(5));
    }

    #[test]
    fn set_rejects_above_max() {
        let mut t = Track::new("hp", 3, 5);
        assert_eq!(
            t.set(6),
            Err(MechError::OutOfRange {
                resource: "hp",
                value: 6,
                max: 5
            })
        );
        assert_eq!(t.current, 3);
    }

    #[test]
    fn set_rejects_negative() {
        let mut t = Track::new("wounds", 2, 6);
        assert!(t.set(-1).is_err());
        assert_eq!(t.current, 2);
    }

    #[test]
    fn adjust_rejects_overshoot() {
        let mut t = Track::new("hp", 2, 5);
        assert_eq!(t.adjust(-2), Ok(0));
        assert!(t.adjust(-1).is_err());
        assert_eq!(t.current, 0);
        assert_eq!(t.adjust(5), Ok(5));
        assert!(t.adjust(1).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Track::new("wounds", 1, 8).to_string(), "wounds: 1/8");
    }
}
