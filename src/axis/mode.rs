//! Microstep mode switch protocol.
//!
//! The driver runs one of two mutually exclusive microstep modes: a fine
//! "tracking" mode for low rates and a coarse "slewing" mode for high
//! rates. Switching up is a two-phase handshake so the driver commits at a
//! step boundary and no steps are lost or duplicated: the poll loop first
//! records the request, then observes the driver's permission, and only
//! commits on a later cycle. Switching back down is immediate once the
//! driver permits it.

/// Hysteresis factor applied to the backlash take-up rate when deciding
/// mode switches, so the mode does not chatter near the boundary.
pub const MODE_SWITCH_HYSTERESIS: f32 = 1.2;

/// Driver microstep mode negotiation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MicrostepModeControl {
    /// Fine, low-speed mode active.
    #[default]
    Tracking,
    /// A switch to the slewing mode has been requested; the driver has not
    /// yet confirmed it is safe.
    SlewingRequest,
    /// The driver confirmed the switch is permitted; commit happens on a
    /// subsequent poll cycle.
    SlewingReady,
    /// Coarse, high-speed mode active.
    Slewing,
}

impl MicrostepModeControl {
    /// True while the coarse slewing mode is active.
    #[inline]
    pub fn is_slewing(self) -> bool {
        self == MicrostepModeControl::Slewing
    }

    /// True while a switch to slewing is pending but not committed.
    #[inline]
    pub fn is_switch_pending(self) -> bool {
        matches!(
            self,
            MicrostepModeControl::SlewingRequest | MicrostepModeControl::SlewingReady
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_states() {
        assert!(!MicrostepModeControl::Tracking.is_switch_pending());
        assert!(MicrostepModeControl::SlewingRequest.is_switch_pending());
        assert!(MicrostepModeControl::SlewingReady.is_switch_pending());
        assert!(!MicrostepModeControl::Slewing.is_switch_pending());
        assert!(MicrostepModeControl::Slewing.is_slewing());
    }
}
