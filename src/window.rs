use crate::decode::DecodedPacket;

/// Largest value the TCP window field can carry.
pub const MAX_WINDOW_VALUE: u16 = u16::MAX;

/// Compiled `window:` rule option.
///
/// Matches TCP segments whose window field equals `threshold`,
/// or differs from it when `negated` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowPredicate {
    /// window size to compare against.
    pub threshold: u16,
    /// `!` marker, turns the equality test into an inequality test.
    pub negated: bool,
}

impl WindowPredicate {
    pub fn new(threshold: u16) -> Self {
        WindowPredicate {
            threshold,
            negated: false,
        }
    }

    pub fn negated(threshold: u16) -> Self {
        WindowPredicate {
            threshold,
            negated: true,
        }
    }

    /// Non-TCP packets never match, negated or not.
    pub fn evaluate<P: DecodedPacket + ?Sized>(&self, packet: &P) -> bool {
        match packet.tcp_window() {
            Some(window) => {
                let matched = (window == self.threshold) != self.negated;

                trace!(
                    "window {} against rule size {} (negated: {}): {}",
                    window,
                    self.threshold,
                    self.negated,
                    matched
                );

                matched
            }
            None => false,
        }
    }
}
