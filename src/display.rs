use core::fmt;

use crate::decode::{IpVersion, Packet, Transport};
use crate::window::WindowPredicate;

impl fmt::Display for WindowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }

        write!(f, "{}", self.threshold)
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            IpVersion::V4 => "4",
            IpVersion::V6 => "6",
        })
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Transport::Tcp { window } => write!(f, "tcp win {}", window),
            Transport::Other(proto) => write!(f, "proto {}", proto),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ipv{} {}", self.version, self.transport)
    }
}
