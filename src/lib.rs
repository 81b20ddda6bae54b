#[macro_use]
extern crate log;

pub mod decode;
pub mod window;

#[cfg(feature = "parse")]
pub mod detect;
#[cfg(feature = "display")]
mod display;
#[cfg(feature = "packet")]
mod packet;
#[cfg(feature = "parse")]
mod parse;

#[cfg(test)]
mod fixtures;

pub use crate::decode::{DecodedPacket, IpVersion, Packet, Transport};
pub use crate::window::{WindowPredicate, MAX_WINDOW_VALUE};

#[cfg(feature = "parse")]
pub use crate::parse::{Grammar, ParseError};
