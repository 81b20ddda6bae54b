/// Read-only view over a decoded packet, as far as transport-layer rule options need it.
pub trait DecodedPacket {
    /// the advertised TCP receive window, or `None` if the packet is not a TCP segment.
    fn tcp_window(&self) -> Option<u16>;

    fn is_tcp(&self) -> bool {
        self.tcp_window().is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    pub version: IpVersion,
    pub transport: Transport,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IpVersion {
    V4,
    V6,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transport {
    /// TCP segment with its window field in host byte order.
    Tcp { window: u16 },
    /// any other transport, identified by its IP protocol number.
    Other(u8),
}

impl Packet {
    pub fn tcp(version: IpVersion, window: u16) -> Self {
        Packet {
            version,
            transport: Transport::Tcp { window },
        }
    }

    pub fn other(version: IpVersion, protocol: u8) -> Self {
        Packet {
            version,
            transport: Transport::Other(protocol),
        }
    }
}

impl DecodedPacket for Packet {
    fn tcp_window(&self) -> Option<u16> {
        match self.transport {
            Transport::Tcp { window } => Some(window),
            Transport::Other(_) => None,
        }
    }
}
