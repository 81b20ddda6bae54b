use failure::{bail, err_msg, Error};

use pnet::packet::{
    ethernet::{EtherType, EtherTypes, EthernetPacket},
    ip::{IpNextHeaderProtocol, IpNextHeaderProtocols},
    ipv4::{Ipv4Flags, Ipv4Packet},
    ipv6::Ipv6Packet,
    tcp::TcpPacket,
    vlan::VlanPacket,
    Packet as _,
};

use crate::decode::{IpVersion, Packet, Transport};

impl Packet {
    /// Decode a raw Ethernet frame.
    pub fn extract(packet: &[u8]) -> Result<Self, Error> {
        EthernetPacket::new(packet)
            .ok_or_else(|| err_msg("ethernet packet too short"))
            .and_then(|packet| visit_ethernet(packet.get_ethertype(), packet.payload()))
    }
}

fn visit_ethernet(ethertype: EtherType, payload: &[u8]) -> Result<Packet, Error> {
    match ethertype {
        EtherTypes::Vlan => VlanPacket::new(payload)
            .ok_or_else(|| err_msg("vlan packet too short"))
            .and_then(visit_vlan),

        EtherTypes::Ipv4 => Ipv4Packet::new(payload)
            .ok_or_else(|| err_msg("ipv4 packet too short"))
            .and_then(visit_ipv4),

        EtherTypes::Ipv6 => Ipv6Packet::new(payload)
            .ok_or_else(|| err_msg("ipv6 packet too short"))
            .and_then(visit_ipv6),

        ty => bail!("unsupported ethernet type: {}", ty),
    }
}

fn visit_vlan(packet: VlanPacket) -> Result<Packet, Error> {
    visit_ethernet(packet.get_ethertype(), packet.payload())
}

fn visit_ipv4(packet: Ipv4Packet) -> Result<Packet, Error> {
    // only the first fragment carries the transport header
    if packet.get_fragment_offset() > 0 {
        bail!("unsupported IPv4 fragment");
    }

    if (packet.get_flags() & Ipv4Flags::MoreFragments) == Ipv4Flags::MoreFragments {
        debug!(
            "first IPv4 fragment, id {}, decoding transport header",
            packet.get_identification()
        );
    }

    visit_transport(
        IpVersion::V4,
        packet.get_next_level_protocol(),
        packet.payload(),
    )
}

fn visit_ipv6(packet: Ipv6Packet) -> Result<Packet, Error> {
    visit_transport(IpVersion::V6, packet.get_next_header(), packet.payload())
}

fn visit_transport(
    version: IpVersion,
    protocol: IpNextHeaderProtocol,
    payload: &[u8],
) -> Result<Packet, Error> {
    let transport = match protocol {
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(payload).ok_or_else(|| err_msg("TCP packet too short"))?;

            Transport::Tcp {
                window: tcp.get_window(),
            }
        }
        protocol => Transport::Other(protocol.0),
    };

    trace!("decoded {:?} packet: {:?}", version, transport);

    Ok(Packet { version, transport })
}
