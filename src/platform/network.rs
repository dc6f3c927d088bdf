//! Local network address lookup.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// The address other hosts would use to reach this machine.
///
/// Connecting a UDP socket sends no packets; it only asks the kernel which
/// source address it would route through. Falls back to `127.0.0.1`.
pub fn local_ip() -> IpAddr {
    outbound_local_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn outbound_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(("10.255.255.255", 1)).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}
