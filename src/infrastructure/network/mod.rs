use std::net::{Ipv4Addr, UdpSocket};

/// Get the primary LAN IPv4 address of the host.
/// Returns 127.0.0.1 as fallback if no network is available.
pub fn get_lan_ip() -> Ipv4Addr {
    get_lan_ip_impl().unwrap_or(Ipv4Addr::LOCALHOST)
}

/// Ask the OS which local address it would route a public destination through.
/// Connecting a UDP socket sends no packets.
fn get_lan_ip_impl() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;

    match socket.local_addr().ok()?.ip() {
        std::net::IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_link_local() => Some(ip),
        _ => None,
    }
}
