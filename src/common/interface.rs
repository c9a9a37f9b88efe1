/*!
Local network interface enumeration, used to pick the address the engine
binds/joins multicast on and to decide whether a candidate interface carries
a usable IPv6 link-local address for the companion socket.

Grounded in the teacher crate's `pnet` dependency (interface enumeration was
referenced but not retrieved in the teacher pack) and in the
`map_local`/`get_local_addrs`/`is_not_globally` filtering pattern from
`caizixian/ssdp-rs`'s `message::mod`.
*/
use pnet::datalink;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// A single IP address bound to a local, non-loopback interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IP {
    pub name: String,
    pub address: IpAddr,
    /// OS-assigned interface index, needed as the scope id when joining an
    /// IPv6 multicast group on a specific interface.
    pub index: u32,
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// All non-loopback IPv4 addresses bound to a local interface.
pub fn ipv4_addresses() -> Vec<IP> {
    local_addresses()
        .into_iter()
        .filter(|ip| matches!(ip.address, IpAddr::V4(v4) if !v4.is_loopback()))
        .collect()
}

/// All non-loopback, non-documentation IPv6 addresses bound to a local
/// interface. Global addresses are included; callers that need link-local
/// specifically should use `ipv6_link_local_addresses`.
pub fn ipv6_addresses() -> Vec<IP> {
    local_addresses()
        .into_iter()
        .filter(|ip| matches!(ip.address, IpAddr::V6(v6) if !v6.is_loopback()))
        .collect()
}

/// The link-local IPv6 addresses (`fe80::/10`), one of which is required to
/// open the companion socket used for the site-local multicast workaround.
pub fn ipv6_link_local_addresses() -> Vec<IP> {
    ipv6_addresses()
        .into_iter()
        .filter(|ip| matches!(ip.address, IpAddr::V6(v6) if is_unicast_link_local(&v6)))
        .collect()
}

/// Returns the first usable IPv4 address, if any interface has one.
pub fn first_ipv4_address() -> Option<IP> {
    ipv4_addresses().into_iter().next()
}

fn local_addresses() -> Vec<IP> {
    let mut found = Vec::new();
    for iface in datalink::interfaces() {
        if iface.is_loopback() || !iface.is_up() {
            continue;
        }
        for network in &iface.ips {
            found.push(IP {
                name: iface.name.clone(),
                address: network.ip(),
                index: iface.index,
            });
        }
    }
    found
}

fn is_unicast_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

/// Loopback IPv4 address used only by the in-process test transport.
pub const LOOPBACK_V4: Ipv4Addr = Ipv4Addr::LOCALHOST;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn link_local_detection() {
        let ll: Ipv6Addr = "fe80::1".parse().unwrap();
        let global: Ipv6Addr = "2001:db8::1".parse().unwrap();
        assert!(is_unicast_link_local(&ll));
        assert!(!is_unicast_link_local(&global));
    }
}
