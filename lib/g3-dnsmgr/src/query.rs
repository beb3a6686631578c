/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::IpAddr;

// RR type values as assigned in the DNS parameter registry
pub const RR_TYPE_A: u16 = 1;
pub const RR_TYPE_PTR: u16 = 12;
pub const RR_TYPE_TXT: u16 = 16;
pub const RR_TYPE_AAAA: u16 = 28;

/// Key of one query as seen by the cache and the pending tables.
///
/// Reverse queries are keyed by the binary address, the arpa form is only
/// materialized when the query goes on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Name(String),
    Addr(IpAddr),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Name(name) => f.write_str(name),
            QueryKey::Addr(ip) => write!(f, "{ip}"),
        }
    }
}

/// One query submitted to the resolver channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsQuery {
    pub key: QueryKey,
    pub rr_type: u16,
}

impl DnsQuery {
    pub fn forward(host: &str, rr_type: u16) -> Self {
        DnsQuery {
            key: QueryKey::Name(host.to_string()),
            rr_type,
        }
    }

    pub fn reverse(addr: IpAddr) -> Self {
        DnsQuery {
            key: QueryKey::Addr(addr),
            rr_type: RR_TYPE_PTR,
        }
    }

    pub fn raw(name: &str, rr_type: u16) -> Self {
        DnsQuery {
            key: QueryKey::Name(name.to_string()),
            rr_type,
        }
    }

    /// The name to put on the wire. Address keys are converted to their
    /// arpa form, name keys pass through unchanged.
    pub fn wire_name(&self) -> String {
        match &self.key {
            QueryKey::Name(name) => name.clone(),
            QueryKey::Addr(ip) => ptr_arpa_name(*ip),
        }
    }
}

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Canonical reverse-DNS name for an address,
/// e.g. `1.0.0.127.in-addr.arpa` or the nibble form under `ip6.arpa`.
pub fn ptr_arpa_name(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa", o[3], o[2], o[1], o[0])
        }
        IpAddr::V6(v6) => {
            let mut s = String::with_capacity(72);
            for b in v6.octets().iter().rev() {
                s.push(HEX_CHARS[(b & 0x0f) as usize] as char);
                s.push('.');
                s.push(HEX_CHARS[(b >> 4) as usize] as char);
                s.push('.');
            }
            s.push_str("ip6.arpa");
            s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn arpa_v4() {
        let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(ptr_arpa_name(ip), "1.0.0.127.in-addr.arpa");
        let ip = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(ptr_arpa_name(ip), "34.216.184.93.in-addr.arpa");
    }

    #[test]
    fn arpa_v6() {
        let ip = IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1));
        assert_eq!(
            ptr_arpa_name(ip),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.ip6.arpa"
        );
        let ip: IpAddr = "2001:db8::567:89ab".parse().unwrap();
        assert_eq!(
            ptr_arpa_name(ip),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn wire_name_for_reverse() {
        let q = DnsQuery::reverse(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(q.rr_type, RR_TYPE_PTR);
        assert_eq!(q.wire_name(), "1.0.0.10.in-addr.arpa");
    }
}
