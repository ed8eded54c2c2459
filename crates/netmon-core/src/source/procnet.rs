// ── /proc/net socket table parsing ──
//
// Format reference: proc(5). Addresses are hex in host byte order per
// 32-bit word, ports are big-endian hex.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::model::ConnectionInfo;

fn tcp_state(code: u8) -> &'static str {
    match code {
        0x01 => "ESTABLISHED",
        0x02 => "SYN_SENT",
        0x03 => "SYN_RECV",
        0x04 => "FIN_WAIT1",
        0x05 => "FIN_WAIT2",
        0x06 => "TIME_WAIT",
        0x07 => "CLOSE",
        0x08 => "CLOSE_WAIT",
        0x09 => "LAST_ACK",
        0x0A => "LISTEN",
        0x0B => "CLOSING",
        _ => "UNKNOWN",
    }
}

fn udp_state(code: u8) -> &'static str {
    match code {
        0x01 => "ESTABLISHED",
        0x07 => "UNCONN",
        _ => "UNKNOWN",
    }
}

fn parse_addr(hex: &str) -> Option<IpAddr> {
    match hex.len() {
        8 => {
            let word = u32::from_str_radix(hex, 16).ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(word.to_le_bytes())))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(hex.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_le_bytes());
            }
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

fn parse_endpoint(field: &str) -> Option<(IpAddr, u16)> {
    let (addr, port) = field.split_once(':')?;
    Some((parse_addr(addr)?, u16::from_str_radix(port, 16).ok()?))
}

/// Parse one `/proc/net/{tcp,tcp6,udp,udp6}` table.
///
/// `protocol` is the label stamped on each entry ("TCP", "UDP").
/// Malformed rows are skipped.
pub fn parse_proc_net(protocol: &str, contents: &str) -> Vec<ConnectionInfo> {
    let is_udp = protocol.eq_ignore_ascii_case("udp");
    contents
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace().skip(1);
            let (_, local_port) = parse_endpoint(fields.next()?)?;
            let (remote_ip, remote_port) = parse_endpoint(fields.next()?)?;
            let code = u8::from_str_radix(fields.next()?, 16).ok()?;
            let state = if is_udp { udp_state(code) } else { tcp_state(code) };
            Some(ConnectionInfo {
                protocol: protocol.to_owned(),
                local_port,
                remote_host: remote_ip.to_string(),
                remote_port,
                state: state.to_owned(),
                owner_app: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TCP: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 1234 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:C350 2209A8C0:01BB 01 00000000:00000000 00:00000000 00000000  1000        0 5678 1 0000000000000000 20 4 30 10 -1
";

    #[test]
    fn parses_ipv4_tcp_rows() {
        let conns = parse_proc_net("TCP", TCP);
        assert_eq!(conns.len(), 2);

        assert_eq!(conns[0].local_port, 631);
        assert_eq!(conns[0].state, "LISTEN");
        assert_eq!(conns[0].remote_host, "0.0.0.0");

        assert_eq!(conns[1].local_port, 50000);
        assert_eq!(conns[1].remote_host, "192.168.9.34");
        assert_eq!(conns[1].remote_port, 443);
        assert_eq!(conns[1].state, "ESTABLISHED");
        assert_eq!(conns[1].owner_app, None);
    }

    #[test]
    fn parses_ipv6_loopback() {
        let table = "header\n   0: 00000000000000000000000001000000:0035 00000000000000000000000001000000:9C40 07 0 0 0\n";
        let conns = parse_proc_net("UDP", table);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].remote_host, "::1");
        assert_eq!(conns[0].local_port, 53);
        assert_eq!(conns[0].state, "UNCONN");
    }

    #[test]
    fn skips_malformed_rows() {
        let table = "header\n   0: garbage\n\n";
        assert!(parse_proc_net("TCP", table).is_empty());
    }
}
