//! Extended-ACL term renderer
//!
//! Expands one term into one-or-more `permit`/`deny` statement lines via
//! cartesian product over source address, destination address, source
//! port, destination port, and protocol. Iteration nests in that order
//! with protocol innermost; the order is load-bearing for output
//! stability, not correctness.

use crate::cisco::normalize::{effective_addresses, effective_ports, AddrField, MatchAddr};
use crate::cisco::protocol::{resolve_protocols, Proto};
use crate::netaddr::AddressFamily;
use crate::policy::{PortRange, Term};
use ipnetwork::IpNetwork;
use std::net::Ipv4Addr;

/// Comment lines are truncated to this display width before emission
pub const MAX_COMMENT_WIDTH: usize = 100;

/// One term viewed through a single address family
///
/// The family hint decides which addresses survive expansion; the
/// match-any sentinel passes both families.
#[derive(Debug)]
pub struct ExtendedTerm<'a> {
    term: &'a Term,
    af: AddressFamily,
}

impl<'a> ExtendedTerm<'a> {
    /// An extended (IPv4) view of the term
    pub fn new(term: &'a Term) -> Self {
        Self {
            term,
            af: AddressFamily::V4,
        }
    }

    /// An inet6 view of the same statement form
    pub fn inet6(term: &'a Term) -> Self {
        Self {
            term,
            af: AddressFamily::V6,
        }
    }

    /// Renders the term into statement lines.
    ///
    /// Starts with a blank separator line and the remark block, then
    /// either the verbatim override for this platform or the expanded
    /// match statements.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![String::new()];

        lines.push(format!("remark {}", self.term.name));
        for comment in &self.term.comment {
            for line in comment.lines() {
                lines.push(format!("remark {}", truncate(line, MAX_COMMENT_WIDTH)));
            }
        }

        // Verbatim overrides skip normal statement generation entirely.
        if let Some(text) = self.term.verbatim_for("cisco") {
            lines.push(text.to_string());
            return lines;
        }

        let protocols = resolve_protocols(self.term);
        let has_tcp = protocols.iter().any(Proto::is_tcp);

        let mut options: Vec<&str> = Vec::new();
        for opt in &self.term.option {
            // `established` only exists for TCP; stateless high-port
            // handling covers other protocols upstream.
            if (opt.starts_with("tcp-established") || opt.starts_with("established"))
                && has_tcp
                && !options.contains(&"established")
            {
                options.push("established");
            }
        }
        if self.term.logging {
            options.push("log");
        }

        let sources = effective_addresses(self.term, AddrField::Source, self.af);
        let destinations = effective_addresses(self.term, AddrField::Destination, self.af);
        let source_ports = effective_ports(self.term, AddrField::Source);
        let destination_ports = effective_ports(self.term, AddrField::Destination);

        for saddr in &sources {
            for daddr in &destinations {
                if !saddr.matches_family(self.af) || !daddr.matches_family(self.af) {
                    continue;
                }
                for sport in &source_ports {
                    for dport in &destination_ports {
                        for proto in &protocols {
                            lines.push(statement_line(
                                self.term.action.keyword(),
                                proto,
                                saddr,
                                *sport,
                                daddr,
                                *dport,
                                &options,
                            ));
                        }
                    }
                }
            }
        }

        lines
    }
}

fn truncate(line: &str, width: usize) -> String {
    line.chars().take(width).collect()
}

/// Formats one complete match statement from its components
fn statement_line(
    action: &str,
    proto: &Proto,
    saddr: &MatchAddr,
    sport: Option<PortRange>,
    daddr: &MatchAddr,
    dport: Option<PortRange>,
    options: &[&str],
) -> String {
    let mut parts: Vec<String> = vec![action.to_string(), proto.to_string()];
    parts.push(render_addr(saddr));
    if let Some(p) = render_port(sport) {
        parts.push(p);
    }
    parts.push(render_addr(daddr));
    if let Some(p) = render_port(dport) {
        parts.push(p);
    }
    for opt in options {
        parts.push((*opt).to_string());
    }
    format!(" {}", parts.join(" "))
}

/// Address notation: `host` for single hosts, network + wildcard mask
/// for v4 prefixes, CIDR for v6 prefixes, the literal `any` sentinel.
pub(crate) fn render_addr(addr: &MatchAddr) -> String {
    match addr {
        MatchAddr::Any => "any".to_string(),
        MatchAddr::Net(named) => match named.net {
            IpNetwork::V4(n) => {
                if n.prefix() == 32 {
                    format!("host {}", n.ip())
                } else {
                    let hostmask = Ipv4Addr::from(!u32::from(n.mask()));
                    format!("{} {}", n.network(), hostmask)
                }
            }
            IpNetwork::V6(n) => {
                if n.prefix() == 128 {
                    format!("host {}", n.ip())
                } else {
                    format!("{}/{}", n.ip(), n.prefix())
                }
            }
        },
    }
}

/// Port notation: nothing for the no-restriction sentinel, `eq` for a
/// single port, `range` otherwise
pub(crate) fn render_port(port: Option<PortRange>) -> Option<String> {
    let port = port?;
    if port.is_single() {
        Some(format!("eq {}", port.low))
    } else {
        Some(format!("range {} {}", port.low, port.high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cisco::test_helpers::{term_with, v4_net};
    use crate::netaddr::NamedNetwork;
    use crate::policy::{Action, Verbatim};

    fn match_lines(lines: &[String]) -> Vec<&String> {
        lines
            .iter()
            .filter(|l| l.starts_with(" permit") || l.starts_with(" deny"))
            .collect()
    }

    #[test]
    fn test_defaults_render_ip_any_any() {
        let term = term_with("allow-all", Action::Accept, |_| {});
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "remark allow-all");
        assert_eq!(lines[2], " permit ip any any");
    }

    #[test]
    fn test_host_and_network_notation() {
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![v4_net("10.1.1.1/32")];
            t.destination_address = vec![v4_net("192.168.0.0/16")];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(
            lines[2],
            " permit ip host 10.1.1.1 192.168.0.0 0.0.255.255"
        );
    }

    #[test]
    fn test_v6_notation() {
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![NamedNetwork::new("2001:db8::/32".parse().unwrap(), "N")];
            t.destination_address =
                vec![NamedNetwork::new("2001:db8::1/128".parse().unwrap(), "H")];
        });
        let lines = ExtendedTerm::inet6(&term).render();
        assert_eq!(lines[2], " permit ip 2001:db8::/32 host 2001:db8::1");
    }

    #[test]
    fn test_port_notation() {
        let term = term_with("t", Action::Accept, |t| {
            t.protocol = vec!["tcp".to_string()];
            t.source_port = vec![crate::policy::PortRange::new(1024, 65535)];
            t.destination_port = vec![crate::policy::PortRange::single(80)];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[2], " permit tcp any range 1024 65535 any eq 80");
    }

    #[test]
    fn test_cartesian_expansion_count() {
        let term = term_with("t", Action::Accept, |t| {
            t.protocol = vec!["tcp".to_string(), "udp".to_string()];
            t.source_address = vec![v4_net("10.0.0.0/24"), v4_net("10.0.1.0/24")];
            t.destination_address = vec![v4_net("172.16.0.0/24"), v4_net("172.16.1.0/24")];
            t.source_port = vec![
                crate::policy::PortRange::single(1000),
                crate::policy::PortRange::single(2000),
            ];
            t.destination_port = vec![
                crate::policy::PortRange::single(80),
                crate::policy::PortRange::single(443),
            ];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(match_lines(&lines).len(), 32);
    }

    #[test]
    fn test_family_mismatch_filters_combinations() {
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![
                v4_net("10.0.0.0/24"),
                NamedNetwork::new("2001:db8::/32".parse().unwrap(), "V6"),
            ];
        });
        let v4_lines = ExtendedTerm::new(&term).render();
        assert_eq!(match_lines(&v4_lines).len(), 1);
        assert!(v4_lines[2].contains("10.0.0.0 0.0.0.255"));

        let v6_lines = ExtendedTerm::inet6(&term).render();
        assert_eq!(match_lines(&v6_lines).len(), 1);
        assert!(v6_lines[2].contains("2001:db8::/32"));
    }

    #[test]
    fn test_established_keyword_requires_tcp() {
        let tcp = term_with("t", Action::Accept, |t| {
            t.protocol = vec!["tcp".to_string()];
            t.option = vec!["established".to_string()];
        });
        let lines = ExtendedTerm::new(&tcp).render();
        assert!(lines[2].ends_with("established"));

        let udp = term_with("t", Action::Accept, |t| {
            t.protocol = vec!["udp".to_string()];
            t.option = vec!["established".to_string()];
        });
        let lines = ExtendedTerm::new(&udp).render();
        assert!(!lines[2].contains("established"));
    }

    #[test]
    fn test_logging_adds_log_keyword() {
        let term = term_with("t", Action::Accept, |t| {
            t.logging = true;
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[2], " permit ip any any log");
    }

    #[test]
    fn test_verbatim_short_circuits() {
        let term = term_with("raw", Action::Accept, |t| {
            t.protocol = vec!["tcp".to_string()];
            t.verbatim = vec![Verbatim::new("cisco", "permit ip any any")];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines, vec!["", "remark raw", "permit ip any any"]);
    }

    #[test]
    fn test_foreign_verbatim_is_ignored() {
        let term = term_with("raw", Action::Accept, |t| {
            t.verbatim = vec![Verbatim::new("juniper", "then accept;")];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert!(!lines.iter().any(|l| l.contains("then accept")));
        assert_eq!(lines[2], " permit ip any any");
    }

    #[test]
    fn test_comment_truncation() {
        let long = "x".repeat(150);
        let term = term_with("t", Action::Accept, |t| {
            t.comment = vec![long];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[2].len(), "remark ".len() + MAX_COMMENT_WIDTH);
    }

    #[test]
    fn test_multiline_comment_splits_into_remarks() {
        let term = term_with("t", Action::Accept, |t| {
            t.comment = vec!["first\nsecond".to_string()];
        });
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[2], "remark first");
        assert_eq!(lines[3], "remark second");
    }

    #[test]
    fn test_reject_downgrades_to_deny() {
        let term = term_with("t", Action::RejectWithTcpRst, |_| {});
        let lines = ExtendedTerm::new(&term).render();
        assert_eq!(lines[2], " deny ip any any");
    }
}
