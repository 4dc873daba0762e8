//! Object-group ACL rendering
//!
//! Two cooperating pieces: [`ObjectGroupTerm`] emits short statements
//! that reference named groups instead of inline addresses and ports,
//! and [`ObjectGroup`] collects every term of a filter and emits each
//! distinct group definition exactly once, keyed by the address
//! `parent_token` (and, for ports, by the `low-high` pair, since port
//! ranges carry no symbolic name of their own).
//!
//! A statement looks like
//!
//! ```text
//!  permit tcp addrgroup first-term-source-address portgroup 179-179 addrgroup ANY
//! ```
//!
//! with the group bodies defined once, before all filter blocks:
//!
//! ```text
//! object-group ip address first-term-source-address
//!  172.16.0.0 255.255.0.0
//!  172.20.0.0 255.255.0.0
//! exit
//! ```

use std::collections::HashSet;
use tracing::debug;

use crate::cisco::protocol::resolve_protocols;
use crate::netaddr::{AddressFamily, NamedNetwork};
use crate::policy::{PortRange, Term};

/// Token attached to the synthetic match-everything address group
const ANY_TOKEN: &str = "ANY";

fn v4_addresses(nets: &[NamedNetwork]) -> Vec<&NamedNetwork> {
    nets.iter()
        .filter(|n| n.family() == AddressFamily::V4)
        .collect()
}

/// Renders one term as group-referencing statements
///
/// Object-group ACLs are v4-only in practice; no per-combination family
/// filtering happens here.
#[derive(Debug)]
pub struct ObjectGroupTerm<'a> {
    term: &'a Term,
}

impl<'a> ObjectGroupTerm<'a> {
    pub fn new(term: &'a Term) -> Self {
        Self { term }
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![String::new()];

        lines.push(format!("remark {}", self.term.name));
        for comment in &self.term.comment {
            for line in comment.lines() {
                lines.push(format!("remark {line}"));
            }
        }

        if let Some(text) = self.term.verbatim_for("cisco") {
            lines.push(text.to_string());
            return lines;
        }

        let protocols = resolve_protocols(self.term);

        let any = NamedNetwork::any_v4(ANY_TOKEN);
        let sources: Vec<&NamedNetwork> = if self.term.source_address.is_empty() {
            vec![&any]
        } else {
            self.term.source_address.iter().collect()
        };
        let destinations: Vec<&NamedNetwork> = if self.term.destination_address.is_empty() {
            vec![&any]
        } else {
            self.term.destination_address.iter().collect()
        };

        let source_ports: Vec<Option<PortRange>> = if self.term.source_port.is_empty() {
            vec![None]
        } else {
            self.term.source_port.iter().copied().map(Some).collect()
        };
        let destination_ports: Vec<Option<PortRange>> = if self.term.destination_port.is_empty() {
            vec![None]
        } else {
            self.term
                .destination_port
                .iter()
                .copied()
                .map(Some)
                .collect()
        };

        let action = self.term.action.keyword();
        for saddr in &sources {
            for daddr in &destinations {
                for sport in &source_ports {
                    for dport in &destination_ports {
                        for proto in &protocols {
                            let mut parts: Vec<String> =
                                vec![action.to_string(), proto.to_string()];
                            parts.push(format!("addrgroup {}", saddr.parent_token));
                            if let Some(p) = sport {
                                parts.push(format!("portgroup {}-{}", p.low, p.high));
                            }
                            parts.push(format!("addrgroup {}", daddr.parent_token));
                            if let Some(p) = dport {
                                parts.push(format!("portgroup {}-{}", p.low, p.high));
                            }
                            lines.push(format!(" {}", parts.join(" ")));
                        }
                    }
                }
            }
        }

        lines
    }
}

/// Collects terms for a filter and renders each distinct group once
///
/// Token-seen state lives in one `render` call; the collector itself can
/// accumulate terms from multiple object-group filters of a document.
#[derive(Debug, Default)]
pub struct ObjectGroup {
    filter_name: String,
    terms: Vec<Term>,
}

impl ObjectGroup {
    /// Registers the filter this collector renders groups for
    pub fn set_name(&mut self, filter_name: &str) {
        self.filter_name = filter_name.to_string();
    }

    pub fn add_term(&mut self, term: &Term) {
        self.terms.push(term.clone());
    }

    /// Returns `true` once at least one term has been collected
    pub fn is_valid(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Renders every distinct address and port group, in term-encounter
    /// order, each exactly once.
    pub fn render(&self) -> Vec<String> {
        debug!(filter = %self.filter_name, terms = self.terms.len(), "rendering object groups");

        let mut lines = vec![String::new()];
        let mut seen_addresses: HashSet<String> = HashSet::new();
        let mut seen_ports: HashSet<(u16, u16)> = HashSet::new();

        for term in &self.terms {
            Self::render_address_group(&mut lines, &mut seen_addresses, &term.source_address);
            Self::render_address_group(&mut lines, &mut seen_addresses, &term.destination_address);

            for port in term.source_port.iter().chain(&term.destination_port) {
                if seen_ports.insert((port.low, port.high)) {
                    lines.push(format!("object-group ip port {}-{}", port.low, port.high));
                    if port.is_single() {
                        lines.push(format!(" eq {}", port.low));
                    } else {
                        lines.push(format!(" range {} {}", port.low, port.high));
                    }
                    lines.push("exit".to_string());
                    lines.push(String::new());
                }
            }
        }

        lines
    }

    fn render_address_group(
        lines: &mut Vec<String>,
        seen: &mut HashSet<String>,
        addresses: &[NamedNetwork],
    ) {
        let addrs = v4_addresses(addresses);
        let Some(first) = addrs.first() else {
            return;
        };
        if !seen.insert(first.parent_token.clone()) {
            return;
        }
        lines.push(format!("object-group ip address {}", first.parent_token));
        for addr in &addrs {
            // netmask_v4 is Some for every address the v4 filter kept
            if let (ip, Some(mask)) = (addr.net.network(), addr.netmask_v4()) {
                lines.push(format!(" {ip} {mask}"));
            }
        }
        lines.push("exit".to_string());
        lines.push(String::new());
    }
}
