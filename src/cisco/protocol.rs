//! Protocol name resolution
//!
//! Cisco statements carry IP protocols numerically except for a handful
//! of keywords the platform accepts by name. [`resolve_protocol`] maps a
//! textual protocol to its IANA number, keeps the literal keywords as
//! words, and passes anything it cannot resolve through unchanged; the
//! platform is the final arbiter of what it accepts, so resolution never
//! fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::policy::Term;

/// Protocol keywords Cisco renders and accepts literally
const LITERAL_NAMES: [&str; 4] = ["ip", "tcp", "udp", "icmp"];

/// IANA assigned protocol numbers, the subset a resolver without
/// `/etc/protocols` needs in practice
const PROTOCOL_NUMBERS: &[(&str, u8)] = &[
    ("hopopt", 0),
    ("icmp", 1),
    ("igmp", 2),
    ("ggp", 3),
    ("ipip", 4),
    ("ipencap", 4),
    ("st", 5),
    ("tcp", 6),
    ("egp", 8),
    ("igp", 9),
    ("pup", 12),
    ("udp", 17),
    ("hmp", 20),
    ("rdp", 27),
    ("ipv6", 41),
    ("ipv6-route", 43),
    ("ipv6-frag", 44),
    ("idrp", 45),
    ("rsvp", 46),
    ("gre", 47),
    ("esp", 50),
    ("ah", 51),
    ("skip", 57),
    ("ipv6-icmp", 58),
    ("icmpv6", 58),
    ("ipv6-nonxt", 59),
    ("ipv6-opts", 60),
    ("rspf", 73),
    ("vmtp", 81),
    ("eigrp", 88),
    ("ospf", 89),
    ("etherip", 97),
    ("encap", 98),
    ("pim", 103),
    ("vrrp", 112),
    ("l2tp", 115),
    ("isis", 124),
    ("sctp", 132),
    ("fc", 133),
    ("udplite", 136),
];

/// A resolved protocol: a number, or a name the platform takes literally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proto {
    Name(String),
    Number(u8),
}

impl Proto {
    /// The IANA number of this protocol, if one is known.
    ///
    /// `ip` has no number; it is the platform's match-any keyword.
    pub fn number(&self) -> Option<u8> {
        match self {
            Proto::Number(n) => Some(*n),
            Proto::Name(name) => lookup(name),
        }
    }

    /// Returns `true` if this protocol is TCP in either representation
    pub fn is_tcp(&self) -> bool {
        self.number() == Some(6)
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proto::Name(name) => write!(f, "{name}"),
            Proto::Number(n) => write!(f, "{n}"),
        }
    }
}

fn lookup(name: &str) -> Option<u8> {
    PROTOCOL_NUMBERS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, num)| *num)
}

/// Resolves one textual protocol to its statement representation.
///
/// Already-numeric input and the literal Cisco keywords pass through
/// unchanged; known names become their IANA number; unknown names pass
/// through verbatim with a diagnostic rather than failing the render.
pub fn resolve_protocol(proto: &str) -> Proto {
    let lower = proto.to_lowercase();
    if let Ok(n) = lower.parse::<u8>() {
        return Proto::Number(n);
    }
    if LITERAL_NAMES.contains(&lower.as_str()) {
        return Proto::Name(lower);
    }
    if let Some(n) = lookup(&lower) {
        return Proto::Number(n);
    }
    debug!(protocol = %proto, "unresolvable protocol name passed through verbatim");
    Proto::Name(lower)
}

/// Resolves a term's protocol list, defaulting to `ip` when unset
pub fn resolve_protocols(term: &Term) -> Vec<Proto> {
    if term.protocol.is_empty() {
        vec![Proto::Name("ip".to_string())]
    } else {
        term.protocol.iter().map(|p| resolve_protocol(p)).collect()
    }
}
