//! Token-carrying network addresses and address-set arithmetic
//!
//! [`NamedNetwork`] wraps an [`ipnetwork::IpNetwork`] together with the
//! two identity tokens the naming database attaches to every address:
//! `token` (the symbolic name of the individual entry) and
//! `parent_token` (the term-level group the entry belongs to, used to
//! collapse sibling addresses into one named object group).
//!
//! [`exclude_networks`] is the address-arithmetic primitive renderers use
//! to apply exclusion sets: set difference fragmented into the minimal
//! covering prefixes of the remainder.

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// IP address family discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    V4,
    V6,
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "inet"),
            AddressFamily::V6 => write!(f, "inet6"),
        }
    }
}

/// An address value plus its naming-database identity tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedNetwork {
    pub net: IpNetwork,
    /// Symbolic name of this individual entry
    pub token: String,
    /// Name of the term-level group this entry belongs to; sibling
    /// addresses sharing a parent token render as one object group
    pub parent_token: String,
}

impl NamedNetwork {
    /// Wraps a network whose token and parent token coincide
    pub fn new(net: IpNetwork, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            net,
            parent_token: token.clone(),
            token,
        }
    }

    pub fn with_parent(
        net: IpNetwork,
        token: impl Into<String>,
        parent_token: impl Into<String>,
    ) -> Self {
        Self {
            net,
            token: token.into(),
            parent_token: parent_token.into(),
        }
    }

    /// The synthetic v4 match-everything address, token `ANY`
    pub fn any_v4(token: impl Into<String>) -> Self {
        let net = IpNetwork::V4(
            Ipv4Network::new(Ipv4Addr::UNSPECIFIED, 0).expect("0.0.0.0/0 is a valid network"),
        );
        Self::new(net, token)
    }

    pub fn family(&self) -> AddressFamily {
        match self.net {
            IpNetwork::V4(_) => AddressFamily::V4,
            IpNetwork::V6(_) => AddressFamily::V6,
        }
    }

    /// Returns `true` for a single-host address (/32 v4, /128 v6)
    pub fn is_host(&self) -> bool {
        match self.net {
            IpNetwork::V4(n) => n.prefix() == 32,
            IpNetwork::V6(n) => n.prefix() == 128,
        }
    }

    pub fn prefix(&self) -> u8 {
        self.net.prefix()
    }

    /// The inverted mask (wildcard bits) of a v4 network
    pub fn hostmask_v4(&self) -> Option<Ipv4Addr> {
        match self.net {
            IpNetwork::V4(n) => Some(Ipv4Addr::from(!u32::from(n.mask()))),
            IpNetwork::V6(_) => None,
        }
    }

    /// The subnet mask of a v4 network
    pub fn netmask_v4(&self) -> Option<Ipv4Addr> {
        match self.net {
            IpNetwork::V4(n) => Some(n.mask()),
            IpNetwork::V6(_) => None,
        }
    }
}

/// Subtracts `excludes` from `networks`, fragmenting each remainder into
/// minimal covering prefixes.
///
/// Fragments inherit the token and parent token of the network they came
/// from, so a partially excluded group stays one group. The result is
/// sorted by family, network address, then prefix length, giving the
/// deterministic ordering renderers depend on.
pub fn exclude_networks(
    networks: &[NamedNetwork],
    excludes: &[NamedNetwork],
) -> Vec<NamedNetwork> {
    let exclude_nets: Vec<IpNetwork> = excludes.iter().map(|e| e.net).collect();
    let mut out = Vec::new();
    for named in networks {
        for fragment in subtract(named.net, &exclude_nets) {
            out.push(NamedNetwork {
                net: fragment,
                token: named.token.clone(),
                parent_token: named.parent_token.clone(),
            });
        }
    }
    out.sort_by_key(|n| sort_key(n.net));
    out
}

fn sort_key(net: IpNetwork) -> (u8, u128, u8) {
    match net {
        IpNetwork::V4(n) => (4, u128::from(u32::from(n.network())), n.prefix()),
        IpNetwork::V6(n) => (6, u128::from(n.network()), n.prefix()),
    }
}

/// Returns `true` if `outer` fully contains `inner` (same family only)
fn contains_net(outer: IpNetwork, inner: IpNetwork) -> bool {
    match (outer, inner) {
        (IpNetwork::V4(a), IpNetwork::V4(b)) => {
            a.prefix() <= b.prefix() && a.contains(b.network())
        }
        (IpNetwork::V6(a), IpNetwork::V6(b)) => {
            a.prefix() <= b.prefix() && a.contains(b.network())
        }
        _ => false,
    }
}

fn overlaps(a: IpNetwork, b: IpNetwork) -> bool {
    contains_net(a, b) || contains_net(b, a)
}

/// Splits a network into its two half-prefix subnets
fn split(net: IpNetwork) -> Option<(IpNetwork, IpNetwork)> {
    match net {
        IpNetwork::V4(n) => {
            if n.prefix() >= 32 {
                return None;
            }
            let prefix = n.prefix() + 1;
            let base = u32::from(n.network());
            let upper = base | (1u32 << (32 - prefix));
            let lo = Ipv4Network::new(Ipv4Addr::from(base), prefix).ok()?;
            let hi = Ipv4Network::new(Ipv4Addr::from(upper), prefix).ok()?;
            Some((IpNetwork::V4(lo), IpNetwork::V4(hi)))
        }
        IpNetwork::V6(n) => {
            if n.prefix() >= 128 {
                return None;
            }
            let prefix = n.prefix() + 1;
            let base = u128::from(n.network());
            let upper = base | (1u128 << (128 - prefix));
            let lo = Ipv6Network::new(Ipv6Addr::from(base), prefix).ok()?;
            let hi = Ipv6Network::new(Ipv6Addr::from(upper), prefix).ok()?;
            Some((IpNetwork::V6(lo), IpNetwork::V6(hi)))
        }
    }
}

/// Recursive half-splitting subtraction of all overlapping excludes
fn subtract(net: IpNetwork, excludes: &[IpNetwork]) -> Vec<IpNetwork> {
    if !excludes.iter().any(|e| overlaps(net, *e)) {
        return vec![net];
    }
    if excludes.iter().any(|e| contains_net(*e, net)) {
        return vec![];
    }
    // Overlap without full containment: some exclude is a strict subset,
    // so the network is splittable.
    match split(net) {
        Some((lo, hi)) => {
            let mut out = subtract(lo, excludes);
            out.extend(subtract(hi, excludes));
            out
        }
        None => vec![net],
    }
}
