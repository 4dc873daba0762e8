//! Term normalization: effective match sets and the `established` pass
//!
//! Renderers never read a term's raw address/port lists directly; they go
//! through [`effective_addresses`] and [`effective_ports`], which apply
//! exclusions, filter by family, and substitute the match-any sentinels.
//!
//! [`normalize_policy`] is the one documented preprocessing step: terms
//! carrying an `established` option gain a synthetic high destination
//! port range, compensating for the absence of connection tracking in a
//! stateless filter. It returns a new policy, leaving the input
//! untouched so rendering stays referentially transparent.

use crate::netaddr::{exclude_networks, AddressFamily, NamedNetwork};
use crate::policy::{Policy, PortRange, Term};

/// Which end of the connection a match set applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrField {
    Source,
    Destination,
}

/// One address position in a statement: a concrete network or match-any
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchAddr {
    /// The platform `any` keyword; matches both families
    Any,
    Net(NamedNetwork),
}

impl MatchAddr {
    pub fn matches_family(&self, af: AddressFamily) -> bool {
        match self {
            MatchAddr::Any => true,
            MatchAddr::Net(n) => n.family() == af,
        }
    }
}

/// Synthetic destination range appended for `established` terms
pub const ESTABLISHED_PORTS: PortRange = PortRange::new(1024, 65535);

/// Returns the family-filtered effective address set for one field.
///
/// An unset field yields the single [`MatchAddr::Any`] sentinel. A set
/// field is filtered to `af` and reduced by the matching exclusion set;
/// a field that is set but has no addresses of this family yields an
/// empty vec, which suppresses every combination for this family.
pub fn effective_addresses(term: &Term, field: AddrField, af: AddressFamily) -> Vec<MatchAddr> {
    let (positive, exclude) = match field {
        AddrField::Source => (&term.source_address, &term.source_address_exclude),
        AddrField::Destination => (&term.destination_address, &term.destination_address_exclude),
    };
    if positive.is_empty() {
        return vec![MatchAddr::Any];
    }
    let of_family = |nets: &[NamedNetwork]| -> Vec<NamedNetwork> {
        nets.iter().filter(|n| n.family() == af).cloned().collect()
    };
    let positive = of_family(positive);
    let exclude = of_family(exclude);
    let remaining = if exclude.is_empty() {
        positive
    } else {
        exclude_networks(&positive, &exclude)
    };
    remaining.into_iter().map(MatchAddr::Net).collect()
}

/// Returns the effective port list for one field.
///
/// `None` is the "no port restriction" sentinel, distinct from matching
/// port 0.
pub fn effective_ports(term: &Term, field: AddrField) -> Vec<Option<PortRange>> {
    let ports = match field {
        AddrField::Source => &term.source_port,
        AddrField::Destination => &term.destination_port,
    };
    if ports.is_empty() {
        vec![None]
    } else {
        ports.iter().copied().map(Some).collect()
    }
}

/// The one-time `established` preprocessing pass.
///
/// Every term whose option set contains a flag starting with
/// `established` gains a synthetic destination port range
/// `[1024, 65535]`. Runs once per policy load, before any rendering.
#[must_use]
pub fn normalize_policy(mut policy: Policy) -> Policy {
    for filter in &mut policy.filters {
        for term in &mut filter.terms {
            if term.has_option_prefix("established") {
                term.destination_port.push(ESTABLISHED_PORTS);
            }
        }
    }
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cisco::test_helpers::{term_with, v4_net};
    use crate::policy::{Action, Filter, Header, Target};

    #[test]
    fn test_unset_addresses_yield_any() {
        let term = term_with("t", Action::Accept, |_| {});
        let src = effective_addresses(&term, AddrField::Source, AddressFamily::V4);
        assert_eq!(src, vec![MatchAddr::Any]);
        let dst = effective_addresses(&term, AddrField::Destination, AddressFamily::V6);
        assert_eq!(dst, vec![MatchAddr::Any]);
    }

    #[test]
    fn test_family_filtering() {
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![
                v4_net("10.0.0.0/24"),
                NamedNetwork::new("2001:db8::/32".parse().unwrap(), "V6NET"),
            ];
        });
        let v4 = effective_addresses(&term, AddrField::Source, AddressFamily::V4);
        assert_eq!(v4.len(), 1);
        let v6 = effective_addresses(&term, AddrField::Source, AddressFamily::V6);
        assert_eq!(v6.len(), 1);
        assert!(v6[0].matches_family(AddressFamily::V6));
    }

    #[test]
    fn test_set_field_with_no_family_match_is_empty() {
        // Addresses exist but none of the requested family: the term
        // must produce nothing for this family, not fall back to any.
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![v4_net("10.0.0.0/24")];
        });
        let v6 = effective_addresses(&term, AddrField::Source, AddressFamily::V6);
        assert!(v6.is_empty());
    }

    #[test]
    fn test_exclusions_are_applied() {
        let term = term_with("t", Action::Accept, |t| {
            t.source_address = vec![v4_net("10.0.0.0/24")];
            t.source_address_exclude = vec![v4_net("10.0.0.0/25")];
        });
        let src = effective_addresses(&term, AddrField::Source, AddressFamily::V4);
        assert_eq!(src.len(), 1);
        match &src[0] {
            MatchAddr::Net(n) => assert_eq!(n.net.to_string(), "10.0.0.128/25"),
            MatchAddr::Any => panic!("exclusion dropped"),
        }
    }

    #[test]
    fn test_unset_ports_yield_sentinel() {
        let term = term_with("t", Action::Accept, |_| {});
        assert_eq!(effective_ports(&term, AddrField::Source), vec![None]);
    }

    #[test]
    fn test_normalize_appends_established_ports() {
        let term = term_with("t", Action::Accept, |t| {
            t.protocol = vec!["tcp".to_string()];
            t.option = vec!["established".to_string()];
        });
        let policy = Policy {
            filters: vec![Filter {
                header: Header {
                    comment: vec![],
                    targets: vec![Target::new("cisco", &["f"])],
                },
                terms: vec![term],
            }],
        };
        let normalized = normalize_policy(policy.clone());
        assert_eq!(
            normalized.filters[0].terms[0].destination_port,
            vec![ESTABLISHED_PORTS]
        );
        // Input policy untouched.
        assert!(policy.filters[0].terms[0].destination_port.is_empty());
    }

    #[test]
    fn test_normalize_ignores_tcp_established() {
        let term = term_with("t", Action::Accept, |t| {
            t.option = vec!["tcp-established".to_string()];
        });
        let policy = Policy {
            filters: vec![Filter {
                header: Header::default(),
                terms: vec![term],
            }],
        };
        let normalized = normalize_policy(policy);
        assert!(normalized.filters[0].terms[0].destination_port.is_empty());
    }
}
