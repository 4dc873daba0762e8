//! Shared test utilities for renderer tests
//!
//! Builder helpers to avoid repeating term and policy construction
//! across test suites. Only compiled in test mode.

use crate::netaddr::NamedNetwork;
use crate::policy::{Action, Filter, Header, Policy, Target, Term};

/// Creates a term and lets the closure fill in the match dimensions.
///
/// # Example
///
/// ```ignore
/// let term = term_with("allow-web", Action::Accept, |t| {
///     t.protocol = vec!["tcp".to_string()];
///     t.destination_port = vec![PortRange::single(80)];
/// });
/// ```
pub fn term_with(name: &str, action: Action, build: impl FnOnce(&mut Term)) -> Term {
    let mut term = Term::new(name, action);
    build(&mut term);
    term
}

/// Parses a v4 network whose token is its own CIDR string
pub fn v4_net(cidr: &str) -> NamedNetwork {
    NamedNetwork::new(cidr.parse().expect("test CIDR is valid"), cidr)
}

/// Parses a v4 network belonging to the named term-level group
pub fn v4_group(cidr: &str, parent_token: &str) -> NamedNetwork {
    NamedNetwork::with_parent(cidr.parse().expect("test CIDR is valid"), cidr, parent_token)
}

/// Builds a single-filter policy targeting cisco
pub fn cisco_policy(filter_name: &str, subtype: Option<&str>, terms: Vec<Term>) -> Policy {
    let options: Vec<&str> = match subtype {
        Some(s) => vec![filter_name, s],
        None => vec![filter_name],
    };
    Policy {
        filters: vec![Filter {
            header: Header {
                comment: vec![],
                targets: vec![Target::new("cisco", &options)],
            },
            terms,
        }],
    }
}
