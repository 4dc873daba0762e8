//! Standard-ACL term renderer
//!
//! Standard ACLs match on a single address and nothing else, so the
//! restricted statement form is validated at construction time: a term
//! carrying protocols, source/destination addresses, options, ports, a
//! counter, or logging is a structural error, raised before any line is
//! rendered. IPv6 addresses are skipped with a diagnostic; standard ACLs
//! are v4-only here.

use ipnetwork::IpNetwork;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::cisco::error::{Error, Result, StandardTermViolation};
use crate::policy::Term;

/// A term validated against the standard-ACL statement form
#[derive(Debug)]
pub struct StandardTerm<'a> {
    term: &'a Term,
    filter_name: &'a str,
}

impl<'a> StandardTerm<'a> {
    /// Validates the term's structure; every violation is independent
    /// and fatal.
    pub fn new(term: &'a Term, filter_name: &'a str) -> Result<Self> {
        let violation = |violation: StandardTermViolation| Error::StandardTerm {
            term: term.name.clone(),
            violation,
        };

        if !term.protocol.is_empty() {
            return Err(violation(StandardTermViolation::Protocol));
        }
        if !term.source_address.is_empty()
            || !term.source_address_exclude.is_empty()
            || !term.destination_address.is_empty()
            || !term.destination_address_exclude.is_empty()
        {
            return Err(violation(StandardTermViolation::Addresses));
        }
        if !term.option.is_empty() {
            return Err(violation(StandardTermViolation::Options));
        }
        if !term.source_port.is_empty() || !term.destination_port.is_empty() {
            return Err(violation(StandardTermViolation::Ports));
        }
        if term.counter.is_some() {
            return Err(violation(StandardTermViolation::Counter));
        }
        if term.logging {
            return Err(violation(StandardTermViolation::Logging));
        }

        Ok(Self { term, filter_name })
    }

    /// Renders `access-list <name> <action> <addr>` statements for the
    /// term's directly attached addresses.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();

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

        let action = self.term.action.keyword();
        for addr in &self.term.address {
            match addr.net {
                IpNetwork::V6(_) => {
                    debug!(
                        term = %self.term.name,
                        "ignoring unsupported IPv6 address in standard ACL"
                    );
                }
                IpNetwork::V4(n) => {
                    if n.prefix() == 32 {
                        lines.push(format!(
                            "access-list {} {} {}",
                            self.filter_name,
                            action,
                            n.ip()
                        ));
                    } else {
                        let hostmask = Ipv4Addr::from(!u32::from(n.mask()));
                        lines.push(format!(
                            "access-list {} {} {} {}",
                            self.filter_name,
                            action,
                            n.network(),
                            hostmask
                        ));
                    }
                }
            }
        }

        lines
    }
}
