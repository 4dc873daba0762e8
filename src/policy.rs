//! Vendor-neutral filter policy data structures
//!
//! This module defines the abstract model that platform renderers consume.
//! A [`Policy`] is an ordered list of [`Filter`]s; each filter pairs a
//! [`Header`] (target platforms, filter name, subtype, comments) with an
//! ordered sequence of [`Term`]s describing match criteria and an action.
//!
//! The model is produced upstream (by a policy-language parser and a
//! naming database) and is read-only to the renderers. Renderers never
//! mutate a term; the one `established` port normalization happens in
//! [`crate::cisco::normalize::normalize_policy`], which returns a new
//! policy.
//!
//! # Example
//!
//! ```
//! use aclgen::policy::{Action, Filter, Header, Policy, PortRange, Target, Term};
//!
//! let mut term = Term::new("allow-web", Action::Accept);
//! term.protocol = vec!["tcp".to_string()];
//! term.destination_port = vec![PortRange::single(80)];
//!
//! let policy = Policy {
//!     filters: vec![Filter {
//!         header: Header {
//!             comment: vec![],
//!             targets: vec![Target::new("cisco", &["test-filter", "extended"])],
//!         },
//!         terms: vec![term],
//!     }],
//! };
//! assert_eq!(policy.filters[0].header.filter_name("cisco"), Some("test-filter"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::netaddr::NamedNetwork;

/// Action taken when a packet matches a term
///
/// `Copy` trait allows efficient passing by value for this small enum.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Allow the packet through
    #[strum(serialize = "accept")]
    Accept,
    /// Drop the packet silently
    #[strum(serialize = "deny")]
    Deny,
    /// Reject the packet
    #[strum(serialize = "reject")]
    Reject,
    /// Fall through to the next term
    #[strum(serialize = "next")]
    Next,
    /// Reject and send a TCP reset
    #[strum(serialize = "reject-with-tcp-rst")]
    RejectWithTcpRst,
}

impl Action {
    /// Returns lowercase action name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Accept => "accept",
            Action::Deny => "deny",
            Action::Reject => "reject",
            Action::Next => "next",
            Action::RejectWithTcpRst => "reject-with-tcp-rst",
        }
    }

    /// Returns the Cisco statement keyword for this action.
    ///
    /// Fixed, process-wide mapping. `reject` and `reject-with-tcp-rst`
    /// both map to `deny`: the platform has no reset primitive. `next`
    /// maps to a comment, a no-op in the rendered ACL.
    pub const fn keyword(self) -> &'static str {
        match self {
            Action::Accept => "permit",
            Action::Deny | Action::Reject | Action::RejectWithTcpRst => "deny",
            Action::Next => "! next",
        }
    }
}

/// Closed port interval; a single port is `[p, p]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PortRange {
    pub low: u16,
    pub high: u16,
}

impl PortRange {
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    pub const fn single(port: u16) -> Self {
        Self {
            low: port,
            high: port,
        }
    }

    /// Returns `true` if the range covers exactly one port
    pub const fn is_single(self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// Raw platform-specific text that replaces a term's rendered output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verbatim {
    /// Target platform name this override applies to, e.g. `cisco`
    pub platform: String,
    /// Raw text emitted unmodified in place of the rendered term
    pub text: String,
}

impl Verbatim {
    pub fn new(platform: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            text: text.into(),
        }
    }
}

/// A single match/action rule
///
/// Unset collections mean "match any" for that dimension; renderers
/// substitute the appropriate platform sentinel. The `address` field
/// holds term-level addresses used only by standard ACLs; extended
/// renderers read the source/destination sets instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub name: String,
    /// Free-text comment lines rendered as remarks
    #[serde(default)]
    pub comment: Vec<String>,
    pub action: Action,
    /// Protocol names or already-numeric strings, e.g. `tcp`, `6`
    #[serde(default)]
    pub protocol: Vec<String>,
    /// Addresses attached directly to the term (standard ACLs only)
    #[serde(default)]
    pub address: Vec<NamedNetwork>,
    #[serde(default)]
    pub source_address: Vec<NamedNetwork>,
    #[serde(default)]
    pub source_address_exclude: Vec<NamedNetwork>,
    #[serde(default)]
    pub destination_address: Vec<NamedNetwork>,
    #[serde(default)]
    pub destination_address_exclude: Vec<NamedNetwork>,
    #[serde(default)]
    pub source_port: Vec<PortRange>,
    #[serde(default)]
    pub destination_port: Vec<PortRange>,
    /// Free-form option flags, notably `established`/`tcp-established`
    #[serde(default)]
    pub option: Vec<String>,
    #[serde(default)]
    pub verbatim: Vec<Verbatim>,
    #[serde(default)]
    pub logging: bool,
    #[serde(default)]
    pub counter: Option<String>,
}

impl Term {
    /// Creates a term with the given name and action; all match
    /// dimensions start unset ("match any").
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            comment: Vec::new(),
            action,
            protocol: Vec::new(),
            address: Vec::new(),
            source_address: Vec::new(),
            source_address_exclude: Vec::new(),
            destination_address: Vec::new(),
            destination_address_exclude: Vec::new(),
            source_port: Vec::new(),
            destination_port: Vec::new(),
            option: Vec::new(),
            verbatim: Vec::new(),
            logging: false,
            counter: None,
        }
    }

    /// Returns `true` if any option flag starts with `prefix`.
    ///
    /// Option flags are free-form words; prefix matching mirrors how
    /// platforms treat variants like `established` vs `established\n`.
    pub fn has_option_prefix(&self, prefix: &str) -> bool {
        self.option.iter().any(|o| o.starts_with(prefix))
    }

    /// Returns the raw text of this term's verbatim override for
    /// `platform`, if one is declared.
    pub fn verbatim_for(&self, platform: &str) -> Option<&str> {
        self.verbatim
            .iter()
            .find(|v| v.platform == platform)
            .map(|v| v.text.as_str())
    }
}

/// One declared rendering target inside a header
///
/// `options[0]` is the per-platform filter name; `options[1]`, when
/// present, is the filter subtype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub platform: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Target {
    pub fn new(platform: impl Into<String>, options: &[&str]) -> Self {
        Self {
            platform: platform.into(),
            options: options.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Filter-level metadata: targets and header comments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Header {
    #[serde(default)]
    pub comment: Vec<String>,
    pub targets: Vec<Target>,
}

impl Header {
    /// Returns `true` if any target names `platform`
    pub fn targets_platform(&self, platform: &str) -> bool {
        self.targets.iter().any(|t| t.platform == platform)
    }

    /// Returns the option list declared for `platform`
    pub fn filter_options(&self, platform: &str) -> Option<&[String]> {
        self.targets
            .iter()
            .find(|t| t.platform == platform)
            .map(|t| t.options.as_slice())
    }

    /// Returns the filter name declared for `platform` (first option token)
    pub fn filter_name(&self, platform: &str) -> Option<&str> {
        self.filter_options(platform)
            .and_then(|opts| opts.first())
            .map(String::as_str)
    }
}

/// A named ruleset: header plus ordered terms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    pub header: Header,
    pub terms: Vec<Term>,
}

/// An ordered sequence of filters, as produced by the policy parser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Policy {
    pub filters: Vec<Filter>,
}
