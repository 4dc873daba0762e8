//! aclgen - vendor-neutral filter policies to Cisco ACL configuration
//!
//! A translation engine that converts an abstract network-filter model
//! (named filters, each an ordered sequence of match/action terms) into
//! concrete Cisco access-control-list syntax.
//!
//! # Architecture
//!
//! - [`policy`] - The abstract filter/term model produced by upstream parsers
//! - [`netaddr`] - Token-carrying addresses and address-set arithmetic
//! - [`cisco`] - The Cisco renderer: term expansion, object groups, assembly
//!
//! # Rendering model
//!
//! Rendering is a single deterministic, synchronous pass: a policy goes
//! in, a complete configuration document comes out, or the render fails
//! outright. Constraint violations (standard-ACL structure, reserved
//! filter numbers, unsupported subtypes) abort the whole document so a
//! partial, security-relevant ACL is never emitted. Non-fatal narrowing
//! (an IPv6 address in a v4-only context, an unresolvable protocol name)
//! is reported through `tracing` and rendering continues.
//!
//! # Example
//!
//! ```
//! use aclgen::policy::{Action, Filter, Header, Policy, PortRange, Target, Term};
//! use aclgen::Cisco;
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
//!
//! let acl = Cisco::new(policy).unwrap().render().unwrap();
//! assert!(acl.contains("ip access-list extended test-filter"));
//! assert!(acl.contains(" permit tcp any any eq 80"));
//! ```

#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]

pub mod cisco;
pub mod netaddr;
pub mod policy;

// Re-export commonly used types
pub use cisco::error::{Error, Result};
pub use cisco::generator::{Cisco, FilterType};
pub use netaddr::{AddressFamily, NamedNetwork};
pub use policy::{Action, Filter, Header, Policy, PortRange, Target, Term, Verbatim};
