use thiserror::Error;

/// Errors raised while assembling a Cisco ACL document
///
/// Every variant is fatal: a violated constraint aborts the whole render
/// so a partial or incorrect ACL is never emitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The policy declares no header targeting this platform
    #[error("no cisco policy found in {target}")]
    NoCiscoPolicy { target: String },

    /// A header requested a filter subtype this platform cannot render
    #[error(
        "only access list types extended, standard, object-group, inet6 \
         and mixed are supported, got '{found}'"
    )]
    UnsupportedFilterType { found: String },

    /// A header targets this platform without declaring a filter name
    #[error("cisco target declares no filter name")]
    MissingFilterName,

    /// A standard-ACL term carries a field the statement form cannot express
    #[error("standard ACL term '{term}': {violation}")]
    StandardTerm {
        term: String,
        violation: StandardTermViolation,
    },

    /// An extended or object-group filter used a number reserved for
    /// standard ACLs
    #[error("access-lists between 1-99 are reserved for standard ACLs, got '{name}'")]
    ReservedStandardRange { name: String },

    /// A standard filter name outside the mandatory numeric range
    #[error("standard access lists must be numbered between 1 and 99, got '{name}'")]
    InvalidStandardName { name: String },
}

/// Structural constraints a standard-ACL term must satisfy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StandardTermViolation {
    #[error("standard ACLs cannot specify protocols")]
    Protocol,

    #[error("standard ACLs cannot use source or destination addresses")]
    Addresses,

    #[error("standard ACLs prohibit use of options")]
    Options,

    #[error("standard ACLs prohibit use of port numbers")]
    Ports,

    #[error("counters are not implemented in standard ACLs")]
    Counter,

    #[error("logging is not implemented in standard ACLs")]
    Logging,
}

pub type Result<T> = std::result::Result<T, Error>;
