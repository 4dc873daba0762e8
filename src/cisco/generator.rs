//! Filter assembler: the Cisco document entry point
//!
//! [`Cisco::new`] guards platform applicability and runs the one-time
//! `established` normalization; [`Cisco::render`] walks the declared
//! filters, selects the per-subtype renderer, validates filter names,
//! emits preamble and remark statements, and concatenates everything
//! into the final document behind two fixed metadata marker lines.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cisco::error::{Error, Result};
use crate::cisco::extended::ExtendedTerm;
use crate::cisco::normalize::normalize_policy;
use crate::cisco::object_group::{ObjectGroup, ObjectGroupTerm};
use crate::cisco::standard::StandardTerm;
use crate::policy::Policy;

/// Platform name used in headers and verbatim overrides
pub const PLATFORM: &str = "cisco";

/// Renderable filter subtypes; the second platform-option token
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
pub enum FilterType {
    #[strum(serialize = "extended")]
    Extended,
    #[strum(serialize = "standard")]
    Standard,
    #[strum(serialize = "object-group")]
    ObjectGroup,
    #[strum(serialize = "inet6")]
    Inet6,
    /// Renders the identical term list twice: extended (v4) then inet6
    #[strum(serialize = "mixed")]
    Mixed,
}

/// A policy bound to the Cisco platform, ready to render
#[derive(Debug)]
pub struct Cisco {
    policy: Policy,
    first_filter_only: bool,
}

impl Cisco {
    /// Conventional output file suffix for rendered documents
    pub const FILE_SUFFIX: &'static str = ".acl";

    /// Binds a policy to this platform.
    ///
    /// Fails unless at least one header targets `cisco`; applies the
    /// `established` port normalization to an owned copy of the policy.
    pub fn new(policy: Policy) -> Result<Self> {
        if !policy
            .filters
            .iter()
            .any(|f| f.header.targets_platform(PLATFORM))
        {
            let target = policy
                .filters
                .iter()
                .flat_map(|f| f.header.targets.iter())
                .map(|t| t.platform.clone())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(Error::NoCiscoPolicy { target });
        }
        Ok(Self {
            policy: normalize_policy(policy),
            first_filter_only: false,
        })
    }

    /// Like [`Cisco::new`], but stops after the first declared filter.
    ///
    /// Legacy generators truncated multi-filter policies this way;
    /// the behavior is kept reachable for byte-for-byte comparison
    /// against their output, never as a default.
    pub fn with_first_filter_only(policy: Policy) -> Result<Self> {
        let mut cisco = Self::new(policy)?;
        cisco.first_filter_only = true;
        Ok(cisco)
    }

    /// Renders the complete ACL document.
    pub fn render(&self) -> Result<String> {
        // Fixed metadata markers precede all filter output.
        let header = ["! $Id:$".to_string(), "! $Date:$".to_string()];

        let mut target: Vec<String> = Vec::new();
        let mut object_groups = ObjectGroup::default();

        for filter in &self.policy.filters {
            let Some(options) = filter.header.filter_options(PLATFORM) else {
                continue;
            };
            let filter_name = options.first().ok_or(Error::MissingFilterName)?;

            let filter_type = match options.get(1) {
                None => FilterType::Extended,
                Some(s) => s
                    .parse::<FilterType>()
                    .map_err(|_| Error::UnsupportedFilterType { found: s.clone() })?,
            };
            debug!(filter = %filter_name, subtype = %filter_type, "assembling filter");

            let subtypes: &[FilterType] = match filter_type {
                FilterType::Mixed => &[FilterType::Extended, FilterType::Inet6],
                _ => std::slice::from_ref(&filter_type),
            };

            for subtype in subtypes {
                match subtype {
                    FilterType::Extended => {
                        validate_extended_name(filter_name)?;
                        target.push(format!("no ip access-list extended {filter_name}"));
                        target.push(format!("ip access-list extended {filter_name}"));
                    }
                    FilterType::Standard => {
                        validate_standard_name(filter_name)?;
                        target.push(format!("no ip access-list {filter_name}"));
                    }
                    FilterType::ObjectGroup => {
                        validate_extended_name(filter_name)?;
                        object_groups.set_name(filter_name);
                        target.push(format!("no ip access-list extended {filter_name}"));
                        target.push(format!("ip access-list extended {filter_name}"));
                    }
                    FilterType::Inet6 => {
                        target.push(format!("no ipv6 access-list {filter_name}"));
                        target.push(format!("ipv6 access-list {filter_name}"));
                    }
                    FilterType::Mixed => unreachable!("mixed expands to extended + inet6"),
                }

                for comment in &filter.header.comment {
                    for line in comment.lines() {
                        target.push(format!("remark {line}"));
                    }
                }

                for term in &filter.terms {
                    match subtype {
                        FilterType::Standard => {
                            target.extend(StandardTerm::new(term, filter_name)?.render());
                        }
                        FilterType::Extended => {
                            target.extend(ExtendedTerm::new(term).render());
                        }
                        FilterType::ObjectGroup => {
                            object_groups.add_term(term);
                            target.extend(ObjectGroupTerm::new(term).render());
                        }
                        FilterType::Inet6 => {
                            target.extend(ExtendedTerm::inet6(term).render());
                        }
                        FilterType::Mixed => unreachable!(),
                    }
                }

                target.push(String::new());
            }

            if self.first_filter_only {
                break;
            }
        }

        // Group definitions precede every filter block.
        if object_groups.is_valid() {
            let mut prefixed = object_groups.render();
            prefixed.extend(target);
            target = prefixed;
        }

        let mut document: Vec<String> = header.into_iter().collect();
        document.extend(target);
        Ok(document.join("\n"))
    }
}

/// Numeric names 1-99 are reserved for standard ACLs on this platform
fn validate_extended_name(name: &str) -> Result<()> {
    if let Ok(n) = name.parse::<u64>() {
        if (1..=99).contains(&n) {
            return Err(Error::ReservedStandardRange {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Standard ACLs must be numbered 1-99
fn validate_standard_name(name: &str) -> Result<()> {
    match name.parse::<u64>() {
        Ok(n) if (1..=99).contains(&n) => Ok(()),
        _ => Err(Error::InvalidStandardName {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_name_validation() {
        assert!(validate_extended_name("test-filter").is_ok());
        assert!(validate_extended_name("100").is_ok());
        assert!(validate_extended_name("50").is_err());
        assert!(validate_extended_name("1").is_err());
        assert!(validate_extended_name("99").is_err());
    }

    #[test]
    fn test_standard_name_validation() {
        assert!(validate_standard_name("50").is_ok());
        assert!(validate_standard_name("1").is_ok());
        assert!(validate_standard_name("99").is_ok());
        assert!(validate_standard_name("100").is_err());
        assert!(validate_standard_name("0").is_err());
        assert!(validate_standard_name("edge-filter").is_err());
    }

    #[test]
    fn test_filter_type_parsing() {
        assert_eq!(
            "object-group".parse::<FilterType>().unwrap(),
            FilterType::ObjectGroup
        );
        assert!("loopback".parse::<FilterType>().is_err());
    }
}
