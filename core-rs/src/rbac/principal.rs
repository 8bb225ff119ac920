//! Principals and the staff/patron partition
//!
//! Patron principals are the reserved public classes (`everyone`,
//! `authenticated`) and anything in the IP-range or patron namespaces.
//! Every other principal is a staff principal (a user or group).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Anonymous public visitors
pub const PUBLIC_PRINC: &str = "everyone";

/// Any logged-in visitor
pub const AUTHENTICATED_PRINC: &str = "authenticated";

/// Prefix of principals derived from an IP range
pub const IP_PRINC_NAMESPACE: &str = "ip:";

/// Prefix of named patron groups
pub const PATRON_NAMESPACE: &str = "patron:";

pub fn is_patron_principal(principal: &str) -> bool {
    principal == PUBLIC_PRINC
        || principal == AUTHENTICATED_PRINC
        || principal.starts_with(IP_PRINC_NAMESPACE)
        || principal.starts_with(PATRON_NAMESPACE)
}

pub fn is_staff_principal(principal: &str) -> bool {
    !is_patron_principal(principal)
}

/// Resolved principals presented by one caller for one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentPrincipals {
    principals: BTreeSet<String>,
}

impl AgentPrincipals {
    pub fn new<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AgentPrincipals {
            principals: principals.into_iter().map(Into::into).collect(),
        }
    }

    /// Principals of an anonymous visitor
    pub fn anonymous() -> Self {
        AgentPrincipals::new([PUBLIC_PRINC])
    }

    pub fn contains(&self, principal: &str) -> bool {
        self.principals.contains(principal)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.principals.iter().map(String::as_str)
    }

    pub fn staff_principals(&self) -> BTreeSet<&str> {
        self.iter().filter(|p| is_staff_principal(p)).collect()
    }

    pub fn patron_principals(&self) -> BTreeSet<&str> {
        self.iter().filter(|p| is_patron_principal(p)).collect()
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl fmt::Display for AgentPrincipals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", joined.join(", "))
    }
}
