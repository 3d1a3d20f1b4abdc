use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::message::ProtocolVersion;

/// A named, ordered set of protocol versions an endpoint is willing to
/// accept, in descending preference order.
///
/// Policies are static tables selected by name, in the manner of cipher
/// preference strings. Every table is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    name: &'static str,
    versions: &'static [ProtocolVersion],
}

use ProtocolVersion::*;

/// TLS 1.2 down to TLS 1.0. The safe pick for endpoints that have not
/// opted into TLS 1.3.
static DEFAULT: Policy = Policy {
    name: "default",
    versions: &[TLS1_2, TLS1_1, TLS1_0],
};

/// TLS 1.3 down to TLS 1.0. TLS 1.3 itself is only effective on
/// connections whose config enables it.
static DEFAULT_TLS13: Policy = Policy {
    name: "default_tls13",
    versions: &[TLS1_3, TLS1_2, TLS1_1, TLS1_0],
};

/// Everything back to SSLv3, for peers stuck in the past.
static LEGACY: Policy = Policy {
    name: "legacy",
    versions: &[TLS1_2, TLS1_1, TLS1_0, SSL3_0],
};

/// TLS 1.3 and 1.2 only.
static STRICT: Policy = Policy {
    name: "strict",
    versions: &[TLS1_3, TLS1_2],
};

static REGISTRY: Lazy<HashMap<&'static str, &'static Policy>> = Lazy::new(|| {
    [&DEFAULT, &DEFAULT_TLS13, &LEGACY, &STRICT]
        .into_iter()
        .map(|p| (p.name, p))
        .collect()
});

impl Policy {
    /// Look up a policy by its registered name.
    pub fn from_name(name: &str) -> Option<&'static Policy> {
        REGISTRY.get(name).copied()
    }

    #[inline(always)]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allowed versions in descending preference order.
    #[inline(always)]
    pub fn versions(&self) -> &'static [ProtocolVersion] {
        self.versions
    }

    pub fn allows(&self, version: ProtocolVersion) -> bool {
        self.versions.contains(&version)
    }

    /// The versions usable on a connection. With `tls13_enabled` off,
    /// TLS 1.3 and above are excluded from the set entirely, not merely
    /// capped.
    pub fn effective_versions(
        &self,
        tls13_enabled: bool,
    ) -> impl Iterator<Item = ProtocolVersion> + '_ {
        self.versions
            .iter()
            .copied()
            .filter(move |v| tls13_enabled || *v < TLS1_3)
    }

    /// Highest usable version, or None if the effective set is empty.
    pub fn effective_max(&self, tls13_enabled: bool) -> Option<ProtocolVersion> {
        self.effective_versions(tls13_enabled).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Policy::from_name("default").map(|p| p.name()), Some("default"));
        assert_eq!(Policy::from_name("default_tls13").map(|p| p.name()), Some("default_tls13"));
        assert!(Policy::from_name("no_such_policy").is_none());
    }

    #[test]
    fn effective_set_excludes_tls13_when_disabled() {
        let policy = Policy::from_name("default_tls13").unwrap();

        assert_eq!(policy.effective_max(true), Some(TLS1_3));
        assert_eq!(policy.effective_max(false), Some(TLS1_2));
        assert!(!policy.effective_versions(false).any(|v| v == TLS1_3));
    }

    #[test]
    fn effective_set_can_be_empty() {
        // Not a registered table; a policy of only TLS 1.3 has nothing left
        // when the toggle is off.
        let policy = Policy {
            name: "tls13_only",
            versions: &[TLS1_3],
        };
        assert_eq!(policy.effective_max(false), None);
    }

    #[test]
    fn allows_is_exact_membership() {
        let policy = Policy::from_name("strict").unwrap();
        assert!(policy.allows(TLS1_2));
        assert!(!policy.allows(TLS1_1));
    }
}
