use crate::message::ProtocolVersion;
use crate::policy::Policy;
use crate::Error;

/// Endpoint configuration for version negotiation.
#[derive(Debug, Clone)]
pub struct Config {
    policy: &'static Policy,
    tls13_enabled: bool,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            policy_name: "default".to_string(),
            enable_tls13: false,
        }
    }

    /// The security policy bound to this endpoint.
    #[inline(always)]
    pub fn policy(&self) -> &'static Policy {
        self.policy
    }

    /// Whether TLS 1.3 negotiation is enabled for this endpoint.
    ///
    /// When off, TLS 1.3 does not exist for the connection: it is excluded
    /// from the policy's effective set and a supported_versions extension in
    /// a peer's hello is treated as ordinary unrecognized extension data.
    #[inline(always)]
    pub fn tls13_enabled(&self) -> bool {
        self.tls13_enabled
    }

    /// Versions usable on connections with this config, in descending
    /// preference order.
    pub fn effective_versions(&self) -> impl Iterator<Item = ProtocolVersion> + '_ {
        self.policy.effective_versions(self.tls13_enabled)
    }

    /// Highest version this endpoint is willing to offer, or None if the
    /// policy has nothing usable under the current toggles.
    pub fn effective_max(&self) -> Option<ProtocolVersion> {
        self.policy.effective_max(self.tls13_enabled)
    }
}

/// Builder for endpoint configuration.
pub struct ConfigBuilder {
    policy_name: String,
    enable_tls13: bool,
}

impl ConfigBuilder {
    /// Select the security policy by name.
    ///
    /// Defaults to "default".
    pub fn policy(mut self, name: &str) -> Self {
        self.policy_name = name.to_string();
        self
    }

    /// Enable TLS 1.3 negotiation.
    ///
    /// Defaults to false. The toggle is fixed at build time; there is no way
    /// to flip it under a live connection.
    pub fn enable_tls13(mut self, enabled: bool) -> Self {
        self.enable_tls13 = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// Returns `Error::UnknownPolicy` if the policy name is not registered.
    pub fn build(self) -> Result<Config, Error> {
        let policy = Policy::from_name(&self.policy_name)
            .ok_or_else(|| Error::UnknownPolicy(self.policy_name.clone()))?;

        Ok(Config {
            policy,
            tls13_enabled: self.enable_tls13,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builder()
            .build()
            .expect("Default config should always validate")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_tls13_off() {
        let config = Config::default();
        assert!(!config.tls13_enabled());
        assert_eq!(config.policy().name(), "default");
    }

    #[test]
    fn unknown_policy_rejected() {
        let result = Config::builder().policy("bogus").build();
        assert_eq!(result.unwrap_err(), Error::UnknownPolicy("bogus".to_string()));
    }

    #[test]
    fn toggle_gates_effective_max() {
        let on = Config::builder()
            .policy("default_tls13")
            .enable_tls13(true)
            .build()
            .unwrap();
        let off = Config::builder().policy("default_tls13").build().unwrap();

        assert_eq!(on.effective_max(), Some(ProtocolVersion::TLS1_3));
        assert_eq!(off.effective_max(), Some(ProtocolVersion::TLS1_2));
    }
}
