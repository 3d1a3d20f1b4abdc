//! Version negotiation core.
//!
//! A ClientHello carries up to two version signals: the fixed legacy field,
//! and (from TLS 1.3) a supported_versions extension listing the client's
//! true candidates. The negotiator reconciles those signals with the local
//! security policy into three values: what the client supports, what the
//! server offers, and what the handshake will actually use.

use log::{debug, trace};
use tinyvec::ArrayVec;

use crate::config::Config;
use crate::message::{ClientHello, ExtensionType, ProtocolVersion};
use crate::message::SupportedVersionsClientHello;
use crate::Error;

/// Highest version expressible in the legacy version field.
///
/// Clients that support anything newer freeze the legacy field here and
/// signal the real maximum through the supported_versions extension, because
/// older peers mis-parse higher values in the fixed field.
pub const LEGACY_VERSION_CEILING: ProtocolVersion = ProtocolVersion::TLS1_2;

/// Where the client's true version claim comes from.
///
/// When the supported_versions extension is present (and TLS 1.3 is enabled
/// locally), it is the authoritative signal: clients sending it are required
/// to freeze the legacy field, so trusting the legacy field instead would
/// silently downgrade the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOffer {
    /// Ordered candidate list from the supported_versions extension.
    FromExtension(ArrayVec<[ProtocolVersion; 8]>),
    /// The legacy version field; the client accepts anything up to it.
    FromLegacyField(ProtocolVersion),
}

impl ClientOffer {
    /// Derive the offer from a parsed ClientHello.
    ///
    /// With `tls13_enabled` off the extension is not interpreted at all and
    /// the offer is always the legacy field.
    pub fn from_client_hello(hello: &ClientHello, tls13_enabled: bool) -> Result<Self, Error> {
        if tls13_enabled {
            let sv_ext = hello
                .extensions
                .iter()
                .find(|e| e.extension_type == ExtensionType::SupportedVersions);

            if let Some(ext) = sv_ext {
                let (rest, sv) = SupportedVersionsClientHello::parse(ext.extension_data)
                    .map_err(|_| {
                        Error::MalformedMessage("bad supported_versions extension".to_string())
                    })?;
                if !rest.is_empty() {
                    return Err(Error::MalformedMessage(
                        "trailing bytes in supported_versions extension".to_string(),
                    ));
                }
                trace!("Client offers versions from extension: {:?}", sv.versions);
                return Ok(ClientOffer::FromExtension(sv.versions));
            }
        }

        trace!(
            "Client offers from legacy version field: {}",
            hello.legacy_version
        );
        Ok(ClientOffer::FromLegacyField(hello.legacy_version))
    }

    /// Highest version the client is capable of.
    pub fn highest(&self) -> ProtocolVersion {
        match self {
            ClientOffer::FromExtension(list) => {
                list.iter().copied().max().unwrap_or_default()
            }
            ClientOffer::FromLegacyField(version) => cap_to_ceiling(*version),
        }
    }

    /// Best version present in both the offer and the config's effective
    /// policy set, if any.
    fn best_common(&self, config: &Config) -> Option<ProtocolVersion> {
        match self {
            ClientOffer::FromExtension(list) => config
                .effective_versions()
                .filter(|v| list.contains(v))
                .max(),
            ClientOffer::FromLegacyField(version) => {
                // A legacy-only client accepts any version up to its field.
                let cap = cap_to_ceiling(*version);
                config.effective_versions().filter(|v| *v <= cap).max()
            }
        }
    }
}

/// Some clients historically wrote impossible values into the legacy field.
/// They never propagate literally; anything above the ceiling reads as the
/// ceiling.
fn cap_to_ceiling(version: ProtocolVersion) -> ProtocolVersion {
    if version.as_u16() > LEGACY_VERSION_CEILING.as_u16() {
        LEGACY_VERSION_CEILING
    } else {
        version
    }
}

/// The three negotiated version values, returned as one immutable triple so
/// no reader can observe a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedVersions {
    /// Highest version the client is capable of.
    pub client_protocol_version: ProtocolVersion,
    /// Highest version the local endpoint was willing to offer.
    pub server_protocol_version: ProtocolVersion,
    /// The version used for the remainder of the handshake.
    pub actual_protocol_version: ProtocolVersion,
}

/// Server-side negotiation against a received ClientHello.
pub fn negotiate(hello: &ClientHello, config: &Config) -> Result<NegotiatedVersions, Error> {
    let offer = ClientOffer::from_client_hello(hello, config.tls13_enabled())?;

    let client_protocol_version = offer.highest();
    let server_protocol_version = config.effective_max().ok_or(Error::NoOverlappingVersion)?;

    let actual_protocol_version = offer
        .best_common(config)
        .ok_or(Error::NoOverlappingVersion)?;

    debug!(
        "Negotiated {} (client {}, server {})",
        actual_protocol_version, client_protocol_version, server_protocol_version
    );

    Ok(NegotiatedVersions {
        client_protocol_version,
        server_protocol_version,
        actual_protocol_version,
    })
}

/// Client-side acceptance of the server's selected version.
///
/// The server may only pick something we offered: at most our own maximum
/// and present in our policy. Anything else is a protocol violation, not a
/// negotiable mismatch.
pub fn accept(chosen: ProtocolVersion, config: &Config) -> Result<NegotiatedVersions, Error> {
    let client_protocol_version = config.effective_max().ok_or(Error::NoOverlappingVersion)?;

    let offered = config.effective_versions().any(|v| v == chosen);
    if chosen > client_protocol_version || !offered {
        return Err(Error::IllegalParameter(format!(
            "server selected {} which we did not offer",
            chosen
        )));
    }

    debug!("Accepted server selection {}", chosen);

    Ok(NegotiatedVersions {
        client_protocol_version,
        server_protocol_version: chosen,
        actual_protocol_version: chosen,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CipherSuite, CompressionMethod, Random, SessionId};
    use tinyvec::array_vec;

    fn hello(legacy_version: ProtocolVersion) -> ClientHello<'static> {
        ClientHello::new(
            legacy_version,
            Random::new(),
            SessionId::empty(),
            CipherSuite::all(),
            array_vec![[CompressionMethod; 4] => CompressionMethod::Null],
        )
    }

    fn hello_with_versions<'a>(
        legacy_version: ProtocolVersion,
        versions: &[ProtocolVersion],
        extension_data: &'a mut Vec<u8>,
    ) -> ClientHello<'a> {
        ClientHello::new(
            legacy_version,
            Random::new(),
            SessionId::empty(),
            CipherSuite::all(),
            array_vec![[CompressionMethod; 4] => CompressionMethod::Null],
        )
        .with_supported_versions(versions, extension_data)
    }

    fn config(policy: &str, tls13: bool) -> Config {
        Config::builder()
            .policy(policy)
            .enable_tls13(tls13)
            .build()
            .unwrap()
    }

    use ProtocolVersion::*;

    #[test]
    fn legacy_only_equal_versions() {
        let result = negotiate(&hello(TLS1_2), &config("default", false)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_2);
        assert_eq!(result.server_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_2);
    }

    #[test]
    fn legacy_only_older_client() {
        let result = negotiate(&hello(TLS1_1), &config("default", false)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_1);
        assert_eq!(result.server_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_1);
    }

    #[test]
    fn no_extension_means_no_upgrade() {
        // Server could do TLS 1.3, but the client never offered the
        // extension, so negotiation runs purely on the legacy field.
        let result = negotiate(&hello(TLS1_2), &config("default_tls13", true)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_2);
        assert_eq!(result.server_protocol_version, TLS1_3);
        assert_eq!(result.actual_protocol_version, TLS1_2);
    }

    #[test]
    fn extension_overrides_tampered_legacy_field() {
        let mut ext = Vec::new();
        let hello = hello_with_versions(TLS1_3, &[TLS1_3, TLS1_2], &mut ext);

        let result = negotiate(&hello, &config("default_tls13", true)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_3);
        assert_eq!(result.server_protocol_version, TLS1_3);
        assert_eq!(result.actual_protocol_version, TLS1_3);
    }

    #[test]
    fn disabled_toggle_ignores_extension() {
        // Same tampered hello, but this server has TLS 1.3 off: the
        // extension is unrecognized data and the legacy field is capped.
        let mut ext = Vec::new();
        let hello = hello_with_versions(TLS1_3, &[TLS1_3, TLS1_2], &mut ext);

        let result = negotiate(&hello, &config("default_tls13", false)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_2);
        assert_eq!(result.server_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_2);
    }

    #[test]
    fn lying_extension_never_upgrades() {
        // Client claims TLS 1.3 but the server policy tops out at 1.2;
        // the best true overlap wins.
        let mut ext = Vec::new();
        let hello = hello_with_versions(TLS1_2, &[TLS1_3, TLS1_2], &mut ext);

        let result = negotiate(&hello, &config("default", true)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_3);
        assert_eq!(result.server_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_2);
    }

    #[test]
    fn extension_without_overlap_fails() {
        // Client only lists TLS 1.3; the server enables 1.3 but its policy
        // does not contain it. No fallback to the legacy field is attempted.
        let mut ext = Vec::new();
        let hello = hello_with_versions(TLS1_2, &[TLS1_3], &mut ext);

        let result = negotiate(&hello, &config("legacy", true));
        assert_eq!(result.unwrap_err(), Error::NoOverlappingVersion);
    }

    #[test]
    fn garbage_legacy_version_too_low_fails() {
        let result = negotiate(&hello(Unknown(0x0102)), &config("default", false));
        assert_eq!(result.unwrap_err(), Error::NoOverlappingVersion);
    }

    #[test]
    fn garbage_legacy_version_too_high_caps() {
        let result = negotiate(&hello(Unknown(0xFFFF)), &config("default", false)).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_2);
    }

    #[test]
    fn empty_supported_versions_is_malformed() {
        // Hand-build an extension with an empty payload list.
        let mut hello = hello(TLS1_2);
        let payload: &[u8] = &[0x00];
        hello.extensions.push(crate::message::Extension::new(
            ExtensionType::SupportedVersions,
            payload,
        ));

        let result = negotiate(&hello, &config("default_tls13", true));
        assert!(matches!(result, Err(Error::MalformedMessage(_))));

        // With the toggle off the same bytes are just unrecognized data.
        let result = negotiate(&hello, &config("default_tls13", false));
        assert!(result.is_ok());
    }

    #[test]
    fn triple_invariants_hold() {
        let mut ext = Vec::new();
        let hello = hello_with_versions(TLS1_2, &[TLS1_3, TLS1_2, TLS1_1], &mut ext);

        for (policy, tls13) in [
            ("default", false),
            ("default", true),
            ("default_tls13", true),
            ("default_tls13", false),
            ("strict", true),
            ("legacy", false),
        ] {
            let config = config(policy, tls13);
            let Ok(result) = negotiate(&hello, &config) else {
                continue;
            };
            let min = result
                .client_protocol_version
                .min(result.server_protocol_version);
            assert!(result.actual_protocol_version <= min);
            assert!(config.policy().allows(result.actual_protocol_version));
        }
    }

    #[test]
    fn accept_validates_server_choice() {
        let config = config("default", false);

        let result = accept(TLS1_2, &config).unwrap();
        assert_eq!(result.client_protocol_version, TLS1_2);
        assert_eq!(result.server_protocol_version, TLS1_2);
        assert_eq!(result.actual_protocol_version, TLS1_2);

        // TLS 1.3 was never offered under this config.
        let result = accept(TLS1_3, &config);
        assert!(matches!(result, Err(Error::IllegalParameter(_))));

        // Nor was SSLv3, which the policy does not contain at all.
        let result = accept(SSL3_0, &config);
        assert!(matches!(result, Err(Error::IllegalParameter(_))));
    }
}
