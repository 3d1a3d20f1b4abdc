use std::sync::Arc;

use log::{debug, trace};
use tinyvec::array_vec;

use crate::config::Config;
use crate::message::{
    CipherSuite, ClientHello, CompressionMethod, ExtensionType, ProtocolVersion, Random,
    ServerHello, SessionId, SupportedVersionsServerHello,
};
use crate::negotiate::{accept, negotiate, NegotiatedVersions, LEGACY_VERSION_CEILING};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Client,
    Server,
}

/// Connection-scoped handshake state for version negotiation.
///
/// Sans-IO: byte slices in, `Vec<u8>` out. The negotiated triple is applied
/// in a single assignment once negotiation succeeds; readers either see no
/// result or all three values.
pub struct Session {
    mode: Mode,
    config: Arc<Config>,

    /// Random unique data (with gmt timestamp) for our own hello.
    random: Random,

    /// Session id we send in our own hello (resumption not implemented).
    session_id: SessionId,

    /// Cipher suite picked from the client's list. Carried opaquely; which
    /// suite wins is not version negotiation's concern.
    selected_cipher_suite: Option<CipherSuite>,

    /// The negotiated versions. Set once, in one step.
    versions: Option<NegotiatedVersions>,
}

impl Session {
    pub fn new(config: Arc<Config>, mode: Mode) -> Self {
        Session {
            mode,
            config,
            random: Random::new(),
            session_id: SessionId::random(),
            selected_cipher_suite: None,
            versions: None,
        }
    }

    #[inline(always)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The negotiated version triple, if negotiation has completed.
    pub fn negotiated(&self) -> Option<&NegotiatedVersions> {
        self.versions.as_ref()
    }

    /// Client: write our ClientHello into `output`.
    ///
    /// The legacy field is capped at the ceiling; anything newer is offered
    /// through the supported_versions extension. No version state is set
    /// here; that waits for the server's response.
    pub fn send_client_hello(&mut self, output: &mut Vec<u8>) -> Result<(), Error> {
        if self.mode != Mode::Client {
            return Err(Error::UnexpectedMessage(
                "send_client_hello on a server session".to_string(),
            ));
        }

        let max = self.config.effective_max().ok_or(Error::NoOverlappingVersion)?;
        let legacy_version = max.min(LEGACY_VERSION_CEILING);

        let hello = ClientHello::new(
            legacy_version,
            self.random,
            self.session_id,
            CipherSuite::all(),
            array_vec![[CompressionMethod; 4] => CompressionMethod::Null],
        );

        // The extension only goes out when the effective set reaches beyond
        // what the legacy field can express.
        let mut extension_data = Vec::new();
        if max > LEGACY_VERSION_CEILING {
            let versions: Vec<ProtocolVersion> = self.config.effective_versions().collect();
            trace!("Offering versions {:?} via supported_versions", versions);
            let hello = hello.with_supported_versions(&versions, &mut extension_data);
            hello.serialize(output);
        } else {
            hello.serialize(output);
        }

        debug!("Sent ClientHello with legacy version {}", legacy_version);
        Ok(())
    }

    /// Server: parse a received ClientHello, negotiate, and record the
    /// version triple.
    pub fn handle_client_hello(&mut self, input: &[u8]) -> Result<&NegotiatedVersions, Error> {
        if self.mode != Mode::Server {
            return Err(Error::UnexpectedMessage(
                "handle_client_hello on a client session".to_string(),
            ));
        }

        let (rest, hello) = ClientHello::parse(input)
            .map_err(|e| Error::MalformedMessage(format!("client hello: {}", e)))?;
        if !rest.is_empty() {
            return Err(Error::MalformedMessage(
                "trailing bytes after client hello".to_string(),
            ));
        }

        let versions = negotiate(&hello, &self.config)?;

        // Cipher selection is out of scope here; we keep the client's first
        // suite we recognize so the reply can echo something sensible.
        self.selected_cipher_suite = hello
            .cipher_suites
            .iter()
            .copied()
            .find(|suite| CipherSuite::all().contains(suite));

        Ok(self.versions.insert(versions))
    }

    /// Server: write our ServerHello carrying the selected version.
    ///
    /// For a TLS 1.3 selection the legacy field stays at the ceiling and the
    /// true choice rides in the supported_versions extension.
    pub fn send_server_hello(&mut self, output: &mut Vec<u8>) -> Result<(), Error> {
        if self.mode != Mode::Server {
            return Err(Error::UnexpectedMessage(
                "send_server_hello on a client session".to_string(),
            ));
        }
        let versions = self.versions.as_ref().ok_or_else(|| {
            Error::UnexpectedMessage("send_server_hello before negotiation".to_string())
        })?;

        let actual = versions.actual_protocol_version;
        let cipher_suite = self
            .selected_cipher_suite
            .ok_or(Error::NoOverlappingVersion)?;

        let hello = ServerHello::new(
            actual.min(LEGACY_VERSION_CEILING),
            self.random,
            self.session_id,
            cipher_suite,
            CompressionMethod::Null,
        );

        let mut extension_data = Vec::new();
        if actual > LEGACY_VERSION_CEILING {
            let hello = hello.with_selected_version(actual, &mut extension_data);
            hello.serialize(output);
        } else {
            hello.serialize(output);
        }

        debug!("Sent ServerHello selecting {}", actual);
        Ok(())
    }

    /// Client: parse the server's response and accept its selected version.
    pub fn handle_server_hello(&mut self, input: &[u8]) -> Result<&NegotiatedVersions, Error> {
        if self.mode != Mode::Client {
            return Err(Error::UnexpectedMessage(
                "handle_server_hello on a server session".to_string(),
            ));
        }

        let (rest, hello) = ServerHello::parse(input)
            .map_err(|e| Error::MalformedMessage(format!("server hello: {}", e)))?;
        if !rest.is_empty() {
            return Err(Error::MalformedMessage(
                "trailing bytes after server hello".to_string(),
            ));
        }

        let chosen = self.selected_version(&hello)?;
        let versions = accept(chosen, &self.config)?;

        Ok(self.versions.insert(versions))
    }

    /// The version the server actually selected: the supported_versions
    /// extension when we negotiate TLS 1.3, else the legacy field.
    fn selected_version(&self, hello: &ServerHello) -> Result<ProtocolVersion, Error> {
        if self.config.tls13_enabled() {
            let sv_ext = hello
                .extensions
                .iter()
                .find(|e| e.extension_type == ExtensionType::SupportedVersions);

            if let Some(ext) = sv_ext {
                let (rest, sv) = SupportedVersionsServerHello::parse(ext.extension_data)
                    .map_err(|_| {
                        Error::MalformedMessage("bad supported_versions extension".to_string())
                    })?;
                if !rest.is_empty() {
                    return Err(Error::MalformedMessage(
                        "trailing bytes in supported_versions extension".to_string(),
                    ));
                }
                return Ok(sv.selected_version);
            }
        }

        Ok(hello.server_version)
    }
}
