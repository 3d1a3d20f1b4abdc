//! SupportedVersions extension (RFC 8446 Section 4.2.1)
//!
//! From TLS 1.3, version negotiation happens via this extension rather than
//! the legacy version field. The client sends a list of candidate versions in
//! preference order, and the server responds with a single selected version.

use crate::message::ProtocolVersion;
use nom::bytes::complete::take;
use nom::error::{Error, ErrorKind};
use nom::number::complete::be_u8;
use nom::{Err, IResult};
use tinyvec::ArrayVec;

/// Maximum number of versions we track in the client's supported_versions list.
const MAX_VERSIONS: usize = 8;

/// SupportedVersions extension payload for ClientHello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedVersionsClientHello {
    pub versions: ArrayVec<[ProtocolVersion; MAX_VERSIONS]>,
}

impl SupportedVersionsClientHello {
    pub fn new(versions: &[ProtocolVersion]) -> Self {
        let mut list = ArrayVec::new();
        for version in versions {
            let _ = list.try_push(*version);
        }
        Self { versions: list }
    }

    /// Parse the extension payload from a ClientHello.
    ///
    /// The wire list must be non-empty, an even number of bytes, and fit in
    /// the declared length. Unrecognized version values (GREASE and friends)
    /// are dropped from the parsed list; they count for the non-empty check
    /// but can never be selected.
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, list_len) = be_u8(input)?;
        if list_len == 0 || list_len % 2 != 0 {
            return Err(Err::Failure(Error::new(input, ErrorKind::LengthValue)));
        }
        let (input, list_data) = take(list_len)(input)?;

        let mut versions = ArrayVec::new();
        let mut rest = list_data;
        while !rest.is_empty() {
            let (next, version) = ProtocolVersion::parse(rest)?;
            rest = next;
            if version.is_known() {
                let _ = versions.try_push(version);
            }
        }

        Ok((input, Self { versions }))
    }

    /// Serialize the extension payload for a ClientHello.
    pub fn serialize(&self, output: &mut Vec<u8>) {
        // Length byte: 2 bytes per version
        output.push((self.versions.len() * 2) as u8);
        for version in &self.versions {
            version.serialize(output);
        }
    }
}

/// SupportedVersions extension payload for ServerHello: the single version
/// selected by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedVersionsServerHello {
    pub selected_version: ProtocolVersion,
}

impl SupportedVersionsServerHello {
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, selected_version) = ProtocolVersion::parse(input)?;
        Ok((input, Self { selected_version }))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        self.selected_version.serialize(output);
    }
}
