use super::extension::serialize_extension_block;
use super::{parse_extension_block, CipherSuite, CompressionMethod, ProtocolVersion};
use super::{Extension, ExtensionType, Random, SessionId};
use super::SupportedVersionsClientHello;
use nom::error::{Error, ErrorKind};
use nom::Err;
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u8},
    IResult,
};
use tinyvec::ArrayVec;

use crate::util::many1;

#[derive(Debug, PartialEq, Eq)]
pub struct ClientHello<'a> {
    pub legacy_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suites: ArrayVec<[CipherSuite; 32]>,
    pub compression_methods: ArrayVec<[CompressionMethod; 4]>,
    pub extensions: ArrayVec<[Extension<'a>; 16]>,
}

impl<'a> ClientHello<'a> {
    pub fn new(
        legacy_version: ProtocolVersion,
        random: Random,
        session_id: SessionId,
        cipher_suites: ArrayVec<[CipherSuite; 32]>,
        compression_methods: ArrayVec<[CompressionMethod; 4]>,
    ) -> Self {
        ClientHello {
            legacy_version,
            random,
            session_id,
            cipher_suites,
            compression_methods,
            extensions: ArrayVec::new(),
        }
    }

    /// Add a supported_versions extension listing `versions` in the given
    /// (descending preference) order.
    ///
    /// The payload is written into `extension_data` and the extension
    /// borrows from it.
    pub fn with_supported_versions(
        mut self,
        versions: &[ProtocolVersion],
        extension_data: &'a mut Vec<u8>,
    ) -> Self {
        extension_data.clear();

        let sv = SupportedVersionsClientHello::new(versions);
        sv.serialize(extension_data);

        self.extensions.push(Extension::new(
            ExtensionType::SupportedVersions,
            &extension_data[..],
        ));

        self
    }

    pub fn parse(input: &'a [u8]) -> IResult<&'a [u8], ClientHello<'a>> {
        let (input, legacy_version) = ProtocolVersion::parse(input)?;
        let (input, random) = Random::parse(input)?;
        let (input, session_id) = SessionId::parse(input)?;
        let (input, cipher_suites_len) = be_u16(input)?;
        let (input, input_cipher) = take(cipher_suites_len)(input)?;
        let (rest, cipher_suites) = many1(CipherSuite::parse)(input_cipher)?;
        if !rest.is_empty() {
            return Err(Err::Failure(Error::new(rest, ErrorKind::LengthValue)));
        }
        let (input, compression_methods_len) = be_u8(input)?;
        let (input, input_compression) = take(compression_methods_len)(input)?;
        let (rest, compression_methods) = many1(CompressionMethod::parse)(input_compression)?;
        if !rest.is_empty() {
            return Err(Err::Failure(Error::new(rest, ErrorKind::LengthValue)));
        }

        let (input, extensions) = parse_extension_block(input)?;

        Ok((
            input,
            ClientHello {
                legacy_version,
                random,
                session_id,
                cipher_suites,
                compression_methods,
                extensions,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        self.legacy_version.serialize(output);
        self.random.serialize(output);
        self.session_id.serialize(output);
        output.extend_from_slice(&(self.cipher_suites.len() as u16 * 2).to_be_bytes());
        for suite in &self.cipher_suites {
            output.extend_from_slice(&suite.as_u16().to_be_bytes());
        }
        output.push(self.compression_methods.len() as u8);
        for method in &self.compression_methods {
            output.push(method.as_u8());
        }

        serialize_extension_block(&self.extensions, output);
    }
}
