use super::extension::serialize_extension_block;
use super::SupportedVersionsServerHello;
use super::{parse_extension_block, CipherSuite, CompressionMethod, ProtocolVersion};
use super::{Extension, ExtensionType, Random, SessionId};
use nom::IResult;
use tinyvec::ArrayVec;

#[derive(Debug, PartialEq, Eq)]
pub struct ServerHello<'a> {
    pub server_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suite: CipherSuite,
    pub compression_method: CompressionMethod,
    pub extensions: ArrayVec<[Extension<'a>; 16]>,
}

impl<'a> ServerHello<'a> {
    pub fn new(
        server_version: ProtocolVersion,
        random: Random,
        session_id: SessionId,
        cipher_suite: CipherSuite,
        compression_method: CompressionMethod,
    ) -> Self {
        ServerHello {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
            extensions: ArrayVec::new(),
        }
    }

    /// Add a supported_versions extension carrying the single selected
    /// version. Used when the selection is beyond what the legacy field
    /// expresses.
    pub fn with_selected_version(
        mut self,
        selected_version: ProtocolVersion,
        extension_data: &'a mut Vec<u8>,
    ) -> Self {
        extension_data.clear();

        let sv = SupportedVersionsServerHello { selected_version };
        sv.serialize(extension_data);

        self.extensions.push(Extension::new(
            ExtensionType::SupportedVersions,
            &extension_data[..],
        ));

        self
    }

    pub fn parse(input: &'a [u8]) -> IResult<&'a [u8], ServerHello<'a>> {
        let (input, server_version) = ProtocolVersion::parse(input)?;
        let (input, random) = Random::parse(input)?;
        let (input, session_id) = SessionId::parse(input)?;
        let (input, cipher_suite) = CipherSuite::parse(input)?;
        let (input, compression_method) = CompressionMethod::parse(input)?;

        let (input, extensions) = parse_extension_block(input)?;

        Ok((
            input,
            ServerHello {
                server_version,
                random,
                session_id,
                cipher_suite,
                compression_method,
                extensions,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        self.server_version.serialize(output);
        self.random.serialize(output);
        self.session_id.serialize(output);
        output.extend_from_slice(&self.cipher_suite.as_u16().to_be_bytes());
        output.push(self.compression_method.as_u8());

        serialize_extension_block(&self.extensions, output);
    }
}
