use nom::error::{Error, ErrorKind};
use nom::Err;
use nom::{bytes::complete::take, number::complete::be_u16, IResult};
use tinyvec::ArrayVec;

#[derive(Debug, PartialEq, Eq)]
pub struct Extension<'a> {
    pub extension_type: ExtensionType,
    pub extension_data: &'a [u8],
}

impl Default for Extension<'_> {
    fn default() -> Self {
        Extension {
            extension_type: ExtensionType::Unknown(0),
            extension_data: &[],
        }
    }
}

impl<'a> Extension<'a> {
    pub fn new(extension_type: ExtensionType, extension_data: &'a [u8]) -> Self {
        Extension {
            extension_type,
            extension_data,
        }
    }

    pub fn parse(input: &'a [u8]) -> IResult<&'a [u8], Extension<'a>> {
        let (input, extension_type) = ExtensionType::parse(input)?;
        let (input, extension_length) = be_u16(input)?;
        let (input, extension_data) = take(extension_length)(input)?;

        Ok((
            input,
            Extension {
                extension_type,
                extension_data,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.extension_type.as_u16().to_be_bytes());
        output.extend_from_slice(&(self.extension_data.len() as u16).to_be_bytes());
        output.extend_from_slice(self.extension_data);
    }
}

/// Parse a full extension block: u16 total length followed by that many
/// bytes of individual extensions. An empty input means no block at all
/// (legal for old-style hellos).
pub fn parse_extension_block(input: &[u8]) -> IResult<&[u8], ArrayVec<[Extension<'_>; 16]>> {
    let mut extensions = ArrayVec::new();

    if input.is_empty() {
        return Ok((input, extensions));
    }

    let (remaining, extensions_len) = be_u16(input)?;
    if extensions_len == 0 {
        return Ok((remaining, extensions));
    }

    let (remaining, extensions_data) = take(extensions_len)(remaining)?;

    let mut rest = extensions_data;
    while !rest.is_empty() {
        if extensions.len() == extensions.capacity() {
            return Err(Err::Failure(Error::new(rest, ErrorKind::TooLarge)));
        }
        let (next, extension) = Extension::parse(rest)?;
        extensions.push(extension);
        rest = next;
    }

    Ok((remaining, extensions))
}

pub(crate) fn serialize_extension_block(extensions: &[Extension<'_>], output: &mut Vec<u8>) {
    if extensions.is_empty() {
        return;
    }

    let mut extensions_len = 0;
    for ext in extensions {
        // Extension type (2) + extension length (2) + extension data
        extensions_len += 4 + ext.extension_data.len();
    }

    output.extend_from_slice(&(extensions_len as u16).to_be_bytes());
    for ext in extensions {
        ext.serialize(output);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    ServerName,
    SupportedGroups,
    EcPointFormats,
    SignatureAlgorithms,
    EncryptThenMac,
    ExtendedMasterSecret,
    SessionTicket,
    SupportedVersions,
    PskKeyExchangeModes,
    KeyShare,
    RenegotiationInfo,
    Unknown(u16),
}

impl Default for ExtensionType {
    fn default() -> Self {
        Self::Unknown(0)
    }
}

impl ExtensionType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => ExtensionType::ServerName,
            0x000A => ExtensionType::SupportedGroups,
            0x000B => ExtensionType::EcPointFormats,
            0x000D => ExtensionType::SignatureAlgorithms,
            0x0016 => ExtensionType::EncryptThenMac,
            0x0017 => ExtensionType::ExtendedMasterSecret,
            0x0023 => ExtensionType::SessionTicket,
            0x002B => ExtensionType::SupportedVersions,
            0x002D => ExtensionType::PskKeyExchangeModes,
            0x0033 => ExtensionType::KeyShare,
            0xFF01 => ExtensionType::RenegotiationInfo,
            _ => ExtensionType::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            ExtensionType::ServerName => 0x0000,
            ExtensionType::SupportedGroups => 0x000A,
            ExtensionType::EcPointFormats => 0x000B,
            ExtensionType::SignatureAlgorithms => 0x000D,
            ExtensionType::EncryptThenMac => 0x0016,
            ExtensionType::ExtendedMasterSecret => 0x0017,
            ExtensionType::SessionTicket => 0x0023,
            ExtensionType::SupportedVersions => 0x002B,
            ExtensionType::PskKeyExchangeModes => 0x002D,
            ExtensionType::KeyShare => 0x0033,
            ExtensionType::RenegotiationInfo => 0xFF01,
            ExtensionType::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ExtensionType> {
        let (input, value) = be_u16(input)?;
        Ok((input, ExtensionType::from_u16(value)))
    }
}
