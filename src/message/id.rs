use nom::bytes::complete::take;
use nom::error::{Error, ErrorKind};
use nom::number::complete::be_u8;
use nom::{Err, IResult};
use rand::Rng;
use std::fmt;
use std::ops::Deref;

const MAX_SESSION_ID_LEN: usize = 32;

pub struct InvalidLength(usize);

impl fmt::Debug for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl std::error::Error for InvalidLength {}

impl fmt::Display for InvalidLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Incorrect SessionId length: {} should be <= {}",
            self.0, MAX_SESSION_ID_LEN
        )
    }
}

/// Legacy session id as carried in hello messages. Opaque to version
/// negotiation; 0 to 32 bytes on the wire.
#[derive(Clone, Copy)]
pub struct SessionId([u8; MAX_SESSION_ID_LEN], usize);

impl SessionId {
    pub fn try_new(data: &[u8]) -> Result<Self, InvalidLength> {
        if data.len() > MAX_SESSION_ID_LEN {
            return Err(InvalidLength(data.len()));
        }
        let mut array = [0; MAX_SESSION_ID_LEN];
        array[..data.len()].copy_from_slice(data);
        Ok(SessionId(array, data.len()))
    }

    pub fn empty() -> SessionId {
        SessionId([0; MAX_SESSION_ID_LEN], 0)
    }

    pub fn random() -> SessionId {
        let mut t = rand::thread_rng();
        let mut array = [0; MAX_SESSION_ID_LEN];
        for a in &mut array {
            *a = t.gen();
        }
        SessionId(array, MAX_SESSION_ID_LEN)
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, len) = be_u8(input)?;
        if len as usize > MAX_SESSION_ID_LEN {
            return Err(Err::Failure(Error::new(input, ErrorKind::LengthValue)));
        }
        let (input, data) = take(len as usize)(input)?;
        // unwrap() is ok because we check the size above.
        let instance = Self::try_new(data).unwrap();
        Ok((input, instance))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.push(self.1 as u8);
        output.extend_from_slice(self);
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({:02x?})", &self.0[..self.1])
    }
}

impl PartialEq for SessionId {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for SessionId {}

impl Deref for SessionId {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0[..self.1]
    }
}

impl<'a> TryFrom<&'a [u8]> for SessionId {
    type Error = InvalidLength;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let id = SessionId::try_new(&[0xAA, 0xBB]).unwrap();

        let mut serialized = Vec::new();
        id.serialize(&mut serialized);
        assert_eq!(serialized, &[0x02, 0xAA, 0xBB]);

        let (rest, parsed) = SessionId::parse(&serialized).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, id);
    }

    #[test]
    fn too_long() {
        assert!(SessionId::try_new(&[0; 33]).is_err());

        let mut wire = vec![0x21]; // 33, over the limit
        wire.extend_from_slice(&[0; 33]);
        assert!(SessionId::parse(&wire).is_err());
    }

    #[test]
    fn empty() {
        let id = SessionId::empty();
        let mut serialized = Vec::new();
        id.serialize(&mut serialized);
        assert_eq!(serialized, &[0x00]);
    }
}
