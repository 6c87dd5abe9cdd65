//! Binary setup representation
//!
//! A configuration is stored as a format version byte followed by the
//! postcard-serialized [`DisplayConfiguration`].

use crate::config::DisplayConfiguration;

/// Current binary format version
pub const FORMAT_VERSION: u8 = 1;

/// Upper bound for an encoded configuration, version byte included
pub const MAX_ENCODED_SIZE: usize = 64;

/// Binary codec errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Output buffer cannot hold the encoded configuration
    BufferTooSmall,
    /// Payload is not a valid configuration
    Deserialize,
    /// Stored with a different format version
    VersionMismatch,
}

/// Encode a configuration into `buf`
///
/// Returns the used part of the buffer.
pub fn encode<'a>(
    config: &DisplayConfiguration,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], CodecError> {
    let (version, payload) = buf.split_first_mut().ok_or(CodecError::BufferTooSmall)?;
    *version = FORMAT_VERSION;

    let len = postcard::to_slice(config, payload)
        .map_err(|_| CodecError::BufferTooSmall)?
        .len();

    Ok(&mut buf[..1 + len])
}

/// Decode a configuration written by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<DisplayConfiguration, CodecError> {
    let (&version, payload) = bytes.split_first().ok_or(CodecError::Deserialize)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::VersionMismatch);
    }

    postcard::from_bytes(payload).map_err(|_| CodecError::Deserialize)
}
