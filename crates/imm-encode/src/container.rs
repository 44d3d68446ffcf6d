//! The `.imm` container: a fixed header, a JSON document payload, and a
//! SHA-256 trailer over the payload. All integers are little-endian.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "IMMX"
//!      4     2  container version
//!      6     1  sequence caps
//!      7     1  audio codec
//!      8     4  audio bitrate
//!     12     8  payload length N
//!     20     N  payload (JSON document)
//!   20+N    32  SHA-256 of payload
//! ```

use std::path::Path;

use imm_core::hash::hash_bytes;
use imm_core::{AudioCodec, AudioSettings, Document, ImmError, ImmResult};

pub const MAGIC: [u8; 4] = *b"IMMX";
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 20;
pub const DIGEST_LEN: usize = 32;

/// Decoded fixed-size header of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u16,
    pub caps: u8,
    pub audio: AudioSettings,
    pub payload_len: u64,
}

/// Serialize a document into container bytes.
pub fn encode(document: &Document, audio: AudioSettings) -> ImmResult<Vec<u8>> {
    let payload = serde_json::to_vec(document)?;
    let digest = hash_bytes(&payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + DIGEST_LEN);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.push(document.sequence.caps);
    out.push(audio.codec.code());
    out.extend_from_slice(&audio.bitrate.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(digest.as_bytes());
    Ok(out)
}

fn le_array<const N: usize>(bytes: &[u8], at: usize) -> ImmResult<[u8; N]> {
    bytes
        .get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ImmError::Container(format!("truncated at offset {}", at)))
}

/// Parse and check the fixed header.
pub fn decode_header(bytes: &[u8]) -> ImmResult<ContainerHeader> {
    let magic: [u8; 4] = le_array(bytes, 0)?;
    if magic != MAGIC {
        return Err(ImmError::Container("bad magic".into()));
    }
    let version = u16::from_le_bytes(le_array(bytes, 4)?);
    if version != VERSION {
        return Err(ImmError::Container(format!(
            "unsupported container version {}",
            version
        )));
    }
    let [caps, codec] = le_array::<2>(bytes, 6)?;
    let codec = AudioCodec::from_code(codec)
        .ok_or_else(|| ImmError::Container(format!("unknown audio codec {}", codec)))?;
    let bitrate = u32::from_le_bytes(le_array(bytes, 8)?);
    let payload_len = u64::from_le_bytes(le_array(bytes, 12)?);
    Ok(ContainerHeader {
        version,
        caps,
        audio: AudioSettings::new(bitrate, codec),
        payload_len,
    })
}

/// Parse container bytes, verifying length and digest.
pub fn decode(bytes: &[u8]) -> ImmResult<(ContainerHeader, Document)> {
    let header = decode_header(bytes)?;
    let len = usize::try_from(header.payload_len)
        .map_err(|_| ImmError::Container("payload length overflows".into()))?;
    let expected = HEADER_LEN
        .checked_add(len)
        .and_then(|n| n.checked_add(DIGEST_LEN))
        .ok_or_else(|| ImmError::Container("payload length overflows".into()))?;
    if bytes.len() != expected {
        return Err(ImmError::Container(format!(
            "expected {} bytes, found {}",
            expected,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_LEN..HEADER_LEN + len];
    let digest = &bytes[HEADER_LEN + len..];
    if hash_bytes(payload).as_bytes()[..] != digest[..] {
        return Err(ImmError::Container("payload digest mismatch".into()));
    }

    let document: Document = serde_json::from_slice(payload)?;
    Ok((header, document))
}

/// Reads `.imm` containers from disk.
pub struct ImmFileReader;

impl ImmFileReader {
    pub fn read(path: &Path) -> ImmResult<(ContainerHeader, Document)> {
        let bytes = std::fs::read(path)?;
        decode(&bytes)
    }
}
