use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::sniff::{FileFormat, sniff};
use crate::domain::ContentHash;
use crate::error::RetrievalError;

/// Decrypted plaintext is base64 of the original upload. Line breaks some
/// wallets insert are tolerated.
pub fn decode_plaintext(plaintext: &str) -> Result<Vec<u8>, RetrievalError> {
    let compact: String = plaintext.split_ascii_whitespace().collect();
    Ok(STANDARD.decode(compact)?)
}

/// A decoded, typed contribution ready to be saved.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub content_hash: ContentHash,
    pub format: FileFormat,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Sniffs `bytes`; an unknown format is an error, never a default type.
    pub fn identify(content_hash: ContentHash, bytes: Vec<u8>) -> Result<Self, RetrievalError> {
        let format = sniff(&bytes).ok_or(RetrievalError::FormatUnrecognized)?;
        Ok(Self {
            content_hash,
            format,
            bytes,
        })
    }

    /// `<hash>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.content_hash, self.format.extension)
    }

    /// `data:{mime};base64,{payload}`
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime,
            STANDARD.encode(&self.bytes)
        )
    }

    pub fn save_action(&self) -> SaveAction {
        SaveAction {
            file_name: self.file_name(),
            data_uri: self.data_uri(),
        }
    }
}

/// What the `Saving` stage hands to a save target: a file name and a
/// `data:` URI carrying the typed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveAction {
    pub file_name: String,
    pub data_uri: String,
}

impl SaveAction {
    fn parts(&self) -> Result<(&str, &str), RetrievalError> {
        self.data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .ok_or_else(|| {
                RetrievalError::Save(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "save action is not a base64 data URI",
                ))
            })
    }

    pub fn mime(&self) -> Result<&str, RetrievalError> {
        self.parts().map(|(mime, _)| mime)
    }

    /// Bytes carried by the URI.
    pub fn payload(&self) -> Result<Vec<u8>, RetrievalError> {
        let (_, data) = self.parts()?;
        Ok(STANDARD.decode(data)?)
    }
}
