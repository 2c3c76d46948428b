use crate::shared::core::blob_encoding;

/// An image chosen by the caller that has not been stored anywhere yet.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_base64(
        file_name: impl Into<String>,
        content_base64: &str,
    ) -> Result<Self, base64::DecodeError> {
        Ok(Self::new(file_name, blob_encoding::decode(content_base64)?))
    }
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
