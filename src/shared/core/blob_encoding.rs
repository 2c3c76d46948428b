// Transport encoding for binary payloads.
//
// Purpose
// - Turn arbitrary bytes into text that can be embedded in a JSON request body, and back.
//
// Responsibilities
// - Standard base64 with padding, the encoding the remote Contents API expects.
// - Decoding tolerates the line breaks the remote inserts every 60 characters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if text.contains(char::is_whitespace) {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        return STANDARD.decode(compact);
    }
    STANDARD.decode(text)
}
