//! Wire format: length-prefixed bincode v2 frames.
//!
//! Each message on the wire is:
//!   [4 bytes big-endian length][bincode v2 payload]

use bincode::{Decode, Encode};

use crate::error::ProtocolError;

/// Maximum message size (16 MiB). Prevents allocation bombs while leaving
/// room for large HTML fragments.
pub const MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

/// Length of the frame header.
pub const HEADER_LEN: usize = 4;

/// Encode a message to a length-prefixed byte vector.
pub fn encode_message<T: Encode>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(msg)?;
    let len = check_len(payload.len())?;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Encode a message body without the length prefix.
pub(crate) fn encode_payload<T: Encode>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(msg, config).map_err(|e| ProtocolError::Serialization(e.to_string()))
}

/// Validate a payload length against [`MAX_MESSAGE_SIZE`].
pub(crate) fn check_len(len: usize) -> Result<u32, ProtocolError> {
    u32::try_from(len)
        .ok()
        .filter(|&l| l <= MAX_MESSAGE_SIZE)
        .ok_or(ProtocolError::TooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        })
}

/// Decode a message from a bincode v2 payload (without the length prefix).
pub fn decode_message<T: Decode<()>>(payload: &[u8]) -> Result<T, ProtocolError> {
    let config = bincode::config::standard();
    let (msg, _) = bincode::decode_from_slice(payload, config)
        .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rich_clipboard_types::{ClipboardSnapshot, MethodCall, MethodResponse, Mime, Value};

    #[test]
    fn set_data_frame_roundtrip() {
        let snapshot = ClipboardSnapshot::text("hello").with(Mime::TextHtml, "<b>hello</b>");
        let call = MethodCall::set_data(snapshot.clone());

        let bytes = encode_message(&call).unwrap();
        // First 4 bytes are length
        let len = u32::from_be_bytes(bytes[..HEADER_LEN].try_into().unwrap());
        assert_eq!(len as usize, bytes.len() - HEADER_LEN);

        let decoded: MethodCall = decode_message(&bytes[HEADER_LEN..]).unwrap();
        assert_eq!(decoded.method, "setData");
        assert_eq!(decoded.arguments.to_snapshot(), Some(snapshot));
    }

    #[test]
    fn response_with_nulls_survives_the_wire() {
        let response = MethodResponse::success(ClipboardSnapshot::text("x").to_nullable());
        let bytes = encode_message(&response).unwrap();
        let decoded: MethodResponse = decode_message(&bytes[HEADER_LEN..]).unwrap();
        let map = decoded.value().and_then(Value::as_map).unwrap();
        assert_eq!(map.get("text/html"), Some(&Value::Null));
        assert_eq!(map.get("text/plain"), Some(&Value::from("x")));
    }

    #[test]
    fn oversized_lengths_are_rejected() {
        assert!(check_len(MAX_MESSAGE_SIZE as usize).is_ok());
        assert!(matches!(
            check_len(MAX_MESSAGE_SIZE as usize + 1),
            Err(ProtocolError::TooLarge { .. })
        ));
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        let result: Result<MethodCall, _> = decode_message(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(ProtocolError::Deserialization(_))));
    }
}
