//! Decoder for the `application/vnd.amazon.eventstream` binary framing
//! Bedrock uses on `/invoke-with-response-stream` responses.
//!
//! Frame layout: 4-byte big-endian total length, 4-byte headers length,
//! 4-byte prelude CRC, headers, payload, 4-byte message CRC. Headers are
//! `name-len, name, value-type, value`; only string-valued headers matter
//! here (`:message-type`, `:event-type`, `:exception-type`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bgate_common::ApiError;
use bytes::{Buf, Bytes, BytesMut};

const PRELUDE_LEN: usize = 12;
const CRC_LEN: usize = 4;
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub headers: Vec<(String, String)>,
    pub payload: Bytes,
}

impl Frame {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Incremental frame decoder over arbitrarily split network reads.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Next complete frame, or `None` until more bytes arrive.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, ApiError> {
        if self.buf.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = u32::from_be_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]])
            as usize;
        let headers_len =
            u32::from_be_bytes([self.buf[4], self.buf[5], self.buf[6], self.buf[7]]) as usize;

        if total_len > MAX_FRAME_LEN
            || total_len < PRELUDE_LEN + CRC_LEN
            || headers_len > total_len - PRELUDE_LEN - CRC_LEN
        {
            return Err(malformed("inconsistent frame lengths"));
        }
        if self.buf.len() < total_len {
            return Ok(None);
        }

        let mut frame = self.buf.split_to(total_len);
        frame.advance(PRELUDE_LEN);
        let headers = parse_headers(&frame[..headers_len])?;
        frame.advance(headers_len);
        let payload = frame.split_to(frame.len() - CRC_LEN).freeze();

        Ok(Some(Frame { headers, payload }))
    }
}

fn parse_headers(mut data: &[u8]) -> Result<Vec<(String, String)>, ApiError> {
    let mut headers = Vec::new();
    while !data.is_empty() {
        let name_len = data[0] as usize;
        data = &data[1..];
        if data.len() < name_len + 1 {
            return Err(malformed("truncated header name"));
        }
        let name = String::from_utf8_lossy(&data[..name_len]).to_string();
        let value_type = data[name_len];
        data = &data[name_len + 1..];

        match value_type {
            // bool true / bool false carry no value bytes
            0 | 1 => {}
            2 => data = skip(data, 1)?,
            3 => data = skip(data, 2)?,
            4 => data = skip(data, 4)?,
            5 | 8 => data = skip(data, 8)?,
            // byte array and string are length-prefixed
            6 | 7 => {
                if data.len() < 2 {
                    return Err(malformed("truncated header value length"));
                }
                let value_len = u16::from_be_bytes([data[0], data[1]]) as usize;
                data = &data[2..];
                if data.len() < value_len {
                    return Err(malformed("truncated header value"));
                }
                if value_type == 7 {
                    let value = String::from_utf8_lossy(&data[..value_len]).to_string();
                    headers.push((name, value));
                }
                data = &data[value_len..];
            }
            9 => data = skip(data, 16)?,
            _ => return Err(malformed("unknown header value type")),
        }
    }
    Ok(headers)
}

fn skip(data: &[u8], len: usize) -> Result<&[u8], ApiError> {
    if data.len() < len {
        return Err(malformed("truncated header value"));
    }
    Ok(&data[len..])
}

fn malformed(detail: &str) -> ApiError {
    ApiError::upstream(
        format!("malformed event stream: {detail}"),
        "MalformedEventStream",
    )
}

/// Extract the native chunk payload from a decoded frame.
///
/// Event frames of type `chunk` wrap the model payload as base64 inside
/// `{"bytes": ...}`. Exception frames become errors carrying the
/// upstream exception type; other event types are skipped.
pub fn frame_to_chunk(frame: &Frame) -> Result<Option<Bytes>, ApiError> {
    match frame.header(":message-type") {
        Some("exception") | Some("error") => {
            let code = frame
                .header(":exception-type")
                .or_else(|| frame.header(":error-code"))
                .unwrap_or("UnknownException")
                .to_string();
            let message = serde_json::from_slice::<serde_json::Value>(&frame.payload)
                .ok()
                .and_then(|value| value["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| String::from_utf8_lossy(&frame.payload).to_string());
            Err(ApiError::upstream(message, code))
        }
        _ => {
            if frame.header(":event-type") != Some("chunk") {
                return Ok(None);
            }
            let envelope: serde_json::Value = serde_json::from_slice(&frame.payload)
                .map_err(|err| malformed(&format!("chunk payload is not JSON: {err}")))?;
            let encoded = envelope["bytes"]
                .as_str()
                .ok_or_else(|| malformed("chunk payload without bytes field"))?;
            let decoded = BASE64
                .decode(encoded)
                .map_err(|err| malformed(&format!("chunk payload base64: {err}")))?;
            Ok(Some(Bytes::from(decoded)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_header(name: &str, value: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out.push(7);
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value.as_bytes());
        out
    }

    fn build_frame(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
        let mut header_bytes = Vec::new();
        for (name, value) in headers {
            header_bytes.extend_from_slice(&string_header(name, value));
        }
        let total_len = PRELUDE_LEN + header_bytes.len() + payload.len() + CRC_LEN;

        let mut out = Vec::new();
        out.extend_from_slice(&(total_len as u32).to_be_bytes());
        out.extend_from_slice(&(header_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0; 4]); // prelude crc, unchecked
        out.extend_from_slice(&header_bytes);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0; 4]); // message crc, unchecked
        out
    }

    #[test]
    fn decodes_a_chunk_frame_across_split_reads() {
        let native = br#"{"generation":"hi"}"#;
        let payload = serde_json::json!({ "bytes": BASE64.encode(native) }).to_string();
        let frame = build_frame(
            &[(":message-type", "event"), (":event-type", "chunk")],
            payload.as_bytes(),
        );

        let mut decoder = FrameDecoder::new();
        let (first, second) = frame.split_at(7);
        decoder.feed(first);
        assert!(decoder.next_frame().expect("partial").is_none());
        decoder.feed(second);

        let frame = decoder.next_frame().expect("decode").expect("complete");
        assert_eq!(frame.header(":event-type"), Some("chunk"));
        let chunk = frame_to_chunk(&frame).expect("chunk").expect("payload");
        assert_eq!(&chunk[..], native);
        assert!(decoder.next_frame().expect("empty").is_none());
    }

    #[test]
    fn exception_frames_become_upstream_errors() {
        let frame = build_frame(
            &[
                (":message-type", "exception"),
                (":exception-type", "throttlingException"),
            ],
            br#"{"message":"Too many requests"}"#,
        );

        let mut decoder = FrameDecoder::new();
        decoder.feed(&frame);
        let frame = decoder.next_frame().expect("decode").expect("complete");
        let err = frame_to_chunk(&frame).unwrap_err();
        assert!(matches!(err, ApiError::Upstream { ref detail, .. }
            if detail.code == "throttlingException"));
        assert_eq!(err.public_message(), "Too many requests");
    }

    #[test]
    fn non_chunk_events_are_skipped() {
        let frame = build_frame(
            &[(":message-type", "event"), (":event-type", "initial-response")],
            b"{}",
        );
        let mut decoder = FrameDecoder::new();
        decoder.feed(&frame);
        let frame = decoder.next_frame().expect("decode").expect("complete");
        assert_eq!(frame_to_chunk(&frame).expect("skip"), None);
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(decoder.next_frame().is_err());
    }
}
