//! Minimal request-line reading.
//!
//! Only the path of the first line is consumed. Method, version and
//! headers are never looked at.

use std::io::{self, Read};

/// Size of the single read performed per connection.
pub const REQUEST_BUFFER_SIZE: usize = 8 * 1024;

/// Raw bytes of one request, from a single bounded read.
pub struct RawRequest {
    pub bytes: Vec<u8>,
}

impl RawRequest {
    /// Read one chunk from the stream. No loop: whatever arrives in the
    /// first read is the request.
    pub fn read_from<R: Read>(stream: &mut R) -> io::Result<Self> {
        let mut bytes = vec![0u8; REQUEST_BUFFER_SIZE];
        let n = stream.read(&mut bytes)?;
        bytes.truncate(n);
        Ok(Self { bytes })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The read filled the buffer, so the request may be cut short.
    pub fn is_truncated(&self) -> bool {
        self.bytes.len() >= REQUEST_BUFFER_SIZE
    }

    pub fn path(&self) -> String {
        parse_request_path(&self.bytes)
    }
}

/// Extract the request path from the head line.
///
/// Skip the method, skip whitespace, skip leading `/`, then capture up to
/// the next whitespace. Query strings and percent-escapes are kept raw.
pub fn parse_request_path(request: &[u8]) -> String {
    let rest = skip_while(request, |b| !is_space(b));
    let rest = skip_while(rest, is_space);
    let rest = skip_while(rest, |b| b == b'/');

    let end = rest.iter().position(|&b| is_space(b)).unwrap_or(rest.len());
    String::from_utf8_lossy(&rest[..end]).into_owned()
}

fn skip_while(bytes: &[u8], pred: impl Fn(u8) -> bool) -> &[u8] {
    let start = bytes.iter().position(|&b| !pred(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

/// C-locale whitespace, vertical tab included.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}
