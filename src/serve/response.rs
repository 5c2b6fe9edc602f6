//! HTTP response assembly and serialization.

use super::inject::maybe_inject_live_reload;
use crate::utils::mime::{self, types::HTML};
use crate::{debug, log};
use std::{fs, io, io::Write, path::Path};

/// Capacity of the serialized header block.
///
/// Bytes past this bound are dropped, leaving a truncated head on the
/// wire. Only reachable with pathologically long `Location` values.
pub const HEADER_BUFFER_SIZE: usize = 4 * 1024;

const NOT_FOUND_BODY: &str = "File not found";
const READ_FAILED_BODY: &str = "File could not be read";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    MovedPermanently,
    NotFound,
    InternalServerError,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "200 OK",
            Self::MovedPermanently => "301 Moved Permanently",
            Self::NotFound => "404 Not Found",
            Self::InternalServerError => "500 Internal Server Error",
        }
    }
}

/// A response owned by one connection.
///
/// Headers keep insertion order and are sent verbatim; duplicates are
/// allowed.
#[derive(Debug)]
pub struct Response {
    pub status: Status,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// New response with `Content-Type` as its first header.
    pub fn new(status: Status, content_type: &str, body: Vec<u8>) -> Self {
        let mut response = Self {
            status,
            headers: Vec::new(),
            body,
        };
        response.add_header("Content-Type", content_type);
        response
    }

    pub fn not_found() -> Self {
        Self::new(Status::NotFound, HTML, NOT_FOUND_BODY.into())
    }

    pub fn read_failed() -> Self {
        Self::new(Status::InternalServerError, HTML, READ_FAILED_BODY.into())
    }

    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(Status::MovedPermanently, HTML, Vec::new());
        response.add_header("Location", location);
        response
    }

    /// Serve a resolved file. HTML gets the live reload script.
    pub fn from_file(path: &Path) -> Self {
        let body = match fs::read(path) {
            Ok(body) => body,
            Err(e) => {
                log!("response"; "could not read {}: {}", path.display(), e);
                return Self::read_failed();
            }
        };

        let body = if is_html(path) {
            let (body, injected) = maybe_inject_live_reload(body);
            if !injected {
                log!("response"; "no <body> in {}, live reload not injected", path.display());
            }
            body
        } else {
            body
        };

        Self::new(Status::Ok, mime::from_path(path), body)
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    #[cfg(test)]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Append the headers every response carries, in wire order.
    pub fn finish(&mut self) {
        self.add_header("Access-Control-Allow-Origin", "*");
        self.add_header("Content-Length", self.body.len().to_string());
    }

    /// Status line, headers and the blank line, bounded by
    /// [`HEADER_BUFFER_SIZE`].
    pub fn serialize_head(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status.as_str());
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut head = head.into_bytes();
        if head.len() > HEADER_BUFFER_SIZE {
            debug!("response"; "header block of {} bytes truncated to {}", head.len(), HEADER_BUFFER_SIZE);
            head.truncate(HEADER_BUFFER_SIZE);
        }
        head
    }

    /// Write head and body. Returns the head for logging.
    pub fn write_to<W: Write>(&self, stream: &mut W) -> io::Result<Vec<u8>> {
        let head = self.serialize_head();
        stream.write_all(&head)?;
        stream.write_all(&self.body)?;
        stream.flush()?;
        Ok(head)
    }
}

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "html")
}
