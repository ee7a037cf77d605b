//! PDF header sniffing.
//!
//! lopdf reports a missing header as a generic parse error; checking the
//! magic bytes first lets the checker tell "this is not a PDF at all" apart
//! from "this PDF is broken".

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Read the first bytes of a file and return the declared PDF version.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = [0u8; 16];
    let mut file = File::open(path)?;
    let read = file.read(&mut header)?;
    sniff_bytes(&header[..read])
}

/// Return the PDF version declared by a `%PDF-x.y` header.
pub fn sniff_bytes(data: &[u8]) -> Result<String> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version = rest.get(..VERSION_LEN).ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version).to_string();

    match version.as_bytes() {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(version),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}
