use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// How much of a file is inspected before deciding it is text.
pub const SNIFF_BYTES: u64 = 1024;

/// Whether the file at `path` can be embedded verbatim.
///
/// Only the first [`SNIFF_BYTES`] are read and checked for valid UTF-8;
/// extensions and magic numbers are not consulted. I/O errors (permission
/// denied included) are returned to the caller rather than treated as binary.
pub fn is_text(path: &Path) -> io::Result<bool> {
    let mut prefix = Vec::with_capacity(SNIFF_BYTES as usize);
    File::open(path)?.take(SNIFF_BYTES).read_to_end(&mut prefix)?;
    Ok(is_text_prefix(&prefix))
}

/// UTF-8 check on a prefix. A multi-byte sequence cut off by the end of the
/// prefix still counts as text.
pub fn is_text_prefix(prefix: &[u8]) -> bool {
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}
