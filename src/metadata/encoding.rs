/// Repair for keywords that were stored as UTF-8 but come back from
/// ExifTool decoded one byte per character through Windows-1251.

use encoding_rs::WINDOWS_1251;

/// Character ExifTool prints in place of a byte it could not render.
/// Its presence means the structured value already lost information.
pub const CORRUPTION_MARKER: char = '?';

/// Returns true if `text` carries the corruption marker
pub fn has_marker(text: &str) -> bool {
    text.contains(CORRUPTION_MARKER)
}

/// Undo a UTF-8 -> Windows-1251 mis-decode.
///
/// The text is encoded back into Windows-1251 bytes and those bytes are read
/// as UTF-8. When either step fails (a character outside the codepage, or
/// bytes that are not UTF-8) the text was not mojibake and is returned as is.
pub fn repair(text: &str) -> String {
    let (bytes, _, unmappable) = WINDOWS_1251.encode(text);
    if unmappable {
        return text.to_owned();
    }

    match std::str::from_utf8(&bytes) {
        Ok(fixed) => fixed.to_owned(),
        Err(_) => text.to_owned(),
    }
}
