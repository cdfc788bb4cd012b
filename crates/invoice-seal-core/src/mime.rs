//! Content-based media type detection.
//!
//! Looks only at the first [`SNIFF_LEN`] bytes and never at the file name.
//! The signature table follows the web content-sniffing rules the authority
//! applies, so a file is labelled the same on both sides.

/// Number of leading bytes considered.
pub const SNIFF_LEN: usize = 512;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const IMAGE_PNG: &str = "image/png";

/// Leading-byte signatures, checked in order.
const PREFIXES: &[(&[u8], &str)] = &[
    (b"<?xml", "text/xml; charset=utf-8"),
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_PLAIN_UTF8),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"BM", "image/bmp"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"\x89PNG\x0D\x0A\x1A\x0A", IMAGE_PNG),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
    (b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    (b"\x00asm", "application/wasm"),
];

/// HTML openers, matched case-insensitively after leading whitespace and
/// followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Detect the media type of a payload from its content.
pub fn detect_media_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];

    if is_html(data) {
        return "text/html; charset=utf-8";
    }

    if let Some((_, mime)) = PREFIXES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return *mime;
    }

    if data.len() >= 14 && &data[..4] == b"RIFF" && &data[8..14] == b"WEBPVP" {
        return "image/webp";
    }

    if data.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN_UTF8
    }
}

fn is_html(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());
    let data = &data[start..];

    HTML_TAGS.iter().any(|tag| {
        data.len() > tag.len()
            && data[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(data[tag.len()], b' ' | b'>')
    })
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_detected_from_content() {
        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        png.extend_from_slice(&[0u8; 32]);
        assert_eq!(detect_media_type(&png), IMAGE_PNG);
    }

    #[test]
    fn test_text_and_json_are_plain_text() {
        assert_eq!(detect_media_type(b"hello world\n"), TEXT_PLAIN_UTF8);
        assert_eq!(detect_media_type(br#"{"month":1}"#), TEXT_PLAIN_UTF8);
        assert_eq!(detect_media_type(b""), TEXT_PLAIN_UTF8);
    }

    #[test]
    fn test_binary_fallback() {
        assert_eq!(detect_media_type(&[0x01, 0x02, 0x03]), OCTET_STREAM);
    }

    #[test]
    fn test_known_signatures() {
        assert_eq!(detect_media_type(b"%PDF-1.7 ..."), "application/pdf");
        assert_eq!(detect_media_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(detect_media_type(b"\xFF\xD8\xFF\xE0"), "image/jpeg");
        assert_eq!(detect_media_type(b"PK\x03\x04rest"), "application/zip");
        assert_eq!(detect_media_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_html_needs_terminator() {
        assert_eq!(
            detect_media_type(b"  <html><body></body></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            detect_media_type(b"<!doctype html>"),
            "text/html; charset=utf-8"
        );
        // "<a" followed by a letter is not an anchor tag.
        assert_eq!(detect_media_type(b"<abc"), TEXT_PLAIN_UTF8);
    }

    #[test]
    fn test_binary_beyond_sniff_window_ignored() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_media_type(&data), TEXT_PLAIN_UTF8);
    }
}
