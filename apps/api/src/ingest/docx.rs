use std::io::{Cursor, Read};

use zip::read::ZipArchive;

use crate::ingest::IngestError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Plain text of a Word document: the `<w:t>` runs of the main part, one line per paragraph.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IngestError::Unreadable(format!("not a zip archive: {e}")))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| IngestError::Unreadable(format!("missing {DOCUMENT_PART}: {e}")))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| IngestError::Unreadable(format!("unreadable {DOCUMENT_PART}: {e}")))?;
    Ok(document_text(&xml))
}

/// Position of the `>` closing a tag, skipping any inside quoted attribute values.
fn tag_end(after: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in after.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn document_text(xml: &str) -> String {
    let mut out = String::new();
    let mut in_run_text = false;
    // `mc:Fallback` repeats the content of the preceding `mc:Choice`.
    let mut fallback_depth = 0usize;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_run_text && fallback_depth == 0 {
            out.push_str(&unescape(&rest[..open]));
        }
        let after = &rest[open + 1..];
        if let Some(comment) = after.strip_prefix("!--") {
            let Some(end) = comment.find("-->") else {
                break;
            };
            rest = &comment[end + 3..];
            continue;
        }
        let Some(close) = tag_end(after) else {
            break;
        };
        let tag = &after[..close];
        rest = &after[close + 1..];

        let self_closing = tag.ends_with('/');
        let (end_tag, body) = match tag.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, tag),
        };
        let name = body
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        match (name, end_tag) {
            ("mc:Fallback", false) if !self_closing => fallback_depth += 1,
            ("mc:Fallback", true) => fallback_depth = fallback_depth.saturating_sub(1),
            _ if fallback_depth > 0 => {}
            ("w:t", false) => in_run_text = !self_closing,
            ("w:t", true) => in_run_text = false,
            ("w:p", true) => out.push('\n'),
            ("w:p", false) if self_closing => out.push('\n'),
            ("w:tab", false) => out.push('\t'),
            ("w:br", false) | ("w:cr", false) => out.push('\n'),
            _ => {}
        }
    }

    out
}

/// Decodes the five predefined XML entities and numeric character references.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16).ok())
                    .unwrap_or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
