//! Content-type classification for served files.
//!
//! The same rules decide the `Content-Type`, whether a `Range` request is
//! honored, and whether the browser should preview or download the file.

use std::path::Path;

use mime_guess::mime::{self, Mime};

use crate::domain::encoding::percent_encode;

/// Which media types receive partial content for a `Range` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Plain static files: audio and video.
    Streaming,
    /// The download endpoint: audio, video and PDF.
    Download,
}

impl RangePolicy {
    pub fn allows(self, media: &Mime) -> bool {
        let streamable = media.type_() == mime::AUDIO || media.type_() == mime::VIDEO;
        match self {
            Self::Streaming => streamable,
            Self::Download => streamable || is_pdf(media),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

pub fn classify(path: &Path) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// `Content-Type` header value, with a UTF-8 charset for textual types.
pub fn content_type(media: &Mime) -> String {
    if is_textual(media) && media.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", media.essence_str())
    } else {
        media.essence_str().to_string()
    }
}

/// Previewable media is shown inline, everything else is downloaded.
pub fn disposition(media: &Mime) -> Disposition {
    let previewable = media.type_() == mime::AUDIO
        || media.type_() == mime::VIDEO
        || media.type_() == mime::IMAGE
        || media.type_() == mime::TEXT
        || is_pdf(media)
        || is_structured_text(media);

    if previewable {
        Disposition::Inline
    } else {
        Disposition::Attachment
    }
}

/// `Content-Disposition` header value for `filename`.
///
/// Non-ASCII names get an RFC 5987 `filename*` parameter next to an ASCII
/// fallback.
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };

    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("{kind}; filename=\"{fallback}\"")
    } else {
        format!(
            "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
            percent_encode(filename)
        )
    }
}

fn is_pdf(media: &Mime) -> bool {
    media.type_() == mime::APPLICATION && media.subtype() == mime::PDF
}

fn is_structured_text(media: &Mime) -> bool {
    media.type_() == mime::APPLICATION
        && (media.subtype() == mime::JSON
            || media.subtype() == mime::XML
            || media.suffix() == Some(mime::JSON)
            || media.suffix() == Some(mime::XML))
}

fn is_textual(media: &Mime) -> bool {
    media.type_() == mime::TEXT
        || is_structured_text(media)
        || (media.type_() == mime::APPLICATION && media.subtype() == mime::JAVASCRIPT)
}
