use serde::Serialize;
use std::path::Path;

/// A render-engine-consumable form of an asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderSource {
    /// Inline-encoded bytes tagged with a MIME type.
    Inline {
        /// MIME type of the payload.
        mime: String,
        /// Base64-encoded bytes (standard alphabet, padded).
        data: String,
    },
    /// Absolute resource locator reachable from the engine's execution
    /// context (`file://...` or a web path).
    Locator(String),
}

impl RenderSource {
    /// Inline-encode raw bytes under `mime`.
    pub fn inline(mime: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine as _;
        Self::Inline {
            mime: mime.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// The `src` string handed to the rendering engine: a `data:` URL for
    /// inline payloads, the locator itself otherwise.
    pub fn engine_src(&self) -> String {
        match self {
            Self::Inline { mime, data } => format!("data:{mime};base64,{data}"),
            Self::Locator(url) => url.clone(),
        }
    }
}

/// Lower-cased extension of a reference path, without the dot.
pub(crate) fn extension_of(reference: &str) -> String {
    Path::new(reference)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Image MIME type derived from a file extension.
///
/// `jpg` maps to the `jpeg` subtype; any other extension maps to its
/// literal name, lower-cased.
pub fn image_mime_for_ext(ext: &str) -> String {
    let ext = ext.to_ascii_lowercase();
    if ext == "jpg" {
        "image/jpeg".to_owned()
    } else {
        format!("image/{ext}")
    }
}

/// Audio MIME type derived from a file extension.
///
/// `wav` maps to `audio/wav`, `m4a` and `mp4` to `audio/mp4`, anything
/// else defaults to `audio/mpeg`.
pub fn audio_mime_for_ext(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "wav" => "audio/wav",
        "m4a" | "mp4" => "audio/mp4",
        _ => "audio/mpeg",
    }
}

/// Reduce a reference to its local path component.
///
/// A fully-qualified `http(s)` locator is stripped to its path (query and
/// fragment dropped) so a same-origin absolute URL and a bare path
/// resolve identically. Anything else passes through unchanged apart
/// from query/fragment trimming.
pub fn local_path_component(reference: &str) -> String {
    let rest = reference
        .strip_prefix("http://")
        .or_else(|| reference.strip_prefix("https://"));

    let path = match rest {
        Some(after_scheme) => match after_scheme.find('/') {
            Some(i) => &after_scheme[i..],
            None => "/",
        },
        None => reference,
    };

    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.to_owned()
}

/// Build a `file://` locator from a filesystem path, slash-normalized for
/// cross-platform correctness.
pub fn file_locator(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    format!("file://{normalized}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn inline_builds_data_url() {
        let src = RenderSource::inline("image/png", b"abc");
        assert_eq!(src.engine_src(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn locator_passes_through() {
        let src = RenderSource::Locator("file:///tmp/a.mp4".to_owned());
        assert_eq!(src.engine_src(), "file:///tmp/a.mp4");
    }

    #[test]
    fn jpg_maps_to_jpeg_subtype() {
        assert_eq!(image_mime_for_ext("jpg"), "image/jpeg");
        assert_eq!(image_mime_for_ext("JPG"), "image/jpeg");
        assert_eq!(image_mime_for_ext("png"), "image/png");
        assert_eq!(image_mime_for_ext("WEBP"), "image/webp");
    }

    #[test]
    fn audio_mime_table() {
        assert_eq!(audio_mime_for_ext("wav"), "audio/wav");
        assert_eq!(audio_mime_for_ext("m4a"), "audio/mp4");
        assert_eq!(audio_mime_for_ext("mp4"), "audio/mp4");
        assert_eq!(audio_mime_for_ext("mp3"), "audio/mpeg");
        assert_eq!(audio_mime_for_ext("ogg"), "audio/mpeg");
    }

    #[test]
    fn absolute_url_reduces_to_path() {
        assert_eq!(
            local_path_component("http://localhost:3000/uploads/s/a.jpg"),
            "/uploads/s/a.jpg"
        );
        assert_eq!(
            local_path_component("https://example.com/uploads/s/a.jpg?v=1#frag"),
            "/uploads/s/a.jpg"
        );
        assert_eq!(local_path_component("https://example.com"), "/");
    }

    #[test]
    fn bare_path_is_unchanged() {
        assert_eq!(
            local_path_component("/uploads/s/a.jpg"),
            "/uploads/s/a.jpg"
        );
        assert_eq!(local_path_component("blob:abc-123"), "blob:abc-123");
    }

    #[test]
    fn file_locator_normalizes_separators() {
        let p = PathBuf::from(r"C:\work\public\uploads\s\a.jpg");
        assert_eq!(file_locator(&p), "file://C:/work/public/uploads/s/a.jpg");
    }

    #[test]
    fn extension_is_lower_cased() {
        assert_eq!(extension_of("/uploads/s/PHOTO.JPG"), "jpg");
        assert_eq!(extension_of("/uploads/s/noext"), "");
    }
}
