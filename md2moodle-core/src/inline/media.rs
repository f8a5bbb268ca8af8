//! Image references
//!
//! Local images are read and embedded as base64 data URIs so the exported question bank is
//! self-contained. Remote images keep their URL as `src`.

use super::{escape_attribute, InlineError, RenderContext};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Where an image reference points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Local(PathBuf),
    Remote(String),
}

impl ImageSource {
    /// Classify a reference, resolving relative paths against `base_dir`.
    ///
    /// Only `scheme://` references are URLs, and `file://` ones are still local. Anything
    /// else, `fig:1.png` or `C:\img.png` included, is a path.
    pub fn classify(target: &str, base_dir: &Path) -> Self {
        let url = target
            .contains("://")
            .then(|| Url::parse(target).ok())
            .flatten();
        match url {
            Some(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => ImageSource::Local(path),
                Err(()) => ImageSource::Local(PathBuf::from(url.path())),
            },
            Some(_) => ImageSource::Remote(target.to_string()),
            None => {
                let path = Path::new(target);
                if path.is_absolute() {
                    ImageSource::Local(path.to_path_buf())
                } else {
                    ImageSource::Local(base_dir.join(path))
                }
            }
        }
    }
}

/// MIME type inferred from a file extension.
pub fn mime_type(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png".to_string(),
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "gif" => "image/gif".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "webp" => "image/webp".to_string(),
        "bmp" => "image/bmp".to_string(),
        "ico" => "image/x-icon".to_string(),
        other => format!("image/{other}"),
    }
}

/// Base64 data URI for the given bytes.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Block-level `<img>` element.
pub fn img_element(src: &str, alt: Option<&str>) -> String {
    match alt {
        Some(alt) => format!(
            "<img style=\"display:block;\" src=\"{}\" alt=\"{}\" />",
            escape_attribute(src),
            escape_attribute(alt)
        ),
        None => format!(
            "<img style=\"display:block;\" src=\"{}\" />",
            escape_attribute(src)
        ),
    }
}

/// Render an `![alt](target)` reference.
pub fn render_image(alt: &str, target: &str, ctx: &RenderContext<'_>) -> Result<String, InlineError> {
    let src = match ImageSource::classify(target, ctx.base_dir()) {
        ImageSource::Remote(url) => url,
        ImageSource::Local(path) => {
            let bytes = fs::read(&path).map_err(|source| InlineError::Resource {
                path: path.clone(),
                source,
            })?;
            data_uri(&mime_type(&path), &bytes)
        }
    };
    Ok(img_element(&src, Some(alt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::PygmentizeRenderer;
    use tempfile::tempdir;

    #[test]
    fn classifies_sources() {
        let base = Path::new("/quiz");
        assert_eq!(
            ImageSource::classify("img/a.png", base),
            ImageSource::Local(PathBuf::from("/quiz/img/a.png"))
        );
        assert_eq!(
            ImageSource::classify("http://example.com/a.png", base),
            ImageSource::Remote("http://example.com/a.png".to_string())
        );
        assert_eq!(
            ImageSource::classify("/abs/a.png", base),
            ImageSource::Local(PathBuf::from("/abs/a.png"))
        );
    }

    #[test]
    fn colon_without_slashes_is_a_path() {
        let base = Path::new("/quiz");
        assert_eq!(
            ImageSource::classify("fig:1.png", base),
            ImageSource::Local(PathBuf::from("/quiz/fig:1.png"))
        );
        assert_eq!(
            ImageSource::classify("file:///srv/img/a.png", base),
            ImageSource::Local(PathBuf::from("/srv/img/a.png"))
        );
    }

    #[test]
    fn infers_mime_types() {
        assert_eq!(mime_type(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(mime_type(Path::new("a.tiff")), "image/tiff");
    }

    #[test]
    fn embeds_local_image_as_data_uri() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("dot.gif"), b"GIF89a").unwrap();
        let renderer = PygmentizeRenderer::default();
        let ctx = RenderContext::new(dir.path(), &renderer);

        let html = render_image("dot", "dot.gif", &ctx).unwrap();
        assert_eq!(
            html,
            "<img style=\"display:block;\" src=\"data:image/gif;base64,R0lGODlh\" alt=\"dot\" />"
        );
    }
}
