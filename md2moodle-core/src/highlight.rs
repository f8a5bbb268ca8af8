//! Code-to-image rendering
//!
//! Code fences marked with `{img}` are rasterized with syntax highlighting so they survive
//! Moodle's HTML filters unchanged. The rasterizer is an external collaborator behind the
//! [`CodeImageRenderer`] trait; the default [`PygmentizeRenderer`] shells out to the
//! `pygmentize` binary and its PNG formatter.

use crate::error::RenderError;
use tracing::warn;

/// Renders source code to PNG bytes.
pub trait CodeImageRenderer {
    /// Render `source` highlighted with `lexer` (or a backend default when `None`).
    fn render(&self, source: &str, lexer: Option<&str>) -> Result<Vec<u8>, RenderError>;
}

/// Knobs for the pygmentize image formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PygmentizeOptions {
    pub font_size: u32,
    pub line_numbers: bool,
    /// Lexer used when a fence does not name one
    pub fallback_lexer: String,
}

impl Default for PygmentizeOptions {
    fn default() -> Self {
        Self {
            font_size: 18,
            line_numbers: false,
            fallback_lexer: "pascal".to_string(),
        }
    }
}

/// [`CodeImageRenderer`] backed by the `pygmentize` command.
#[derive(Debug, Clone, Default)]
pub struct PygmentizeRenderer {
    options: PygmentizeOptions,
}

impl PygmentizeRenderer {
    pub fn new(options: PygmentizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PygmentizeOptions {
        &self.options
    }

    fn lexer_or_fallback<'a>(&'a self, lexer: Option<&'a str>) -> &'a str {
        match lexer {
            Some(lexer) if !lexer.is_empty() => lexer,
            _ => {
                warn!(
                    fallback = %self.options.fallback_lexer,
                    "code fence has no lexer, using fallback"
                );
                &self.options.fallback_lexer
            }
        }
    }

    fn formatter_options(&self) -> String {
        format!(
            "font_size={},line_numbers={}",
            self.options.font_size,
            if self.options.line_numbers {
                "True"
            } else {
                "False"
            }
        )
    }
}

impl CodeImageRenderer for PygmentizeRenderer {
    #[cfg(feature = "native-render")]
    fn render(&self, source: &str, lexer: Option<&str>) -> Result<Vec<u8>, RenderError> {
        native::render_with_pygmentize(
            source,
            self.lexer_or_fallback(lexer),
            &self.formatter_options(),
        )
    }

    #[cfg(not(feature = "native-render"))]
    fn render(&self, _source: &str, lexer: Option<&str>) -> Result<Vec<u8>, RenderError> {
        let _ = (self.lexer_or_fallback(lexer), self.formatter_options());
        Err(RenderError::Unavailable(
            "md2moodle-core was built without the `native-render` feature".to_string(),
        ))
    }
}

#[cfg(feature = "native-render")]
mod native {
    use crate::error::RenderError;
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::process::Command;
    use tempfile::tempdir;
    use tracing::debug;
    use which::which;

    pub(super) fn render_with_pygmentize(
        source: &str,
        lexer: &str,
        formatter_options: &str,
    ) -> Result<Vec<u8>, RenderError> {
        let binary = resolve_pygmentize_binary()?;
        let failed = |message: String| RenderError::Failed {
            lexer: lexer.to_string(),
            message,
        };

        let temp_dir = tempdir().map_err(|e| failed(e.to_string()))?;
        let input_path = temp_dir.path().join("snippet.txt");
        let output_path = temp_dir.path().join("snippet.png");
        fs::write(&input_path, source).map_err(|e| failed(e.to_string()))?;

        debug!(binary = %binary.display(), lexer, "rendering code block");
        let output = Command::new(&binary)
            .arg("-l")
            .arg(lexer)
            .arg("-f")
            .arg("png")
            .arg("-O")
            .arg(formatter_options)
            .arg("-o")
            .arg(&output_path)
            .arg(&input_path)
            .output()
            .map_err(|e| {
                failed(format!(
                    "failed to launch pygmentize ({}): {e}",
                    binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "pygmentize exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        fs::read(&output_path).map_err(|e| failed(e.to_string()))
    }

    fn resolve_pygmentize_binary() -> Result<PathBuf, RenderError> {
        if let Some(path) = env::var_os("MD2MOODLE_PYGMENTIZE_BIN") {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        which("pygmentize").map_err(|_| {
            RenderError::Unavailable(
                "unable to locate `pygmentize`. Install Pygments with Pillow or set MD2MOODLE_PYGMENTIZE_BIN."
                    .to_string(),
            )
        })
    }
}
