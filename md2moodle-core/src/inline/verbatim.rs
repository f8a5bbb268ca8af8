//! Code fences
//!
//! A fence becomes a `<pre><code>` block, or a PNG image when it was opened with the
//! `{img}` suffix.

use super::media::{data_uri, img_element};
use super::{escape_html, InlineError, RenderContext};
use crate::model::CodeFence;

/// Render a completed code fence.
pub fn render_fence(fence: &CodeFence, ctx: &RenderContext<'_>) -> Result<String, InlineError> {
    if fence.render_as_image {
        let png = ctx
            .code_renderer
            .render(&fence.source, fence.lexer.as_deref())?;
        Ok(img_element(&data_uri("image/png", &png), None))
    } else {
        Ok(format!("<pre><code>{}</code></pre>", escape_html(&fence.source)))
    }
}
