// 語法高亮主模組

mod engine;

use anyhow::Result;

// 導出公開 API
pub use engine::HighlightEngine;
pub(crate) use engine::syntax_set;

/// 不支援的語言一律改用的識別字
pub const PLAIN_TEXT: &str = "plaintext";

/// 渲染結果 `<pre>` 上的標記 class，用來避免重複高亮
pub const RENDERED_MARKER: &str = "prehl";

/// 渲染器：把 (原始碼, 語言, 主題) 轉成 HTML
pub trait Renderer {
    /// 語言識別字是否在支援清單中
    fn supports_language(&self, language: &str) -> bool;

    /// 渲染一段程式碼，回傳完整的 `<pre>` HTML
    fn render(&self, text: &str, language: &str, theme: &str) -> Result<String>;
}
