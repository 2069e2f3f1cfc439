//! prehl - 為 HTML 頁面中尚未高亮的程式碼區塊補上語法高亮
//!
//! 流程：選取候選 `<pre>` → 判定語言（class 提示或分類器）→ 渲染 → 就地替換。

pub mod candidate;
pub mod classify;
pub mod config;
pub mod dom;
pub mod highlight;
pub mod pipeline;
pub mod resolve;
pub mod source;
pub mod utils;

// 重新導出常用類型
pub use candidate::CodeBlock;
pub use classify::{Classifier, KeywordClassifier, LanguageGuess};
pub use config::{CandidateRule, SiteProfile};
pub use highlight::{HighlightEngine, Renderer};
pub use pipeline::{highlight_html, BlockOutcome, Pipeline, Report};
pub use resolve::Resolution;
