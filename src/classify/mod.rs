// 語言分類器
//
// 由原始碼文字推測語言，回傳依分數由高到低排序的候選清單（可為空）。

mod keyword;
mod shebang;

use anyhow::Result;

pub use keyword::KeywordClassifier;
pub use shebang::detect_shebang;

/// 單一語言候選
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    pub language_id: String,
    /// 0.0 ~ 1.0
    pub score: f64,
}

impl LanguageGuess {
    pub fn new(language_id: impl Into<String>, score: f64) -> Self {
        Self {
            language_id: language_id.into(),
            score,
        }
    }
}

/// 語言分類器
pub trait Classifier {
    /// 對一段原始碼執行模型，結果依分數遞減排序
    fn run_model(&self, text: &str) -> Result<Vec<LanguageGuess>>;
}
