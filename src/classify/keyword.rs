//! 關鍵字統計分類器
//!
//! 每個語言有一組帶權重的特徵（正規表達式），以命中次數加權計分，
//! 再把各語言的原始分數正規化成機率。證據不足時回傳空清單，
//! 讓呼叫端略過該區塊，而不是硬猜一個語言。

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{detect_shebang, Classifier, LanguageGuess};

/// 單一特徵最多計入的命中次數
const MAX_HITS: usize = 4;

/// 語言特徵表：(語言識別字, [(特徵, 權重)])
const FEATURE_TABLE: &[(&str, &[(&str, f64)])] = &[
    (
        "py",
        &[
            (r"(?m)^\s*def \w+\(.*\)\s*(->\s*[\w\[\], .]+)?:\s*$", 3.0),
            (r"(?m)^\s*(from [\w.]+ )?import \w+", 1.5),
            (r"(?m)^\s*(if|elif|for|while|with|class|try|except)\b.*:\s*$", 1.5),
            (r"\bself\.", 1.5),
            (r"\bprint\(", 1.0),
            (r"\b(None|True|False)\b", 1.0),
            (r"\belif\b", 2.0),
            (r"__\w+__", 1.5),
        ],
    ),
    (
        "js",
        &[
            (r"\bfunction\s*\w*\s*\(", 1.5),
            (r"\b(const|let|var)\s+\w+\s*=", 1.5),
            (r"=>", 1.0),
            (r"console\.log\(", 3.0),
            (r"\brequire\(", 2.0),
            (r"\bdocument\.", 2.0),
            (r"===|!==", 2.0),
            (r"\bexport\s+default\b", 1.5),
            (r"\bundefined\b", 1.5),
        ],
    ),
    (
        "ts",
        &[
            (r":\s*(string|number|boolean|any|void|unknown)\b", 3.0),
            (r"\binterface\s+\w+\s*\{", 2.0),
            (r#"\bimport\s+.*\s+from\s+['"]"#, 1.0),
            (r"\b(const|let)\s+\w+\s*:\s*\w+", 2.0),
            (r"\bexport\s+(type|interface)\b", 2.5),
        ],
    ),
    (
        "rs",
        &[
            (r"\bfn\s+\w+", 3.0),
            (r"\blet\s+mut\b", 3.0),
            (r"\bimpl\b", 2.0),
            (r"\bpub\s+(fn|struct|enum|mod|trait)\b", 2.5),
            (r"\w+!\(", 1.5),
            (r"&(mut\s+)?self\b", 2.5),
            (r"\buse\s+\w+(::\w+)+", 2.5),
            (r"->\s*\w+", 0.5),
        ],
    ),
    (
        "go",
        &[
            (r"(?m)^package\s+\w+\s*$", 3.0),
            (r"\bfunc\s+(\(\w+\s+\*?\w+\)\s*)?\w+\(", 3.0),
            (r":=", 1.5),
            (r"\bfmt\.\w+", 3.0),
            (r"(?m)^import\s+\(", 2.0),
            (r"\bchan\b|\bgo\s+func\b", 2.0),
            (r"\bnil\b", 1.0),
        ],
    ),
    (
        "c",
        &[
            (r"(?m)^#include\s*<\w+\.h>", 3.0),
            (r"\bprintf\(", 1.5),
            (r"\bmalloc\(|\bfree\(", 2.0),
            (r"\bint\s+main\s*\(", 1.5),
            (r"\bstruct\s+\w+\s*\{", 1.0),
            (r"\bNULL\b", 1.0),
        ],
    ),
    (
        "cpp",
        &[
            (r"(?m)^#include\s*<\w+>", 3.0),
            (r"\bstd::", 3.0),
            (r"\bcout\s*<<|\bcin\s*>>", 3.0),
            (r"\btemplate\s*<", 2.5),
            (r"\bnamespace\s+\w+", 1.5),
            (r"\bnullptr\b", 2.0),
        ],
    ),
    (
        "java",
        &[
            (r"\bpublic\s+(static\s+)?(class|void|final)\b", 2.5),
            (r"System\.out\.print", 3.0),
            (r"(?m)^import\s+java\.", 3.0),
            (r"\bString\[\]\s+args", 3.0),
            (r"@Override", 2.5),
            (r"(?m)^package\s+[\w.]+;", 2.0),
        ],
    ),
    (
        "cs",
        &[
            (r"(?m)^using\s+System", 3.0),
            (r"Console\.Write", 3.0),
            (r"\{\s*get;\s*set;\s*\}", 3.0),
            (r"\bnamespace\s+[\w.]+", 1.0),
            (r"\bvar\s+\w+\s*=\s*new\b", 1.5),
        ],
    ),
    (
        "rb",
        &[
            (r"(?m)^\s*def\s+\w+[?!]?\s*$", 2.0),
            (r"(?m)^\s*end\s*$", 2.0),
            (r"\bputs\b", 2.0),
            (r#"\brequire\s+['"]"#, 1.5),
            (r"\.each\s+do\b|\bdo\s*\|", 2.5),
            (r"\battr_(reader|accessor|writer)\b", 3.0),
        ],
    ),
    (
        "php",
        &[
            (r"<\?php", 5.0),
            (r"\$\w+\s*=", 1.5),
            (r"\becho\b", 1.0),
            (r"\bfunction\s+\w+\s*\(\$", 3.0),
        ],
    ),
    (
        "sh",
        &[
            (
                r"(?m)^\s*(sudo|apt|apt-get|npm|pip|cd|ls|export|echo|git|cargo|brew|yarn|mkdir|rm|curl|chmod)\s",
                2.0,
            ),
            (r"(?m)^\$\s", 2.0),
            (r"(?m)^\s*(fi|done|esac)\s*$", 2.5),
            (r"\|\s*(grep|awk|sed|xargs)\b", 2.5),
            (r"(?m)^\s*if\s+\[", 2.5),
        ],
    ),
    (
        "html",
        &[
            (r"(?i)<!DOCTYPE html>", 5.0),
            (r"</?(div|span|html|body|head|p|a|ul|li)\b[^>]*>", 1.5),
            (r"<\w+\s+(class|id|href|src)=", 1.5),
        ],
    ),
    (
        "css",
        &[
            (r"(?m)^\s*[\w.#:\[\]=-]+(\s*[,>+~]?\s*[\w.#:\[\]=-]+)*\s*\{\s*$", 1.0),
            (r"(?m)^\s*[\w-]+\s*:\s*[^;{]+;\s*$", 1.5),
            (r"\b\d+(px|em|rem|vh|vw)\b", 1.5),
            (r"@media\b", 3.0),
        ],
    ),
    (
        "sql",
        &[
            (r"(?is)\bSELECT\b.+\bFROM\b", 3.0),
            (r"(?i)\b(INSERT\s+INTO|UPDATE\s+\w+\s+SET|DELETE\s+FROM)\b", 3.0),
            (r"(?i)\bCREATE\s+TABLE\b", 3.0),
            (r"(?i)\bWHERE\b", 1.0),
            (r"(?i)\b(INNER|LEFT|RIGHT|OUTER)\s+JOIN\b", 2.0),
        ],
    ),
    (
        "json",
        &[
            (r#"(?m)^\s*"[^"]+"\s*:\s*("|\d|\{|\[|true|false|null)"#, 1.5),
            (r"\A\s*[\{\[]", 1.0),
        ],
    ),
    (
        "yaml",
        &[
            (r"(?m)^\s*[\w-]+:\s*[^\s{;]*$", 1.0),
            (r"(?m)^\s*-\s+[\w-]+:", 1.5),
            (r"(?m)^---\s*$", 2.0),
        ],
    ),
];

struct LanguageModel {
    id: &'static str,
    features: Vec<(Regex, f64)>,
}

/// 編譯後的特徵表（延遲載入）
static MODELS: Lazy<Vec<LanguageModel>> = Lazy::new(|| {
    FEATURE_TABLE
        .iter()
        .map(|&(id, features)| LanguageModel {
            id,
            features: features
                .iter()
                .map(|(pattern, weight)| {
                    let re = Regex::new(pattern)
                        .unwrap_or_else(|e| panic!("Invalid feature for '{}': {}", id, e));
                    (re, *weight)
                })
                .collect(),
        })
        .collect()
});

/// 關鍵字統計分類器
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// 最高分語言的原始分數門檻
    min_evidence: f64,
    /// 正規化後保留的最低機率
    min_confidence: f64,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            min_evidence: 3.0,
            min_confidence: 0.1,
        }
    }

    #[cfg(test)]
    pub fn with_thresholds(min_evidence: f64, min_confidence: f64) -> Self {
        Self {
            min_evidence,
            min_confidence,
        }
    }

    /// 各語言原始分數（未排序，未過濾）
    fn raw_scores(&self, text: &str) -> Vec<(&'static str, f64)> {
        MODELS
            .iter()
            .map(|model| {
                let score: f64 = model
                    .features
                    .iter()
                    .map(|(re, weight)| re.find_iter(text).take(MAX_HITS).count() as f64 * weight)
                    .sum();
                (model.id, score)
            })
            .collect()
    }

    /// 可辨識的語言識別字
    pub fn languages() -> Vec<&'static str> {
        FEATURE_TABLE.iter().map(|(id, _)| *id).collect()
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for KeywordClassifier {
    fn run_model(&self, text: &str) -> Result<Vec<LanguageGuess>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        if let Some(language) = detect_shebang(text) {
            return Ok(vec![LanguageGuess::new(language, 1.0)]);
        }

        let scores = self.raw_scores(text);
        let total: f64 = scores.iter().map(|(_, s)| s).sum();
        let top = scores.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        if top < self.min_evidence || total <= 0.0 {
            return Ok(Vec::new());
        }

        let mut guesses: Vec<LanguageGuess> = scores
            .into_iter()
            .map(|(id, score)| LanguageGuess::new(id, score / total))
            .filter(|guess| guess.score >= self.min_confidence)
            .collect();
        guesses.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(guesses)
    }
}
