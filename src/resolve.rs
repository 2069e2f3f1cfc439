//! 語言判定
//!
//! 判定順序（第一個成立者勝出）：
//! 1. class 名稱中的語言提示（例如 `lang-python`），`none` 不算
//! 2. 分類器的最高分候選
//! 3. 都沒有則無法判定，呼叫端應略過該區塊
//!
//! 有提示時絕不呼叫分類器。多個 class 都帶前綴時，以屬性中第一個為準。

use anyhow::{Context, Result};
use regex::Regex;

use crate::candidate::CodeBlock;
use crate::classify::Classifier;

/// 代表「沒有提示」的提示值
const NO_HINT: &str = "none";

/// 判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// 來自 class 名稱
    Hinted(String),
    /// 來自分類器
    Guessed(String),
    Unresolved,
}

impl Resolution {
    pub fn language(&self) -> Option<&str> {
        match self {
            Resolution::Hinted(lang) | Resolution::Guessed(lang) => Some(lang.as_str()),
            Resolution::Unresolved => None,
        }
    }
}

/// 語言判定器
pub struct LanguageResolver<'a> {
    hint_pattern: Regex,
    classifier: &'a dyn Classifier,
}

impl<'a> LanguageResolver<'a> {
    pub fn new(hint_prefix: &str, classifier: &'a dyn Classifier) -> Result<Self> {
        let hint_pattern = Regex::new(&format!(r"{}([\w-]+)", regex::escape(hint_prefix)))
            .with_context(|| format!("Invalid hint prefix '{}'", hint_prefix))?;
        Ok(Self {
            hint_pattern,
            classifier,
        })
    }

    /// 從 class 名稱取出語言提示（第一個符合者）
    pub fn explicit_hint(&self, classes: &[String]) -> Option<String> {
        classes.iter().find_map(|class| {
            self.hint_pattern
                .captures(class)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
    }

    pub fn resolve(&self, block: &CodeBlock) -> Result<Resolution> {
        if let Some(hint) = self.explicit_hint(&block.classes) {
            if hint != NO_HINT {
                return Ok(Resolution::Hinted(hint));
            }
        }

        let guesses = self
            .classifier
            .run_model(&block.text)
            .context("Language classifier failed")?;

        Ok(guesses
            .into_iter()
            .next()
            .map(|guess| Resolution::Guessed(guess.language_id))
            .unwrap_or(Resolution::Unresolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::select_candidates;
    use crate::classify::LanguageGuess;
    use crate::config::CandidateRule;
    use crate::dom::Document;
    use std::cell::Cell;

    struct FakeClassifier {
        guesses: Vec<LanguageGuess>,
        calls: Cell<usize>,
    }

    impl FakeClassifier {
        fn new(guesses: Vec<LanguageGuess>) -> Self {
            Self {
                guesses,
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for FakeClassifier {
        fn run_model(&self, _text: &str) -> Result<Vec<LanguageGuess>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.guesses.clone())
        }
    }

    fn block(html: &str) -> CodeBlock {
        let doc = Document::parse(html);
        select_candidates(&doc, &CandidateRule::AnyPre)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_hint_wins_without_classifier() {
        let classifier = FakeClassifier::new(vec![LanguageGuess::new("go", 0.9)]);
        let resolver = LanguageResolver::new("lang-", &classifier).unwrap();

        let resolution = resolver
            .resolve(&block("<pre class=\"lang-python\">x = 1</pre>"))
            .unwrap();
        assert_eq!(resolution, Resolution::Hinted("python".to_string()));
        assert_eq!(classifier.calls.get(), 0);
    }

    #[test]
    fn test_none_hint_falls_back_to_classifier() {
        let classifier = FakeClassifier::new(vec![
            LanguageGuess::new("go", 0.9),
            LanguageGuess::new("rs", 0.1),
        ]);
        let resolver = LanguageResolver::new("lang-", &classifier).unwrap();

        let resolution = resolver
            .resolve(&block("<pre class=\"lang-none\">x := 1</pre>"))
            .unwrap();
        assert_eq!(resolution, Resolution::Guessed("go".to_string()));
        assert_eq!(classifier.calls.get(), 1);
    }

    #[test]
    fn test_no_hint_and_no_guess_is_unresolved() {
        let classifier = FakeClassifier::new(Vec::new());
        let resolver = LanguageResolver::new("lang-", &classifier).unwrap();

        let resolution = resolver.resolve(&block("<pre>???</pre>")).unwrap();
        assert_eq!(resolution, Resolution::Unresolved);
        assert_eq!(resolution.language(), None);
    }

    #[test]
    fn test_hint_token_forms() {
        let classifier = FakeClassifier::new(Vec::new());
        let resolver = LanguageResolver::new("lang-", &classifier).unwrap();
        let classes = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            resolver.explicit_hint(&classes(&["s-code-block", "lang-objective-c"])),
            Some("objective-c".to_string())
        );
        assert_eq!(
            resolver.explicit_hint(&classes(&["lang-js", "lang-ts"])),
            Some("js".to_string())
        );
        assert_eq!(resolver.explicit_hint(&classes(&["language-js", "default"])), None);
        assert_eq!(resolver.explicit_hint(&classes(&["lang-"])), None);
    }

    #[test]
    fn test_classifier_error_propagates() {
        struct Broken;
        impl Classifier for Broken {
            fn run_model(&self, _text: &str) -> Result<Vec<LanguageGuess>> {
                anyhow::bail!("model not loaded")
            }
        }

        let resolver = LanguageResolver::new("lang-", &Broken).unwrap();
        assert!(resolver.resolve(&block("<pre>x</pre>")).is_err());
    }
}
