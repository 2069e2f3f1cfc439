//! 高亮流程
//!
//! 選取候選區塊 → 判定語言 → 渲染 → 就地替換。
//! 每個區塊獨立處理，單一區塊失敗只會讓它保持原狀，不影響其他區塊。

use anyhow::Result;

use crate::candidate::{select_candidates, CodeBlock};
use crate::classify::Classifier;
use crate::config::SiteProfile;
use crate::dom::{self, Document};
use crate::highlight::{Renderer, PLAIN_TEXT};
use crate::resolve::{LanguageResolver, Resolution};

/// 單一區塊的最終狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// 已替換為渲染結果；`language` 為實際交給渲染器的識別字
    Replaced { language: String },
    /// 沒有提示也沒有猜測，原樣保留
    Unresolved,
    /// 分類器失敗，原樣保留
    ResolveFailed { reason: String },
    /// 渲染或替換失敗，原樣保留
    RenderFailed { reason: String },
}

/// 一次執行的結果統計
#[derive(Debug, Default, Clone)]
pub struct Report {
    pub outcomes: Vec<BlockOutcome>,
}

impl Report {
    pub fn replaced(&self) -> usize {
        self.count(|o| matches!(o, BlockOutcome::Replaced { .. }))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, BlockOutcome::Unresolved))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                BlockOutcome::ResolveFailed { .. } | BlockOutcome::RenderFailed { .. }
            )
        })
    }

    fn count(&self, pred: impl Fn(&BlockOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// 依網站設定建立的高亮流程
pub struct Pipeline<'a> {
    profile: &'a SiteProfile,
    resolver: LanguageResolver<'a>,
    renderer: &'a dyn Renderer,
    theme: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        profile: &'a SiteProfile,
        classifier: &'a dyn Classifier,
        renderer: &'a dyn Renderer,
        theme: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            profile,
            resolver: LanguageResolver::new(profile.hint_prefix, classifier)?,
            renderer,
            theme: theme.into(),
        })
    }

    /// 處理整份文件
    pub fn run(&self, document: &Document) -> Report {
        let blocks = select_candidates(document, &self.profile.candidates);
        log::debug!(
            "Found {} candidate block(s) with profile '{}'",
            blocks.len(),
            self.profile.name
        );

        Report {
            outcomes: blocks.iter().map(|block| self.process(block)).collect(),
        }
    }

    fn process(&self, block: &CodeBlock) -> BlockOutcome {
        let resolution = match self.resolver.resolve(block) {
            Ok(resolution) => resolution,
            Err(e) => {
                log::warn!("Skipping {:?}: {:#}", block, e);
                return BlockOutcome::ResolveFailed {
                    reason: format!("{:#}", e),
                };
            }
        };

        let Some(language) = resolution.language() else {
            log::debug!("Don't have a good guess for {:?}", block);
            return BlockOutcome::Unresolved;
        };
        if let Resolution::Guessed(lang) = &resolution {
            log::debug!("Guessed '{}' for {:?}", lang, block);
        }

        let language = self.render_language(language);
        match self.render_and_replace(block, language) {
            Ok(()) => BlockOutcome::Replaced {
                language: language.to_string(),
            },
            Err(e) => {
                log::warn!("Leaving {:?} unhighlighted: {:#}", block, e);
                BlockOutcome::RenderFailed {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    /// 不支援的語言改用純文字
    fn render_language<'l>(&self, language: &'l str) -> &'l str {
        if self.renderer.supports_language(language) {
            language
        } else {
            log::info!("Renderer doesn't recognize '{}', falling back to '{}'", language, PLAIN_TEXT);
            PLAIN_TEXT
        }
    }

    fn render_and_replace(&self, block: &CodeBlock, language: &str) -> Result<()> {
        let html = self.renderer.render(&block.text, language, &self.theme)?;
        dom::replace_with_html(&block.node, &html)
    }
}

/// 解析、處理並序列化一份 HTML 文件
pub fn highlight_html(html: &str, pipeline: &Pipeline<'_>) -> Result<(String, Report)> {
    let document = Document::parse(html);
    let report = pipeline.run(&document);
    Ok((document.to_html()?, report))
}
