//! 候選程式碼區塊選取
//!
//! 只做查詢，不修改文件。已帶有渲染標記的 `<pre>` 一律略過，
//! 所以對輸出再跑一次不會重複選到同一個區塊。

use markup5ever_rcdom::Handle;

use crate::config::CandidateRule;
use crate::dom::{self, Document};
use crate::highlight::RENDERED_MARKER;

/// 待高亮的程式碼區塊
#[derive(Clone)]
pub struct CodeBlock {
    pub(crate) node: Handle,
    /// 區塊呈現出的原始碼
    pub text: String,
    /// class 名稱（屬性中的順序）
    pub classes: Vec<String>,
}

impl CodeBlock {
    pub(crate) fn from_node(node: Handle) -> Self {
        let text = dom::text_content(&node);
        let classes = dom::class_list(&node);
        Self {
            node,
            text,
            classes,
        }
    }
}

impl std::fmt::Debug for CodeBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeBlock")
            .field("classes", &self.classes)
            .field("len", &self.text.len())
            .finish()
    }
}

/// 依規則選出尚未高亮的區塊（文件順序）
pub fn select_candidates(document: &Document, rule: &CandidateRule) -> Vec<CodeBlock> {
    let nodes: Vec<Handle> = match rule {
        CandidateRule::UnmarkedParent { marker } => document
            .elements()
            .into_iter()
            .filter(|el| dom::is_element(el, "div") && !dom::has_class(el, marker))
            .filter_map(|div| {
                dom::child_elements(&div)
                    .into_iter()
                    .find(|child| dom::is_element(child, "pre"))
            })
            .filter(|pre| !is_rendered(pre))
            .collect(),
        CandidateRule::AnyPre => document
            .elements()
            .into_iter()
            .filter(|el| dom::is_element(el, "pre"))
            .filter(|pre| !is_rendered(pre) && !dom::has_ancestor(pre, "pre"))
            .collect(),
    };

    nodes.into_iter().map(CodeBlock::from_node).collect()
}

fn is_rendered(pre: &Handle) -> bool {
    dom::has_class(pre, RENDERED_MARKER)
}
