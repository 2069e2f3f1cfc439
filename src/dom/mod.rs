//! HTML 文件模型
//!
//! 以 html5ever 解析成 `RcDom`，提供候選選取與就地替換需要的少數操作。

use anyhow::{bail, Context, Result};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, parse_fragment, serialize, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// 解析時會吞掉開頭第一個換行的元素
const LEADING_NEWLINE_TAGS: &[&str] = &["pre", "textarea", "listing"];

/// 解析後的 HTML 文件
pub struct Document {
    dom: RcDom,
}

impl Document {
    /// 解析完整 HTML 文件（缺少的 html/head/body 會自動補上）
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// 依文件順序（前序）列出所有元素節點
    pub fn elements(&self) -> Vec<Handle> {
        let mut elements = Vec::new();
        let mut stack = vec![self.dom.document.clone()];

        while let Some(node) = stack.pop() {
            if matches!(node.data, NodeData::Element { .. }) {
                elements.push(node.clone());
            }
            // 反向推入，保持前序
            for child in node.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
        }

        elements
    }

    /// 序列化回 HTML 字串
    ///
    /// 序列化器不會補回 `<pre>` 開頭被解析器吞掉的換行，
    /// 所以輸出期間暫時在這些文字前多加一個換行，結束後還原。
    pub fn to_html(&self) -> Result<String> {
        let padded = self.pad_leading_newlines();

        let mut bytes = Vec::new();
        let handle: SerializableHandle = self.dom.document.clone().into();
        let result = serialize(&mut bytes, &handle, Default::default());

        for text in &padded {
            if let NodeData::Text { contents } = &text.data {
                contents.borrow_mut().pop_front(1);
            }
        }

        result.context("Failed to serialize HTML document")?;
        String::from_utf8(bytes).context("Serialized HTML is not valid UTF-8")
    }

    /// 在以換行開頭的 pre/textarea/listing 首個文字節點前補一個換行
    fn pad_leading_newlines(&self) -> Vec<Handle> {
        let mut padded = Vec::new();
        for element in self.elements() {
            if !LEADING_NEWLINE_TAGS.iter().any(|tag| is_element(&element, tag)) {
                continue;
            }
            let Some(first) = element.children.borrow().first().cloned() else {
                continue;
            };
            if let NodeData::Text { contents } = &first.data {
                let mut contents = contents.borrow_mut();
                if contents.starts_with('\n') {
                    let mut text = StrTendril::from_slice("\n");
                    text.push_tendril(&contents);
                    *contents = text;
                    padded.push(first.clone());
                }
            }
        }
        padded
    }
}

/// 元素標籤名稱（非元素回傳 None）
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

/// class 屬性拆成的名稱清單（保持屬性中的順序）
pub fn class_list(node: &Handle) -> Vec<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return Vec::new();
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == "class")
        .map(|attr| attr.value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    class_list(node).iter().any(|c| c == class)
}

/// 元素的直接子元素
pub fn child_elements(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// 父節點（已脫離文件樹則為 None）
pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// 是否有符合標籤的祖先元素
pub fn has_ancestor(node: &Handle, tag: &str) -> bool {
    let mut current = parent(node);
    while let Some(ancestor) = current {
        if is_element(&ancestor, tag) {
            return true;
        }
        current = parent(&ancestor);
    }
    false
}

/// 元素呈現出的文字：文字節點串接，`<br>` 視為換行
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if &*name.local == "br" => out.push('\n'),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// 以一段 HTML 取代元素本身（相當於設定 outerHTML）
///
/// 新節點插在原元素的位置，原元素從樹上移除。
pub fn replace_with_html(node: &Handle, html: &str) -> Result<()> {
    let parent = parent(node).context("Element has no parent to splice into")?;

    let fragment = parse_fragment(
        RcDom::default(),
        Default::default(),
        QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from("body")),
        Vec::new(),
    )
    .one(html);

    // 片段解析結果：document -> html -> 片段節點
    let root = fragment
        .document
        .children
        .borrow()
        .first()
        .cloned()
        .context("Rendered markup produced no nodes")?;
    let replacements: Vec<Handle> = root.children.borrow_mut().drain(..).collect();
    if replacements.is_empty() {
        bail!("Rendered markup produced no nodes");
    }

    let mut siblings = parent.children.borrow_mut();
    let index = siblings
        .iter()
        .position(|sibling| Rc::ptr_eq(sibling, node))
        .context("Element not found among its parent's children")?;

    for replacement in &replacements {
        replacement.parent.set(Some(Rc::downgrade(&parent)));
    }
    siblings.splice(index..=index, replacements);
    node.parent.set(None);

    Ok(())
}
