//! 語法高亮引擎
//!
//! 使用 syntect 內建的語法集與主題集，輸出帶 inline style 的 HTML。
//!
//! 實現特點：
//! - Token 層級過濾換行符，每一行包成 `<span class="line">`
//! - token 轉 HTML 與跳脫交給 `syntect::html`

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use std::fmt::Write;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Style, Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::{Renderer, PLAIN_TEXT, RENDERED_MARKER};

/// 全域語法集（延遲載入）
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// 全域主題集（使用 syntect 內建主題）
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

/// 主題別名（使用者腳本慣用的名稱 -> syntect 內建主題）
const THEME_ALIASES: &[(&str, &str)] = &[
    ("github-dark", "base16-ocean.dark"),
    ("dark-plus", "base16-eighties.dark"),
    ("github-light", "InspiredGitHub"),
    ("solarized-dark", "Solarized (dark)"),
    ("solarized-light", "Solarized (light)"),
];

/// 語言別名（分類器與網站 class 常見的寫法 -> syntect token）
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("javascript", "js"),
    ("node", "js"),
    ("jsx", "js"),
    ("python", "py"),
    ("python3", "py"),
    ("rust", "rs"),
    ("golang", "go"),
    ("c++", "cpp"),
    ("cxx", "cpp"),
    ("csharp", "cs"),
    ("c#", "cs"),
    ("shell", "sh"),
    ("bash", "sh"),
    ("zsh", "sh"),
    ("console", "sh"),
    ("ruby", "rb"),
    ("objective-c", "m"),
    ("objc", "m"),
    ("markdown", "md"),
    ("yml", "yaml"),
    ("kotlin", "kt"),
    ("perl", "pl"),
    ("haskell", "hs"),
    ("makefile", "make"),
];

/// 純文字的各種寫法
const PLAIN_NAMES: &[&str] = &[PLAIN_TEXT, "plain", "text", "txt"];

/// 供其他模組（例如 shebang 偵測）共用的語法集
pub(crate) fn syntax_set() -> &'static SyntaxSet {
    &SYNTAX_SET
}

/// 語法高亮引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct HighlightEngine;

impl HighlightEngine {
    pub fn new() -> Self {
        Self
    }

    /// 依語言識別字尋找語法（先套用別名，大小寫不敏感）
    fn find_syntax(&self, language: &str) -> Option<&'static SyntaxReference> {
        let lower = language.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if PLAIN_NAMES.contains(&lower.as_str()) {
            return Some(SYNTAX_SET.find_syntax_plain_text());
        }

        let token = LANGUAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map(|(_, token)| *token)
            .unwrap_or(lower.as_str());

        SYNTAX_SET
            .find_syntax_by_token(token)
            .or_else(|| SYNTAX_SET.find_syntax_by_token(&lower))
    }

    /// 依名稱或別名取得主題
    fn find_theme(&self, name: &str) -> Option<&'static Theme> {
        let canonical = THEME_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, real)| *real)
            .unwrap_or(name);
        THEME_SET.themes.get(canonical)
    }

    /// 主題是否存在（含別名）
    pub fn has_theme(&self, name: &str) -> bool {
        self.find_theme(name).is_some()
    }

    /// 取得可用主題清單（含別名）
    pub fn available_themes() -> Vec<String> {
        let mut themes: Vec<String> = THEME_SET.themes.keys().cloned().collect();
        themes.extend(THEME_ALIASES.iter().map(|(alias, _)| alias.to_string()));
        themes.sort();
        themes
    }

    /// 取得可用語法清單
    pub fn available_syntaxes() -> Vec<String> {
        SYNTAX_SET
            .syntaxes()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// 將一段程式碼高亮成 HTML
    fn highlight_to_html(
        &self,
        text: &str,
        syntax: &SyntaxReference,
        theme: &Theme,
        language: &str,
        theme_name: &str,
    ) -> Result<String> {
        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::with_capacity(text.len() * 4 + 256);

        let background = theme.settings.background.map(hex);
        let foreground = theme.settings.foreground.map(hex);
        let mut style_attr = String::new();
        if let Some(bg) = &background {
            let _ = write!(style_attr, "background-color:{}", bg);
        }
        if let Some(fg) = &foreground {
            if !style_attr.is_empty() {
                style_attr.push(';');
            }
            let _ = write!(style_attr, "color:{}", fg);
        }

        let _ = write!(
            output,
            "<pre class=\"{} {}\" style=\"{}\" data-lang=\"{}\" tabindex=\"0\"><code>",
            RENDERED_MARKER,
            theme_slug(theme_name),
            style_attr,
            html_escape::encode_double_quoted_attribute(language),
        );

        for (idx, line) in LinesWithEndings::from(text).enumerate() {
            let ranges = highlighter
                .highlight_line(line, &SYNTAX_SET)
                .with_context(|| format!("Failed to highlight line {} as '{}'", idx + 1, language))?;
            if idx > 0 {
                output.push('\n');
            }
            let line_html = line_to_html(&ranges)
                .with_context(|| format!("Failed to write line {} as HTML", idx + 1))?;
            output.push_str("<span class=\"line\">");
            output.push_str(&line_html);
            output.push_str("</span>");
        }

        output.push_str("</code></pre>");
        Ok(output)
    }
}

impl Renderer for HighlightEngine {
    fn supports_language(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    fn render(&self, text: &str, language: &str, theme: &str) -> Result<String> {
        let Some(syntax) = self.find_syntax(language) else {
            bail!("Language '{}' is not supported", language);
        };
        let theme_ref = self
            .find_theme(theme)
            .with_context(|| format!("Theme '{}' not found", theme))?;

        self.highlight_to_html(text, syntax, theme_ref, language, theme)
    }
}

/// 將一行的 token 轉為 HTML（在 token 層級過濾換行符）
fn line_to_html(ranges: &[(Style, &str)]) -> Result<String> {
    let tokens: Vec<(Style, &str)> = ranges
        .iter()
        .map(|&(style, text)| (style, strip_line_endings(text)))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    Ok(styled_line_to_highlighted_html(&tokens, IncludeBackground::No)?)
}

/// 移除行尾的換行符（\n, \r, \r\n）
#[inline]
fn strip_line_endings(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .or_else(|| s.strip_suffix('\r'))
        .unwrap_or(s)
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// 主題名稱轉成可用於 class 的形式
fn theme_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
