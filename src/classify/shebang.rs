// 由 shebang 行偵測語言

use crate::highlight::syntax_set;

/// 第一行為 `#!` 時，以語法集的 first-line 規則偵測語言
///
/// 回傳語法的第一個副檔名作為語言識別字（例如 `py`、`sh`）
pub fn detect_shebang(content: &str) -> Option<String> {
    let first_line = content.lines().next()?.trim_end();
    if !first_line.starts_with("#!") {
        return None;
    }

    let syntax = syntax_set().find_syntax_by_first_line(first_line)?;
    Some(
        syntax
            .file_extensions
            .first()
            .cloned()
            .unwrap_or_else(|| syntax.name.to_lowercase()),
    )
}
