// 輸入讀取與解碼、輸出寫入

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// 代表標準輸入／輸出的路徑
pub const STDIO: &str = "-";

/// 依名稱取得編碼（例如 `utf-8`、`big5`、`windows-1252`）
pub fn encoding_for_label(label: &str) -> Result<&'static encoding_rs::Encoding> {
    encoding_rs::Encoding::for_label(label.trim().as_bytes())
        .with_context(|| format!("Unknown encoding: {}", label))
}

/// 檢測文件編碼，基於 BOM
fn detect_encoding(bytes: &[u8]) -> (&'static encoding_rs::Encoding, usize) {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        (encoding_rs::UTF_8, 3)
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        (encoding_rs::UTF_16LE, 2)
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        (encoding_rs::UTF_16BE, 2)
    } else {
        // 無 BOM，預設 UTF-8
        (encoding_rs::UTF_8, 0)
    }
}

/// 解碼為 UTF-8，並回傳實際使用的編碼
///
/// 有 BOM 時以 BOM 為準；否則使用指定編碼，未指定則為 UTF-8。
pub fn decode(
    bytes: &[u8],
    encoding: Option<&'static encoding_rs::Encoding>,
) -> (String, &'static encoding_rs::Encoding) {
    let (bom_encoding, bom_length) = detect_encoding(bytes);
    let encoding_to_use = if bom_length > 0 {
        bom_encoding
    } else {
        encoding.unwrap_or(encoding_rs::UTF_8)
    };

    let (decoded, had_errors) = encoding_to_use.decode_without_bom_handling(&bytes[bom_length..]);
    if had_errors {
        log::warn!(
            "Encoding errors detected while decoding input as {}",
            encoding_to_use.name()
        );
    }
    (decoded.into_owned(), encoding_to_use)
}

/// 以輸入的編碼重新編碼輸出，讓頁面宣告的 charset 仍然成立
///
/// UTF-16 依 encoding_rs 的規則輸出為 UTF-8；無法表示的字元寫成數值字元參照。
pub fn encode(html: &str, encoding: &'static encoding_rs::Encoding) -> Vec<u8> {
    let (bytes, used, had_unmappable) = encoding.encode(html);
    if had_unmappable {
        log::warn!(
            "Some characters can't be represented in {}, wrote them as character references",
            used.name()
        );
    }
    bytes.into_owned()
}

/// 讀取輸入（`-` 代表標準輸入）
pub fn read_input(
    path: &str,
    encoding: Option<&'static encoding_rs::Encoding>,
) -> Result<(String, &'static encoding_rs::Encoding)> {
    let bytes = if path == STDIO {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read standard input")?;
        bytes
    } else {
        fs::read(path).with_context(|| format!("Failed to read file: {}", path))?
    };
    Ok(decode(&bytes, encoding))
}

/// 寫出結果（未指定或 `-` 代表標準輸出），編碼與輸入相同
pub fn write_output(
    path: Option<&Path>,
    html: &str,
    encoding: &'static encoding_rs::Encoding,
) -> Result<()> {
    let bytes = encode(html, encoding);
    match path {
        Some(path) if path.as_os_str() != STDIO => fs::write(path, bytes)
            .with_context(|| format!("Failed to write file: {}", path.display())),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|_| stdout.flush())
                .context("Failed to write standard output")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_bom_is_stripped() {
        let bytes = [&[0xEF, 0xBB, 0xBF][..], "<pre>x</pre>".as_bytes()].concat();
        assert_eq!(decode(&bytes, None).0, "<pre>x</pre>");
    }

    #[test]
    fn test_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<p>é</p>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(
            decode(&bytes, None),
            ("<p>é</p>".to_string(), encoding_rs::UTF_16LE)
        );
    }

    #[test]
    fn test_explicit_encoding() {
        let big5 = encoding_for_label("big5").unwrap();
        let (bytes, _, _) = big5.encode("中文");
        assert_eq!(decode(&bytes, Some(big5)), ("中文".to_string(), big5));
    }

    #[test]
    fn test_bom_overrides_label() {
        let latin1 = encoding_for_label("windows-1252").unwrap();
        let bytes = [&[0xEF, 0xBB, 0xBF][..], "é".as_bytes()].concat();
        assert_eq!(decode(&bytes, Some(latin1)).0, "é");
    }

    #[test]
    fn test_unknown_label() {
        assert!(encoding_for_label("klingon").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        write_output(Some(&path), "<pre>ok</pre>", encoding_rs::UTF_8).unwrap();
        assert_eq!(
            read_input(path.to_str().unwrap(), None).unwrap(),
            ("<pre>ok</pre>".to_string(), encoding_rs::UTF_8)
        );
    }

    #[test]
    fn test_output_keeps_input_encoding() {
        let big5 = encoding_for_label("big5").unwrap();
        let html = "<meta charset=\"big5\"><pre>中文</pre>";
        let (input, _, _) = big5.encode(html);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        let (decoded, encoding) = decode(&input, Some(big5));
        write_output(Some(&path), &decoded, encoding).unwrap();

        assert_eq!(fs::read(&path).unwrap(), input.into_owned());
    }

    #[test]
    fn test_unmappable_output_uses_references() {
        let latin1 = encoding_for_label("windows-1252").unwrap();
        assert_eq!(encode("a中b", latin1), b"a&#20013;b");
    }

    #[test]
    fn test_utf16_output_is_utf8() {
        assert_eq!(encode("é", encoding_rs::UTF_16LE), "é".as_bytes());
    }
}
