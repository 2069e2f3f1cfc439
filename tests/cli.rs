use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const STACK_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>q</title></head><body>
<p>Try this:</p>
<pre class="lang-python s-code-block"><code>def add(a, b):
    return a + b
</code></pre>
<pre class="default s-code-block"><code>hello there</code></pre>
</body></html>
"#;

fn prehl() -> Command {
    Command::cargo_bin("prehl").unwrap()
}

#[test]
fn test_help() {
    prehl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("USAGE:"));
}

#[test]
fn test_missing_input_fails() {
    prehl()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing <INPUT>"));
}

#[test]
fn test_highlights_from_stdin() {
    prehl()
        .args(["--url", "https://stackoverflow.com/questions/1", "-"])
        .write_stdin(STACK_PAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("<pre class=\"prehl dark-plus\""))
        .stdout(predicate::str::contains("data-lang=\"python\""))
        // 無法判定的區塊保持原樣
        .stdout(predicate::str::contains(
            "<pre class=\"default s-code-block\"><code>hello there</code></pre>",
        ));
}

#[test]
fn test_stackexchange_uses_light_theme() {
    prehl()
        .args(["-u", "https://unix.stackexchange.com/q/1", "-"])
        .write_stdin(STACK_PAGE)
        .assert()
        .success()
        .stdout(predicate::str::contains("<pre class=\"prehl github-light\""));
}

#[test]
fn test_unmatched_url_passes_page_through() {
    prehl()
        .args(["--url", "https://example.com/post", "-"])
        .write_stdin(STACK_PAGE)
        .assert()
        .success()
        .stdout(STACK_PAGE);
}

#[test]
fn test_file_output_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.html");
    let first = dir.path().join("first.html");
    let second = dir.path().join("second.html");
    fs::write(
        &input,
        "<div class=\"snippet\"><pre>package main\n\nfunc main() {\n\tx := 1\n\tfmt.Println(x)\n}\n</pre></div>\
         <div class=\"highlight\"><pre>already done</pre></div>",
    )
    .unwrap();

    prehl()
        .args(["--site", "github"])
        .arg(&input)
        .arg(&first)
        .assert()
        .success();
    let first_html = fs::read_to_string(&first).unwrap();
    assert!(first_html.contains("data-lang=\"go\""));
    assert!(first_html.contains("<div class=\"highlight\"><pre>already done</pre></div>"));

    prehl()
        .args(["--site", "github"])
        .arg(&first)
        .arg(&second)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&second).unwrap(), first_html);
}

#[test]
fn test_unknown_theme_fails() {
    prehl()
        .args(["--theme", "no-such-theme", "-"])
        .write_stdin("<pre>x</pre>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Theme 'no-such-theme' not found"));
}

#[test]
fn test_unknown_site_fails() {
    prehl()
        .args(["--site", "nope", "-"])
        .write_stdin("<pre>x</pre>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown site 'nope'"));
}

#[test]
fn test_list_sites() {
    prehl()
        .arg("--list-sites")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"))
        .stdout(predicate::str::contains("stackexchange"));
}

#[test]
fn test_list_themes_includes_aliases() {
    prehl()
        .arg("--list-themes")
        .assert()
        .success()
        .stdout(predicate::str::contains("github-dark"))
        .stdout(predicate::str::contains("InspiredGitHub"));
}

#[test]
fn test_list_languages_includes_detected() {
    prehl()
        .arg("--list-languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust"))
        .stdout(predicate::str::contains("Detected from content: py, js"));
}

#[test]
fn test_output_keeps_declared_encoding() {
    let big5 = encoding_rs::BIG5;
    let page = "<html><head><meta charset=\"big5\"></head><body><pre class=\"lang-python\">print(\"中文\")</pre></body></html>";
    let (input, _, _) = big5.encode(page);

    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("in.html");
    let out_path = dir.path().join("out.html");
    fs::write(&in_path, &input).unwrap();

    prehl()
        .args(["--site", "generic", "-e", "big5"])
        .arg(&in_path)
        .arg(&out_path)
        .assert()
        .success();

    let bytes = fs::read(&out_path).unwrap();
    let (decoded, had_errors) = big5.decode_without_bom_handling(&bytes);
    assert!(!had_errors);
    assert!(decoded.contains("charset=\"big5\""));
    assert!(decoded.contains("中文"));
    assert!(decoded.contains("data-lang=\"python\""));
    assert!(std::str::from_utf8(&bytes).is_err());
}
