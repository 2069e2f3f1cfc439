// 網站設定
//
// 每個網站一份 SiteProfile：網址比對規則、主題規則、候選區塊規則。

use anyhow::{bail, Result};
use regex::Regex;

/// 候選區塊的結構規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRule {
    /// `<div>` 的第一個直接子 `<pre>`，且 div 沒有 `marker` class
    UnmarkedParent { marker: &'static str },
    /// 所有 `<pre>`
    AnyPre,
}

/// 單一網站的設定
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: &'static str,
    /// 使用者腳本格式的網址比對規則，例如 `https://*.github.com/*`
    pub matches: &'static [&'static str],
    pub candidates: CandidateRule,
    /// 語言提示的 class 前綴
    pub hint_prefix: &'static str,
    pub default_theme: &'static str,
    /// (網址子字串, 主題)，第一個符合者優先
    pub theme_overrides: &'static [(&'static str, &'static str)],
}

/// 內建網站設定
pub const BUILTIN_PROFILES: &[SiteProfile] = &[
    SiteProfile {
        name: "github",
        matches: &["https://*.github.com/*"],
        candidates: CandidateRule::UnmarkedParent {
            marker: "highlight",
        },
        hint_prefix: "lang-",
        default_theme: "github-dark",
        theme_overrides: &[],
    },
    SiteProfile {
        name: "stackexchange",
        matches: &[
            "https://*.stackoverflow.com/*",
            "https://*.stackexchange.com/*",
            "https://*.reddit.com/r/*",
        ],
        candidates: CandidateRule::AnyPre,
        hint_prefix: "lang-",
        default_theme: "dark-plus",
        theme_overrides: &[("stackexchange", "github-light")],
    },
    SiteProfile {
        name: "generic",
        matches: &[],
        candidates: CandidateRule::AnyPre,
        hint_prefix: "lang-",
        default_theme: "github-dark",
        theme_overrides: &[],
    },
];

impl SiteProfile {
    /// 依名稱取得內建設定
    pub fn by_name(name: &str) -> Option<&'static SiteProfile> {
        BUILTIN_PROFILES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// 第一個比對規則符合網址的設定
    pub fn for_url(url: &str) -> Option<&'static SiteProfile> {
        BUILTIN_PROFILES.iter().find(|p| p.matches_url(url))
    }

    /// 未指定網址與網站時使用的設定
    pub fn generic() -> &'static SiteProfile {
        &BUILTIN_PROFILES[BUILTIN_PROFILES.len() - 1]
    }

    pub fn matches_url(&self, url: &str) -> bool {
        self.matches.iter().any(|pattern| match compile_match_pattern(pattern) {
            Ok(re) => re.is_match(url),
            Err(e) => {
                log::warn!("Ignoring match pattern '{}' of '{}': {:#}", pattern, self.name, e);
                false
            }
        })
    }

    /// 依網址選主題
    pub fn theme_for(&self, url: Option<&str>) -> &'static str {
        url.and_then(|url| {
            self.theme_overrides
                .iter()
                .find(|(needle, _)| url.contains(needle))
                .map(|(_, theme)| *theme)
        })
        .unwrap_or(self.default_theme)
    }
}

/// 把使用者腳本的比對規則轉成正規表達式
///
/// - scheme 為 `*` 時代表 http 或 https
/// - host 的 `*.` 前綴同時符合網域本身與所有子網域
/// - 其餘位置的 `*` 符合任意字元
fn compile_match_pattern(pattern: &str) -> Result<Regex> {
    let Some((scheme, rest)) = pattern.split_once("://") else {
        bail!("Missing scheme separator");
    };
    let (host, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => bail!("Missing path"),
    };

    let scheme_re = if scheme == "*" {
        "https?".to_string()
    } else {
        regex::escape(scheme)
    };

    let host_re = if host == "*" {
        "[^/]+".to_string()
    } else if let Some(domain) = host.strip_prefix("*.") {
        format!(r"(?:[^/]*\.)?{}", regex::escape(domain))
    } else if host.contains('*') {
        bail!("Wildcard is only allowed as a host prefix");
    } else {
        regex::escape(host)
    };

    let path_re = path
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Ok(Regex::new(&format!(
        "(?i)^{}://{}(?::\\d+)?{}$",
        scheme_re, host_re, path_re
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_for_url() {
        let name = |url| SiteProfile::for_url(url).map(|p| p.name);
        assert_eq!(name("https://github.com/rust-lang/rust/issues/1"), Some("github"));
        assert_eq!(name("https://gist.github.com/foo"), Some("github"));
        assert_eq!(name("https://stackoverflow.com/questions/1"), Some("stackexchange"));
        assert_eq!(name("https://unix.stackexchange.com/q/2"), Some("stackexchange"));
        assert_eq!(name("https://www.reddit.com/r/rust/"), Some("stackexchange"));
        assert_eq!(name("https://www.reddit.com/user/someone"), None);
        assert_eq!(name("https://notgithub.com/"), None);
        assert_eq!(name("http://github.com/"), None);
    }

    #[test]
    fn test_theme_selection() {
        let se = SiteProfile::by_name("stackexchange").unwrap();
        assert_eq!(se.theme_for(Some("https://superuser.stackexchange.com/q/1")), "github-light");
        assert_eq!(se.theme_for(Some("https://stackoverflow.com/q/1")), "dark-plus");
        assert_eq!(se.theme_for(None), "dark-plus");

        let gh = SiteProfile::by_name("GitHub").unwrap();
        assert_eq!(gh.theme_for(Some("https://github.com/")), "github-dark");
    }

    #[test]
    fn test_generic_profile() {
        let generic = SiteProfile::generic();
        assert_eq!(generic.name, "generic");
        assert_eq!(generic.candidates, CandidateRule::AnyPre);
        assert!(!generic.matches_url("https://github.com/"));
    }

    #[test]
    fn test_match_pattern_forms() {
        let re = compile_match_pattern("*://example.com/docs/*").unwrap();
        assert!(re.is_match("http://example.com/docs/a"));
        assert!(re.is_match("https://example.com:8443/docs/"));
        assert!(!re.is_match("https://example.com/blog/"));

        assert!(compile_match_pattern("https://ex*ample.com/*").is_err());
        assert!(compile_match_pattern("example.com/*").is_err());
    }
}
