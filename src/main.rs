use anyhow::{bail, Context, Result};
use prehl::config::BUILTIN_PROFILES;
use prehl::{
    highlight_html, source, utils, HighlightEngine, KeywordClassifier, Pipeline, SiteProfile,
};
use std::path::PathBuf;

const HELP: &str = "\
prehl - fill in syntax highlighting for code blocks that have none

USAGE:
  prehl [OPTIONS] <INPUT> [OUTPUT]

ARGS:
  <INPUT>     HTML file to read, or '-' for standard input
  [OUTPUT]    File to write (default: standard output)

OPTIONS:
  -u, --url URL          Page URL; picks the site profile and its theme
  -s, --site NAME        Use a built-in site profile by name
  -t, --theme NAME       Override the theme
  -e, --encoding LABEL   Input encoding when there is no BOM (default: utf-8);
                         output is written in the same encoding
      --list-sites       List built-in site profiles
      --list-themes      List available themes
      --list-languages   List languages the renderer knows
  -d, --debug            Enable debug logging
  -h, --help             Print help
  -V, --version          Print version

If --url is given and no site profile matches it, the page is written back unchanged.
";

#[derive(Debug)]
struct Args {
    input: Option<String>,
    output: Option<PathBuf>,
    url: Option<String>,
    site: Option<String>,
    theme: Option<String>,
    encoding: Option<String>,
    debug: bool,
    list_sites: bool,
    list_themes: bool,
    list_languages: bool,
    help: bool,
    version: bool,
}

fn parse_args() -> Result<Args> {
    let mut pargs = pico_args::Arguments::from_env();

    let args = Args {
        help: pargs.contains(["-h", "--help"]),
        version: pargs.contains(["-V", "--version"]),
        debug: pargs.contains(["-d", "--debug"]),
        list_sites: pargs.contains("--list-sites"),
        list_themes: pargs.contains("--list-themes"),
        list_languages: pargs.contains("--list-languages"),
        url: pargs.opt_value_from_str(["-u", "--url"])?,
        site: pargs.opt_value_from_str(["-s", "--site"])?,
        theme: pargs.opt_value_from_str(["-t", "--theme"])?,
        encoding: pargs.opt_value_from_str(["-e", "--encoding"])?,
        // 位置參數必須最後取
        input: pargs.opt_free_from_str()?,
        output: pargs.opt_free_from_str()?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {:?}", remaining);
    }

    Ok(args)
}

/// 決定網站設定：--site 優先，其次 --url，都沒有則用 generic
fn select_profile(site: Option<&str>, url: Option<&str>) -> Result<Option<&'static SiteProfile>> {
    if let Some(name) = site {
        return SiteProfile::by_name(name)
            .map(Some)
            .with_context(|| format!("Unknown site '{}'; see --list-sites", name));
    }
    match url {
        Some(url) => Ok(SiteProfile::for_url(url)),
        None => Ok(Some(SiteProfile::generic())),
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;

    if args.help {
        print!("{}", HELP);
        return Ok(());
    }
    if args.version {
        println!("prehl {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // 初始化日誌
    utils::init_logger(args.debug);

    if args.list_sites {
        for profile in BUILTIN_PROFILES {
            println!(
                "{:<14} {:<12} {}",
                profile.name,
                profile.default_theme,
                profile.matches.join(" ")
            );
        }
        return Ok(());
    }
    if args.list_themes {
        HighlightEngine::available_themes()
            .iter()
            .for_each(|theme| println!("{}", theme));
        return Ok(());
    }
    if args.list_languages {
        HighlightEngine::available_syntaxes()
            .iter()
            .for_each(|syntax| println!("{}", syntax));
        println!();
        println!("Detected from content: {}", KeywordClassifier::languages().join(", "));
        return Ok(());
    }

    let input = args
        .input
        .as_deref()
        .context("Missing <INPUT>; see --help")?;
    let encoding = args
        .encoding
        .as_deref()
        .map(source::encoding_for_label)
        .transpose()?;
    let (html, encoding) = source::read_input(input, encoding)?;

    let Some(profile) = select_profile(args.site.as_deref(), args.url.as_deref())? else {
        log::info!(
            "No site profile matches {}, leaving page unchanged",
            args.url.as_deref().unwrap_or_default()
        );
        return source::write_output(args.output.as_deref(), &html, encoding);
    };

    let theme = args
        .theme
        .as_deref()
        .unwrap_or_else(|| profile.theme_for(args.url.as_deref()));
    let engine = HighlightEngine::new();
    if !engine.has_theme(theme) {
        bail!("Theme '{}' not found; see --list-themes", theme);
    }

    let classifier = KeywordClassifier::new();
    let pipeline = Pipeline::new(profile, &classifier, &engine, theme)?;
    let (output, report) = highlight_html(&html, &pipeline)?;

    log::info!(
        "{}: {} highlighted, {} unresolved, {} failed (profile '{}', theme '{}')",
        input,
        report.replaced(),
        report.unresolved(),
        report.failed(),
        profile.name,
        theme
    );

    source::write_output(args.output.as_deref(), &output, encoding)
}
