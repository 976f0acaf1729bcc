//! Terminal syntax highlighting for snippet content.
use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";
const RESET: &str = "\x1b[0m";

fn find_syntax(file_name: &str, language: &str) -> Option<&'static SyntaxReference> {
    let by_extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| SYNTAX_SET.find_syntax_by_extension(ext));
    by_extension.or_else(|| SYNTAX_SET.find_syntax_by_token(language))
}

/// Content with 24-bit color escapes, or unchanged when no syntax matches.
pub fn highlight(file_name: &str, language: &str, content: &str) -> String {
    let Some(syntax) = find_syntax(file_name, language) else {
        return content.to_string();
    };
    let Some(theme) = THEME_SET.themes.get(THEME) else {
        return content.to_string();
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(content.len() * 2);
    for line in LinesWithEndings::from(content) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(e) => {
                tracing::debug!(error = %e, "highlighting failed, falling back to plain text");
                return content.to_string();
            }
        }
    }
    out.push_str(RESET);
    out
}
