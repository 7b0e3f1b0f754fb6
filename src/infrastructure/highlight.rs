use std::sync::LazyLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

const THEME: &str = "base16-ocean.dark";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Highlights `text` for a 24-bit terminal using the syntax registered for `extension`.
///
/// Returns the text untouched when colored output is turned off. Unknown
/// extensions fall back to plain text.
pub fn highlight_text(text: &str, extension: &str) -> Result<String, syntect::Error> {
    if !colored::control::SHOULD_COLORIZE.should_colorize() {
        return Ok(text.to_string());
    }

    let syntax = SYNTAX_SET
        .find_syntax_by_extension(extension)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, &THEME_SET.themes[THEME]);

    let mut output = String::with_capacity(text.len() * 2);
    for line in LinesWithEndings::from(text) {
        let ranges = highlighter.highlight_line(line, &SYNTAX_SET)?;
        output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
    }
    output.push_str("\x1b[0m");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_syntaxes_and_theme_exist() {
        assert!(SYNTAX_SET.find_syntax_by_extension("json").is_some());
        assert!(SYNTAX_SET.find_syntax_by_extension("html").is_some());
        assert!(THEME_SET.themes.contains_key(THEME));
    }

    #[test]
    fn plain_when_color_is_off() {
        colored::control::set_override(false);
        let html = "<p>hi</p>\n";
        assert_eq!(highlight_text(html, "html").unwrap(), html);
    }
}
