use crate::model::ChangeKind;
use ratatui::{
    style::{Color, Style},
    text::Span,
};
use syntect::{
    easy::HighlightLines,
    highlighting::{Color as SyntectColor, Theme, ThemeSet},
    parsing::SyntaxSet,
};

/// Maximum line length for syntax highlighting (skip longer lines for performance).
const MAX_LINE_LENGTH: usize = 10_000;

/// Gutter marker and diff color for a change kind.
fn gutter(kind: ChangeKind) -> (&'static str, Color) {
    match kind {
        ChangeKind::Insert => ("+", Color::Green),
        ChangeKind::Delete => ("-", Color::Red),
        ChangeKind::Context => (" ", Color::Reset),
    }
}

/// Syntax highlighter for hunk content.
///
/// This struct is immutable and can be shared. Use `for_file()` to create
/// a stateful highlighter session for a specific file.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a new Highlighter with default syntax and theme sets.
    ///
    /// Loads all bundled syntaxes and themes (~250ms), paid once.
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get("base16-ocean.dark")
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Create a file-scoped highlighter session that maintains state across
    /// lines, which multi-line constructs (strings, block comments) need to
    /// be colored correctly.
    pub fn for_file(&self, file_ext: &str) -> FileHighlighter<'_> {
        FileHighlighter::new(&self.syntax_set, &self.theme, file_ext)
    }

    /// Convert syntect Color to ratatui Color.
    fn syntect_to_ratatui(color: SyntectColor) -> Color {
        Color::Rgb(color.r, color.g, color.b)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintains HighlightLines state across the lines of one file's hunks.
/// Must be fed lines sequentially.
pub struct FileHighlighter<'a> {
    highlighter: Option<HighlightLines<'a>>,
    syntax_set: &'a SyntaxSet,
}

impl<'a> FileHighlighter<'a> {
    fn new(syntax_set: &'a SyntaxSet, theme: &'a Theme, file_ext: &str) -> Self {
        let syntax = syntax_set
            .find_syntax_by_extension(file_ext)
            .or_else(|| syntax_set.find_syntax_by_name(file_ext));

        let highlighter = syntax.map(|s| HighlightLines::new(s, theme));

        Self {
            highlighter,
            syntax_set,
        }
    }

    /// Highlight one change line: a diff-colored gutter marker followed by
    /// syntax-colored content. Falls back to plain diff coloring when the
    /// file type is unknown or highlighting fails.
    pub fn highlight_change(&mut self, kind: ChangeKind, text: &str) -> Vec<Span<'static>> {
        let (marker, marker_color) = gutter(kind);
        let marker_span = Span::styled(marker.to_string(), Style::default().fg(marker_color));

        // Performance: skip highlighting very long lines.
        if text.len() > MAX_LINE_LENGTH {
            return vec![
                marker_span,
                Span::styled(text.to_string(), Style::default().fg(marker_color)),
            ];
        }

        let Some(ref mut highlighter) = self.highlighter else {
            return vec![
                marker_span,
                Span::styled(text.to_string(), Style::default().fg(marker_color)),
            ];
        };

        match highlighter.highlight_line(text, self.syntax_set) {
            Ok(regions) => {
                let mut spans = Vec::with_capacity(regions.len() + 1);
                spans.push(marker_span);
                for (style, part) in regions {
                    let fg_color = Highlighter::syntect_to_ratatui(style.foreground);
                    spans.push(Span::styled(
                        part.to_string(),
                        Style::default().fg(fg_color),
                    ));
                }
                spans
            }
            Err(_) => vec![
                marker_span,
                Span::styled(text.to_string(), Style::default().fg(marker_color)),
            ],
        }
    }
}
