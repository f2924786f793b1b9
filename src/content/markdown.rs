//! Markdown rendering with optional syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::MarkdownConfig;

/// Syntect state, only loaded when highlighting is enabled
struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

/// Markdown renderer
pub struct MarkdownRenderer {
    options: Options,
    highlighter: Option<Highlighter>,
}

impl MarkdownRenderer {
    /// Create a plain CommonMark renderer with no extensions
    pub fn new() -> Self {
        Self {
            options: Options::empty(),
            highlighter: None,
        }
    }

    /// Create from configuration
    ///
    /// Fails when highlighting is enabled with a theme syntect does not ship.
    pub fn from_config(config: &MarkdownConfig) -> Result<Self, String> {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_FOOTNOTES, config.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, config.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);

        let highlighter = if config.highlight.enable {
            let mut theme_set = ThemeSet::load_defaults();
            let theme = theme_set
                .themes
                .remove(&config.highlight.theme)
                .ok_or_else(|| {
                    format!("unknown highlight theme '{}'", config.highlight.theme)
                })?;
            Some(Highlighter {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme,
                line_numbers: config.highlight.line_number,
            })
        } else {
            None
        };

        Ok(Self {
            options,
            highlighter,
        })
    }

    /// Render markdown to HTML
    ///
    /// Any input is accepted; malformed constructs degrade to text the way
    /// CommonMark prescribes.
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut html_output = String::new();

        match &self.highlighter {
            None => html::push_html(&mut html_output, parser),
            Some(highlighter) => {
                html::push_html(&mut html_output, highlight_events(parser, highlighter))
            }
        }

        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace code blocks in an event stream with highlighted HTML
fn highlight_events<'a>(
    parser: Parser<'a>,
    highlighter: &Highlighter,
) -> impl Iterator<Item = Event<'a>> {
    let mut events: Vec<Event> = Vec::new();
    let mut in_code_block = false;
    let mut code_block_lang: Option<String> = None;
    let mut code_block_content = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                code_block_lang = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        // Info strings may carry more than the language: "rust ignore"
                        let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                        if lang.is_empty() {
                            None
                        } else {
                            Some(lang)
                        }
                    }
                    CodeBlockKind::Indented => None,
                };
                code_block_content.clear();
            }
            Event::End(TagEnd::CodeBlock) => {
                let highlighted =
                    highlighter.highlight_code(&code_block_content, code_block_lang.as_deref());
                events.push(Event::Html(CowStr::from(highlighted)));
                in_code_block = false;
                code_block_lang = None;
            }
            Event::Text(text) if in_code_block => {
                code_block_content.push_str(&text);
            }
            _ => events.push(event),
        }
    }

    events.into_iter()
}

impl Highlighter {
    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let body = match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(highlighted) if self.line_numbers => add_line_numbers(&highlighted),
            Ok(highlighted) => highlighted,
            Err(e) => {
                tracing::debug!("Highlighting failed for language {}: {}", lang, e);
                html_escape(code)
            }
        };

        format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            html_escape(lang),
            body
        )
    }
}

/// Prefix each highlighted line with a line-number span
fn add_line_numbers(code: &str) -> String {
    code.lines()
        .enumerate()
        .map(|(i, line)| format!(r#"<span class="line-number">{}</span>{}"#, i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
