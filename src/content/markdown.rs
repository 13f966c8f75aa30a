//! Markdown rendering with syntax highlighting
//!
//! The produced HTML is not sanitized. Notices are written by trusted authors;
//! exposing the content directory to untrusted input requires an HTML
//! sanitizer in front of the rendered body.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Markdown renderer with optional syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with highlighting enabled and no line numbers
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create from highlight settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to an HTML fragment
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;
        let parser = Parser::new_ext(markdown, options);

        let mut html_output = String::new();
        if !self.highlight {
            html::push_html(&mut html_output, parser);
            return html_output;
        }

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            if let Some((_, code)) = code_block.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((lang, code)) = code_block.take() {
                            let highlighted = self.highlight_code(&code, lang.as_deref());
                            events.push(Event::Html(CowStr::from(highlighted)));
                        }
                    }
                    Event::Text(text) => code.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            // Info strings may carry attributes after the language
                            let lang = lang.split_whitespace().next().unwrap_or("");
                            (!lang.is_empty()).then(|| lang.to_string())
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                event => events.push(event),
            }
        }

        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
            .and_then(|theme| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            });

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                self.add_line_numbers(&highlighted, lang, code.lines().count())
            }
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                escape_attr(lang),
                highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_attr(lang),
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, highlighted: &str, lang: &str, line_count: usize) -> String {
        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            escape_attr(lang),
            gutter,
            highlighted
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Keep language tokens usable as a class name
fn escape_attr(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect()
}
