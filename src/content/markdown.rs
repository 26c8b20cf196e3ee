//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

/// HTML produced from a markdown body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    /// Parts of the input that were rendered as literal text
    pub warnings: Vec<String>,
}

/// An open code block while walking the event stream
struct CodeBlock {
    lang: Option<String>,
    code: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(config: &HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.theme.clone(),
            highlight: config.enable,
            line_numbers: config.line_number,
        }
    }

    /// Renderer that emits code blocks without highlighting
    pub fn plain() -> Self {
        Self::with_options(&HighlightConfig {
            enable: false,
            ..HighlightConfig::default()
        })
    }

    /// Render markdown to HTML.
    ///
    /// Rendering never fails; malformed constructs come out as literal text
    /// and are listed in [`Rendered::warnings`].
    pub fn render(&self, markdown: &str) -> Rendered {
        // Front-matter is stripped before we get here, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION;
        let parser = Parser::new_ext(markdown, options).into_offset_iter();

        let mut warnings = Vec::new();
        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<CodeBlock> = None;

        for (event, range) in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            if !fence_is_closed(&markdown[range.clone()]) {
                                warnings.push(format!(
                                    "unterminated code fence at line {}",
                                    line_of(markdown, range.start)
                                ));
                            }
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(CodeBlock {
                        lang,
                        code: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code_block.take() {
                        let html = self.code_block(&block, &mut warnings);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some(block) = code_block.as_mut() {
                        block.code.push_str(&text);
                    }
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Rendered {
            html: html_output,
            warnings,
        }
    }

    /// Render a code block, highlighting it when the language is known
    fn code_block(&self, block: &CodeBlock, warnings: &mut Vec<String>) -> String {
        let Some(lang) = block.lang.as_deref() else {
            return format!("<pre><code>{}</code></pre>\n", html_escape(&block.code));
        };

        let plain = || {
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                html_escape(lang),
                html_escape(&block.code)
            )
        };

        if !self.highlight {
            return plain();
        }
        let (Some(syntax), Some(theme)) = (self.syntax_set.find_syntax_by_token(lang), self.theme())
        else {
            return plain();
        };

        match highlighted_html_for_string(&block.code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Ok(highlighted) => format!(
                "<figure class=\"highlight {}\">{}</figure>\n",
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                warnings.push(format!("could not highlight {} block: {}", lang, e));
                plain()
            }
        }
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let line_count = code.lines().count().max(1);

        let gutter = (1..=line_count)
            .map(|n| format!("<span class=\"line-number\">{}</span>", n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<figure class=\"highlight {}\"><table><tr><td class=\"gutter\"><pre>{}</pre></td><td class=\"code\">{}</td></tr></table></figure>\n",
            html_escape(lang),
            gutter,
            code
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a fenced block's source text ends with a matching closing fence
fn fence_is_closed(source: &str) -> bool {
    let opening = source.trim_start();
    let Some(fence_char) = opening.chars().next() else {
        return false;
    };
    let fence_len = opening.chars().take_while(|&c| c == fence_char).count();

    let mut lines = source.trim_end().lines();
    lines.next();
    lines.last().is_some_and(|last| {
        // fences nested in blockquotes keep their `>` prefix
        let last = last.trim().trim_start_matches('>').trim_start();
        last.len() >= fence_len && last.chars().all(|c| c == fence_char)
    })
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
