//! Markdown rendering for post bodies.

use pulldown_cmark::{Event, Options, Parser, html};

/// Render Markdown to HTML.
///
/// GFM tables, strikethrough and task lists are on, quotes and dashes are
/// typographic, and single newlines become `<br />`.
pub fn render_markdown(source: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION;

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::with_capacity(source.len() + source.len() / 2);
    html::push_html(&mut out, parser);
    out
}
