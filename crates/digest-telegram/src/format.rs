//! Markdown to Telegram HTML.
//!
//! Telegram accepts only a small HTML subset (`b`, `i`, `code`, `pre`, `a`),
//! so the conversion is line based: headings become bold lines, list
//! bullets become `•`, fenced blocks become `<pre>`, and inline bold, code,
//! and links are rewritten inside each line. Everything else is escaped.

use std::sync::OnceLock;

use chrono::NaiveDate;
use digest_models::{Progress, SummaryItem};
use regex::Regex;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Escapes text for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds the full message for one summary: header, body, and footer.
pub fn format_summary(item: &SummaryItem, progress: Progress, date: NaiveDate) -> String {
    format!(
        "📚 <b>Daily Documentation Summary</b>\n\
         📅 {date}\n\
         \n\
         🔖 <b>Repository:</b> <code>{key}</code>\n\
         📊 <b>Progress:</b> {progress}\n\
         \n\
         {RULE}\n\
         \n\
         {body}\n\
         \n\
         {RULE}\n\
         🤖 Auto-generated by stardigest\n\
         🔗 <a href=\"{url}\">View Repository</a>",
        date = date.format("%B %d, %Y"),
        key = html_escape(&item.key),
        progress = progress,
        body = markdown_to_telegram_html(&item.content).trim(),
        url = item.repo_url(),
    )
}

/// Caption for the attached markdown document.
pub fn document_caption(item: &SummaryItem) -> String {
    format!(
        "📚 Documentation Summary: <b>{}</b>",
        html_escape(&item.key)
    )
}

/// Converts summary markdown into Telegram HTML.
///
/// A fenced block is emitted as one `<pre>...</pre>` run whose first line
/// starts with `<pre>` and whose last line ends with `</pre>`. The splitter
/// relies on that shape.
pub fn markdown_to_telegram_html(markdown: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut code: Option<Vec<String>> = None;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            match code.take() {
                Some(block) => out.push(format!("<pre>{}</pre>", block.join("\n"))),
                None => code = Some(Vec::new()),
            }
            continue;
        }

        if let Some(block) = code.as_mut() {
            block.push(html_escape(line));
            continue;
        }

        out.push(convert_line(line));
    }

    // Unterminated fence
    if let Some(block) = code {
        out.push(format!("<pre>{}</pre>", block.join("\n")));
    }

    out.join("\n")
}

fn convert_line(line: &str) -> String {
    let trimmed = line.trim_start();

    let heading_level = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&heading_level) && trimmed[heading_level..].starts_with(' ') {
        let text = trimmed[heading_level..].trim().replace("**", "");
        return format!("<b>{}</b>", inline(&text));
    }

    if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-' || c == '*' || c == '_') {
        return RULE.to_string();
    }

    if let Some(rest) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("+ "))
    {
        let indent = &line[..line.len() - trimmed.len()];
        return format!("{}• {}", indent, inline(rest));
    }

    inline(line)
}

fn code_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid code span regex"))
}

fn bold() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"))
}

fn link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[([^\]]+)\]\((https?://[^)\s]+)\)").expect("valid link regex")
    })
}

/// Rewrites inline markdown in one line; code spans are left unformatted.
fn inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 16);
    let mut last = 0;

    for caps in code_span().captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&format_text(&line[last..whole.start()]));
        out.push_str("<code>");
        out.push_str(&html_escape(inner.as_str()));
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&format_text(&line[last..]));
    out
}

fn format_text(text: &str) -> String {
    let escaped = html_escape(text);
    let bolded = bold().replace_all(&escaped, "<b>$1</b>");
    link()
        .replace_all(&bolded, "<a href=\"$2\">$1</a>")
        .into_owned()
}
