//! Markdown to styled HTML email rendering.

use chrono::NaiveDate;
use digest_models::{Progress, SummaryItem};
use pulldown_cmark::{html, Options, Parser};

/// A fully rendered email, ready to be wrapped in a MIME message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub plain: String,
}

/// Section headings the summarizer emits, and their decorated form.
const HEADINGS: &[(&str, &str)] = &[
    ("## 1. Project Overview", "## 🎯 Project Overview & Purpose"),
    ("## 2. Key Features", "## ⚡ Key Features & Capabilities"),
    ("## 3. Architecture", "## 🏗️ Architecture & Technical Design"),
    ("### What is this project", "### 📖 What is this project and what problem does it solve?"),
    ("### Target audience", "### 👥 Target audience and use cases"),
    ("### Project history", "### 📅 Project history, maturity, and current status"),
    ("### Key differentiators", "### 🌟 Key differentiators from similar projects"),
    ("### Major Features", "### 🚀 Major Features"),
    ("### Overall system architecture", "### 🔧 Overall system architecture"),
    ("### Design patterns", "### 🎨 Design patterns and principles used"),
    ("### Data flow", "### 🔄 Data flow and component interactions"),
];

/// Labelled feature notes that become callout boxes: (marker, class, icon, label).
const CALLOUTS: &[(&str, &str, &str, &str)] = &[
    ("**What it does**:", "info-box", "💡", "What it does"),
    ("**Why it's useful**:", "info-box", "✨", "Why it's useful"),
    ("**When to use it**:", "info-box", "🎯", "When to use it"),
    ("**Limitations**:", "warning-box", "⚠️", "Limitations"),
];

/// Renders one summary as an email.
pub fn render_email(item: &SummaryItem, progress: Progress, date: NaiveDate) -> RenderedEmail {
    let subject = format!("📚 Doc Summary [{}]: {}", progress, item.key);
    let body = markdown_to_html(&decorate(&item.content));

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>{css}</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>📚 Daily Documentation Summary</h1>
    <p>{date}</p>
    <div class="progress">📬 Repo {position} of {total}</div>
  </div>
  <div class="content">
    <div class="repo-badge">🔖 Repository: {key}</div>
    <hr class="divider">
{body}
  </div>
  <div class="footer">
    <p>🤖 Auto-generated by stardigest</p>
    <p><a href="{url}">📂 View Repository</a></p>
  </div>
</div>
</body>
</html>
"#,
        css = STYLESHEET,
        date = date.format("%B %d, %Y"),
        position = progress.position,
        total = progress.total,
        key = escape(&item.key),
        body = body,
        url = item.repo_url(),
    );

    let plain = format!(
        "Daily Documentation Summary - {}\nRepo {} of {}: {}\n\n{}\n\nView repository: {}\n",
        date.format("%B %d, %Y"),
        progress.position,
        progress.total,
        item.key,
        item.content.trim_end(),
        item.repo_url(),
    );

    RenderedEmail {
        subject,
        html,
        plain,
    }
}

/// Converts CommonMark (with tables and strikethrough) to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Adds icons to known headings and turns labelled notes into callouts.
fn decorate(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    for line in markdown.lines() {
        out.push_str(&decorate_line(line));
        out.push('\n');
    }
    out
}

fn decorate_line(line: &str) -> String {
    if let Some((_, replacement)) = HEADINGS.iter().find(|(prefix, _)| line.starts_with(prefix)) {
        return replacement.to_string();
    }

    for (marker, class, icon, label) in CALLOUTS {
        if let Some((_, rest)) = line.split_once(marker) {
            // Raw HTML blocks end at a blank line
            return format!(
                "<div class=\"{}\">{} <strong>{}:</strong> {}</div>\n",
                class,
                icon,
                label,
                inline_html(rest.trim())
            );
        }
    }

    line.to_string()
}

/// Renders a single line of inline markdown without the paragraph wrapper.
fn inline_html(text: &str) -> String {
    let rendered = markdown_to_html(text);
    let trimmed = rendered.trim_end();
    trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(trimmed)
        .to_string()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLESHEET: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; line-height: 1.6; color: #333; max-width: 900px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }
.container { background-color: white; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; text-align: center; }
.header h1 { margin: 0; font-size: 28px; font-weight: 600; border: none; color: white; }
.header p { margin: 10px 0 0 0; opacity: 0.9; font-size: 14px; }
.progress { background: rgba(255,255,255,0.2); padding: 8px 16px; border-radius: 20px; font-size: 13px; margin-top: 10px; display: inline-block; }
.content { padding: 40px; }
.repo-badge { display: inline-block; background-color: #f0f0f0; padding: 8px 16px; border-radius: 20px; font-size: 14px; font-weight: 600; margin-bottom: 20px; }
h1 { color: #1a202c; font-size: 24px; margin-top: 30px; padding-bottom: 10px; border-bottom: 3px solid #667eea; }
h2 { color: #2d3748; font-size: 20px; margin-top: 25px; padding-left: 10px; border-left: 4px solid #667eea; }
h3 { color: #4a5568; font-size: 18px; margin-top: 20px; }
h4 { color: #667eea; font-size: 16px; margin-top: 15px; }
li { margin: 8px 0; }
code { background-color: #f7fafc; padding: 2px 6px; border-radius: 3px; font-family: 'Courier New', monospace; font-size: 0.9em; color: #e53e3e; }
pre { background-color: #2d3748; color: #f7fafc; padding: 16px; border-radius: 6px; overflow-x: auto; }
pre code { background-color: transparent; color: inherit; padding: 0; }
blockquote { border-left: 4px solid #667eea; margin: 20px 0; color: #4a5568; background-color: #f7fafc; padding: 15px 20px; }
.info-box { background-color: #ebf8ff; border-left: 4px solid #4299e1; padding: 15px; margin: 15px 0; border-radius: 4px; }
.warning-box { background-color: #fffaf0; border-left: 4px solid #f6ad55; padding: 15px; margin: 15px 0; border-radius: 4px; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #e2e8f0; }
th { background-color: #f7fafc; font-weight: 600; }
.divider { height: 2px; background: linear-gradient(to right, transparent, #667eea, transparent); margin: 30px 0; border: none; }
.footer { background-color: #f7fafc; padding: 20px 40px; text-align: center; color: #718096; font-size: 14px; border-top: 1px solid #e2e8f0; }
.footer a { color: #667eea; text-decoration: none; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(content: &str) -> SummaryItem {
        SummaryItem::new("tokio-rs_tokio", content, Utc::now())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_subject_carries_progress() {
        let email = render_email(&item("# T"), Progress { position: 3, total: 40 }, date());
        assert_eq!(email.subject, "📚 Doc Summary [3/40]: tokio-rs_tokio");
    }

    #[test]
    fn test_html_wraps_rendered_markdown() {
        let email = render_email(
            &item("# Title\n\nSome **bold** text.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n"),
            Progress { position: 1, total: 2 },
            date(),
        );

        assert!(email.html.contains("<h1>Title</h1>"));
        assert!(email.html.contains("<strong>bold</strong>"));
        assert!(email.html.contains("<table>"));
        assert!(email.html.contains("Repo 1 of 2"));
        assert!(email.html.contains("March 09, 2026"));
        assert!(email.html.contains("https://github.com/tokio-rs/tokio"));
    }

    #[test]
    fn test_plain_alternative_keeps_markdown() {
        let email = render_email(
            &item("# Title\n\nBody"),
            Progress { position: 2, total: 5 },
            date(),
        );
        assert!(email.plain.contains("Repo 2 of 5: tokio-rs_tokio"));
        assert!(email.plain.contains("# Title\n\nBody"));
        assert!(!email.plain.contains('<'));
    }

    #[test]
    fn test_known_headings_are_decorated() {
        let out = decorate("## 1. Project Overview\n### Major Features\n## Other");
        assert_eq!(
            out,
            "## 🎯 Project Overview & Purpose\n### 🚀 Major Features\n## Other\n"
        );
    }

    #[test]
    fn test_callouts_render_inline_markdown() {
        let html = markdown_to_html(&decorate("- **Limitations**: needs `tokio`\n"));
        assert!(html.contains(
            r#"<div class="warning-box">⚠️ <strong>Limitations:</strong> needs <code>tokio</code></div>"#
        ));
    }

    #[test]
    fn test_key_is_escaped() {
        let mut summary = item("x");
        summary.key = "a_<b>".into();
        let email = render_email(&summary, Progress { position: 1, total: 1 }, date());
        assert!(email.html.contains("Repository: a_&lt;b&gt;"));
    }
}
