//! Splitting long messages to fit the Bot API limit.

/// Maximum length of one Bot API text message.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Room kept free in each chunk for the part label.
const LABEL_RESERVE: usize = 48;

const PRE_OPEN: &str = "<pre>";
const PRE_CLOSE: &str = "</pre>";

/// Length as Telegram counts it, in UTF-16 code units.
pub fn text_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Splits `text` into labelled parts that each fit in one message.
///
/// Text that already fits is returned as a single unlabelled part.
pub fn into_parts(text: &str, max_len: usize) -> Vec<String> {
    if text_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let chunks = split_message(text, max_len.saturating_sub(LABEL_RESERVE));
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let label = if i == 0 {
                format!("📄 <b>Part {}/{}</b>", i + 1, total)
            } else {
                format!("📄 <b>Part {}/{} (continued)</b>", i + 1, total)
            };
            format!("{}\n\n{}", label, chunk)
        })
        .collect()
}

/// Splits `text` on line boundaries into chunks of at most `max_len`.
///
/// Lines longer than a chunk are cut, preferring whitespace and never
/// inside a tag or entity. A `<pre>` block cut across chunks is closed at
/// the end of one chunk and reopened at the start of the next.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text_len(text) <= max_len {
        return vec![text.to_string()];
    }

    let budget = max_len
        .saturating_sub(PRE_OPEN.len() + PRE_CLOSE.len() + 1)
        .max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut has_content = false;
    let mut in_pre = false;

    for line in text.split('\n') {
        for piece in hard_wrap(line, budget) {
            let closing = if in_pre { PRE_CLOSE.len() } else { 0 };
            if has_content && text_len(&current) + text_len(&piece) + 1 + closing > max_len {
                let mut done = current.trim_end_matches('\n').to_string();
                if in_pre {
                    done.push_str(PRE_CLOSE);
                }
                chunks.push(done);
                current = if in_pre {
                    PRE_OPEN.to_string()
                } else {
                    String::new()
                };
            }

            current.push_str(&piece);
            current.push('\n');
            has_content = true;

            if piece.starts_with(PRE_OPEN) {
                in_pre = true;
            }
            if piece.ends_with(PRE_CLOSE) {
                in_pre = false;
            }
        }
    }

    let last = current.trim_end_matches('\n');
    if !last.trim().is_empty() {
        chunks.push(last.to_string());
    }
    chunks
}

/// Cuts one line into pieces of at most `budget` code units.
///
/// Inline tags still open at a cut are closed at the end of the piece and
/// reopened at the start of the next one, so every piece parses on its own.
fn hard_wrap(line: &str, budget: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut rest = line;

    loop {
        let reopen = open.concat();
        if text_len(&reopen) + text_len(rest) <= budget {
            pieces.push(reopen + rest);
            return pieces;
        }

        let mut room = budget.saturating_sub(text_len(&reopen)).max(1);
        let (cut, still_open) = loop {
            let cut = safe_cut(rest, room);
            let mut still_open = open.clone();
            track_inline_tags(&rest[..cut], &mut still_open);
            let len = text_len(&reopen) + text_len(&rest[..cut]) + closing_len(&still_open);
            if len <= budget || room == 1 {
                break (cut, still_open);
            }
            room = room.saturating_sub(len - budget).max(1);
        };

        let mut piece = reopen;
        piece.push_str(&rest[..cut]);
        for tag in still_open.iter().rev() {
            piece.push_str(&closing_tag(tag));
        }
        pieces.push(piece);

        open = still_open;
        rest = &rest[cut..];
    }
}

/// Updates `open` with the inline tags opened and closed in `s`.
///
/// `<pre>` is handled per chunk by [`split_message`] and ignored here.
fn track_inline_tags<'a>(s: &'a str, open: &mut Vec<&'a str>) {
    let mut rest = s;
    while let Some(lt) = rest.find('<') {
        let Some(len) = rest[lt..].find('>') else {
            return;
        };
        let tag = &rest[lt..=lt + len];
        rest = &rest[lt + len + 1..];

        if let Some(name) = tag.strip_prefix("</") {
            let name = tag_name(name);
            if let Some(pos) = open.iter().rposition(|t| tag_name(&t[1..]) == name) {
                open.remove(pos);
            }
        } else if tag_name(&tag[1..]) != "pre" {
            open.push(tag);
        }
    }
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(s.len());
    &s[..end]
}

fn closing_tag(open_tag: &str) -> String {
    format!("</{}>", tag_name(&open_tag[1..]))
}

fn closing_len(open: &[&str]) -> usize {
    open.iter().map(|tag| text_len(&closing_tag(tag))).sum()
}

/// Byte offset at which to cut `s` so the head fits in `budget`.
fn safe_cut(s: &str, budget: usize) -> usize {
    let mut units = 0;
    let mut end = 0;
    for (i, c) in s.char_indices() {
        if units + c.len_utf16() > budget {
            break;
        }
        units += c.len_utf16();
        end = i + c.len_utf8();
    }
    if end == 0 {
        // Always make progress
        return s.chars().next().map_or(s.len(), char::len_utf8);
    }

    let head = &s[..end];
    let mut cut = end;
    if let Some(lt) = head.rfind('<') {
        if !head[lt..].contains('>') {
            cut = lt;
        }
    }
    if let Some(amp) = head[..cut].rfind('&') {
        if !head[amp..cut].contains(';') {
            cut = amp;
        }
    }
    if let Some(space) = head[..cut].rfind(' ') {
        if space > cut / 2 {
            cut = space + 1;
        }
    }

    if cut > 0 {
        return cut;
    }
    // A leading tag or entity is taken whole, even past the budget
    let close = match s.as_bytes().first() {
        Some(b'<') => s.find('>'),
        Some(b'&') => s.find(';'),
        _ => None,
    };
    close.map_or(end, |i| i + 1)
}
