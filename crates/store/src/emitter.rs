//! YAML emission with formatting sidecar applied
//!
//! Writes a value tree back to text, replaying the leading comments, blank
//! lines, inline comments, and scalar styles recorded for each dotted path.
//! Paths that were edited or added since the scan simply emit in the default
//! style; paths that were removed drop their comments with them.

use serde_json::Value as JsonValue;

use llamafarm_core::path;

use crate::comments::{CommentMap, ScalarStyle};

const INDENT: usize = 2;

/// Render a value tree to YAML text, applying the sidecar
pub fn emit(value: &JsonValue, sidecar: &CommentMap) -> String {
    let mut out = String::new();
    match value {
        JsonValue::Object(obj) if !obj.is_empty() => {
            emit_mapping(&mut out, obj, 0, "", sidecar);
        }
        JsonValue::Array(items) if !items.is_empty() => {
            emit_sequence(&mut out, items, 0, "", sidecar);
        }
        other => {
            emit_scalar_line(&mut out, other, 0, "", sidecar);
        }
    }
    for line in sidecar.trailing() {
        push_comment_line(&mut out, 0, line);
    }
    out
}

fn emit_mapping(
    out: &mut String,
    obj: &serde_json::Map<String, JsonValue>,
    indent: usize,
    parent: &str,
    sidecar: &CommentMap,
) {
    for (key, value) in obj {
        let entry_path = path::join(parent, key);
        if let Some(lines) = sidecar.leading(&entry_path) {
            for line in lines {
                push_comment_line(out, indent, line);
            }
        }
        emit_entry(out, key, value, indent, &entry_path, sidecar, None);
    }
}

/// Write one `key: value` entry. When `dash_at` is set, the first line is
/// prefixed with `- ` at that column instead of plain indentation (a mapping
/// entry folded onto a sequence dash).
fn emit_entry(
    out: &mut String,
    key: &str,
    value: &JsonValue,
    indent: usize,
    entry_path: &str,
    sidecar: &CommentMap,
    dash_at: Option<usize>,
) {
    let first_prefix = match dash_at {
        Some(col) => format!("{}- ", " ".repeat(col)),
        None => " ".repeat(indent),
    };
    let inline = sidecar.inline(entry_path);

    match value {
        JsonValue::Object(obj) if !obj.is_empty() => {
            push_key_line(out, &first_prefix, key, None, inline);
            emit_mapping(out, obj, indent + INDENT, entry_path, sidecar);
        }
        JsonValue::Array(items) if !items.is_empty() => {
            push_key_line(out, &first_prefix, key, None, inline);
            emit_sequence(out, items, indent + INDENT, entry_path, sidecar);
        }
        JsonValue::Object(_) => {
            push_key_line(out, &first_prefix, key, Some("{}"), inline);
        }
        JsonValue::Array(_) => {
            push_key_line(out, &first_prefix, key, Some("[]"), inline);
        }
        JsonValue::Null if sidecar.style(entry_path) == Some(ScalarStyle::Empty) => {
            push_key_line(out, &first_prefix, key, None, inline);
        }
        scalar => match render_scalar(scalar, sidecar.style(entry_path)) {
            Rendered::Inline(text) => {
                push_key_line(out, &first_prefix, key, Some(&text), inline);
            }
            Rendered::Block { header, lines } => {
                push_key_line(out, &first_prefix, key, Some(&header), inline);
                for line in &lines {
                    push_block_line(out, indent + INDENT, line);
                }
            }
        },
    }
}

fn emit_sequence(
    out: &mut String,
    items: &[JsonValue],
    indent: usize,
    parent: &str,
    sidecar: &CommentMap,
) {
    for (idx, item) in items.iter().enumerate() {
        let elem_path = path::index(parent, idx);
        if let Some(lines) = sidecar.leading(&elem_path) {
            for line in lines {
                push_comment_line(out, indent, line);
            }
        }
        match item {
            JsonValue::Object(obj) if !obj.is_empty() => {
                emit_sequence_object(out, obj, indent, &elem_path, sidecar);
            }
            JsonValue::Array(inner) if !inner.is_empty() => {
                out.push_str(&" ".repeat(indent));
                out.push_str("-\n");
                emit_sequence(out, inner, indent + INDENT, &elem_path, sidecar);
            }
            JsonValue::Object(_) => {
                push_dash_scalar(out, indent, "{}", sidecar.inline(&elem_path));
            }
            JsonValue::Array(_) => {
                push_dash_scalar(out, indent, "[]", sidecar.inline(&elem_path));
            }
            JsonValue::Null if sidecar.style(&elem_path) == Some(ScalarStyle::Empty) => {
                push_dash_scalar(out, indent, "", sidecar.inline(&elem_path));
            }
            scalar => match render_scalar(scalar, sidecar.style(&elem_path)) {
                Rendered::Inline(text) => {
                    push_dash_scalar(out, indent, &text, sidecar.inline(&elem_path));
                }
                Rendered::Block { header, lines } => {
                    push_dash_scalar(out, indent, &header, sidecar.inline(&elem_path));
                    for line in &lines {
                        push_block_line(out, indent + INDENT, line);
                    }
                }
            },
        }
    }
}

/// Sequence item that is a mapping: fold the first entry onto the dash
/// unless its own leading comments would be displaced.
fn emit_sequence_object(
    out: &mut String,
    obj: &serde_json::Map<String, JsonValue>,
    indent: usize,
    elem_path: &str,
    sidecar: &CommentMap,
) {
    let first_has_comments = obj
        .keys()
        .next()
        .map_or(false, |k| sidecar.leading(&path::join(elem_path, k)).is_some());
    if first_has_comments {
        out.push_str(&" ".repeat(indent));
        out.push_str("-\n");
        emit_mapping(out, obj, indent + INDENT, elem_path, sidecar);
        return;
    }
    for (pos, (key, value)) in obj.iter().enumerate() {
        let entry_path = path::join(elem_path, key);
        if pos == 0 {
            emit_entry(
                out,
                key,
                value,
                indent + INDENT,
                &entry_path,
                sidecar,
                Some(indent),
            );
        } else {
            if let Some(lines) = sidecar.leading(&entry_path) {
                for line in lines {
                    push_comment_line(out, indent + INDENT, line);
                }
            }
            emit_entry(out, key, value, indent + INDENT, &entry_path, sidecar, None);
        }
    }
}

fn emit_scalar_line(
    out: &mut String,
    value: &JsonValue,
    indent: usize,
    entry_path: &str,
    sidecar: &CommentMap,
) {
    match render_scalar(value, sidecar.style(entry_path)) {
        Rendered::Inline(text) => {
            out.push_str(&" ".repeat(indent));
            out.push_str(&text);
            out.push('\n');
        }
        Rendered::Block { header, lines } => {
            out.push_str(&" ".repeat(indent));
            out.push_str(&header);
            out.push('\n');
            for line in &lines {
                push_block_line(out, indent + INDENT, line);
            }
        }
    }
}

enum Rendered {
    Inline(String),
    Block { header: String, lines: Vec<String> },
}

fn render_scalar(value: &JsonValue, style: Option<ScalarStyle>) -> Rendered {
    match value {
        JsonValue::String(s) => render_string(s, style),
        JsonValue::Bool(b) => Rendered::Inline(b.to_string()),
        JsonValue::Number(n) => Rendered::Inline(n.to_string()),
        JsonValue::Null => Rendered::Inline("null".to_string()),
        // Containers are handled by the callers
        other => Rendered::Inline(other.to_string()),
    }
}

fn render_string(s: &str, style: Option<ScalarStyle>) -> Rendered {
    if s.contains('\n') {
        return render_block(s).unwrap_or_else(|| Rendered::Inline(quote_double(s)));
    }
    match style {
        Some(ScalarStyle::DoubleQuoted) => Rendered::Inline(quote_double(s)),
        Some(ScalarStyle::SingleQuoted) if single_quotable(s) => {
            Rendered::Inline(format!("'{}'", s.replace('\'', "''")))
        }
        Some(ScalarStyle::Literal) | Some(ScalarStyle::Folded) if block_safe_line(s) => {
            Rendered::Block {
                header: "|-".to_string(),
                lines: vec![s.to_string()],
            }
        }
        _ => {
            if plain_safe(s) {
                Rendered::Inline(s.to_string())
            } else {
                Rendered::Inline(quote_double(s))
            }
        }
    }
}

/// Multiline string as a literal block scalar. The chomping indicator
/// matches the trailing newline count; `None` when the body cannot survive
/// a block round trip.
fn render_block(s: &str) -> Option<Rendered> {
    let content = s.trim_end_matches('\n');
    let trailing = s.len() - content.len();
    let header = match trailing {
        0 => "|-",
        1 => "|",
        _ => "|+",
    };
    let mut lines: Vec<String> = content.split('\n').map(|l| l.to_string()).collect();
    if lines.iter().any(|l| !block_safe_line(l)) {
        return None;
    }
    for _ in 1..trailing {
        lines.push(String::new());
    }
    Some(Rendered::Block {
        header: header.to_string(),
        lines,
    })
}

/// A line that keeps its exact bytes inside an indented literal block
fn block_safe_line(line: &str) -> bool {
    !line.starts_with(' ') && !line.starts_with('\t') && !line.ends_with(' ') && !line.contains('\r')
}

fn single_quotable(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || !c.is_control())
}

/// Whether a string survives plain (unquoted) emission unchanged
fn plain_safe(s: &str) -> bool {
    if s.is_empty() || s.starts_with(' ') || s.ends_with(' ') {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') || s.contains('\t') {
        return false;
    }
    let lowered = s.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return false;
    }
    if s.parse::<f64>().is_ok() {
        return false;
    }
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    match first {
        '&' | '*' | '!' | '|' | '>' | '%' | '@' | '`' | '"' | '\'' | '#' | ',' | '[' | ']'
        | '{' | '}' => false,
        '-' | ':' | '?' => !matches!(chars.next(), None | Some(' ')),
        _ => true,
    }
}

fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn push_comment_line(out: &mut String, indent: usize, line: &str) {
    if line.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&" ".repeat(indent));
        out.push_str(line);
        out.push('\n');
    }
}

fn push_key_line(
    out: &mut String,
    first_prefix: &str,
    key: &str,
    value: Option<&str>,
    inline: Option<&str>,
) {
    out.push_str(first_prefix);
    out.push_str(&render_key(key));
    out.push(':');
    if let Some(v) = value {
        out.push(' ');
        out.push_str(v);
    }
    if let Some(c) = inline {
        out.push_str("  ");
        out.push_str(c);
    }
    out.push('\n');
}

fn push_dash_scalar(out: &mut String, indent: usize, value: &str, inline: Option<&str>) {
    out.push_str(&" ".repeat(indent));
    out.push('-');
    if !value.is_empty() {
        out.push(' ');
        out.push_str(value);
    }
    if let Some(c) = inline {
        out.push_str("  ");
        out.push_str(c);
    }
    out.push('\n');
}

fn push_block_line(out: &mut String, indent: usize, line: &str) {
    if line.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&" ".repeat(indent));
        out.push_str(line);
        out.push('\n');
    }
}

fn render_key(key: &str) -> String {
    if plain_safe(key) && !key.contains(':') && !key.contains('#') {
        key.to_string()
    } else {
        quote_double(key)
    }
}
