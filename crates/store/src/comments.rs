//! Formatting sidecar for YAML round trips
//!
//! `scan` walks the raw YAML text once and records, keyed by dotted path,
//! the leading comment block above each entry (blank lines included, stored
//! as empty strings), any inline comment after a value, and the scalar
//! presentation style. The emitter consults the sidecar to reproduce the
//! original layout for every path that still exists after editing.
//!
//! The scan is line-based and best-effort: block mappings/sequences, quoted
//! scalars, block scalars, and single-line flow collections are understood;
//! exotic constructs are skipped without losing the parsed value (the value
//! tree always comes from the YAML parser, never from this scan).

use std::collections::HashMap;

use llamafarm_core::path;

/// Scalar presentation observed in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    SingleQuoted,
    DoubleQuoted,
    /// Literal block scalar (`|`)
    Literal,
    /// Folded block scalar (`>`); re-emitted as literal
    Folded,
    /// Key written with no value (parses as null)
    Empty,
}

/// Comments, blank lines, and scalar styles keyed by dotted path
#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    leading: HashMap<String, Vec<String>>,
    inline: HashMap<String, String>,
    trailing: Vec<String>,
    styles: HashMap<String, ScalarStyle>,
}

impl CommentMap {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty()
            && self.inline.is_empty()
            && self.trailing.is_empty()
            && self.styles.is_empty()
    }

    /// Comment lines (and blank-line markers) directly above a path
    pub fn leading(&self, path: &str) -> Option<&[String]> {
        self.leading.get(path).map(|v| v.as_slice())
    }

    /// Comment trailing the value on the same line
    pub fn inline(&self, path: &str) -> Option<&str> {
        self.inline.get(path).map(|s| s.as_str())
    }

    /// Comment lines after the last entry of the document
    pub fn trailing(&self) -> &[String] {
        &self.trailing
    }

    pub fn style(&self, path: &str) -> Option<ScalarStyle> {
        self.styles.get(path).copied()
    }
}

#[derive(Debug)]
enum FrameKind {
    Mapping,
    Sequence { next_index: usize },
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    path: String,
    kind: FrameKind,
}

impl Frame {
    fn is_sequence(&self) -> bool {
        matches!(self.kind, FrameKind::Sequence { .. })
    }
}

#[derive(Debug)]
struct OpenKey {
    indent: usize,
    path: String,
    /// True when the open node is a bare sequence element (`-` alone)
    is_elem: bool,
}

/// Scan raw YAML text into a formatting sidecar
pub fn scan(text: &str) -> CommentMap {
    let mut map = CommentMap::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending: Vec<String> = Vec::new();
    let mut open_key: Option<OpenKey> = None;
    // Indent of the entry that opened a block scalar; its body is skipped
    let mut block_indent: Option<usize> = None;
    // Open bracket/brace depth of a flow collection spanning lines
    let mut flow_depth: i32 = 0;

    for raw_line in text.lines() {
        let stripped = raw_line.trim_start_matches(' ');
        let indent = raw_line.len() - stripped.len();
        let content = stripped.trim_end();

        if let Some(open) = block_indent {
            if content.is_empty() || indent > open {
                continue;
            }
            block_indent = None;
        }
        if flow_depth > 0 {
            flow_depth += flow_balance(content);
            continue;
        }
        if content.is_empty() {
            pending.push(String::new());
            continue;
        }
        if content.starts_with('#') {
            pending.push(content.to_string());
            continue;
        }

        let line_is_dash = content == "-" || content.starts_with("- ");

        // An open key with no deeper content had an empty value. A dash at
        // the key's own indent still belongs to it (zero-indented sequence).
        if let Some(open) = &open_key {
            let owns_dash = line_is_dash && !open.is_elem && indent == open.indent;
            if indent <= open.indent && !owns_dash {
                map.styles.insert(open.path.clone(), ScalarStyle::Empty);
                open_key = None;
            }
        }

        while stack.last().map_or(false, |f| f.indent > indent) {
            stack.pop();
        }
        if !line_is_dash && stack.last().map_or(false, |f| f.indent == indent && f.is_sequence()) {
            stack.pop();
        }

        let mut cur_indent = indent;
        let mut cur = content;

        // Descend through sequence dashes, which may chain on one line.
        let mut handled = false;
        while cur == "-" || cur.starts_with("- ") {
            let elem_path = enter_sequence_item(&mut stack, cur_indent, &mut open_key);
            flush_pending(&mut map, &mut pending, &elem_path);

            if cur == "-" {
                open_key = Some(OpenKey {
                    indent: cur_indent,
                    path: elem_path,
                    is_elem: true,
                });
                handled = true;
                break;
            }
            let after = &cur[2..];
            let pad = after.len() - after.trim_start_matches(' ').len();
            cur_indent += 2 + pad;
            cur = &after[pad..];

            if cur == "-" || cur.starts_with("- ") {
                // Nested sequence folded onto the same line
                stack.push(Frame {
                    indent: cur_indent,
                    path: elem_path,
                    kind: FrameKind::Sequence { next_index: 0 },
                });
                continue;
            }
            if split_key(cur).is_some() {
                // Mapping entry folded onto the dash line
                stack.push(Frame {
                    indent: cur_indent,
                    path: elem_path,
                    kind: FrameKind::Mapping,
                });
                break;
            }
            // Scalar sequence element
            record_scalar(
                &mut map,
                &elem_path,
                cur,
                cur_indent,
                &mut block_indent,
                &mut flow_depth,
            );
            handled = true;
            break;
        }
        if handled {
            continue;
        }

        let Some((key, rest)) = split_key(cur) else {
            // Not a mapping entry (multiline plain scalar or similar); the
            // parser owns the value, nothing to record.
            continue;
        };

        let parent = match stack.last() {
            Some(top) if top.indent == cur_indent => top.path.clone(),
            _ => {
                // Opening a nested mapping under the last open key
                let p = open_key.take().map(|o| o.path).unwrap_or_default();
                stack.push(Frame {
                    indent: cur_indent,
                    path: p.clone(),
                    kind: FrameKind::Mapping,
                });
                p
            }
        };

        let entry_path = path::join(&parent, &key);
        flush_pending(&mut map, &mut pending, &entry_path);

        let (value, comment) = split_inline_comment(rest);
        if let Some(c) = comment {
            map.inline.insert(entry_path.clone(), c.to_string());
        }
        let value = value.trim();
        if value.is_empty() {
            open_key = Some(OpenKey {
                indent: cur_indent,
                path: entry_path,
                is_elem: false,
            });
        } else {
            record_scalar_value(
                &mut map,
                &entry_path,
                value,
                cur_indent,
                &mut block_indent,
                &mut flow_depth,
            );
        }
    }

    if let Some(open) = &open_key {
        map.styles.insert(open.path.clone(), ScalarStyle::Empty);
    }
    while pending.last().map_or(false, |l| l.is_empty()) {
        pending.pop();
    }
    map.trailing = pending;
    map
}

fn enter_sequence_item(
    stack: &mut Vec<Frame>,
    indent: usize,
    open_key: &mut Option<OpenKey>,
) -> String {
    let reuse = stack
        .last()
        .map_or(false, |f| f.indent == indent && f.is_sequence());
    if !reuse {
        let parent = open_key.take().map(|o| o.path).unwrap_or_default();
        stack.push(Frame {
            indent,
            path: parent,
            kind: FrameKind::Sequence { next_index: 0 },
        });
    }
    match stack.last_mut() {
        Some(Frame {
            kind: FrameKind::Sequence { next_index },
            path,
            ..
        }) => {
            let idx = *next_index;
            *next_index += 1;
            path::index(path, idx)
        }
        _ => path::index("", 0),
    }
}

fn flush_pending(map: &mut CommentMap, pending: &mut Vec<String>, entry_path: &str) {
    if !pending.is_empty() {
        map.leading
            .insert(entry_path.to_string(), std::mem::take(pending));
    }
}

fn record_scalar(
    map: &mut CommentMap,
    entry_path: &str,
    raw: &str,
    indent: usize,
    block_indent: &mut Option<usize>,
    flow_depth: &mut i32,
) {
    let (value, comment) = split_inline_comment(raw);
    if let Some(c) = comment {
        map.inline.insert(entry_path.to_string(), c.to_string());
    }
    let value = value.trim();
    if !value.is_empty() {
        record_scalar_value(map, entry_path, value, indent, block_indent, flow_depth);
    }
}

fn record_scalar_value(
    map: &mut CommentMap,
    entry_path: &str,
    value: &str,
    indent: usize,
    block_indent: &mut Option<usize>,
    flow_depth: &mut i32,
) {
    match value.chars().next() {
        Some('"') => {
            map.styles
                .insert(entry_path.to_string(), ScalarStyle::DoubleQuoted);
        }
        Some('\'') => {
            map.styles
                .insert(entry_path.to_string(), ScalarStyle::SingleQuoted);
        }
        Some('|') => {
            map.styles
                .insert(entry_path.to_string(), ScalarStyle::Literal);
            *block_indent = Some(indent);
        }
        Some('>') => {
            map.styles
                .insert(entry_path.to_string(), ScalarStyle::Folded);
            *block_indent = Some(indent);
        }
        Some('{') | Some('[') => {
            let depth = flow_balance(value);
            if depth > 0 {
                *flow_depth = depth;
            }
        }
        _ => {}
    }
}

/// Split a `key: value` line into key and the text after the colon.
/// Returns `None` when the line is not a mapping entry.
fn split_key(content: &str) -> Option<(String, &str)> {
    if let Some(stripped) = content.strip_prefix('"') {
        let end = stripped.find('"')?;
        let rest = stripped[end + 1..].strip_prefix(':')?;
        return Some((stripped[..end].to_string(), rest));
    }
    if let Some(stripped) = content.strip_prefix('\'') {
        let end = stripped.find('\'')?;
        let rest = stripped[end + 1..].strip_prefix(':')?;
        return Some((stripped[..end].to_string(), rest));
    }
    for (i, c) in content.char_indices() {
        if c == ':' {
            let next = content[i + 1..].chars().next();
            if next.is_none() || next == Some(' ') {
                return Some((content[..i].trim_end().to_string(), &content[i + 1..]));
            }
        }
    }
    None
}

/// Split an inline comment off a value, honoring quoting. A `#` starts a
/// comment only at the start of the value or after whitespace.
fn split_inline_comment(raw: &str) -> (&str, Option<&str>) {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev_is_space = true;
    for (i, c) in raw.char_indices() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && prev_is_space => {
                return (raw[..i].trim_end(), Some(raw[i..].trim_end()));
            }
            _ => {}
        }
        prev_is_space = c == ' ' || c == '\t';
    }
    (raw.trim_end(), None)
}

/// Net bracket/brace depth change of a line, outside quotes
fn flow_balance(line: &str) -> i32 {
    let mut depth = 0;
    let mut in_single = false;
    let mut in_double = false;
    for c in line.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '{' | '[' if !in_single && !in_double => depth += 1,
            '}' | ']' if !in_single && !in_double => depth -= 1,
            '#' if !in_single && !in_double => break,
            _ => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_and_inline_comments() {
        let yaml = "\
# Project header
version: v1
name: demo  # project name
";
        let map = scan(yaml);
        assert_eq!(
            map.leading("version").unwrap(),
            &["# Project header".to_string()]
        );
        assert_eq!(map.inline("name"), Some("# project name"));
        assert!(map.leading("name").is_none());
    }

    #[test]
    fn test_blank_lines_recorded_as_markers() {
        let yaml = "\
version: v1

# runtime section
runtime:
  provider: ollama
";
        let map = scan(yaml);
        assert_eq!(
            map.leading("runtime").unwrap(),
            &[String::new(), "# runtime section".to_string()]
        );
    }

    #[test]
    fn test_nested_and_sequence_paths() {
        let yaml = "\
rag:
  databases:
    # primary store
    - name: main_db
      type: chroma  # backend
    - name: side_db
      type: qdrant
";
        let map = scan(yaml);
        assert_eq!(
            map.leading("rag.databases.0").unwrap(),
            &["# primary store".to_string()]
        );
        assert_eq!(map.inline("rag.databases.0.type"), Some("# backend"));
        assert!(map.leading("rag.databases.1").is_none());
    }

    #[test]
    fn test_scalar_styles() {
        let yaml = "\
single: 'quoted'
double: \"also quoted\"
plain: bare
block: |
  first
  second
empty_key:
";
        let map = scan(yaml);
        assert_eq!(map.style("single"), Some(ScalarStyle::SingleQuoted));
        assert_eq!(map.style("double"), Some(ScalarStyle::DoubleQuoted));
        assert_eq!(map.style("plain"), None);
        assert_eq!(map.style("block"), Some(ScalarStyle::Literal));
        assert_eq!(map.style("empty_key"), Some(ScalarStyle::Empty));
    }

    #[test]
    fn test_block_scalar_body_is_not_scanned() {
        let yaml = "\
content: |
  looks_like_a: key
  # not a comment
after: done
";
        let map = scan(yaml);
        assert!(map.style("content.looks_like_a").is_none());
        assert!(map.leading("after").is_none());
        assert_eq!(map.style("content"), Some(ScalarStyle::Literal));
    }

    #[test]
    fn test_trailing_comments() {
        let yaml = "\
version: v1
# the end
";
        let map = scan(yaml);
        assert_eq!(map.trailing(), &["# the end".to_string()]);
    }

    #[test]
    fn test_hash_inside_quotes_is_value() {
        let yaml = "name: \"not # a comment\"\n";
        let map = scan(yaml);
        assert!(map.inline("name").is_none());
        assert_eq!(map.style("name"), Some(ScalarStyle::DoubleQuoted));
    }

    #[test]
    fn test_scalar_sequence_elements() {
        let yaml = "\
prompts:
  - greeting  # primary
  - farewell
";
        let map = scan(yaml);
        assert_eq!(map.inline("prompts.0"), Some("# primary"));
        assert!(map.inline("prompts.1").is_none());
    }

    #[test]
    fn test_zero_indented_sequence() {
        let yaml = "\
databases:
- name: a
- name: b
other: 1
";
        let map = scan(yaml);
        // No Empty style: the dashes belong to the key
        assert!(map.style("databases").is_none());
        assert!(map.style("other").is_none());
    }
}
