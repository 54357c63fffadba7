//! Tag parsing for No-Intro style filenames.
//!
//! Filenames follow the convention:
//! ```text
//! Game Name (Region1, Region2) (Rev X) (Beta) [0100ABCD00010000] [1.1]
//! ```
//!
//! Community re-releases usually carry better region/version information in
//! these tags than the original header, so the resolvers consult them first.

use crate::region::Region;

/// A `(parenthesized)` or `[bracketed]` group in a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Paren(String),
    Bracket(String),
}

impl Tag {
    pub fn content(&self) -> &str {
        match self {
            Tag::Paren(s) | Tag::Bracket(s) => s,
        }
    }
}

/// Split a name into the base title and its sequence of tags.
pub fn extract_title_and_tags(name: &str) -> (String, Vec<Tag>) {
    let mut tags = Vec::new();
    let mut title_end = None;
    let mut chars = name.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let (open, close, make_tag): (char, char, fn(String) -> Tag) = match ch {
            '(' => ('(', ')', Tag::Paren),
            '[' => ('[', ']', Tag::Bracket),
            _ => continue,
        };

        if title_end.is_none() {
            title_end = Some(i);
        }

        let mut depth = 1u32;
        let start = i + open.len_utf8();
        let mut end = name.len();

        for (j, c) in chars.by_ref() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    end = j;
                    break;
                }
            }
        }

        let content = name[start..end].to_string();
        if !content.is_empty() {
            tags.push(make_tag(content));
        }
    }

    let title = match title_end {
        Some(pos) => name[..pos].trim_end().to_string(),
        None => name.trim().to_string(),
    };

    (title, tags)
}

/// Version string from filename tags.
///
/// Special release tags win over numeric ones:
/// `(Beta)` → `beta`, `(Beta 2)` → `beta 2`, `(Virtual Console)` → `vc`,
/// `(Sample)` → `sample`. Otherwise `(Rev 1.1)` → `1.1`, `[1.2]` → `2`.
/// Returns an empty string when nothing matches.
pub fn version_from_filename(stem: &str) -> String {
    let (_, tags) = extract_title_and_tags(stem);

    for tag in &tags {
        if let Tag::Paren(content) = tag {
            if let Some(special) = special_version(content.trim()) {
                return special;
            }
        }
    }

    for tag in &tags {
        if let Tag::Paren(content) = tag {
            if let Some(rev) = revision_number(content.trim()) {
                return rev;
            }
        }
    }

    for tag in &tags {
        if let Tag::Bracket(content) = tag {
            if let Some(minor) = content.trim().strip_prefix("1.") {
                if !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()) {
                    return minor.to_string();
                }
            }
        }
    }

    String::new()
}

fn special_version(content: &str) -> Option<String> {
    let lower = content.to_lowercase();
    match lower.as_str() {
        "beta" => return Some("beta".to_string()),
        "virtual console" => return Some("vc".to_string()),
        "sample" => return Some("sample".to_string()),
        _ => {}
    }
    let n = lower.strip_prefix("beta")?.trim_start();
    if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) {
        return Some(format!("beta {n}"));
    }
    None
}

/// `Rev 1` / `rev 2.3` → `1` / `2.3`.
fn revision_number(content: &str) -> Option<String> {
    let (word, rest) = content.split_once(char::is_whitespace)?;
    if !word.eq_ignore_ascii_case("rev") {
        return None;
    }
    let number = rest.trim();
    let mut parts = number.splitn(2, '.');
    let major = parts.next()?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(major) {
        return None;
    }
    match parts.next() {
        None => Some(number.to_string()),
        Some(minor) if numeric(minor) => Some(number.to_string()),
        Some(_) => None,
    }
}

/// Region from the first parenthesized group only, full names only.
///
/// `"Game (USA, Europe) (Rev 1)"` → `"USA"`.
pub fn region_from_first_group(stem: &str) -> String {
    let (_, tags) = extract_title_and_tags(stem);
    tags.iter()
        .find_map(|t| match t {
            Tag::Paren(content) => Some(content),
            Tag::Bracket(_) => None,
        })
        .and_then(|content| {
            content
                .split(',')
                .find_map(|part| Region::from_full_name(part.trim()))
        })
        .map(|r| r.name().to_string())
        .unwrap_or_default()
}

/// Region from any group, accepting full names and abbreviations.
///
/// `"Game [JPN]"` → `"Japan"`, `"Game (En,Fr) (E)"` → `"Europe"`.
pub fn region_from_filename(stem: &str) -> String {
    let (_, tags) = extract_title_and_tags(stem);
    tags.iter()
        .flat_map(|t| t.content().split(','))
        .find_map(|part| Region::from_tag(part.trim()))
        .map(|r| r.name().to_string())
        .unwrap_or_default()
}

/// First `[16 hex digits]` group, uppercased (Switch title-ID convention).
pub fn bracket_title_id(stem: &str) -> Option<String> {
    let (_, tags) = extract_title_and_tags(stem);
    tags.iter().find_map(|t| match t {
        Tag::Bracket(content) if crate::util::is_hex_of_len(content, 16) => {
            Some(content.to_uppercase())
        }
        _ => None,
    })
}

/// Remove every tag group and normalize whitespace; falls back to the input
/// when nothing would remain.
pub fn strip_tags(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut depth = 0u32;
    for c in stem.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    let cleaned = out.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        stem.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[path = "tests/name_tags_tests.rs"]
mod tests;
