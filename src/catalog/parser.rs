//! Front matter parser for agent and skill markdown files.

use crate::error::ParseError;
use serde_yaml::Value;
use std::collections::HashMap;

const DELIMITER: &str = "---";

/// Parsed value of a front matter key
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    List(Vec<String>),
    /// Nested mappings and anything else the rules don't inspect
    Other,
}

/// A front matter entry: its parsed value plus the source text after `key:`
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub value: FieldValue,
    pub raw: String,
}

impl Field {
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the source value is written as a single-quoted YAML scalar
    pub fn is_single_quoted(&self) -> bool {
        self.raw.starts_with('\'')
    }
}

/// Ordered front matter mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Vec<(String, Field)>,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Text value of a key, if present and a scalar
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Field::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Document split into front matter and body
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Split a markdown file into its `---` delimited block and the body after it
fn split_block(content: &str) -> Result<(&str, &str), ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let first = lines.next().ok_or(ParseError::MissingBlock)?;
    if trim_eol(first) != DELIMITER {
        return Err(ParseError::MissingBlock);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if trim_eol(line) == DELIMITER {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(ParseError::MissingBlock)
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// Source text of each top-level key's value.
///
/// A value that starts on the line after `key:` is taken from the first
/// non-blank, indented continuation line.
fn raw_values(block: &str) -> HashMap<String, String> {
    let lines: Vec<&str> = block.lines().collect();
    let mut raw = HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with(|c: char| c.is_whitespace() || c == '#' || c == '-') {
            continue;
        }
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches(|c| c == '"' || c == '\'');
        let mut value = rest.trim();
        if value.is_empty() {
            value = lines[i + 1..]
                .iter()
                .take_while(|l| l.trim().is_empty() || l.starts_with(char::is_whitespace))
                .map(|l| l.trim())
                .find(|l| !l.is_empty() && !l.starts_with('#'))
                .unwrap_or_default();
        }
        raw.entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }
    raw
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Sequence(items) => {
            FieldValue::List(items.iter().filter_map(scalar_text).collect())
        }
        other => scalar_text(other)
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Other),
    }
}

/// Parse only the front matter of a document
pub fn parse_front_matter(content: &str) -> Result<FrontMatter, ParseError> {
    parse_document(content).map(|doc| doc.front_matter)
}

/// Parse a complete document into front matter and body
pub fn parse_document(content: &str) -> Result<ParsedDocument, ParseError> {
    let (block, body) = split_block(content)?;

    if block.trim().is_empty() {
        return Ok(ParsedDocument {
            front_matter: FrontMatter::default(),
            body: body.to_string(),
        });
    }

    let value: Value = serde_yaml::from_str(block)
        .map_err(|e| ParseError::MalformedBlock(e.to_string()))?;
    let mapping = match value {
        Value::Mapping(m) => m,
        Value::Null => Default::default(),
        _ => {
            return Err(ParseError::MalformedBlock(
                "top level is not a mapping".to_string(),
            ))
        }
    };

    let mut raw = raw_values(block);
    let mut fields = Vec::with_capacity(mapping.len());
    for (key, value) in mapping.iter() {
        let Value::String(key) = key else {
            return Err(ParseError::MalformedBlock(format!(
                "non-string key {:?}",
                key
            )));
        };
        fields.push((
            key.clone(),
            Field {
                value: field_value(value),
                raw: raw.remove(key).unwrap_or_default(),
            },
        ));
    }

    Ok(ParsedDocument {
        front_matter: FrontMatter { fields },
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter() {
        let content = r#"---
name: drupal-cache-tags
description: 'Cache tag invalidation patterns'
tools:
  - Read
  - Grep
model: sonnet
---

# Cache tags
"#;
        let doc = parse_document(content).unwrap();
        let fm = &doc.front_matter;
        assert_eq!(fm.text("name"), Some("drupal-cache-tags"));
        assert_eq!(fm.text("description"), Some("Cache tag invalidation patterns"));
        assert!(fm.get("description").unwrap().is_single_quoted());
        assert!(!fm.get("name").unwrap().is_single_quoted());
        assert_eq!(
            fm.get("tools").unwrap().value,
            FieldValue::List(vec!["Read".into(), "Grep".into()])
        );
        assert_eq!(fm.keys().collect::<Vec<_>>(), vec!["name", "description", "tools", "model"]);
        assert!(doc.body.contains("# Cache tags"));
    }

    #[test]
    fn test_flow_sequence_tools() {
        let content = "---\ndescription: 'x'\ntools: ['read', 'edit']\n---\n";
        let fm = parse_front_matter(content).unwrap();
        assert_eq!(
            fm.get("tools").unwrap().value,
            FieldValue::List(vec!["read".into(), "edit".into()])
        );
    }

    #[test]
    fn test_value_on_continuation_line() {
        let content = "---\ndescription:\n  'Quoted expert assistant'\ntools:\n  - read\n---\n";
        let fm = parse_front_matter(content).unwrap();
        let desc = fm.get("description").unwrap();
        assert_eq!(desc.as_text(), Some("Quoted expert assistant"));
        assert!(desc.is_single_quoted());

        let fm = parse_front_matter("---\ndescription:\n  Plain expert assistant\n---\n").unwrap();
        assert!(!fm.get("description").unwrap().is_single_quoted());

        // An empty value does not borrow the next key's text
        let fm = parse_front_matter("---\ndescription:\nname: 'x'\n---\n").unwrap();
        assert_eq!(fm.get("description").unwrap().raw, "");
    }

    #[test]
    fn test_double_quoted_is_not_single_quoted() {
        let fm = parse_front_matter("---\ndescription: \"Expert\"\n---\n").unwrap();
        assert_eq!(fm.text("description"), Some("Expert"));
        assert!(!fm.get("description").unwrap().is_single_quoted());
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\nname: x\r\n---\r\nbody\r\n";
        let doc = parse_document(content).unwrap();
        assert_eq!(doc.front_matter.text("name"), Some("x"));
        assert_eq!(doc.body, "body\r\n");
    }

    #[test]
    fn test_missing_block() {
        assert_eq!(
            parse_front_matter("# Just markdown\n").unwrap_err(),
            ParseError::MissingBlock
        );
        assert_eq!(parse_front_matter("").unwrap_err(), ParseError::MissingBlock);
        // Delimiter must be exactly three hyphens
        assert_eq!(
            parse_front_matter("----\nname: x\n----\n").unwrap_err(),
            ParseError::MissingBlock
        );
    }

    #[test]
    fn test_unclosed_block() {
        let content = "---\nname: x\ndescription: 'never closed'\n";
        assert_eq!(parse_front_matter(content).unwrap_err(), ParseError::MissingBlock);
    }

    #[test]
    fn test_malformed_block() {
        let err = parse_front_matter("---\nname: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedBlock(_)));

        let err = parse_front_matter("---\n- just\n- a list\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedBlock(_)));
    }

    #[test]
    fn test_empty_block_is_empty_mapping() {
        let doc = parse_document("---\n---\nbody").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_body_may_contain_delimiters() {
        let content = "---\nname: x\n---\nintro\n---\nmore\n";
        let doc = parse_document(content).unwrap();
        assert_eq!(doc.front_matter.len(), 1);
        assert_eq!(doc.body, "intro\n---\nmore\n");
    }
}
