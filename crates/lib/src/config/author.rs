//! Package author parsing.

use serde::{Deserialize, Serialize};

/// A structured package author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  #[serde(default)]
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
}

impl Author {
  /// Parse the npm free-text author form `Name <email> (url)`.
  ///
  /// Every part is optional. Whitespace around each part is trimmed and
  /// empty parts are dropped.
  pub fn parse(raw: &str) -> Self {
    let name_end = raw.find(['<', '(']).unwrap_or(raw.len());

    Self {
      name: raw[..name_end].trim().to_string(),
      email: delimited(raw, '<', '>'),
      url: delimited(raw, '(', ')'),
    }
  }
}

fn delimited(raw: &str, open: char, close: char) -> Option<String> {
  let start = raw.find(open)? + open.len_utf8();
  let len = raw[start..].find(close)?;
  let value = raw[start..start + len].trim();
  (!value.is_empty()).then(|| value.to_string())
}

/// The `author` field of `package.json`, either free text or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorField {
  Text(String),
  Structured(Author),
}

impl AuthorField {
  pub fn resolve(&self) -> Author {
    match self {
      AuthorField::Text(raw) => Author::parse(raw),
      AuthorField::Structured(author) => author.clone(),
    }
  }
}
