//! Column wrapping for the overlay text.
//!
//! The label string is laid out the way a pretty printer lays out a long string
//! literal: split after whitespace into quoted chunks that fit the width, one
//! chunk per line. The literal punctuation is then stripped so only the text
//! remains.
use regex::Regex;
use std::sync::OnceLock;

/// Column limit used when the caller does not pick one.
pub const DEFAULT_COLUMNS: usize = 60;

/// Indent and trailing allowance of a top-level wrapped literal: `(` and `)`.
const INDENT: usize = 1;
const ALLOWANCE: usize = 1;

static WORD_PARTS: OnceLock<Regex> = OnceLock::new();
static STRAY_CHARS: OnceLock<Regex> = OnceLock::new();
static INDENTED_NEWLINE: OnceLock<Regex> = OnceLock::new();

fn word_parts() -> &'static Regex {
  WORD_PARTS.get_or_init(|| Regex::new(r"\S*\s*").expect("valid regex"))
}

fn stray_chars() -> &'static Regex {
  STRAY_CHARS.get_or_init(|| Regex::new(r"[()']").expect("valid regex"))
}

fn indented_newline() -> &'static Regex {
  INDENTED_NEWLINE.get_or_init(|| Regex::new(r"\n ").expect("valid regex"))
}

/// Returns a copy of `text` that spans no more than `columns` columns.
pub fn format_text(text: &str, columns: usize) -> String {
  let wrapped = wrap_literal(text, columns);
  let stripped = stray_chars().replace_all(&wrapped, "");
  indented_newline().replace_all(&stripped, "\n").into_owned()
}

/// Quotes `text` as a string literal, split over several lines when wider than `width`.
fn wrap_literal(text: &str, width: usize) -> String {
  let literal = quote(text);
  if text.is_empty() || char_len(&literal) <= width {
    return literal;
  }

  let max_width = width.saturating_sub(INDENT);
  let lines: Vec<&str> = text.split_inclusive('\n').collect();
  let mut chunks: Vec<String> = Vec::new();

  for (i, line) in lines.iter().enumerate() {
    let last_line = i + 1 == lines.len();
    let line_limit = if last_line {
      max_width.saturating_sub(ALLOWANCE)
    } else {
      max_width
    };

    let rep = quote(line);
    if char_len(&rep) <= line_limit {
      chunks.push(rep);
      continue;
    }

    // Alternating word + trailing whitespace parts.
    let parts: Vec<&str> = word_parts()
      .find_iter(line)
      .map(|m| m.as_str())
      .filter(|part| !part.is_empty())
      .collect();

    let mut current = String::new();
    for (j, part) in parts.iter().enumerate() {
      let limit = if last_line && j + 1 == parts.len() {
        max_width.saturating_sub(ALLOWANCE)
      } else {
        max_width
      };
      let candidate = format!("{}{}", current, part);
      if char_len(&quote(&candidate)) > limit {
        if !current.is_empty() {
          chunks.push(quote(&current));
        }
        current = part.to_string();
      } else {
        current = candidate;
      }
    }
    if !current.is_empty() {
      chunks.push(quote(&current));
    }
  }

  if chunks.len() == 1 {
    return literal;
  }

  let separator = format!("\n{}", " ".repeat(INDENT));
  format!("({})", chunks.join(&separator))
}

/// Quotes like a string literal: single quotes unless the text has `'` and no `"`.
fn quote(text: &str) -> String {
  let delimiter = if text.contains('\'') && !text.contains('"') {
    '"'
  } else {
    '\''
  };

  let mut out = String::with_capacity(text.len() + 2);
  out.push(delimiter);
  for c in text.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if c == delimiter => {
        out.push('\\');
        out.push(c);
      }
      c => out.push(c),
    }
  }
  out.push(delimiter);
  out
}

fn char_len(text: &str) -> usize {
  text.chars().count()
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = "Water , Pool , Swimming Pool , Building , Tub , Jacuzzi , Hot Tub , \
    Outdoors , Swimming , Sports , Sport , Urban , Porch , Hotel , Garden , Town , City , \
    Resort , Vase , Tree , Pottery , Potted Plant , Plant , Jar";

  #[test]
  fn test_short_text_is_unchanged() {
    assert_eq!(format_text("Water , Pool", 60), "Water , Pool");
    assert_eq!(format_text("", 60), "");
  }

  #[test]
  fn test_wraps_after_whitespace() {
    let text = "Water , Pool , Swimming Pool , Building , Tub , Jacuzzi , Hot Tub , Outdoors";
    assert_eq!(
      format_text(text, 60),
      "Water , Pool , Swimming Pool , Building , Tub , Jacuzzi \n, Hot Tub , Outdoors"
    );
  }

  #[test]
  fn test_wrapped_literal_shape() {
    let text = "Water , Pool , Swimming Pool , Building , Tub , Jacuzzi , Hot Tub , Outdoors";
    assert_eq!(
      wrap_literal(text, 60),
      "('Water , Pool , Swimming Pool , Building , Tub , Jacuzzi '\n ', Hot Tub , Outdoors')"
    );
  }

  #[test]
  fn test_no_line_exceeds_columns() {
    for columns in [20, 30, 45, 60, 80] {
      let formatted = format_text(SAMPLE, columns);
      for line in formatted.lines() {
        assert!(
          line.chars().count() <= columns,
          "line {:?} longer than {}",
          line,
          columns
        );
      }
    }
  }

  #[test]
  fn test_no_words_are_lost() {
    let formatted = format_text(SAMPLE, 30);
    let original: Vec<&str> = SAMPLE.split_whitespace().collect();
    let wrapped: Vec<&str> = formatted.split_whitespace().collect();
    assert_eq!(original, wrapped);
  }

  #[test]
  fn test_strips_parentheses_and_quotes() {
    let formatted = format_text("Jar (Container) , Children's Toy", 60);
    assert!(!formatted.contains('('));
    assert!(!formatted.contains(')'));
    assert!(!formatted.contains('\''));
    assert!(formatted.contains("Jar Container"));
  }

  #[test]
  fn test_quote() {
    assert_eq!(quote("abc"), "'abc'");
    assert_eq!(quote("it's"), "\"it's\"");
    assert_eq!(quote("a\\b"), "'a\\\\b'");
    assert_eq!(quote("say \"it's\""), "'say \"it\\'s\"'");
  }
}
