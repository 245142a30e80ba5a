//! Line-level helpers shared by the module and function scanners.

/// The text after `---` on a doc comment line, or `None` for any other line.
///
/// Separator lines made only of dashes are treated as empty content.
pub(crate) fn doc_content(line: &str) -> Option<&str> {
  let rest = line.trim_start().strip_prefix("---")?;
  if !rest.is_empty() && rest.chars().all(|c| c == '-') {
    return Some("");
  }
  Some(rest)
}

/// Split `@tag rest` into `("tag", "rest")`.
pub(crate) fn tag_of(content: &str) -> Option<(&str, &str)> {
  let body = content.trim_start().strip_prefix('@')?;
  let end = body.find(char::is_whitespace).unwrap_or(body.len());
  Some((&body[..end], body[end..].trim_start()))
}

/// Split the leading whitespace-delimited word off `text`.
pub(crate) fn split_word(text: &str) -> (&str, &str) {
  let text = text.trim_start();
  let end = text.find(char::is_whitespace).unwrap_or(text.len());
  (&text[..end], text[end..].trim_start())
}

/// Split a type expression off the front of `text`, returning the type text
/// and whatever follows it.
///
/// Brackets and quotes are respected, and whitespace only ends the type when
/// it is not next to a `|`, `:` or `,` continuation, so `string | integer`
/// and `fun(a: integer): string` are taken whole.
pub(crate) fn split_type(text: &str) -> (&str, &str) {
  let text = text.trim_start();
  let mut depth = 0i32;
  let mut quote: Option<char> = None;
  let mut last: Option<char> = None;

  for (i, c) in text.char_indices() {
    if let Some(q) = quote {
      if c == q {
        quote = None;
      }
      last = Some(c);
      continue;
    }

    match c {
      '"' | '\'' | '`' => quote = Some(c),
      '<' | '(' | '[' | '{' => depth += 1,
      '>' | ')' | ']' | '}' => depth -= 1,
      _ if c.is_whitespace() => {
        if depth > 0 {
          continue;
        }
        let next = text[i..].trim_start().chars().next();
        let continues = matches!(last, Some('|' | ':' | ',')) || next == Some('|');
        if !continues {
          return (&text[..i], text[i..].trim_start());
        }
        continue;
      }
      _ => {}
    }
    last = Some(c);
  }

  (text, "")
}

/// Split `text` on `sep` wherever it is not nested inside brackets.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
  let mut parts = Vec::new();
  let mut depth = 0i32;
  let mut start = 0;
  for (i, c) in text.char_indices() {
    match c {
      '<' | '(' | '[' | '{' => depth += 1,
      '>' | ')' | ']' | '}' => depth -= 1,
      _ if c == sep && depth == 0 => {
        parts.push(&text[start..i]);
        start = i + c.len_utf8();
      }
      _ => {}
    }
  }
  parts.push(&text[start..]);
  parts
}

/// Remove the common indentation of non-blank lines and trim blank lines at
/// either end.
pub(crate) fn clean_description(lines: &[&str]) -> Option<String> {
  let indent = lines
    .iter()
    .filter(|l| !l.trim().is_empty())
    .map(|l| l.len() - l.trim_start().len())
    .min()?;

  let cleaned: Vec<&str> = lines
    .iter()
    .map(|l| {
      if l.trim().is_empty() {
        ""
      } else {
        l.get(indent..).unwrap_or_else(|| l.trim_start()).trim_end()
      }
    })
    .collect();

  let first = cleaned.iter().position(|l| !l.is_empty())?;
  let last = cleaned.iter().rposition(|l| !l.is_empty())?;
  Some(cleaned[first..=last].join("\n"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_doc_content() {
    assert_eq!(doc_content("  --- hello"), Some(" hello"));
    assert_eq!(doc_content("---------"), Some(""));
    assert_eq!(doc_content("-- plain comment"), None);
    assert_eq!(doc_content("local x = 1"), None);
  }

  #[test]
  fn test_tag_of() {
    assert_eq!(tag_of(" @param x integer"), Some(("param", "x integer")));
    assert_eq!(tag_of("@async"), Some(("async", "")));
    assert_eq!(tag_of(" just words"), None);
  }

  #[test]
  fn test_split_type_stops_at_description() {
    assert_eq!(split_type("integer the count"), ("integer", "the count"));
    assert_eq!(
      split_type("table<string, integer> lookup"),
      ("table<string, integer>", "lookup")
    );
    assert_eq!(split_type("string | nil # maybe"), ("string | nil", "# maybe"));
    assert_eq!(
      split_type("fun(a: integer): string callback"),
      ("fun(a: integer): string", "callback")
    );
    assert_eq!(split_type(r#""a b" | "c""#), (r#""a b" | "c""#, ""));
  }

  #[test]
  fn test_split_top_level() {
    assert_eq!(
      split_top_level("A, table<string, B>, C", ','),
      vec!["A", " table<string, B>", " C"]
    );
  }

  #[test]
  fn test_clean_description() {
    let lines = ["", " Adds two numbers.", "", "   Indented detail.", ""];
    assert_eq!(
      clean_description(&lines),
      Some("Adds two numbers.\n\n  Indented detail.".to_string())
    );
    assert_eq!(clean_description(&["", "  "]), None);
  }
}
