//! Whole-file scan for class and alias declarations.

use tessera_types::{ClassDef, ClassTable, TypeExpr, parse_type};

use crate::lines::{doc_content, split_top_level, split_type, split_word, tag_of};

const FIELD_SCOPES: &[&str] = &["public", "private", "protected", "package"];

/// Collect every `---@class` (with its `---@field` lines) and `---@alias` in
/// `source`.
///
/// A class block runs until the first line that is not a `---` comment.
/// An alias with no inline type collects the `---| value` lines that follow.
pub fn parse_module(source: &str) -> ClassTable {
  let mut table = ClassTable::new();
  let mut class: Option<ClassDef> = None;
  let mut alias: Option<(String, Vec<TypeExpr>)> = None;

  for line in source.lines() {
    let Some(content) = doc_content(line) else {
      flush(&mut table, &mut class, &mut alias);
      continue;
    };

    if let Some(variant) = content.trim_start().strip_prefix('|') {
      if let Some((_, members)) = alias.as_mut() {
        let (ty, _) = split_type(variant.trim_start_matches('>'));
        members.push(parse_type(ty));
      }
      continue;
    }

    let Some((tag, rest)) = tag_of(content) else {
      continue;
    };

    match tag {
      "class" => {
        flush(&mut table, &mut class, &mut alias);
        class = parse_class_header(rest);
      }
      "field" => {
        if let Some(class) = class.as_mut() {
          apply_field(class, rest);
        }
      }
      "alias" => {
        flush(&mut table, &mut class, &mut alias);
        let (head, rest) = split_word(rest);
        let name = strip_generics(head).0;
        if name.is_empty() {
          continue;
        }
        let (ty, _) = split_type(rest);
        if ty.is_empty() {
          alias = Some((name.to_string(), Vec::new()));
        } else {
          table.insert_alias(name, parse_type(ty));
        }
      }
      _ => {}
    }
  }

  flush(&mut table, &mut class, &mut alias);
  table
}

fn flush(
  table: &mut ClassTable,
  class: &mut Option<ClassDef>,
  alias: &mut Option<(String, Vec<TypeExpr>)>,
) {
  if let Some(class) = class.take() {
    table.insert_class(class);
  }
  if let Some((name, mut members)) = alias.take() {
    match members.len() {
      0 => {}
      1 => table.insert_alias(name, members.remove(0)),
      _ => table.insert_alias(name, TypeExpr::Union(members)),
    }
  }
}

/// `Name<T, U>` → (`Name`, [`T`, `U`]).
fn strip_generics(head: &str) -> (&str, Vec<String>) {
  match head.find('<') {
    Some(lt) => {
      let inner = head[lt + 1..].trim_end_matches('>');
      let generics = split_top_level(inner, ',')
        .into_iter()
        .map(|g| g.split(':').next().unwrap_or_default().trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();
      (&head[..lt], generics)
    }
    None => (head, Vec::new()),
  }
}

/// `[(modifiers)] Name[<T>] [: Parent, ...] [description]`
fn parse_class_header(rest: &str) -> Option<ClassDef> {
  let mut rest = rest.trim();
  let mut exact = false;
  while let Some(inner) = rest.strip_prefix('(') {
    let end = inner.find(')')?;
    exact |= inner[..end].split(',').any(|m| m.trim() == "exact");
    rest = inner[end + 1..].trim_start();
  }

  let (head, parents) = match split_top_level(rest, ':').as_slice() {
    [head] => (*head, ""),
    [head, parents, ..] => (*head, *parents),
    [] => return None,
  };

  let (head, _) = split_type(head);
  let (name, generics) = strip_generics(head.trim());
  if name.is_empty() {
    return None;
  }

  let mut class = ClassDef::new(name);
  class.exact = exact;
  class.generics = generics;

  for parent in split_top_level(parents, ',') {
    let (ty, _) = split_type(parent);
    if !ty.is_empty() {
      class.parents.push(parse_type(ty));
    }
  }

  Some(class)
}

/// `[scope] name[?] type [description]` or `[K] V` index signatures.
fn apply_field(class: &mut ClassDef, rest: &str) {
  let (mut name, mut rest) = split_word(rest);
  if FIELD_SCOPES.contains(&name) {
    (name, rest) = split_word(rest);
  }

  if name.starts_with('[') {
    class.indexed = true;
    return;
  }

  let (ty, _) = split_type(rest);
  if name.is_empty() || ty.is_empty() {
    return;
  }

  let (name, optional) = match name.strip_suffix('?') {
    Some(stripped) => (stripped, true),
    None => (name, false),
  };
  let ty = parse_type(ty);
  let ty = if optional && !ty.accepts_nil() {
    TypeExpr::Optional(Box::new(ty))
  } else {
    ty
  };
  class.set_field(name, ty);
}

#[cfg(test)]
mod tests {
  use super::*;

  const SOURCE: &str = r#"
---@class Base
---@field id integer
---@field created string Creation time

---@class (exact) Point
---@field x number
---@field y number

--- A user record.
---@class User : Base
---@field private name string
---@field email? string
---@field roles table<string, boolean>

---@class Headers : table<string, string>
---@field host string

---@class Bag
---@field [string] integer

---@alias Ids integer[]

---@alias Mode
---| "read" # read only
---| "write"

local M = {}
return M
"#;

  #[test]
  fn test_classes_are_collected() {
    let table = parse_module(SOURCE);

    let base = table.class("Base").unwrap();
    assert_eq!(base.fields.len(), 2);
    assert_eq!(base.fields[1].ty, TypeExpr::name("string"));

    let point = table.class("Point").unwrap();
    assert!(point.exact);

    let user = table.class("User").unwrap();
    assert_eq!(user.parents, vec![TypeExpr::name("Base")]);
    let names: Vec<&str> = user.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "email", "roles"]);
    assert_eq!(user.fields[1].ty.to_string(), "string?");
    assert_eq!(user.fields[2].ty.to_string(), "table<string, boolean>");
  }

  #[test]
  fn test_dict_like_classes() {
    let table = parse_module(SOURCE);
    assert!(table.is_dict_like("Headers"));
    assert!(table.class("Bag").unwrap().indexed);
    assert!(!table.is_dict_like("User"));
  }

  #[test]
  fn test_aliases() {
    let table = parse_module(SOURCE);
    assert_eq!(table.alias("Ids").unwrap().to_string(), "integer[]");
    assert_eq!(table.alias("Mode").unwrap().to_string(), r#""read"|"write""#);
  }

  #[test]
  fn test_generic_class_header() {
    let table = parse_module("---@class Box<T> : Base\n---@field value T\n");
    let class = table.class("Box").unwrap();
    assert_eq!(class.generics, vec!["T".to_string()]);
    assert_eq!(class.parents, vec![TypeExpr::name("Base")]);
  }

  #[test]
  fn test_class_block_ends_at_code() {
    let source = "---@class A\nlocal x = 1\n---@field stray integer\n";
    let table = parse_module(source);
    assert!(table.class("A").unwrap().fields.is_empty());
  }
}
