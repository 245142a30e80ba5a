//! The doc comment block directly above a function definition.

use tessera_types::{TypeExpr, parse_type};

use crate::lines::{clean_description, doc_content, split_type, split_word, tag_of};

/// A `---@param` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDoc {
  pub name: String,
  pub ty: TypeExpr,
  /// `name?`, or a type that spells out `nil`.
  pub optional: bool,
}

/// Annotations attached to one function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionDoc {
  /// Free text lines, cleaned of common indentation.
  pub description: Option<String>,
  pub params: Vec<ParamDoc>,
  /// One entry per `---@return` tag.
  pub returns: Vec<TypeExpr>,
  /// Names introduced by `---@generic`.
  pub generics: Vec<String>,
}

impl FunctionDoc {
  /// Read the `---` block ending right above `line_defined` (1-based).
  ///
  /// Returns `None` when the line before the definition is not a doc comment.
  pub fn above(source: &str, line_defined: usize) -> Option<Self> {
    let lines: Vec<&str> = source.lines().collect();
    let end = line_defined.checked_sub(1)?.min(lines.len());

    let mut start = end;
    while start > 0 && doc_content(lines[start - 1]).is_some() {
      start -= 1;
    }
    if start == end {
      return None;
    }

    Some(Self::parse(&lines[start..end]))
  }

  /// Parse a block of `---` lines.
  pub fn parse(lines: &[&str]) -> Self {
    let mut doc = FunctionDoc::default();
    let mut description = Vec::new();
    // `@class`/`@alias` blocks can share a comment run with the function;
    // their fields and free text are not part of the function's docs.
    let mut in_declaration = false;
    // Free text after the first tag continues that tag's description.
    let mut tagged = false;

    for content in lines.iter().filter_map(|l| doc_content(l)) {
      let Some((tag, rest)) = tag_of(content) else {
        if !in_declaration && !tagged {
          description.push(content);
        }
        continue;
      };

      match tag {
        "param" => {
          in_declaration = false;
          tagged = true;
          if let Some(param) = parse_param(rest) {
            doc.params.push(param);
          }
        }
        "return" => {
          in_declaration = false;
          tagged = true;
          let (ty, _) = split_type(rest);
          if !ty.is_empty() {
            doc.returns.push(parse_type(ty));
          }
        }
        "generic" => {
          in_declaration = false;
          tagged = true;
          doc.generics.extend(
            rest
              .split(',')
              .map(|g| g.split(':').next().unwrap_or_default().trim())
              .filter(|g| !g.is_empty())
              .map(str::to_string),
          );
        }
        "class" | "alias" => in_declaration = true,
        _ => {}
      }
    }

    doc.description = clean_description(&description);
    doc
  }

  pub fn param(&self, name: &str) -> Option<&ParamDoc> {
    self.params.iter().find(|p| p.name == name)
  }

  /// The declared return type: one `@return` as is, several as a tuple.
  pub fn return_type(&self) -> Option<TypeExpr> {
    match self.returns.as_slice() {
      [] => None,
      [single] => Some(single.clone()),
      many => Some(TypeExpr::Tuple(many.to_vec())),
    }
  }
}

fn parse_param(rest: &str) -> Option<ParamDoc> {
  let (name, rest) = split_word(rest);
  if name.is_empty() {
    return None;
  }
  let (name, marked_optional) = match name.strip_suffix('?') {
    Some(stripped) => (stripped, true),
    None => (name, false),
  };

  let (ty, _) = split_type(rest);
  let ty = if ty.is_empty() {
    TypeExpr::name("any")
  } else {
    parse_type(ty)
  };
  let optional = marked_optional || ty.declares_nil();
  let ty = if marked_optional && !ty.accepts_nil() {
    TypeExpr::Optional(Box::new(ty))
  } else {
    ty
  };

  Some(ParamDoc {
    name: name.to_string(),
    ty,
    optional,
  })
}
