//! Parsed type expressions.

use std::fmt;

/// A literal used as a type (`"read"`, `42`, `true`).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  /// String literal, stored without quotes.
  Str(String),
  /// Numeric literal, stored as written so it renders back unchanged.
  Number(String),
  Bool(bool),
}

/// A parsed LuaLS type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
  /// A bare or dotted name: `integer`, `User`, `http.Request`.
  Name(String),
  /// A literal type.
  Literal(Literal),
  /// `T[]`
  Array(Box<TypeExpr>),
  /// `T?`
  Optional(Box<TypeExpr>),
  /// `A|B|C`
  Union(Vec<TypeExpr>),
  /// `Name<A, B>`, including `table<K, V>` and `Annotated<T, ...>`.
  Apply { name: String, args: Vec<TypeExpr> },
  /// `[A, B]`
  Tuple(Vec<TypeExpr>),
  /// `fun(a: A, b: B): R`
  Function {
    params: Vec<(String, TypeExpr)>,
    returns: Vec<TypeExpr>,
  },
  /// `{ x: integer, y: integer }`
  Record(Vec<(String, TypeExpr)>),
  /// Text the grammar could not make sense of.
  Unparsed(String),
}

impl TypeExpr {
  /// Shorthand for `TypeExpr::Name`.
  pub fn name(name: impl Into<String>) -> Self {
    Self::Name(name.into())
  }

  /// The class-like name this expression refers to, if any.
  ///
  /// `Parent` and `Parent<T>` both name `Parent`; composite forms name nothing.
  pub fn head_name(&self) -> Option<&str> {
    match self {
      Self::Name(name) => Some(name),
      Self::Apply { name, .. } => Some(name),
      _ => None,
    }
  }

  /// Whether `nil` is an accepted value of this type.
  pub fn accepts_nil(&self) -> bool {
    match self {
      Self::Optional(_) => true,
      Self::Name(name) => matches!(name.as_str(), "nil" | "any" | "unknown"),
      Self::Union(members) => members.iter().any(TypeExpr::accepts_nil),
      _ => false,
    }
  }

  /// Whether `nil` is spelled out: `T?`, `nil`, or a union with either.
  /// `any` and `unknown` accept `nil` without declaring it.
  pub fn declares_nil(&self) -> bool {
    match self {
      Self::Optional(_) => true,
      Self::Name(name) => name == "nil",
      Self::Union(members) => members.iter().any(TypeExpr::declares_nil),
      _ => false,
    }
  }

  fn needs_parens_as_operand(&self) -> bool {
    matches!(self, Self::Union(_) | Self::Function { .. })
  }

  fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.needs_parens_as_operand() {
      write!(f, "({})", self)
    } else {
      write!(f, "{}", self)
    }
  }
}

impl fmt::Display for Literal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Literal::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
      Literal::Number(n) => f.write_str(n),
      Literal::Bool(b) => write!(f, "{}", b),
    }
  }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr]) -> fmt::Result {
  for (i, item) in items.iter().enumerate() {
    if i > 0 {
      f.write_str(", ")?;
    }
    write!(f, "{}", item)?;
  }
  Ok(())
}

fn write_named_list(f: &mut fmt::Formatter<'_>, items: &[(String, TypeExpr)]) -> fmt::Result {
  for (i, (name, ty)) in items.iter().enumerate() {
    if i > 0 {
      f.write_str(", ")?;
    }
    write!(f, "{}: {}", name, ty)?;
  }
  Ok(())
}

impl fmt::Display for TypeExpr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeExpr::Name(name) => f.write_str(name),
      TypeExpr::Literal(literal) => write!(f, "{}", literal),
      TypeExpr::Array(inner) => {
        inner.fmt_operand(f)?;
        f.write_str("[]")
      }
      TypeExpr::Optional(inner) => {
        inner.fmt_operand(f)?;
        f.write_str("?")
      }
      TypeExpr::Union(members) => {
        for (i, member) in members.iter().enumerate() {
          if i > 0 {
            f.write_str("|")?;
          }
          member.fmt_operand(f)?;
        }
        Ok(())
      }
      TypeExpr::Apply { name, args } => {
        write!(f, "{}<", name)?;
        write_list(f, args)?;
        f.write_str(">")
      }
      TypeExpr::Tuple(items) => {
        f.write_str("[")?;
        write_list(f, items)?;
        f.write_str("]")
      }
      TypeExpr::Function { params, returns } => {
        f.write_str("fun(")?;
        write_named_list(f, params)?;
        f.write_str(")")?;
        if !returns.is_empty() {
          f.write_str(": ")?;
          write_list(f, returns)?;
        }
        Ok(())
      }
      TypeExpr::Record(fields) => {
        f.write_str("{ ")?;
        write_named_list(f, fields)?;
        f.write_str(" }")
      }
      TypeExpr::Unparsed(text) => f.write_str(text),
    }
  }
}
