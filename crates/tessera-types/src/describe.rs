//! Type expression → [`TypeDescriptor`].
//!
//! Dispatch order, first match wins:
//! 1. no type → `Any`
//! 2. `Annotated<Base, ...>` → `Annotated`
//! 3. a declared class → the first capability in [`CAPABILITIES`] that holds,
//!    or `Class` when none does
//! 4. parameterised forms → `Generic`
//! 5. scalars and literals → `Basic`
//! 6. anything else → `Unknown`

use indexmap::IndexMap;

use crate::class::{ClassDef, ClassTable};
use crate::descriptor::TypeDescriptor;
use crate::expr::{Literal, TypeExpr};

const BASIC_SCALARS: &[&str] = &["string", "integer", "number", "boolean", "nil"];

#[derive(Debug, Clone, Copy)]
enum Shape {
  TypedDict,
  Dataclass,
  Model,
}

type Capability = fn(&ClassTable, &ClassDef, &IndexMap<&str, &TypeExpr>) -> bool;

fn is_typed_dict(classes: &ClassTable, class: &ClassDef, fields: &IndexMap<&str, &TypeExpr>) -> bool {
  !fields.is_empty() && classes.is_dict_like(&class.name)
}

fn is_record(_: &ClassTable, class: &ClassDef, _: &IndexMap<&str, &TypeExpr>) -> bool {
  class.exact
}

fn is_model(_: &ClassTable, _: &ClassDef, fields: &IndexMap<&str, &TypeExpr>) -> bool {
  !fields.is_empty()
}

/// Structural capabilities of a class, tested in order.
const CAPABILITIES: &[(Shape, Capability)] = &[
  (Shape::TypedDict, is_typed_dict),
  (Shape::Dataclass, is_record),
  (Shape::Model, is_model),
];

/// Describe `expr` against `classes`. `None` means "not annotated".
pub fn describe(expr: Option<&TypeExpr>, classes: &ClassTable) -> TypeDescriptor {
  Describer::new(classes).describe(expr)
}

/// Stateful describer; tracks generic variables in scope and the classes and
/// aliases currently being expanded so recursion always terminates.
pub struct Describer<'a> {
  classes: &'a ClassTable,
  generics: Vec<String>,
  expanding: Vec<String>,
  aliases: Vec<String>,
}

impl<'a> Describer<'a> {
  pub fn new(classes: &'a ClassTable) -> Self {
    Self {
      classes,
      generics: Vec::new(),
      expanding: Vec::new(),
      aliases: Vec::new(),
    }
  }

  /// Treat these names as generic variables (`---@generic T`).
  pub fn with_generics<I, S>(mut self, generics: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.generics.extend(generics.into_iter().map(Into::into));
    self
  }

  pub fn describe(&mut self, expr: Option<&TypeExpr>) -> TypeDescriptor {
    match expr {
      None => TypeDescriptor::Any,
      Some(expr) => self.describe_expr(expr),
    }
  }

  fn describe_all(&mut self, exprs: &[TypeExpr]) -> Vec<TypeDescriptor> {
    exprs.iter().map(|e| self.describe_expr(e)).collect()
  }

  fn describe_expr(&mut self, expr: &TypeExpr) -> TypeDescriptor {
    match expr {
      TypeExpr::Apply { name, args } if name == "Annotated" && !args.is_empty() => {
        TypeDescriptor::Annotated {
          base_type: Box::new(self.describe_expr(&args[0])),
          metadata: args[1..].iter().map(render_marker).collect(),
        }
      }
      TypeExpr::Name(name) => self.describe_name(name),
      TypeExpr::Apply { name, args } => TypeDescriptor::generic(name, self.describe_all(args)),
      TypeExpr::Array(inner) => TypeDescriptor::generic("array", vec![self.describe_expr(inner)]),
      TypeExpr::Optional(inner) => {
        let mut members = match inner.as_ref() {
          TypeExpr::Union(members) => self.describe_all(members),
          other => vec![self.describe_expr(other)],
        };
        members.push(TypeDescriptor::basic("nil"));
        TypeDescriptor::generic("union", members)
      }
      TypeExpr::Union(members) => TypeDescriptor::generic("union", self.describe_all(members)),
      TypeExpr::Tuple(items) => TypeDescriptor::generic("tuple", self.describe_all(items)),
      TypeExpr::Function { params, returns } => {
        let params = params
          .iter()
          .map(|(_, ty)| self.describe_expr(ty))
          .collect();
        let returns = self.describe_all(returns);
        TypeDescriptor::generic(
          "fun",
          vec![
            TypeDescriptor::generic("params", params),
            TypeDescriptor::generic("returns", returns),
          ],
        )
      }
      TypeExpr::Record(fields) => {
        let fields = fields
          .iter()
          .map(|(name, ty)| TypeDescriptor::generic(name, vec![self.describe_expr(ty)]))
          .collect();
        TypeDescriptor::generic("record", fields)
      }
      TypeExpr::Literal(literal) => TypeDescriptor::basic(literal.to_string()),
      TypeExpr::Unparsed(text) => TypeDescriptor::unknown(text),
    }
  }

  fn describe_name(&mut self, name: &str) -> TypeDescriptor {
    if matches!(name, "any" | "unknown") {
      return TypeDescriptor::Any;
    }
    if self.generics.iter().any(|g| g == name) {
      return TypeDescriptor::unknown(name);
    }

    let classes = self.classes;
    if let Some(target) = classes.alias(name) {
      if self.aliases.iter().any(|a| a == name) {
        return TypeDescriptor::unknown(name);
      }
      self.aliases.push(name.to_string());
      let described = self.describe_expr(target);
      self.aliases.pop();
      return described;
    }

    if let Some(class) = classes.class(name) {
      return self.describe_class(class);
    }

    if BASIC_SCALARS.contains(&name) {
      TypeDescriptor::basic(name)
    } else {
      TypeDescriptor::class(name)
    }
  }

  fn describe_class(&mut self, class: &'a ClassDef) -> TypeDescriptor {
    if self.expanding.iter().any(|c| c == &class.name) {
      return TypeDescriptor::class(&class.name);
    }

    let classes = self.classes;
    let fields = classes.merged_fields(&class.name);
    let Some(shape) = CAPABILITIES
      .iter()
      .find(|(_, capable)| capable(classes, class, &fields))
      .map(|(shape, _)| *shape)
    else {
      return TypeDescriptor::class(&class.name);
    };

    let scope = self.generics.len();
    for ancestor in classes.lineage(&class.name) {
      self.generics.extend(ancestor.generics.iter().cloned());
    }
    self.expanding.push(class.name.clone());

    let described: IndexMap<String, TypeDescriptor> = fields
      .into_iter()
      .map(|(field, ty)| (field.to_string(), self.describe_expr(ty)))
      .collect();

    self.expanding.pop();
    self.generics.truncate(scope);

    let name = class.name.clone();
    match shape {
      Shape::TypedDict => TypeDescriptor::TypedDict {
        name,
        fields: described,
      },
      Shape::Dataclass => TypeDescriptor::Dataclass {
        name,
        fields: described,
      },
      Shape::Model => TypeDescriptor::PydanticModel {
        name,
        fields: described,
      },
    }
  }
}

/// Metadata markers render the way they read: string markers unquoted,
/// anything else as its type text.
fn render_marker(expr: &TypeExpr) -> String {
  match expr {
    TypeExpr::Literal(Literal::Str(s)) => s.clone(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::parser::parse_type;

  fn describe_text(text: &str, classes: &ClassTable) -> serde_json::Value {
    serde_json::to_value(describe(Some(&parse_type(text)), classes)).unwrap()
  }

  fn class(name: &str, parents: &[&str], fields: &[(&str, &str)]) -> ClassDef {
    let mut def = ClassDef::new(name);
    def.parents = parents.iter().map(|p| parse_type(p)).collect();
    for (field, ty) in fields {
      def.set_field(*field, parse_type(ty));
    }
    def
  }

  #[test]
  fn test_none_is_any() {
    assert_eq!(describe(None, &ClassTable::new()), TypeDescriptor::Any);
  }

  #[test]
  fn test_basic_scalars_round_trip() {
    let classes = ClassTable::new();
    for scalar in ["string", "integer", "number", "boolean", "nil"] {
      let described = describe(Some(&parse_type(scalar)), &classes);
      match described {
        TypeDescriptor::Basic { value } => assert_eq!(value.to_string(), scalar),
        other => panic!("expected Basic for {scalar}, got {other:?}"),
      }
    }
  }

  #[test]
  fn test_literals_are_basic() {
    let classes = ClassTable::new();
    assert_eq!(describe_text("42", &classes), json!({"type": "Basic", "value": "42"}));
    assert_eq!(describe_text("true", &classes), json!({"type": "Basic", "value": "true"}));
    assert_eq!(
      describe_text(r#""read""#, &classes),
      json!({"type": "Basic", "value": "\"read\""})
    );
  }

  #[test]
  fn test_array_of_integer() {
    assert_eq!(
      describe_text("integer[]", &ClassTable::new()),
      json!({
        "type": "Generic",
        "origin": "array",
        "args": [{"type": "Basic", "value": "integer"}]
      })
    );
  }

  #[test]
  fn test_nested_generics_preserved() {
    assert_eq!(
      describe_text("table<string, integer>[]", &ClassTable::new()),
      json!({
        "type": "Generic",
        "origin": "array",
        "args": [{
          "type": "Generic",
          "origin": "table",
          "args": [
            {"type": "Basic", "value": "string"},
            {"type": "Basic", "value": "integer"}
          ]
        }]
      })
    );
  }

  #[test]
  fn test_optional_is_union_with_nil() {
    assert_eq!(
      describe_text("(string|integer)?", &ClassTable::new()),
      json!({
        "type": "Generic",
        "origin": "union",
        "args": [
          {"type": "Basic", "value": "string"},
          {"type": "Basic", "value": "integer"},
          {"type": "Basic", "value": "nil"}
        ]
      })
    );
  }

  #[test]
  fn test_function_type() {
    assert_eq!(
      describe_text("fun(x: integer): string", &ClassTable::new()),
      json!({
        "type": "Generic",
        "origin": "fun",
        "args": [
          {"type": "Generic", "origin": "params", "args": [{"type": "Basic", "value": "integer"}]},
          {"type": "Generic", "origin": "returns", "args": [{"type": "Basic", "value": "string"}]}
        ]
      })
    );
  }

  #[test]
  fn test_annotated_collects_markers() {
    assert_eq!(
      describe_text(r#"Annotated<integer, "gt=0", Positive>"#, &ClassTable::new()),
      json!({
        "type": "Annotated",
        "base_type": {"type": "Basic", "value": "integer"},
        "metadata": ["gt=0", "Positive"]
      })
    );
  }

  #[test]
  fn test_capability_order() {
    let mut classes = ClassTable::new();
    classes.insert_class(class("Headers", &["table<string, string>"], &[("host", "string")]));
    let mut point = class("Point", &[], &[("x", "number"), ("y", "number")]);
    point.exact = true;
    classes.insert_class(point);
    classes.insert_class(class("User", &[], &[("name", "string")]));
    classes.insert_class(class("Handle", &[], &[]));

    assert_eq!(describe_text("Headers", &classes)["type"], "TypedDict");
    assert_eq!(describe_text("Point", &classes)["type"], "Dataclass");
    assert_eq!(describe_text("User", &classes)["type"], "PydanticModel");
    assert_eq!(describe_text("Handle", &classes), json!({"type": "Class", "name": "Handle"}));
    assert_eq!(describe_text("userdata", &classes), json!({"type": "Class", "name": "userdata"}));
  }

  #[test]
  fn test_derived_field_type_wins() {
    let mut classes = ClassTable::new();
    classes.insert_class(class("Base", &[], &[("id", "integer"), ("tags", "string[]")]));
    classes.insert_class(class("Derived", &["Base"], &[("id", "string")]));

    assert_eq!(
      describe_text("Derived", &classes),
      json!({
        "type": "PydanticModel",
        "name": "Derived",
        "fields": {
          "id": {"type": "Basic", "value": "string"},
          "tags": {"type": "Generic", "origin": "array", "args": [{"type": "Basic", "value": "string"}]}
        }
      })
    );
  }

  #[test]
  fn test_self_referencing_class_stops_at_class_boundary() {
    let mut classes = ClassTable::new();
    classes.insert_class(class("Node", &[], &[("value", "integer"), ("next", "Node?")]));

    assert_eq!(
      describe_text("Node", &classes)["fields"]["next"],
      json!({
        "type": "Generic",
        "origin": "union",
        "args": [{"type": "Class", "name": "Node"}, {"type": "Basic", "value": "nil"}]
      })
    );
  }

  #[test]
  fn test_aliases_expand_and_cycles_terminate() {
    let mut classes = ClassTable::new();
    classes.insert_alias("Ids", parse_type("integer[]"));
    classes.insert_alias("Loop", parse_type("Loop[]"));

    assert_eq!(describe_text("Ids", &classes)["origin"], "array");
    assert_eq!(
      describe_text("Loop", &classes),
      json!({"type": "Generic", "origin": "array", "args": [{"type": "Unknown", "value": "Loop"}]})
    );
  }

  #[test]
  fn test_generic_variables_are_unknown() {
    let classes = ClassTable::new();
    let expr = parse_type("T[]");
    let described = Describer::new(&classes)
      .with_generics(["T"])
      .describe(Some(&expr));
    assert_eq!(
      described,
      TypeDescriptor::generic("array", vec![TypeDescriptor::unknown("T")])
    );
  }

  #[test]
  fn test_unparsed_text_is_unknown() {
    assert_eq!(
      describe_text("table<", &ClassTable::new()),
      json!({"type": "Unknown", "value": "table<"})
    );
  }

  #[test]
  fn test_explicit_any() {
    assert_eq!(describe_text("any", &ClassTable::new()), json!({"type": "Any"}));
  }
}
