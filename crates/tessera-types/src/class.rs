//! Class and alias declarations collected from a module.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::warn;

use crate::expr::TypeExpr;

/// A single `---@field` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
  pub name: String,
  /// Declared type. A `name?` field is stored as `T?`.
  pub ty: TypeExpr,
}

/// A `---@class` declaration and the fields declared directly on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDef {
  pub name: String,
  /// Generic parameters from `---@class Box<T>`.
  pub generics: Vec<String>,
  /// Parents in declaration order (`---@class C : A, table<string, B>`).
  pub parents: Vec<TypeExpr>,
  /// `(exact)` classes are records with a fixed set of named fields.
  pub exact: bool,
  /// Set by a `---@field [K] V` index signature.
  pub indexed: bool,
  /// Own fields, in declaration order.
  pub fields: Vec<FieldDef>,
}

impl ClassDef {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  /// Add or replace an own field, keeping the first declaration position.
  pub fn set_field(&mut self, name: impl Into<String>, ty: TypeExpr) {
    let name = name.into();
    match self.fields.iter_mut().find(|f| f.name == name) {
      Some(existing) => existing.ty = ty,
      None => self.fields.push(FieldDef { name, ty }),
    }
  }
}

/// All classes and aliases visible to a module's annotations.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
  classes: IndexMap<String, ClassDef>,
  aliases: IndexMap<String, TypeExpr>,
}

impl ClassTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a class. Re-declaring a class extends it: parents are appended
  /// and fields overlay the earlier declaration.
  pub fn insert_class(&mut self, class: ClassDef) {
    match self.classes.get_mut(&class.name) {
      Some(existing) => {
        for parent in class.parents {
          if !existing.parents.contains(&parent) {
            existing.parents.push(parent);
          }
        }
        existing.exact |= class.exact;
        existing.indexed |= class.indexed;
        if existing.generics.is_empty() {
          existing.generics = class.generics;
        }
        for field in class.fields {
          existing.set_field(field.name, field.ty);
        }
      }
      None => {
        self.classes.insert(class.name.clone(), class);
      }
    }
  }

  pub fn insert_alias(&mut self, name: impl Into<String>, ty: TypeExpr) {
    self.aliases.insert(name.into(), ty);
  }

  pub fn class(&self, name: &str) -> Option<&ClassDef> {
    self.classes.get(name)
  }

  pub fn alias(&self, name: &str) -> Option<&TypeExpr> {
    self.aliases.get(name)
  }

  pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
    self.classes.values()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty() && self.aliases.is_empty()
  }

  /// Ancestry of `name`, most-base first and `name` itself last.
  ///
  /// Parents are visited depth first in declaration order and each class
  /// appears once, so inheritance cycles terminate.
  pub fn lineage(&self, name: &str) -> Vec<&ClassDef> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    self.visit(name, &mut seen, &mut order);
    order
  }

  fn visit<'a>(&'a self, name: &str, seen: &mut HashSet<String>, order: &mut Vec<&'a ClassDef>) {
    if !seen.insert(name.to_string()) {
      return;
    }
    let Some(class) = self.classes.get(name) else {
      return;
    };
    for parent in &class.parents {
      if let Some(parent_name) = parent.head_name() {
        self.visit(parent_name, seen, order);
      }
    }
    order.push(class);
  }

  /// Field types of `name` with inherited fields merged in.
  ///
  /// Each ancestor overlays the accumulator in lineage order, so a field
  /// redeclared by a more derived class replaces the inherited one while
  /// keeping its original position.
  pub fn merged_fields(&self, name: &str) -> IndexMap<&str, &TypeExpr> {
    let lineage = self.lineage(name);
    for class in &lineage {
      self.flag_ambiguous_fields(class);
    }

    let mut fields = IndexMap::new();
    for class in lineage {
      for field in &class.fields {
        fields.insert(field.name.as_str(), &field.ty);
      }
    }
    fields
  }

  /// Whether the class (or an ancestor) extends `table`/`table<K, V>` or
  /// declares an index signature.
  pub fn is_dict_like(&self, name: &str) -> bool {
    self.lineage(name).iter().any(|class| {
      class.indexed
        || class
          .parents
          .iter()
          .any(|parent| parent.head_name() == Some("table"))
    })
  }

  /// Multiple inheritance has no defined field origin; surface collisions
  /// between parents instead of picking a winner quietly.
  fn flag_ambiguous_fields(&self, class: &ClassDef) {
    let parents: Vec<&str> = class
      .parents
      .iter()
      .filter_map(TypeExpr::head_name)
      .filter(|name| self.classes.contains_key(*name))
      .collect();
    if parents.len() < 2 {
      return;
    }

    let mut origins: HashMap<&str, (&str, &TypeExpr)> = HashMap::new();
    for parent in parents {
      for ancestor in self.lineage(parent) {
        for field in &ancestor.fields {
          match origins.get(field.name.as_str()) {
            Some((first, ty)) if *ty != &field.ty && *first != parent => {
              warn!(
                class = %class.name,
                field = %field.name,
                first_parent = %first,
                second_parent = %parent,
                "field inherited from multiple parents with different types"
              );
            }
            Some(_) => {}
            None => {
              origins.insert(field.name.as_str(), (parent, &field.ty));
            }
          }
        }
      }
    }
  }
}
