//! Typed schema registry.
//!
//! Every table, super-entity and component link is declared once, during
//! process start, through a [`SchemaBuilder`]. [`SchemaBuilder::build`]
//! validates the declarations and freezes them into an immutable [`Schema`]
//! that request handling reads from but never mutates.
//!
//! A *super-entity* is a polymorphic root table whose rows stand for exactly
//! one concrete row of one of a fixed set of instance types. A *component* is
//! a table that is automatically available as a sub-resource of another
//! table; components declared on a super-entity are inherited by every one of
//! its instance types, registered or not.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::{Error, Result, crud::CrudStrings};

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
  /// Generated primary key.
  Id,
  DateTime,
  Date,
  /// Bounded string; `max_len` counts characters, not bytes.
  String { max_len: usize },
  /// Unbounded free text.
  Text,
  Float,
  /// Foreign key into a plain table.
  Reference { table: &'static str },
  /// Foreign key into a super-entity, carrying its shared key.
  SuperLink { entity: &'static str },
  /// Discriminator column of a super-entity.
  InstanceType { entity: &'static str },
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
  pub name:     &'static str,
  pub kind:     FieldKind,
  pub label:    Option<&'static str>,
  pub readable: bool,
  pub writable: bool,
  pub required: bool,
}

impl FieldSpec {
  pub fn new(name: &'static str, kind: FieldKind) -> Self {
    Self {
      name,
      kind,
      label: None,
      readable: true,
      writable: true,
      required: false,
    }
  }

  /// Primary keys are generated, never written by callers.
  pub fn id(name: &'static str) -> Self {
    Self::new(name, FieldKind::Id).read_only()
  }

  pub fn datetime(name: &'static str) -> Self {
    Self::new(name, FieldKind::DateTime)
  }

  pub fn date(name: &'static str) -> Self { Self::new(name, FieldKind::Date) }

  pub fn string(name: &'static str, max_len: usize) -> Self {
    Self::new(name, FieldKind::String { max_len })
  }

  pub fn text(name: &'static str) -> Self { Self::new(name, FieldKind::Text) }

  pub fn float(name: &'static str) -> Self { Self::new(name, FieldKind::Float) }

  pub fn reference(name: &'static str, table: &'static str) -> Self {
    Self::new(name, FieldKind::Reference { table })
  }

  /// A link to the super-entity `entity` through its shared key `key`.
  pub fn super_link(key: &'static str, entity: &'static str) -> Self {
    Self::new(key, FieldKind::SuperLink { entity })
  }

  pub fn label(mut self, label: &'static str) -> Self {
    self.label = Some(label);
    self
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn read_only(mut self) -> Self {
    self.writable = false;
    self
  }

  /// Neither shown nor accepted by the generic CRUD surface.
  pub fn hidden(mut self) -> Self {
    self.readable = false;
    self.writable = false;
    self
  }

  /// Validate a caller-supplied string value against this declaration.
  ///
  /// `None` means the caller left the field empty.
  pub fn check(&self, table: &str, value: Option<&str>) -> Result<()> {
    let value = match value {
      Some(v) if !v.trim().is_empty() => v,
      _ if self.required => {
        return Err(Error::Required {
          table: table.to_owned(),
          field: self.name.to_owned(),
        });
      }
      _ => return Ok(()),
    };

    if !self.writable {
      return Err(Error::NotWritable {
        table: table.to_owned(),
        field: self.name.to_owned(),
      });
    }

    if let FieldKind::String { max_len } = self.kind {
      let len = value.chars().count();
      if len > max_len {
        return Err(Error::TooLong {
          table: table.to_owned(),
          field: self.name.to_owned(),
          max: max_len,
          len,
        });
      }
    }

    Ok(())
  }
}

// ─── Table configuration ─────────────────────────────────────────────────────

/// A generic CRUD operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudMethod {
  Create,
  Read,
  Update,
  Delete,
}

impl fmt::Display for CrudMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Create => "create",
      Self::Read => "read",
      Self::Update => "update",
      Self::Delete => "delete",
    })
  }
}

/// What the generic CRUD surface may do with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableConfig {
  pub insertable: bool,
  pub editable:   bool,
  pub deletable:  bool,
  /// Whether the list view offers an "add" form.
  pub listadd:    bool,
}

impl Default for TableConfig {
  fn default() -> Self {
    Self {
      insertable: true,
      editable:   true,
      deletable:  true,
      listadd:    true,
    }
  }
}

impl TableConfig {
  /// Configuration for super-entity roots, which are only ever populated by
  /// their concrete instance types.
  pub fn read_only() -> Self {
    Self {
      insertable: true,
      editable:   false,
      deletable:  false,
      listadd:    false,
    }
  }

  /// Direct creation goes through the list view's add form, so it needs
  /// both `insertable` and `listadd`.
  pub fn permits(&self, method: CrudMethod) -> bool {
    match method {
      CrudMethod::Create => self.insertable && self.listadd,
      CrudMethod::Read => true,
      CrudMethod::Update => self.editable,
      CrudMethod::Delete => self.deletable,
    }
  }
}

// ─── Tables, super-entities, components ──────────────────────────────────────

/// A sub-resource link: rows of `name` whose `joinby` field equals the
/// parent's value of the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSpec {
  pub name:   &'static str,
  pub joinby: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSpec {
  pub name:       &'static str,
  pub fields:     Vec<FieldSpec>,
  pub config:     TableConfig,
  pub components: Vec<ComponentSpec>,
}

impl TableSpec {
  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn require_field(&self, name: &str) -> Result<&FieldSpec> {
    self.field(name).ok_or_else(|| Error::UnknownField {
      table: self.name.to_owned(),
      field: name.to_owned(),
    })
  }
}

/// One allowed concrete type of a super-entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceType {
  pub table: &'static str,
  pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuperEntitySpec {
  pub name:  &'static str,
  /// The shared key, present on the root and on every instance type.
  pub key:   &'static str,
  pub types: Vec<InstanceType>,
}

impl SuperEntitySpec {
  pub fn has_type(&self, table: &str) -> bool {
    self.types.iter().any(|t| t.table == table)
  }

  pub fn type_label(&self, table: &str) -> Option<&'static str> {
    self.types.iter().find(|t| t.table == table).map(|t| t.label)
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Collects declarations; see the module documentation.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
  tables:         BTreeMap<&'static str, TableSpec>,
  super_entities: BTreeMap<&'static str, SuperEntitySpec>,
  crud_strings:   BTreeMap<&'static str, CrudStrings>,
}

impl SchemaBuilder {
  pub fn new() -> Self { Self::default() }

  /// Declare a plain table with the default (fully editable) configuration.
  pub fn define_table(
    &mut self,
    name: &'static str,
    fields: impl IntoIterator<Item = FieldSpec>,
  ) -> Result<&mut Self> {
    if self.tables.contains_key(name) {
      return Err(Error::DuplicateTable(name));
    }

    let mut collected: Vec<FieldSpec> = Vec::new();
    for field in fields {
      if collected.iter().any(|f| f.name == field.name) {
        return Err(Error::DuplicateField {
          table: name,
          field: field.name,
        });
      }
      collected.push(field);
    }

    self.tables.insert(name, TableSpec {
      name,
      fields: collected,
      config: TableConfig::default(),
      components: Vec::new(),
    });
    Ok(self)
  }

  /// Declare a super-entity root table.
  ///
  /// The root gets its shared `key` and an `instance_type` discriminator
  /// ahead of `fields`.
  pub fn super_entity(
    &mut self,
    name: &'static str,
    key: &'static str,
    types: impl IntoIterator<Item = InstanceType>,
    fields: impl IntoIterator<Item = FieldSpec>,
  ) -> Result<&mut Self> {
    if self.super_entities.contains_key(name) {
      return Err(Error::DuplicateSuperEntity(name));
    }

    let mut collected: Vec<InstanceType> = Vec::new();
    for t in types {
      if collected.iter().any(|c| c.table == t.table) {
        return Err(Error::DuplicateInstanceType {
          entity: name,
          table:  t.table,
        });
      }
      collected.push(t);
    }
    if collected.is_empty() {
      return Err(Error::EmptyInstanceTypes(name));
    }

    let root_fields = [
      FieldSpec::id(key),
      FieldSpec::new("instance_type", FieldKind::InstanceType { entity: name })
        .read_only(),
    ]
    .into_iter()
    .chain(fields);

    self.define_table(name, root_fields)?;
    self.super_entities.insert(name, SuperEntitySpec {
      name,
      key,
      types: collected,
    });
    Ok(self)
  }

  /// Replace the CRUD configuration of an already-declared table.
  pub fn configure(
    &mut self,
    table: &str,
    config: TableConfig,
  ) -> Result<&mut Self> {
    let spec = self
      .tables
      .get_mut(table)
      .ok_or_else(|| Error::UnknownTable(table.to_owned()))?;
    spec.config = config;
    Ok(self)
  }

  /// Attach components to an already-declared table. The component tables
  /// themselves may be declared later; they are checked in [`Self::build`].
  pub fn add_components(
    &mut self,
    table: &str,
    components: impl IntoIterator<Item = ComponentSpec>,
  ) -> Result<&mut Self> {
    let spec = self
      .tables
      .get_mut(table)
      .ok_or_else(|| Error::UnknownTable(table.to_owned()))?;
    spec.components.extend(components);
    Ok(self)
  }

  pub fn crud_strings(
    &mut self,
    table: &'static str,
    strings: CrudStrings,
  ) -> Result<&mut Self> {
    if self.crud_strings.contains_key(table) {
      return Err(Error::DuplicateCrudStrings(table));
    }
    self.crud_strings.insert(table, strings);
    Ok(self)
  }

  /// Validate cross-table references and freeze the registry.
  pub fn build(self) -> Result<Schema> {
    for spec in self.tables.values() {
      for field in &spec.fields {
        match field.kind {
          FieldKind::Reference { table } => {
            if !self.tables.contains_key(table) {
              return Err(Error::DanglingReference {
                table:  spec.name,
                field:  field.name,
                target: table,
              });
            }
          }
          FieldKind::SuperLink { entity }
          | FieldKind::InstanceType { entity } => {
            if !self.super_entities.contains_key(entity) {
              return Err(Error::UnknownSuperEntity(entity.to_owned()));
            }
          }
          _ => {}
        }
      }

      for component in &spec.components {
        let joined = self
          .tables
          .get(component.name)
          .is_some_and(|c| c.field(component.joinby).is_some());
        if !joined {
          return Err(Error::DanglingComponent {
            table:     spec.name,
            component: component.name,
          });
        }
      }
    }

    if let Some(table) = self
      .crud_strings
      .keys()
      .find(|t| !self.tables.contains_key(*t))
    {
      return Err(Error::UnknownTable((*table).to_owned()));
    }

    tracing::debug!(
      tables = self.tables.len(),
      super_entities = self.super_entities.len(),
      "schema registry built"
    );

    Ok(Schema {
      tables:         self.tables,
      super_entities: self.super_entities,
      crud_strings:   self.crud_strings,
    })
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// The frozen registry produced by [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct Schema {
  tables:         BTreeMap<&'static str, TableSpec>,
  super_entities: BTreeMap<&'static str, SuperEntitySpec>,
  crud_strings:   BTreeMap<&'static str, CrudStrings>,
}

impl Schema {
  pub fn table(&self, name: &str) -> Option<&TableSpec> {
    self.tables.get(name)
  }

  pub fn require_table(&self, name: &str) -> Result<&TableSpec> {
    self
      .table(name)
      .ok_or_else(|| Error::UnknownTable(name.to_owned()))
  }

  /// All tables, ordered by name.
  pub fn tables(&self) -> impl Iterator<Item = &TableSpec> {
    self.tables.values()
  }

  pub fn super_entity(&self, name: &str) -> Option<&SuperEntitySpec> {
    self.super_entities.get(name)
  }

  /// The super-entities that list `table` among their instance types.
  pub fn instance_of<'a>(
    &'a self,
    table: &'a str,
  ) -> impl Iterator<Item = &'a SuperEntitySpec> + 'a {
    self.super_entities.values().filter(move |s| s.has_type(table))
  }

  /// Components of `table`: its own, plus those inherited from every
  /// super-entity it is an instance type of. `table` itself need not be
  /// registered.
  pub fn components<'a>(&'a self, table: &'a str) -> Vec<&'a ComponentSpec> {
    let own = self
      .tables
      .get(table)
      .into_iter()
      .flat_map(|t| t.components.iter());

    let inherited = self
      .instance_of(table)
      .filter_map(|s| self.tables.get(s.name))
      .flat_map(|t| t.components.iter());

    own.chain(inherited).collect()
  }

  pub fn component<'a>(
    &'a self,
    table: &'a str,
    name: &str,
  ) -> Option<&'a ComponentSpec> {
    self.components(table).into_iter().find(|c| c.name == name)
  }

  pub fn crud_strings(&self, table: &str) -> Option<&CrudStrings> {
    self.crud_strings.get(table)
  }

  /// Fail with [`Error::NotPermitted`] unless `table`'s configuration allows
  /// `method` through the generic CRUD surface.
  pub fn permits(&self, table: &str, method: CrudMethod) -> Result<()> {
    if self.require_table(table)?.config.permits(method) {
      Ok(())
    } else {
      Err(Error::NotPermitted {
        table: table.to_owned(),
        method,
      })
    }
  }

  /// Validate a caller-supplied value for `table.field`.
  pub fn check(&self, table: &str, field: &str, value: Option<&str>) -> Result<()> {
    self
      .require_table(table)?
      .require_field(field)?
      .check(table, value)
  }
}
