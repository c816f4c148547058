//!
//! # Configuration store
//!
//! The layout engine reads its inputs from, and publishes its results to, a hierarchical
//! key-value store organized in tables.
//! A table is addressed by a name and an index (e.g. `GEO[shield]`), the default index being
//! the empty string (e.g. `PMTINFO[]`).
//! Each table holds named fields that are either scalars or arrays.
//!
//! The [ConfigStore] trait only requires raw field access, the typed accessors
//! (`get_d`, `get_darray`, `set_i`, ...) are provided on top of it and the nested table [Link]
//! comes with the [NestedLink] extension.
//! [MemoryStore] is the in-memory implementation, it loads its tables from TOML templates.

use serde::Serialize;
use std::{fmt, path::PathBuf};

mod memory;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table {0} not found")]
    Table(TableKey),
    #[error("field {field} not found in table {table}")]
    Field { table: TableKey, field: String },
    #[error("field {field} of table {table} is of type {found}, expected {expected}")]
    Type {
        table: TableKey,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("the template file ({0}) does not exist")]
    TemplatePath(String),
    #[error(r#"the template {0} is not a file and the environment variable "PMT_COVERAGE_DATA" is not set"#)]
    EnvVar(String, #[source] std::env::VarError),
    #[error("cannot read template file: {1}")]
    Read(#[source] std::io::Error, PathBuf),
    #[error("cannot deserialize template from toml")]
    Parse(#[from] toml::de::Error),
    #[error("array {field} of table {table} is empty")]
    EmptyArray { table: TableKey, field: String },
    #[error("cannot serialize store into toml")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid entry #{0} in template {1}: {2}")]
    Entry(usize, String, String),
    #[error("template {0} has no table")]
    EmptyTemplate(String),
}
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Table address: name and index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub name: String,
    pub index: String,
}
impl TableKey {
    pub fn new(name: &str, index: &str) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
        }
    }
}
impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// Field value
///
/// An empty array has no element type: empty integer and double arrays are equal and both
/// can be read as either.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Double(f64),
    Str(String),
    IntArray(Vec<i64>),
    DoubleArray(Vec<f64>),
}
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (IntArray(a), IntArray(b)) => a == b,
            (DoubleArray(a), DoubleArray(b)) => a == b,
            (IntArray(a), DoubleArray(b)) | (DoubleArray(b), IntArray(a)) => {
                a.is_empty() && b.is_empty()
            }
            _ => false,
        }
    }
}
impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::IntArray(_) => "int array",
            Value::DoubleArray(_) => "double array",
        }
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}
impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::IntArray(value)
    }
}
impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::DoubleArray(value)
    }
}

/// Hierarchical configuration store interface
///
/// Integer values are widened when read as doubles but doubles are never narrowed to integers.
pub trait ConfigStore {
    /// Returns the value of a field, if the table and the field exist
    fn field(&self, table: &str, index: &str, field: &str) -> Option<&Value>;
    /// Sets the value of a field, creating the table if needed
    fn set_field(&mut self, table: &str, index: &str, field: &str, value: Value);
    /// Checks if a table exists
    fn has_table(&self, table: &str, index: &str) -> bool;
    /// Loads a template into the store and returns the number of tables that have been loaded
    fn load(&mut self, template: &str) -> StoreResult<usize>;

    #[doc(hidden)]
    fn get_value(&self, table: &str, index: &str, field: &str) -> StoreResult<&Value> {
        if !self.has_table(table, index) {
            return Err(StoreError::Table(TableKey::new(table, index)));
        }
        self.field(table, index, field)
            .ok_or_else(|| StoreError::Field {
                table: TableKey::new(table, index),
                field: field.into(),
            })
    }
    /// Gets a double scalar
    fn get_d(&self, table: &str, index: &str, field: &str) -> StoreResult<f64> {
        match self.get_value(table, index, field)? {
            Value::Double(value) => Ok(*value),
            Value::Int(value) => Ok(*value as f64),
            other => Err(type_error(table, index, field, "double", other)),
        }
    }
    /// Gets an integer scalar
    fn get_i(&self, table: &str, index: &str, field: &str) -> StoreResult<i64> {
        match self.get_value(table, index, field)? {
            Value::Int(value) => Ok(*value),
            other => Err(type_error(table, index, field, "int", other)),
        }
    }
    /// Gets a string
    fn get_s(&self, table: &str, index: &str, field: &str) -> StoreResult<String> {
        match self.get_value(table, index, field)? {
            Value::Str(value) => Ok(value.clone()),
            other => Err(type_error(table, index, field, "string", other)),
        }
    }
    /// Gets an array of doubles
    fn get_darray(&self, table: &str, index: &str, field: &str) -> StoreResult<Vec<f64>> {
        match self.get_value(table, index, field)? {
            Value::DoubleArray(value) => Ok(value.clone()),
            Value::IntArray(value) => Ok(value.iter().map(|x| *x as f64).collect()),
            other => Err(type_error(table, index, field, "double array", other)),
        }
    }
    /// Gets an array of integers
    fn get_iarray(&self, table: &str, index: &str, field: &str) -> StoreResult<Vec<i64>> {
        match self.get_value(table, index, field)? {
            Value::IntArray(value) => Ok(value.clone()),
            Value::DoubleArray(value) if value.is_empty() => Ok(Vec::new()),
            other => Err(type_error(table, index, field, "int array", other)),
        }
    }
    /// Sets a double scalar
    fn set_d(&mut self, table: &str, index: &str, field: &str, value: f64) {
        self.set_field(table, index, field, value.into())
    }
    /// Sets an integer scalar
    fn set_i(&mut self, table: &str, index: &str, field: &str, value: i64) {
        self.set_field(table, index, field, value.into())
    }
    /// Sets an array of doubles
    fn set_darray(&mut self, table: &str, index: &str, field: &str, value: Vec<f64>) {
        self.set_field(table, index, field, value.into())
    }
    /// Sets an array of integers
    fn set_iarray(&mut self, table: &str, index: &str, field: &str, value: Vec<i64>) {
        self.set_field(table, index, field, value.into())
    }
}

fn type_error(
    table: &str,
    index: &str,
    field: &str,
    expected: &'static str,
    found: &Value,
) -> StoreError {
    StoreError::Type {
        table: TableKey::new(table, index),
        field: field.into(),
        expected,
        found: found.type_name(),
    }
}

/// Nested table lookup
///
/// Implemented for every [ConfigStore], trait objects included.
pub trait NestedLink: ConfigStore {
    /// Returns a link to the table `table[index]`
    fn link(&self, table: &str, index: &str) -> StoreResult<Link<'_, Self>>;
}
impl<S: ConfigStore + ?Sized> NestedLink for S {
    fn link(&self, table: &str, index: &str) -> StoreResult<Link<'_, Self>> {
        if self.has_table(table, index) {
            Ok(Link {
                store: self,
                key: TableKey::new(table, index),
            })
        } else {
            Err(StoreError::Table(TableKey::new(table, index)))
        }
    }
}

/// Read-only link to a single table of a [ConfigStore]
pub struct Link<'a, S: ConfigStore + ?Sized> {
    store: &'a S,
    key: TableKey,
}
impl<'a, S: ConfigStore + ?Sized> Link<'a, S> {
    /// Returns the table address
    pub fn key(&self) -> &TableKey {
        &self.key
    }
    pub fn get_d(&self, field: &str) -> StoreResult<f64> {
        self.store.get_d(&self.key.name, &self.key.index, field)
    }
    pub fn get_i(&self, field: &str) -> StoreResult<i64> {
        self.store.get_i(&self.key.name, &self.key.index, field)
    }
    pub fn get_s(&self, field: &str) -> StoreResult<String> {
        self.store.get_s(&self.key.name, &self.key.index, field)
    }
    pub fn get_darray(&self, field: &str) -> StoreResult<Vec<f64>> {
        self.store.get_darray(&self.key.name, &self.key.index, field)
    }
    pub fn get_iarray(&self, field: &str) -> StoreResult<Vec<i64>> {
        self.store.get_iarray(&self.key.name, &self.key.index, field)
    }
    /// Follows a string field of this table to another table: `table[self.field]`
    pub fn follow(&self, field: &str, table: &str) -> StoreResult<Link<'a, S>> {
        let index = self.get_s(field)?;
        self.store.link(table, &index)
    }
}
