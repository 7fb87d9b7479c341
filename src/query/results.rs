//! Materialized result sets.
//!
//! A [`ResultSet`] is populated exactly once, by a single read pass over a
//! driver cursor, and is immutable afterwards. Buffering everything up
//! front trades memory on large results for a container that can be
//! re-iterated, shared across tasks, and read long after the producing
//! command and connection are gone. That trade is the deliberate design
//! choice of this crate, not an accident.
//!
//! Rows are addressed positionally or by case-insensitive column name;
//! field values come out as raw [`Value`]s or through the fallible typed
//! accessors on [`Row`].

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Index;
use std::sync::Arc;

use crate::driver::{ColumnSchema, SqlType};
use crate::error::{AccessError, DriverError};
use crate::types::format::FormatSpec;
use crate::types::{FromValue, Value};

/// Descriptor for a single result column.
///
/// Created once from the driver-reported schema when materialization
/// starts; never mutated.
#[derive(Debug, Clone)]
pub struct Column {
    ordinal: usize,
    name: String,
    data_type: SqlType,
}

impl Column {
    /// 0-based position within the result.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Column name in driver-reported casing.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared data type.
    pub fn data_type(&self) -> &SqlType {
        &self.data_type
    }
}

/// Column descriptors plus the name lookup table, shared by every row of
/// one result.
#[derive(Debug)]
struct ColumnTable {
    columns: Vec<Column>,
    /// Lowercased name -> ordinal, built once. First occurrence wins when
    /// a driver reports duplicate names.
    by_name: HashMap<String, usize>,
}

impl ColumnTable {
    fn new(schema: &[ColumnSchema]) -> Self {
        let columns: Vec<Column> = schema
            .iter()
            .enumerate()
            .map(|(ordinal, col)| Column {
                ordinal,
                name: col.name.clone(),
                data_type: col.data_type.clone(),
            })
            .collect();

        let mut by_name = HashMap::with_capacity(columns.len());
        for column in &columns {
            by_name
                .entry(column.name.to_lowercase())
                .or_insert(column.ordinal);
        }

        Self { columns, by_name }
    }

    fn resolve_name(&self, name: &str) -> Result<usize, AccessError> {
        self.by_name
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| AccessError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn resolve_ordinal(&self, index: usize) -> Result<usize, AccessError> {
        if index < self.columns.len() {
            Ok(index)
        } else {
            Err(AccessError::ColumnOutOfRange {
                index,
                count: self.columns.len(),
            })
        }
    }
}

/// A column address: either a name or a 0-based ordinal.
///
/// The accessors on [`Row`] take `impl Into<ColumnAddr>` so both
/// `row.value::<i64, _>("itemid")` and `row.value::<i64, _>(0)` work.
#[derive(Debug, Clone, Copy)]
pub enum ColumnAddr<'a> {
    /// Case-insensitive column name.
    Name(&'a str),
    /// 0-based ordinal.
    Ordinal(usize),
}

impl<'a> From<&'a str> for ColumnAddr<'a> {
    fn from(name: &'a str) -> Self {
        ColumnAddr::Name(name)
    }
}

impl<'a> From<&'a String> for ColumnAddr<'a> {
    fn from(name: &'a String) -> Self {
        ColumnAddr::Name(name)
    }
}

impl From<usize> for ColumnAddr<'_> {
    fn from(index: usize) -> Self {
        ColumnAddr::Ordinal(index)
    }
}

/// One materialized row.
///
/// An immutable snapshot of field values, positionally aligned with the
/// parent result's columns. The shared column table is referenced only
/// for name-to-ordinal resolution; a row never mutates its parent.
#[derive(Debug, Clone)]
pub struct Row {
    table: Arc<ColumnTable>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from driver fields, normalizing SQL NULL (`None`) to
    /// [`Value::Null`].
    fn new(table: Arc<ColumnTable>, fields: Vec<Option<Value>>) -> Self {
        let values = fields
            .into_iter()
            .map(|field| field.unwrap_or(Value::Null))
            .collect();
        Self { table, values }
    }

    /// Number of fields; always equal to the parent's column count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no fields (zero-column result).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the raw value at a name or ordinal.
    ///
    /// A field that was SQL NULL in the source is [`Value::Null`].
    ///
    /// # Errors
    ///
    /// `AccessError::ColumnNotFound` for an unknown name,
    /// `AccessError::ColumnOutOfRange` for an ordinal past the end.
    pub fn raw<'a>(&self, column: impl Into<ColumnAddr<'a>>) -> Result<&Value, AccessError> {
        let ordinal = self.resolve(column.into())?;
        Ok(&self.values[ordinal])
    }

    /// Extract the value at a name or ordinal as `T`.
    ///
    /// With an explicit target type, leave the address generic inferred:
    /// `row.value::<i64, _>("itemid")`.
    ///
    /// # Errors
    ///
    /// `AccessError::Cast` when the stored value is not convertible to
    /// `T`, plus the lookup failures of [`Row::raw`].
    pub fn value<'a, T, C>(&self, column: C) -> Result<T, AccessError>
    where
        T: FromValue,
        C: Into<ColumnAddr<'a>>,
    {
        T::from_value(self.raw(column)?)
    }

    /// Extract the value at a name or ordinal as `T` and render it
    /// through a display-format specifier: `[[fill]align][width][.precision]`,
    /// modeled on the std `format!` spec.
    ///
    /// # Errors
    ///
    /// `AccessError::Format` for a malformed specifier, plus the failures
    /// of [`Row::value`].
    pub fn formatted<'a, T, C>(&self, column: C, spec: &str) -> Result<String, AccessError>
    where
        T: FromValue + Display,
        C: Into<ColumnAddr<'a>>,
    {
        let spec = FormatSpec::parse(spec)?;
        let value: T = self.value(column)?;
        Ok(spec.apply(&value))
    }

    fn resolve(&self, addr: ColumnAddr<'_>) -> Result<usize, AccessError> {
        match addr {
            ColumnAddr::Name(name) => self.table.resolve_name(name),
            ColumnAddr::Ordinal(index) => self.table.resolve_ordinal(index),
        }
    }
}

impl Index<usize> for Row {
    type Output = Value;

    /// Positional field access. Panics on an out-of-range index, like
    /// slice indexing; use [`Row::raw`] for the fallible form.
    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

/// An eagerly materialized query result.
///
/// Owns the column descriptors, the case-insensitive name lookup, and
/// every row. Independent of the command and connection that produced it.
#[derive(Debug)]
pub struct ResultSet {
    table: Arc<ColumnTable>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create an empty result for the given schema; rows are appended by
    /// the materializing command.
    pub(crate) fn new(schema: &[ColumnSchema]) -> Self {
        Self {
            table: Arc::new(ColumnTable::new(schema)),
            rows: Vec::new(),
        }
    }

    /// Append one driver row.
    ///
    /// # Errors
    ///
    /// `DriverError` when the driver returns a field count that does not
    /// match the schema it reported.
    pub(crate) fn push_row(&mut self, fields: Vec<Option<Value>>) -> Result<(), DriverError> {
        if fields.len() != self.table.columns.len() {
            return Err(DriverError::new(format!(
                "driver returned {} fields for a {}-column result",
                fields.len(),
                self.table.columns.len()
            )));
        }
        self.rows.push(Row::new(Arc::clone(&self.table), fields));
        Ok(())
    }

    /// Column descriptors in driver-reported order.
    pub fn columns(&self) -> &[Column] {
        &self.table.columns
    }

    /// Column names in driver-reported order.
    pub fn column_names(&self) -> Vec<&str> {
        self.table.columns.iter().map(|c| c.name()).collect()
    }

    /// Look up a column descriptor by case-insensitive name.
    ///
    /// # Errors
    ///
    /// `AccessError::ColumnNotFound` when no column matches.
    pub fn column(&self, name: &str) -> Result<&Column, AccessError> {
        let ordinal = self.table.resolve_name(name)?;
        Ok(&self.table.columns[ordinal])
    }

    /// All rows, in the order the driver produced them.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the buffered rows. Re-iterating replays the same rows
    /// in the same order; the backing store is not a live cursor.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
