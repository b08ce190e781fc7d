use serde_json::Value as JsonValue;
use time::{Date, PrimitiveDateTime};

use crate::domain::iso::{parse_iso, IsoTemporal};
use crate::TableError;

/// Label every historical series index carries after decode.
pub const DATE_INDEX_LABEL: &str = "date";

/// Leading record keys an encoder writes for a row index.
const INDEX_COLUMN_NAMES: [&str; 2] = [DATE_INDEX_LABEL, "index"];

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(Date),
    DateTime(PrimitiveDateTime),
    /// Nested JSON found inside a record, kept as received.
    Json(JsonValue),
}

impl Cell {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(flag) => Self::Bool(*flag),
            JsonValue::Number(number) => match number.as_i64() {
                Some(int) => Self::Int(int),
                None => number.as_f64().map_or(Self::Json(value.clone()), Self::Float),
            },
            JsonValue::String(text) => Self::Text(text.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Self::Json(value.clone()),
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(int) => Some(*int as f64),
            Self::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Reads the cell as a calendar date, if it is one or spells one.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Self::Date(date) => Some(*date),
            Self::DateTime(datetime) => Some(datetime.date()),
            Self::Text(text) => parse_iso(text).map(IsoTemporal::date),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Date> for Cell {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

impl From<PrimitiveDateTime> for Cell {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

/// Storage type of a column, inferred from its non-null cells.
///
/// `Object` is the untyped bucket: mixed cells, text, nested JSON, or no
/// data at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Integer,
    Float,
    Temporal,
    Object,
}

impl ColumnKind {
    fn infer<'a>(cells: impl Iterator<Item = &'a Cell>) -> Self {
        let mut kind: Option<Self> = None;
        for cell in cells {
            let cell_kind = match cell {
                Cell::Null => continue,
                Cell::Bool(_) => Self::Bool,
                Cell::Int(_) => Self::Integer,
                Cell::Float(_) => Self::Float,
                Cell::Date(_) | Cell::DateTime(_) => Self::Temporal,
                Cell::Text(_) | Cell::Json(_) => return Self::Object,
            };
            kind = Some(match (kind, cell_kind) {
                (None, next) => next,
                (Some(current), next) if current == next => current,
                (Some(Self::Integer), Self::Float) | (Some(Self::Float), Self::Integer) => {
                    Self::Float
                }
                _ => return Self::Object,
            });
        }
        kind.unwrap_or(Self::Object)
    }
}

/// Row labels of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableIndex {
    pub label: Option<String>,
    pub values: Vec<Cell>,
}

/// Ordered rows of named columns with an optional labeled index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    index: Option<TableIndex>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for column in columns {
            let name = column.into();
            if names.contains(&name) {
                return Err(TableError::DuplicateColumn { name });
            }
            names.push(name);
        }

        Ok(Self {
            columns: names,
            rows: Vec::new(),
            index: None,
        })
    }

    /// An empty table whose rows are labeled by an index called `label`.
    pub fn indexed<I, S>(label: impl Into<String>, columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns)?;
        table.index = Some(TableIndex {
            label: Some(label.into()),
            values: Vec::new(),
        });
        Ok(table)
    }

    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<(), TableError> {
        if self.index.is_some() {
            return Err(TableError::IndexRequired);
        }
        self.check_width(&cells)?;
        self.rows.push(cells);
        Ok(())
    }

    pub fn push_indexed_row(&mut self, key: Cell, cells: Vec<Cell>) -> Result<(), TableError> {
        self.check_width(&cells)?;
        let index = self.index.as_mut().ok_or(TableError::NotIndexed)?;
        index.values.push(key);
        self.rows.push(cells);
        Ok(())
    }

    /// Replaces the index wholesale.
    pub fn set_index(&mut self, label: Option<String>, values: Vec<Cell>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::IndexLength {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        self.index = Some(TableIndex { label, values });
        Ok(())
    }

    fn check_width(&self, cells: &[Cell]) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }
        Ok(())
    }

    /// Builds a table from "records" JSON: an array of `{column: cell}` objects.
    ///
    /// Columns appear in first-seen order; a record missing a column gets a
    /// null cell there. The result has no index.
    pub fn from_records(records: &[JsonValue]) -> Result<Self, TableError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let object = record.as_object().ok_or(TableError::NotRecords)?;
            for key in object.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(JsonValue::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).map_or(Cell::Null, Cell::from_json))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            index: None,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    pub fn index(&self) -> Option<&TableIndex> {
        self.index.as_ref()
    }

    pub fn index_label(&self) -> Option<&str> {
        self.index.as_ref().and_then(|index| index.label.as_deref())
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let position = self.column_position(name)?;
        Some(self.rows.iter().map(move |row| &row[position]))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let position = self.column_position(column)?;
        self.rows.get(row).map(|cells| &cells[position])
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(ColumnKind::infer)
    }

    pub(crate) fn column_cells_mut(
        &mut self,
        position: usize,
    ) -> impl Iterator<Item = &mut Cell> + '_ {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(position))
    }

    /// Labels the row index `"date"` and types its entries as dates.
    ///
    /// An existing index is relabeled whatever it was called. A table without
    /// one (the usual case after decode, since records carry no index) has its
    /// first column promoted when that column is the written index or holds
    /// only calendar days. Otherwise every column stays and rows are indexed
    /// by position.
    pub fn into_date_indexed(mut self) -> Self {
        let mut index = match self.index.take() {
            Some(index) => index,
            None if self.first_column_is_index() => {
                self.columns.remove(0);
                let values = self.rows.iter_mut().map(|row| row.remove(0)).collect();
                TableIndex {
                    label: None,
                    values,
                }
            }
            None => TableIndex {
                label: None,
                values: (0..self.rows.len())
                    .map(|position| Cell::Int(position as i64))
                    .collect(),
            },
        };

        index.label = Some(DATE_INDEX_LABEL.to_owned());
        for value in &mut index.values {
            if let Some(date) = as_calendar_day(value) {
                *value = Cell::Date(date);
            }
        }

        self.index = Some(index);
        self
    }

    fn first_column_is_index(&self) -> bool {
        let Some(first) = self.columns.first() else {
            return false;
        };
        if INDEX_COLUMN_NAMES.contains(&first.as_str()) {
            return true;
        }
        !self.rows.is_empty()
            && self.rows.iter().all(|row| as_calendar_day(&row[0]).is_some())
    }
}

/// A cell that names a whole day: a date, a midnight datetime, or date text.
fn as_calendar_day(cell: &Cell) -> Option<Date> {
    match cell {
        Cell::Date(date) => Some(*date),
        Cell::DateTime(datetime) if datetime.time() == time::Time::MIDNIGHT => {
            Some(datetime.date())
        }
        Cell::Text(text) => match parse_iso(text)? {
            IsoTemporal::Date(date) => Some(date),
            IsoTemporal::DateTime(datetime) if datetime.time() == time::Time::MIDNIGHT => {
                Some(datetime.date())
            }
            IsoTemporal::DateTime(_) => None,
        },
        _ => None,
    }
}
