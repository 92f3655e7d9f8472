//! Data transfer objects between the page orchestrator, CSV persistence and
//! reporting.

use crate::domain::Record;

/// Column holding the category label derived from the main-category URL
pub const MAIN_CATEG_COL: &str = "main_categ";
/// Column holding the category label derived from the sub-category URL
pub const SUB_CATEG_COL: &str = "sub_categ";

/// Rectangular table of scraped products.
///
/// Every row has exactly one cell per column; rows keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ProductTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// `main_categ`, `sub_categ`, then the field columns
    pub fn with_category_columns<'a>(field_names: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new([MAIN_CATEG_COL, SUB_CATEG_COL].into_iter().chain(field_names))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Values of one column, top to bottom
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Append a row, padding short rows with empty cells and dropping extras
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Append a record under its category labels; cells are matched by column name
    pub fn push_record(&mut self, main_categ: &str, sub_categ: &str, record: &Record) {
        let row = self
            .columns
            .iter()
            .map(|column| match column.as_str() {
                MAIN_CATEG_COL => main_categ.to_string(),
                SUB_CATEG_COL => sub_categ.to_string(),
                field => record.get(field).unwrap_or_default().to_string(),
            })
            .collect();
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_columns_come_first() {
        let table = ProductTable::with_category_columns(["name", "price"]);

        assert_eq!(table.columns(), ["main_categ", "sub_categ", "name", "price"]);
        assert!(table.is_empty());
    }

    #[test]
    fn records_fill_cells_by_column_name() {
        let mut table = ProductTable::with_category_columns(["name", "price"]);
        let record: Record = [("price", "9.99"), ("name", "Widget")].into_iter().collect();

        table.push_record("tools", "hammers", &record);
        table.push_record("tools", "saws", &Record::empty(["price"]));

        assert_eq!(table.rows()[0], ["tools", "hammers", "Widget", "9.99"]);
        assert_eq!(table.rows()[1], ["tools", "saws", "", ""]);
        assert_eq!(
            table.column_values(SUB_CATEG_COL).unwrap().collect::<Vec<_>>(),
            vec!["hammers", "saws"]
        );
        assert!(table.column_values("colour").is_none());
    }

    #[test]
    fn push_row_normalizes_width() {
        let mut table = ProductTable::new(["a", "b"]);

        table.push_row(vec!["1".into()]);
        table.push_row(vec!["1".into(), "2".into(), "3".into()]);

        assert_eq!(table.rows(), [vec!["1", ""], vec!["1", "2"]]);
    }
}
