use bon::Builder;
use serde_json::{Map, Value};

use super::table::Table;
use crate::Result;
use crate::error::Error;

const RENAME_COLUMNS: &str = "rename-columns";
const REORDER_COLUMNS: &str = "reorder-columns";
const REINDEX: &str = "reindex";

/// Writer options for `tabular` output.
///
/// The three structural directives are applied to the loaded table, in the order rename, reorder,
/// reindex. `extra` is forwarded to the serializer selected by the persistence path.
///
/// ```
/// use eodhd_client_sdk::normalize::WriterOptions;
///
/// let options = WriterOptions::builder()
///     .rename_columns(vec![("Adjusted_close".to_owned(), "Close".to_owned())])
///     .reorder_columns(true)
///     .reindex(vec!["Date".to_owned()])
///     .build();
/// assert!(options.extra.is_empty());
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Builder)]
pub struct WriterOptions {
    /// Old label to new label, in the order the columns are reordered to
    #[builder(default)]
    pub rename_columns: Vec<(String, String)>,
    /// Keep only the renamed columns, ordered like `rename_columns`
    #[builder(default)]
    pub reorder_columns: bool,
    /// Columns forming the key of the table
    #[builder(default)]
    pub reindex: Vec<String>,
    /// Serializer options
    #[builder(default)]
    pub extra: Map<String, Value>,
}

impl WriterOptions {
    /// Split a raw option mapping into directives and serializer options.
    ///
    /// `rename-columns` must be an object of strings, `reorder-columns` a boolean and `reindex`
    /// a string or an array of strings. Every other key is kept in [`Self::extra`].
    pub fn from_map(mut options: Map<String, Value>) -> Result<Self> {
        let rename_columns = match options.remove(RENAME_COLUMNS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(mapping)) => mapping
                .into_iter()
                .map(|(from, to)| match to {
                    Value::String(to) => Ok((from, to)),
                    other => Err(Error::validation(format!(
                        "{RENAME_COLUMNS}: label for '{from}' must be a string, found {other}"
                    ))),
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(Error::validation(format!(
                    "{RENAME_COLUMNS} must be a mapping, found {other}"
                )));
            }
        };

        let reorder_columns = match options.remove(REORDER_COLUMNS) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => flag,
            Some(other) => {
                return Err(Error::validation(format!(
                    "{REORDER_COLUMNS} must be a boolean, found {other}"
                )));
            }
        };

        let reindex = match options.remove(REINDEX) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(column)) => vec![column],
            Some(Value::Array(columns)) => columns
                .into_iter()
                .map(|column| match column {
                    Value::String(column) => Ok(column),
                    other => Err(Error::validation(format!(
                        "{REINDEX} entries must be strings, found {other}"
                    ))),
                })
                .collect::<Result<_>>()?,
            Some(other) => {
                return Err(Error::validation(format!(
                    "{REINDEX} must be a string or a list of strings, found {other}"
                )));
            }
        };

        Ok(Self {
            rename_columns,
            reorder_columns,
            reindex,
            extra: options,
        })
    }

    /// Apply the structural directives to `table`.
    ///
    /// Reordering only happens when a rename mapping was given.
    pub fn apply(&self, table: &mut Table) -> Result<()> {
        if !self.rename_columns.is_empty() {
            table.rename(&self.rename_columns);

            if self.reorder_columns {
                let order: Vec<String> = self
                    .rename_columns
                    .iter()
                    .map(|(_, to)| to.clone())
                    .collect();
                table.select(&order)?;
            }
        }

        if !self.reindex.is_empty() {
            table.set_index(&self.reindex)?;
        }

        Ok(())
    }
}
