//! Arrow backed serializers: feather (Arrow IPC file) and parquet.
//!
//! **Feature flag:** `arrow`

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::FileWriter;
use parquet::arrow::ArrowWriter;

use super::table::{Cell, Column, Table};
use crate::Result;
use crate::error::Error;

/// Key columns lead, as in every other tabular format.
fn batch(table: &Table) -> Result<RecordBatch> {
    let (_, columns) = table.frame(!table.index().is_empty());

    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());
    for column in &columns {
        let (data_type, array) = array(column);
        fields.push(Field::new(column.name(), data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| Error::processing(format!("unable to build record batch: {e}")))
}

/// Arrow array of the narrowest type holding every cell. Mixed columns fall back to strings.
fn array(column: &Column) -> (DataType, ArrayRef) {
    let cells = column.cells();
    let all = |f: fn(&Cell) -> bool| cells.iter().all(|c| c.is_null() || f(c));

    if all(|c| matches!(c, Cell::Int(_))) {
        let values: Int64Array = cells
            .iter()
            .map(|c| match c {
                Cell::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        (DataType::Int64, Arc::new(values))
    } else if all(|c| matches!(c, Cell::Int(_) | Cell::Float(_))) {
        let values: Float64Array = cells.iter().map(Cell::as_f64).collect();
        (DataType::Float64, Arc::new(values))
    } else if all(|c| matches!(c, Cell::Bool(_))) {
        let values: BooleanArray = cells
            .iter()
            .map(|c| match c {
                Cell::Bool(v) => Some(*v),
                _ => None,
            })
            .collect();
        (DataType::Boolean, Arc::new(values))
    } else {
        let values: StringArray = cells
            .iter()
            .map(|c| (!c.is_null()).then(|| c.to_string()))
            .collect();
        (DataType::Utf8, Arc::new(values))
    }
}

pub(crate) fn feather(table: &Table) -> Result<Vec<u8>> {
    let batch = batch(table)?;
    let fault = |e: arrow::error::ArrowError| Error::processing(format!("unable to write feather: {e}"));

    let mut writer = FileWriter::try_new(Vec::new(), &batch.schema()).map_err(fault)?;
    writer.write(&batch).map_err(fault)?;
    writer.finish().map_err(fault)?;
    writer.into_inner().map_err(fault)
}

pub(crate) fn parquet(table: &Table) -> Result<Vec<u8>> {
    let batch = batch(table)?;
    let fault =
        |e: parquet::errors::ParquetError| Error::processing(format!("unable to write parquet: {e}"));

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).map_err(fault)?;
    writer.write(&batch).map_err(fault)?;
    writer.close().map_err(fault)?;
    Ok(buffer)
}
