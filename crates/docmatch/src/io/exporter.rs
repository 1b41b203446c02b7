//! Write a [`Dataset`] to CSV (UTF-8 with BOM) or XLSX.

use super::format::FileFormat;
use crate::error::{DocmatchError, Result};
use crate::table::{Dataset, StringColumn};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// Worksheet limits of the xlsx format
const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLUMNS: usize = 16_384;

pub fn export(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = FileFormat::for_export(path)?;
    info!(path = %path.display(), rows = dataset.num_rows(), "Starting export");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DocmatchError::from_io(parent, e))?;
    }

    match format {
        FileFormat::Csv => write_csv(dataset, path)?,
        FileFormat::Xls | FileFormat::Xlsx => write_xlsx(dataset, path)?,
    }

    info!(path = %path.display(), "Dataset exported");
    Ok(())
}

fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| DocmatchError::from_io(path, e))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)
        .map_err(|e| DocmatchError::from_io(path, e))?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(dataset.column_names())?;
    for row in dataset.to_string_rows()? {
        writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
    }
    writer.flush().map_err(|e| DocmatchError::from_io(path, e))?;
    Ok(())
}

fn write_xlsx(dataset: &Dataset, path: &Path) -> Result<()> {
    if dataset.num_rows() >= XLSX_MAX_ROWS || dataset.num_columns() > XLSX_MAX_COLUMNS {
        return Err(DocmatchError::Config(format!(
            "{} rows x {} columns does not fit in a worksheet",
            dataset.num_rows(),
            dataset.num_columns()
        )));
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in dataset.column_names().iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }

    for col in 0..dataset.num_columns() {
        let array = dataset.column_at(col);
        let col_num = col as u16;
        let cells = (0..array.len()).filter(|&row| !array.is_null(row));
        match array.data_type() {
            DataType::Int64 => {
                let values = array.as_primitive::<Int64Type>();
                for row in cells {
                    sheet.write_number(row as u32 + 1, col_num, values.value(row) as f64)?;
                }
            }
            DataType::Float64 => {
                let values = array.as_primitive::<Float64Type>();
                for row in cells {
                    sheet.write_number(row as u32 + 1, col_num, values.value(row))?;
                }
            }
            DataType::Boolean => {
                let values = array.as_boolean();
                for row in cells {
                    sheet.write_boolean(row as u32 + 1, col_num, values.value(row))?;
                }
            }
            _ => {
                let values = StringColumn::new(array)?;
                for row in cells {
                    if let Some(text) = values.get(row) {
                        sheet.write_string(row as u32 + 1, col_num, text)?;
                    }
                }
            }
        }
    }

    workbook.save(path).map_err(|e| match e {
        XlsxError::IoError(io) => DocmatchError::from_io(path, io),
        other => DocmatchError::Xlsx(other),
    })
}
