//! CSV to Parquet conversion.
//!
//! The whole object is held in memory: the schema is inferred from every
//! row first, then the content is decoded a second time into record
//! batches which are written to Parquet in input order.

use std::io::Cursor;
use std::sync::Arc;

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

use crate::error::ArchiveError;

/// A Parquet file produced from one CSV object.
#[derive(Debug)]
pub(crate) struct Converted {
    pub parquet: Bytes,
    pub rows: usize,
}

fn writer_properties() -> WriterProperties {
    let created_by = KeyValue {
        key: "created_by".to_string(),
        value: Some(env!("CARGO_PKG_NAME").to_string()),
    };
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(vec![created_by]))
        .build()
}

/// Decodes `csv` (header row first) and re-encodes it as Parquet.
///
/// Column types are inferred from the content. Empty cells become nulls.
pub(crate) fn csv_to_parquet(csv: &[u8]) -> Result<Converted, ArchiveError> {
    if csv.iter().all(u8::is_ascii_whitespace) {
        return Err(ArchiveError::EmptyInput);
    }
    let format = Format::default().with_header(true);
    let (schema, _) = format.infer_schema(Cursor::new(csv), None)?;
    if schema.fields().is_empty() {
        return Err(ArchiveError::EmptyInput);
    }
    let schema = Arc::new(schema);

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(Cursor::new(csv))?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, Some(writer_properties()))?;
    let mut rows = 0;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        writer.write(&batch)?;
    }
    writer.close()?;

    Ok(Converted {
        parquet: Bytes::from(buffer),
        rows,
    })
}
