//! Parquet encoding and decoding of a timeline.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use arrow::array::{Float64Array, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use cairn_types::{Bar, Timeline};

use crate::StoreError;

const ROW_GROUP_SIZE: usize = 100_000;

/// Creates the Arrow schema for a bar timeline.
fn bar_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "timestamp",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
        Field::new("volume", DataType::UInt64, false),
    ])
}

/// Converts a slice of bars to an Arrow RecordBatch.
fn bars_to_batch(bars: &[Bar]) -> Result<RecordBatch, StoreError> {
    let timestamps: Vec<_> = bars.iter().map(|b| b.timestamp.timestamp_micros()).collect();
    let opens: Vec<_> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<_> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<_> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<_> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<_> = bars.iter().map(|b| b.volume).collect();

    RecordBatch::try_new(
        Arc::new(bar_schema()),
        vec![
            Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC")),
            Arc::new(Float64Array::from(opens)),
            Arc::new(Float64Array::from(highs)),
            Arc::new(Float64Array::from(lows)),
            Arc::new(Float64Array::from(closes)),
            Arc::new(UInt64Array::from(volumes)),
        ],
    )
    .map_err(|e| StoreError::Columnar(e.to_string()))
}

/// Writes the full timeline as Parquet (SNAPPY, microsecond UTC
/// timestamps).
pub(crate) fn write_parquet<W: Write + Send>(
    timeline: &Timeline,
    writer: W,
) -> Result<(), StoreError> {
    let schema = Arc::new(bar_schema());
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_max_row_group_size(ROW_GROUP_SIZE)
        .build();

    let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))
        .map_err(|e| StoreError::Columnar(e.to_string()))?;

    for chunk in timeline.bars().chunks(ROW_GROUP_SIZE) {
        let batch = bars_to_batch(chunk)?;
        arrow_writer
            .write(&batch)
            .map_err(|e| StoreError::Columnar(e.to_string()))?;
    }

    arrow_writer
        .close()
        .map_err(|e| StoreError::Columnar(e.to_string()))?;

    Ok(())
}

/// Reads a timeline back from a Parquet file.
pub(crate) fn read_parquet(file: File) -> Result<Timeline, StoreError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| StoreError::Columnar(e.to_string()))?
        .build()
        .map_err(|e| StoreError::Columnar(e.to_string()))?;

    let mut bars = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| StoreError::Columnar(e.to_string()))?;
        append_batch(&batch, &mut bars)?;
    }
    Ok(Timeline::from_bars(bars))
}

fn append_batch(batch: &RecordBatch, bars: &mut Vec<Bar>) -> Result<(), StoreError> {
    let column = |name: &str| {
        batch
            .column_by_name(name)
            .ok_or_else(|| StoreError::Columnar(format!("missing column '{name}'")))
    };
    let float = |name: &str| -> Result<&Float64Array, StoreError> {
        column(name)?
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| StoreError::Columnar(format!("column '{name}' is not Float64")))
    };

    let timestamps = column("timestamp")?
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| StoreError::Columnar("column 'timestamp' has wrong type".to_string()))?;
    let opens = float("open")?;
    let highs = float("high")?;
    let lows = float("low")?;
    let closes = float("close")?;
    let volumes = column("volume")?
        .as_any()
        .downcast_ref::<UInt64Array>()
        .ok_or_else(|| StoreError::Columnar("column 'volume' is not UInt64".to_string()))?;

    for i in 0..batch.num_rows() {
        let micros = timestamps.value(i);
        let timestamp = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| StoreError::Columnar(format!("timestamp {micros} out of range")))?;
        bars.push(Bar::new(
            timestamp,
            opens.value(i),
            highs.value(i),
            lows.value(i),
            closes.value(i),
            volumes.value(i),
        ));
    }
    Ok(())
}
