//! Polars `AnyValue` and dtype conversions into the table model.

use chrono::{DateTime, NaiveDate};
use polars::prelude::*;

use sheetdiff_model::{CellValue, ColumnType};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars AnyValue to a cell.
/// Returns `Empty` for Null. Strings are kept as read, whitespace included.
pub fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Empty,
        AnyValue::Boolean(b) => CellValue::Bool(b),
        AnyValue::Int8(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int16(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int32(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int64(v) => CellValue::Number(v as f64),
        AnyValue::UInt8(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt16(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt32(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt64(v) => CellValue::Number(v as f64),
        AnyValue::Float32(v) => f64::from(v).into(),
        AnyValue::Float64(v) => v.into(),
        AnyValue::String(s) => CellValue::text(s),
        AnyValue::StringOwned(s) => CellValue::text(s.as_str()),
        AnyValue::Date(days) => days_to_date(days).map_or(CellValue::Empty, CellValue::Date),
        AnyValue::Datetime(v, unit, _) => {
            let datetime = match unit {
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
            };
            datetime.map_or(CellValue::Empty, |dt| CellValue::DateTime(dt.naive_utc()))
        }
        other => CellValue::text(other.to_string()),
    }
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

/// Maps a Polars dtype onto the model's column types.
pub fn dtype_to_column_type(dtype: &DataType) -> ColumnType {
    match dtype {
        DataType::Boolean => ColumnType::Bool,
        DataType::Date => ColumnType::Date,
        DataType::Datetime(_, _) => ColumnType::DateTime,
        DataType::String => ColumnType::Text,
        DataType::Null => ColumnType::Empty,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnType::Number,
        _ => ColumnType::Mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_scalars() {
        assert_eq!(any_to_cell(AnyValue::Null), CellValue::Empty);
        assert_eq!(any_to_cell(AnyValue::Int64(7)), CellValue::Number(7.0));
        assert_eq!(any_to_cell(AnyValue::String("")), CellValue::Empty);
        assert_eq!(any_to_cell(AnyValue::Float64(f64::NAN)), CellValue::Empty);
    }

    #[test]
    fn strings_keep_whitespace() {
        assert_eq!(any_to_cell(AnyValue::String("A  ")), CellValue::text("A  "));
        assert_ne!(any_to_cell(AnyValue::String("A  ")), any_to_cell(AnyValue::String("A")));
        assert_eq!(any_to_cell(AnyValue::String("   ")), CellValue::text("   "));
    }

    #[test]
    fn converts_epoch_days() {
        assert_eq!(
            any_to_cell(AnyValue::Date(19_723)),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn converts_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let millis = expected.and_utc().timestamp_millis();
        assert_eq!(
            any_to_cell(AnyValue::Datetime(millis, TimeUnit::Milliseconds, None)),
            CellValue::DateTime(expected)
        );
    }

    #[test]
    fn maps_dtypes() {
        assert_eq!(dtype_to_column_type(&DataType::Int64), ColumnType::Number);
        assert_eq!(dtype_to_column_type(&DataType::Float32), ColumnType::Number);
        assert_eq!(dtype_to_column_type(&DataType::String), ColumnType::Text);
        assert_eq!(dtype_to_column_type(&DataType::Date), ColumnType::Date);
    }
}
