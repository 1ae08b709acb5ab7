// 📊 Table Builder - RawRecord list → sorted OffsetTable
//
// Sort key: (entity, datetime). Null datetimes go LAST inside their entity
// and the sort is stable, so ties keep extraction order. The aggregator
// relies on this: first row of a group = earliest, last row = latest.

use crate::parser::RawRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fixed date + time format: D/M/YYYY H:MM:SS AM|PM
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

/// One row of the Datos table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetRow {
    #[serde(flatten)]
    pub record: RawRecord,

    /// Derived from date + time; None when they don't form a valid timestamp.
    /// Internal sort key, never exported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
}

impl OffsetRow {
    pub fn new(record: RawRecord) -> Self {
        let datetime = combine_datetime(&record.date, &record.time);
        OffsetRow { record, datetime }
    }

    pub fn entity(&self) -> &str {
        &self.record.entity
    }
}

/// Rows sorted by entity, then timestamp (nulls last)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffsetTable {
    rows: Vec<OffsetRow>,
}

impl OffsetTable {
    /// Build and sort. Takes ownership; the input is not reused afterwards.
    pub fn build(records: Vec<RawRecord>) -> Self {
        let mut rows: Vec<OffsetRow> = records.into_iter().map(OffsetRow::new).collect();
        rows.sort_by(compare_rows);
        OffsetTable { rows }
    }

    pub fn rows(&self) -> &[OffsetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contiguous runs of rows sharing an entity, in table order
    pub fn groups(&self) -> impl Iterator<Item = &[OffsetRow]> {
        self.rows.chunk_by(|a, b| a.entity() == b.entity())
    }

    pub fn null_datetime_count(&self) -> usize {
        self.rows.iter().filter(|r| r.datetime.is_none()).count()
    }
}

/// Parse "date time" with `DATETIME_FORMAT`. The marker is upper-cased first
/// so "pm" parses like "PM".
pub fn combine_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date, time.to_uppercase());
    NaiveDateTime::parse_from_str(&combined, DATETIME_FORMAT).ok()
}

fn compare_rows(a: &OffsetRow, b: &OffsetRow) -> Ordering {
    a.entity()
        .cmp(b.entity())
        .then_with(|| compare_nulls_last(a.datetime, b.datetime))
}

fn compare_nulls_last(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, time: &str, entity: &str, old: f64, new: f64) -> RawRecord {
        RawRecord {
            date: date.to_string(),
            time: time.to_string(),
            entity: entity.to_string(),
            characteristic: "X".to_string(),
            old_value: old,
            new_value: new,
            user: String::new(),
        }
    }

    #[test]
    fn test_combine_datetime_day_first_twelve_hour() {
        let dt = combine_datetime("10/5/2024", "02:15:30 PM").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(14, 15, 30)
            .unwrap();
        assert_eq!(dt, expected);

        let dt = combine_datetime("1/1/2024", "12:00:00 am").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "00:00");
    }

    #[test]
    fn test_combine_datetime_invalid_is_none() {
        assert!(combine_datetime("31/2/2024", "01:00:00 PM").is_none());
        assert!(combine_datetime("1/13/2024", "01:00:00 PM").is_none());
        assert!(combine_datetime("1/1/2024", "13:00:00 PM").is_none());
    }

    #[test]
    fn test_sorted_by_entity_then_datetime() {
        let table = OffsetTable::build(vec![
            record("2/1/2024", "10:00:00 AM", "B", 1.0, 2.0),
            record("1/1/2024", "10:00:00 AM", "B", 3.0, 4.0),
            record("5/1/2024", "09:00:00 AM", "A", 5.0, 6.0),
            record("1/1/2024", "09:00:00 PM", "A", 7.0, 8.0),
        ]);

        let order: Vec<(&str, f64)> = table
            .rows()
            .iter()
            .map(|r| (r.entity(), r.record.old_value))
            .collect();
        assert_eq!(order, vec![("A", 7.0), ("A", 5.0), ("B", 3.0), ("B", 1.0)]);
    }

    #[test]
    fn test_null_datetimes_sort_last_and_stable() {
        let table = OffsetTable::build(vec![
            record("1/1/2024", "13:00:00 PM", "A", 1.0, 0.0),
            record("3/1/2024", "10:00:00 AM", "A", 2.0, 0.0),
            record("30/2/2024", "10:00:00 AM", "A", 3.0, 0.0),
            record("1/1/2024", "10:00:00 AM", "A", 4.0, 0.0),
        ]);

        let olds: Vec<f64> = table.rows().iter().map(|r| r.record.old_value).collect();
        assert_eq!(olds, vec![4.0, 2.0, 1.0, 3.0]);
        assert_eq!(table.null_datetime_count(), 2);
    }

    #[test]
    fn test_groups_follow_sorted_entity_order() {
        let table = OffsetTable::build(vec![
            record("1/1/2024", "10:00:00 AM", "b", 1.0, 2.0),
            record("1/1/2024", "10:00:00 AM", "B", 1.0, 2.0),
            record("2/1/2024", "10:00:00 AM", "B", 1.0, 2.0),
            record("1/1/2024", "10:00:00 AM", "A-1", 1.0, 2.0),
        ]);

        let groups: Vec<(&str, usize)> = table.groups().map(|g| (g[0].entity(), g.len())).collect();
        // byte order: uppercase before lowercase
        assert_eq!(groups, vec![("A-1", 1), ("B", 2), ("b", 1)]);
    }

    #[test]
    fn test_empty_table() {
        let table = OffsetTable::build(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.groups().count(), 0);
    }
}
