//! Weekly bucketing of transaction records for a selected month.

use chrono::Datelike;
use log::debug;

use crate::model::{ReportSelection, TransactionRecord, WeeklyStats, WEEKS_PER_MONTH};

/// Maps a day of the month (1-based) to its week bucket.
///
/// Days 1..=7 land in bucket 0, 8..=14 in bucket 1, 15..=21 in bucket 2 and
/// everything from day 22 onwards in bucket 3.
pub fn week_index(day: u32) -> usize {
    let index = (day.saturating_sub(1) / 7) as usize;
    index.min(WEEKS_PER_MONTH - 1)
}

/// Counts borrows and returns per week bucket for the selected month and year.
///
/// Borrow and return dates are tested independently: a record borrowed in
/// February and returned in March only contributes to March's returns.
/// Records with no date inside the selection are skipped.
pub fn aggregate(records: &[TransactionRecord], selection: ReportSelection) -> WeeklyStats {
    let stats = records
        .iter()
        .fold(WeeklyStats::default(), |mut stats, record| {
            let borrowed = record.borrowed_date();
            if selection.contains(borrowed) {
                stats.borrowed[week_index(borrowed.day())] += 1;
            }

            if let Some(returned) = record.returned_date() {
                if selection.contains(returned) {
                    stats.returned[week_index(returned.day())] += 1;
                }
            }

            stats
        });

    debug!(
        "Aggregated {} records for {}: {} borrowed, {} returned",
        records.len(),
        selection,
        stats.total_borrowed(),
        stats.total_returned()
    );

    stats
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn march_2024() -> ReportSelection {
        ReportSelection::new(2, 2024).expect("valid selection")
    }

    #[test]
    fn week_index_is_bounded_and_monotonic() {
        let mut previous = 0;
        for day in 1..=31 {
            let index = week_index(day);
            assert!(index < WEEKS_PER_MONTH, "day {day} mapped to {index}");
            assert!(index >= previous, "day {day} went backwards");
            previous = index;
        }

        assert_eq!(week_index(1), 0);
        assert_eq!(week_index(7), 0);
        assert_eq!(week_index(8), 1);
        assert_eq!(week_index(21), 2);
        assert!((22..=31).all(|day| week_index(day) == 3));
    }

    #[test]
    fn buckets_mixed_records() {
        let records = vec![
            TransactionRecord::borrowed(date(2024, 3, 3)),
            TransactionRecord::borrowed(date(2024, 3, 3)).with_returned(date(2024, 3, 10)),
            TransactionRecord::borrowed(date(2024, 2, 1)),
        ];

        let stats = aggregate(&records, march_2024());

        assert_eq!(stats.borrowed, [2, 0, 0, 0]);
        assert_eq!(stats.returned, [0, 1, 0, 0]);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        assert_eq!(aggregate(&[], march_2024()), WeeklyStats::default());
    }

    #[test]
    fn cross_month_return_counts_only_in_return_month() {
        let records = vec![
            TransactionRecord::borrowed(date(2024, 2, 27)).with_returned(date(2024, 3, 30)),
        ];

        let march = aggregate(&records, march_2024());
        assert_eq!(march.borrowed, [0; 4]);
        assert_eq!(march.returned, [0, 0, 0, 1]);

        let february = aggregate(&records, ReportSelection::new(1, 2024).expect("valid"));
        assert_eq!(february.borrowed, [0, 0, 0, 1]);
        assert_eq!(february.returned, [0; 4]);
    }

    #[test]
    fn same_month_other_year_is_ignored() {
        let records = vec![
            TransactionRecord::borrowed(date(2023, 3, 5)).with_returned(date(2023, 3, 6)),
        ];

        assert_eq!(aggregate(&records, march_2024()), WeeklyStats::default());
    }

    #[test]
    fn borrowed_total_equals_matching_records() {
        let records: Vec<_> = (1..=31)
            .map(|day| TransactionRecord::borrowed(date(2024, 3, day)))
            .chain((1..=29).map(|day| TransactionRecord::borrowed(date(2024, 2, day))))
            .collect();

        let stats = aggregate(&records, march_2024());

        assert_eq!(stats.total_borrowed(), 31);
        assert_eq!(stats.borrowed, [7, 7, 7, 10]);
    }

    #[test]
    fn aggregation_is_idempotent_and_order_independent() {
        let mut records = vec![
            TransactionRecord::borrowed(date(2024, 3, 1)).with_returned(date(2024, 3, 20)),
            TransactionRecord::borrowed(date(2024, 3, 15)),
            TransactionRecord::borrowed(date(2024, 3, 28)).with_returned(date(2024, 4, 2)),
        ];

        let first = aggregate(&records, march_2024());
        let second = aggregate(&records, march_2024());
        records.reverse();
        let reversed = aggregate(&records, march_2024());

        assert_eq!(first, second);
        assert_eq!(first, reversed);
    }
}
