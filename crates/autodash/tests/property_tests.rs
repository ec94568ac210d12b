//! Property tests for the cleaning, profiling and planning contracts.

use autodash::{ChartKind, ChartSpec, CleanedTable, DashboardConfig, Profile, RawTable};
use polars::prelude::*;
use proptest::prelude::*;
use std::fmt::Debug;

const DATES: &[&str] = &["2023-01-01", "2023-01-02", "2023-02-15", "2024-12-31"];

/// Mostly small integers so ties and duplicate rows are common, with extreme
/// finite magnitudes and infinities mixed in.
fn number() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (-5i32..5).prop_map(f64::from),
        1 => prop::sample::select(vec![1e300, -1e300, f64::MAX, -f64::MAX, f64::MIN_POSITIVE]),
        1 => prop::sample::select(vec![f64::INFINITY, f64::NEG_INFINITY]),
    ]
}

/// One column of cells, roughly 20% missing.
fn cells<T: Clone + Debug>(
    value: impl Strategy<Value = T>,
    rows: usize,
) -> impl Strategy<Value = Vec<Option<T>>> {
    prop::collection::vec(prop::option::weighted(0.8, value), rows)
}

/// Random tables mixing numeric, categorical, date-text and boolean columns.
fn raw_table() -> impl Strategy<Value = RawTable> {
    (1usize..12, 0usize..4, 0usize..4, 0usize..3, 0usize..2)
        .prop_filter("at least one column", |(_, numeric, categorical, dates, flags)| {
            numeric + categorical + dates + flags > 0
        })
        .prop_flat_map(|(rows, numeric, categorical, dates, flags)| {
            (
                prop::collection::vec(cells(number(), rows), numeric),
                prop::collection::vec(
                    cells(prop::sample::select(vec!["a", "b", "c"]), rows),
                    categorical,
                ),
                prop::collection::vec(cells(prop::sample::select(DATES), rows), dates),
                prop::collection::vec(cells(any::<bool>(), rows), flags),
            )
        })
        .prop_map(|(numeric, categorical, dates, flags)| {
            let mut columns = Vec::new();
            for (i, values) in numeric.into_iter().enumerate() {
                columns.push(Column::new(format!("n{}", i).into(), values));
            }
            for (i, values) in categorical.into_iter().enumerate() {
                columns.push(Column::new(format!("c{}", i).into(), values));
            }
            for (i, values) in dates.into_iter().enumerate() {
                columns.push(Column::new(format!("d{}", i).into(), values));
            }
            for (i, values) in flags.into_iter().enumerate() {
                columns.push(Column::new(format!("f{}", i).into(), values));
            }
            RawTable::new(columns).expect("generated columns are well formed")
        })
}

fn distinct_rows(table: &CleanedTable) -> usize {
    table
        .data()
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .expect("unique rows")
        .height()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cleaned_table_has_no_missing_cells(raw in raw_table()) {
        let cleaned = autodash::clean(&raw);

        for column in cleaned.data().get_columns() {
            prop_assert_eq!(column.null_count(), 0, "column {}", column.name());
        }
        if cleaned.width() == 0 {
            prop_assert_eq!(cleaned.height(), 0);
        }
    }

    #[test]
    fn cleaned_table_has_no_duplicate_rows(raw in raw_table()) {
        let cleaned = autodash::clean(&raw);
        prop_assert_eq!(distinct_rows(&cleaned), cleaned.height());
    }

    #[test]
    fn cleaning_is_idempotent(raw in raw_table()) {
        let once = autodash::clean(&raw);
        let twice = autodash::clean(&RawTable::from(once.data().clone()));

        prop_assert!(once.data().equals(twice.data()));
        prop_assert_eq!(once.kinds(), twice.kinds());
    }

    #[test]
    fn cleaning_only_shrinks(raw in raw_table()) {
        let before = raw.data().clone();
        let cleaned = autodash::clean(&raw);

        prop_assert!(cleaned.height() <= raw.height());
        prop_assert!(cleaned.width() <= raw.width());
        prop_assert!(raw.data().equals_missing(&before));

        let summary = cleaned.summary();
        prop_assert_eq!(summary.rows_before, raw.height());
        prop_assert_eq!(summary.rows_after, cleaned.height());
        prop_assert_eq!(
            summary.rows_removed(),
            summary.empty_rows_removed + summary.duplicates_removed
        );
    }

    #[test]
    fn correlations_are_bounded(raw in raw_table()) {
        let profile = autodash::profile(&autodash::clean(&raw));

        if let Some(matrix) = &profile.correlations {
            for (a, row) in matrix {
                for (b, r) in row {
                    prop_assert!((-1.0..=1.0).contains(r), "{} ~ {} = {}", a, b, r);
                    if a == b {
                        prop_assert_eq!(*r, 1.0);
                    }
                    prop_assert_eq!(Some(*r), profile.correlation(b, a));
                }
            }
        }
    }

    #[test]
    fn chart_plan_respects_caps(raw in raw_table()) {
        let cleaned = autodash::clean(&raw);
        let charts = autodash::plan_charts(&cleaned);
        let config = DashboardConfig::default();
        let count = |kind: ChartKind| charts.iter().filter(|c| c.kind == kind).count();

        let overview = cleaned.overview();
        let numeric = overview.numeric_columns.len();
        let categorical = overview.categorical_columns.len();
        let temporal = overview.temporal_columns.len();

        prop_assert_eq!(count(ChartKind::Distribution), numeric.min(config.max_distribution_charts));
        prop_assert_eq!(count(ChartKind::Categorical), categorical.min(config.max_categorical_charts));
        prop_assert_eq!(count(ChartKind::Correlation), usize::from(numeric >= 2));
        prop_assert_eq!(count(ChartKind::ScatterMatrix), usize::from(numeric >= 2));
        prop_assert_eq!(count(ChartKind::Boxplot), usize::from(numeric >= 1));
        prop_assert_eq!(count(ChartKind::Timeseries), usize::from(temporal >= 1 && numeric >= 1));
    }

    #[test]
    fn profile_describes_every_column(raw in raw_table()) {
        let cleaned = autodash::clean(&raw);
        let profile = autodash::profile(&cleaned);

        prop_assert_eq!(profile.dataset_info.rows, cleaned.height());
        prop_assert_eq!(profile.column_types.len(), cleaned.width());
        let overview = cleaned.overview();
        prop_assert_eq!(profile.numeric_summary.len(), overview.numeric_columns.len());
        prop_assert_eq!(profile.categorical_summary.len(), overview.categorical_columns.len());

        for summary in profile.numeric_summary.values() {
            prop_assert_eq!(summary.count, cleaned.height());
            if let (Some(min), Some(q50), Some(max)) = (summary.min, summary.q50, summary.max) {
                prop_assert!(min <= q50 && q50 <= max);
            }
        }
    }

    #[test]
    fn charts_round_trip_through_json(raw in raw_table()) {
        let charts = autodash::plan_charts(&autodash::clean(&raw));

        let json = serde_json::to_string(&charts).unwrap();
        let back: Vec<ChartSpec> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, charts);
    }

    #[test]
    fn profile_round_trips_through_json(raw in raw_table()) {
        let profile = autodash::profile(&autodash::clean(&raw));

        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, profile);
    }
}
