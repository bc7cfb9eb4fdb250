//! Integration tests for query composition and index resolution

mod common;

use apm_query_core::search::*;
use apm_query_core::AppError;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

fn composer() -> QueryComposer {
    QueryComposer::new(Arc::new(FieldRegistry::default()))
}

fn app() -> SearchCondition {
    AppIdentity::new("com.shop", "android").into()
}

fn all_dimensions() -> Vec<SearchCondition> {
    vec![
        app(),
        DocumentId::new("doc-1").into(),
        TimeRange::new(Some(1_715_000_000_000), Some(1_715_086_400_000)).into(),
        ValueRange::new(Some(100), Some(3000)).into(),
        GeoFilter::new("cn-sh").into(),
        FieldValueFilter::new("url", "https://shop.example/cart").into(),
        FreeTextFilter::new("TypeError: x is undefined").into(),
    ]
}

#[test]
fn test_list_query_shape() {
    let query = composer().compose(UseCase::List, &all_dimensions()).unwrap();

    assert_eq!(
        query.to_json(),
        json!({
            "bool": {
                "filter": [
                    { "term": { "package_name": "com.shop" } },
                    { "term": { "server_type": "android" } },
                    { "range": { "timestamp": {
                        "gte": 1_715_000_000_000i64,
                        "lte": 1_715_086_400_000i64,
                        "format": "epoch_millis"
                    } } },
                    { "range": { "duration": { "gte": 100, "lte": 3000 } } },
                    { "term": { "region_code": "cn-sh" } },
                    { "term": { "url.raw": "https://shop.example/cart" } },
                    { "term": { "message.raw": "TypeError: x is undefined" } }
                ]
            }
        })
    );
}

#[test]
fn test_use_cases_select_dimensions() {
    let conditions = all_dimensions();

    let detail = composer().compose(UseCase::Detail, &conditions).unwrap();
    let fields: Vec<&str> = detail.filter().iter().map(Clause::field).collect();
    assert_eq!(fields, vec!["package_name", "server_type", "_id"]);

    let chart = composer().compose(UseCase::Chart, &conditions).unwrap();
    let fields: Vec<&str> = chart.filter().iter().map(Clause::field).collect();
    assert!(!fields.contains(&"message.raw"));
    assert!(!fields.contains(&"_id"));
    assert!(fields.contains(&"timestamp"));
}

#[test]
fn test_composition_is_order_independent() {
    let conditions = all_dimensions();
    let expected = composer().compose(UseCase::List, &conditions).unwrap();

    for shift in 1..conditions.len() {
        let mut rotated = conditions.clone();
        rotated.rotate_left(shift);
        assert_eq!(composer().compose(UseCase::List, &rotated).unwrap(), expected);
    }

    let mut reversed = conditions;
    reversed.reverse();
    assert_eq!(composer().compose(UseCase::List, &reversed).unwrap(), expected);
}

#[test]
fn test_blank_conditions_add_nothing() {
    let query = composer()
        .compose(
            UseCase::List,
            &[
                app(),
                TimeRange::default().into(),
                ValueRange::default().into(),
                GeoFilter::new("  ").into(),
                FieldValueFilter::default().into(),
                FreeTextFilter::new("").into(),
            ],
        )
        .unwrap();

    assert_eq!(query.filter().len(), 2);
}

#[test]
fn test_single_bound_value_range_is_ignored() {
    for range in [
        ValueRange::new(Some(500), None),
        ValueRange::new(None, Some(500)),
        ValueRange::new(Some(-1), Some(500)),
    ] {
        let query = composer()
            .compose(UseCase::List, &[app(), range.into()])
            .unwrap();
        assert!(query.filter().iter().all(|c| c.field() != "duration"));
    }
}

#[test]
fn test_unknown_field_is_client_error() {
    let err = composer()
        .compose(
            UseCase::List,
            &[app(), FieldValueFilter::new("os\"; drop", "x").into()],
        )
        .unwrap_err();

    assert!(matches!(err, SearchError::InvalidField(ref f) if f == "os\"; drop"));
    let app_err: AppError = err.into();
    assert_eq!(app_err.error_code(), "INVALID_FIELD");
    assert!(app_err.is_client_error());
}

#[test]
fn test_missing_app_identity_rejected() {
    let err = composer()
        .compose(UseCase::Chart, &[GeoFilter::new("cn-sh").into()])
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingAppIdentity(_)));
}

#[test]
fn test_conditions_deserialize_from_request_json() {
    let conditions: Vec<SearchCondition> = serde_json::from_value(json!([
        { "kind": "app", "package_name": "com.shop", "server_type": "ios" },
        { "kind": "field_value", "field_name": "os", "field_value": "iOS" }
    ]))
    .unwrap();

    let query = composer().compose(UseCase::List, &conditions).unwrap();
    assert_eq!(query.filter()[2], Clause::term("os", "iOS"));
}

#[test]
fn test_daily_resolution_covers_window_without_gaps() {
    let resolver = IndexResolver::from_config(&SearchConfig::default(), common::fixed_clock());
    let from = Utc.with_ymd_and_hms(2024, 2, 27, 23, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();

    let indices = resolver.resolve("page_load", Some(from), Some(to)).unwrap();

    let mut day = from.date_naive();
    let mut expected = Vec::new();
    while day <= to.date_naive() {
        expected.push(format!("apm-page-load-{}", day.format("%Y.%m.%d")));
        day = day.succ_opt().unwrap();
    }
    assert_eq!(indices, expected);
    assert_eq!(indices.len(), 5);
}

fn partition_date(index: &str, prefix: &str, monthly: bool) -> NaiveDate {
    let suffix = index
        .strip_prefix(prefix)
        .and_then(|s| s.strip_prefix('-'))
        .unwrap_or_else(|| panic!("{} does not start with {}", index, prefix));
    if monthly {
        NaiveDate::parse_from_str(&format!("{}.01", suffix), "%Y.%m.%d").unwrap()
    } else {
        NaiveDate::parse_from_str(suffix, "%Y.%m.%d").unwrap()
    }
}

fn assert_covers(indices: &[String], prefix: &str, monthly: bool, from: DateTime<Utc>, to: DateTime<Utc>) {
    let floor = |d: NaiveDate| if monthly { d.with_day(1).unwrap() } else { d };
    let dates: Vec<NaiveDate> = indices
        .iter()
        .map(|i| partition_date(i, prefix, monthly))
        .collect();

    assert_eq!(dates.first(), Some(&floor(from.date_naive())), "{} .. {}", from, to);
    assert_eq!(dates.last(), Some(&floor(to.date_naive())), "{} .. {}", from, to);
    for pair in dates.windows(2) {
        let next = if monthly {
            pair[0].checked_add_months(Months::new(1))
        } else {
            pair[0].succ_opt()
        };
        assert_eq!(next, Some(pair[1]), "gap after {} in {} .. {}", pair[0], from, to);
    }
}

#[test]
fn test_resolution_covers_every_window_without_gaps() {
    let resolver = IndexResolver::from_config(&SearchConfig::default(), common::fixed_clock());
    let anchors = [
        Utc.with_ymd_and_hms(2023, 2, 28, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 28, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 4, 30, 18, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
    ];
    let spans = [
        Duration::zero(),
        Duration::minutes(1),
        Duration::hours(23),
        Duration::hours(25),
        Duration::days(29),
        Duration::days(31),
        Duration::days(59),
        Duration::days(366),
    ];

    for from in anchors {
        for span in spans {
            let to = from + span;

            let daily = resolver.resolve("page_load", Some(from), Some(to)).unwrap();
            assert_covers(&daily, "apm-page-load", false, from, to);
            assert_eq!(resolver.resolve("page_load", Some(to), Some(from)).unwrap(), daily);

            let monthly = resolver.resolve("session", Some(from), Some(to)).unwrap();
            assert_covers(&monthly, "apm-session", true, from, to);
        }
    }
}

#[test]
fn test_oversized_window_rejected_as_client_error() {
    let resolver = IndexResolver::from_config(&SearchConfig::default(), common::fixed_clock());
    let from = Utc.timestamp_millis_opt(0).unwrap();
    let to = Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap();

    let err = resolver.resolve("page_load", Some(from), Some(to)).unwrap_err();
    assert!(matches!(err, SearchError::WindowTooLarge { partitions: 19859, max: 400, .. }));
    assert!(AppError::from(err).is_client_error());
}

#[test]
fn test_out_of_range_upper_bound_rejected() {
    let resolver = IndexResolver::from_config(&SearchConfig::default(), common::fixed_clock());
    let to = TimeRange::new(None, Some(-8_334_600_000_000_000)).to_utc();
    assert!(to.is_some());

    let err = resolver.resolve("page_load", None, to).unwrap_err();
    assert!(matches!(err, SearchError::InvalidTimeRange(_)));
    assert!(AppError::from(err).is_client_error());
}

#[test]
fn test_default_window_uses_clock_and_lookback() {
    let config = SearchConfigBuilder::new()
        .lookback_days(2)
        .datasets(vec![DatasetConfig::new("error", "apm-error", PartitionGranularity::Daily)])
        .build();
    let clock = common::fixed_clock();
    let resolver = IndexResolver::from_config(&config, clock.clone());

    assert_eq!(
        resolver.resolve("error", None, None).unwrap(),
        vec!["apm-error-2024.05.13", "apm-error-2024.05.14", "apm-error-2024.05.15"]
    );

    clock.advance(Duration::days(1));
    let indices = resolver.resolve("error", None, None).unwrap();
    assert_eq!(indices.last().map(String::as_str), Some("apm-error-2024.05.16"));
}

#[test]
fn test_lookback_clamped_to_first_partition() {
    let config = SearchConfigBuilder::new()
        .datasets(vec![
            DatasetConfig::new("crash", "apm-crash", PartitionGranularity::Daily)
                .with_earliest_partition(NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()),
            DatasetConfig::new("session", "apm-session", PartitionGranularity::Monthly)
                .with_earliest_partition(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()),
        ])
        .build();
    let resolver = IndexResolver::from_config(&config, common::fixed_clock());

    assert_eq!(
        resolver.resolve("crash", None, None).unwrap(),
        vec!["apm-crash-2024.05.14", "apm-crash-2024.05.15"]
    );
    assert_eq!(
        resolver.resolve("session", None, None).unwrap(),
        vec!["apm-session-2024.05"]
    );

    // Window entirely before the first partition still yields one index
    let old = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(
        resolver.resolve("crash", Some(old), Some(old)).unwrap(),
        vec!["apm-crash-2023.01.01"]
    );
}

#[test]
fn test_unknown_dataset_is_configuration_error() {
    let resolver = IndexResolver::from_config(&SearchConfig::default(), common::fixed_clock());
    let err = resolver.resolve("crash", None, None).unwrap_err();

    assert!(matches!(err, SearchError::UnknownDataset(_)));
    assert!(matches!(AppError::from(err), AppError::Configuration(_)));
}
