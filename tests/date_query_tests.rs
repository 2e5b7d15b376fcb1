use chrono::{NaiveDate, NaiveDateTime};
use wpjm_public_api::date_query::{resolve_bound, Boundary, DateQuery};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn now() -> NaiveDateTime {
    at(2024, 3, 31, 14, 30, 0)
}

fn after(expr: &str) -> Option<NaiveDateTime> {
    resolve_bound(expr, Boundary::After, true, now())
}

fn before(expr: &str) -> Option<NaiveDateTime> {
    resolve_bound(expr, Boundary::Before, true, now())
}

#[test]
fn test_year_expands_to_whole_year() {
    assert_eq!(after("2017"), Some(at(2017, 1, 1, 0, 0, 0)));
    assert_eq!(before("2017"), Some(at(2017, 12, 31, 23, 59, 59)));
}

#[test]
fn test_month_expands_to_whole_month() {
    assert_eq!(after("2024-02"), Some(at(2024, 2, 1, 0, 0, 0)));
    assert_eq!(before("2024-02"), Some(at(2024, 2, 29, 23, 59, 59)));
    assert_eq!(before("2023-02"), Some(at(2023, 2, 28, 23, 59, 59)));
}

#[test]
fn test_day_and_time_forms() {
    assert_eq!(after("2017-06-01"), Some(at(2017, 6, 1, 0, 0, 0)));
    assert_eq!(before("2017-06-01"), Some(at(2017, 6, 1, 23, 59, 59)));
    assert_eq!(before("2017-06-01 10:15"), Some(at(2017, 6, 1, 10, 15, 59)));
    assert_eq!(after("2017-06-01T10:15:30"), Some(at(2017, 6, 1, 10, 15, 30)));
}

#[test]
fn test_exclusive_bounds_fill_the_other_way() {
    assert_eq!(
        resolve_bound("2017", Boundary::After, false, now()),
        Some(at(2017, 12, 31, 23, 59, 59))
    );
    assert_eq!(
        resolve_bound("2017", Boundary::Before, false, now()),
        Some(at(2017, 1, 1, 0, 0, 0))
    );
}

#[test]
fn test_impossible_calendar_dates() {
    assert_eq!(after("2017-13"), None);
    assert_eq!(after("2017-02-30"), None);
    assert_eq!(after("2017-06-01 25:00"), None);
}

#[test]
fn test_relative_keywords() {
    assert_eq!(after("now"), Some(now()));
    assert_eq!(after("today"), Some(at(2024, 3, 31, 0, 0, 0)));
    assert_eq!(after("Yesterday"), Some(at(2024, 3, 30, 0, 0, 0)));
    assert_eq!(after("tomorrow"), Some(at(2024, 4, 1, 0, 0, 0)));
    // "this month" is just the current moment
    assert_eq!(after("this month"), Some(now()));
    assert_eq!(after("last month"), Some(at(2024, 2, 29, 14, 30, 0)));
    assert_eq!(after("next year"), Some(at(2025, 3, 31, 14, 30, 0)));
}

#[test]
fn test_relative_offsets() {
    assert_eq!(after("3 days ago"), Some(at(2024, 3, 28, 14, 30, 0)));
    assert_eq!(after("-1 week"), Some(at(2024, 3, 24, 14, 30, 0)));
    assert_eq!(after("+2 hours"), Some(at(2024, 3, 31, 16, 30, 0)));
    assert_eq!(after("1 fortnight ago"), Some(at(2024, 3, 17, 14, 30, 0)));
    assert_eq!(after("2 years ago"), Some(at(2022, 3, 31, 14, 30, 0)));
}

#[test]
fn test_first_and_last_day_of_month() {
    assert_eq!(after("first day of this month"), Some(at(2024, 3, 1, 14, 30, 0)));
    assert_eq!(after("last day of last month"), Some(at(2024, 2, 29, 14, 30, 0)));
    assert_eq!(after("first day of next month"), Some(at(2024, 4, 1, 14, 30, 0)));
}

#[test]
fn test_unknown_expressions() {
    assert_eq!(after(""), None);
    assert_eq!(after("soon"), None);
    assert_eq!(after("3 lightyears ago"), None);
    assert_eq!(after("2017 06 01"), None);
}

#[test]
fn test_query_resolution() {
    assert_eq!(DateQuery::inclusive(None, None), None);

    let query = DateQuery::inclusive(Some("2017".into()), Some("2017".into())).unwrap();
    let range = query.resolve(now()).unwrap();
    assert!(range.contains(at(2017, 1, 1, 0, 0, 0)));
    assert!(range.contains(at(2017, 12, 31, 23, 59, 59)));
    assert!(!range.contains(at(2016, 12, 31, 23, 59, 59)));
    assert!(!range.contains(at(2018, 1, 1, 0, 0, 0)));

    let half_open = DateQuery::inclusive(None, Some("2017-06".into())).unwrap();
    let range = half_open.resolve(now()).unwrap();
    assert!(range.contains(at(1990, 1, 1, 0, 0, 0)));
    assert!(!range.contains(at(2017, 7, 1, 0, 0, 0)));

    let broken = DateQuery::inclusive(Some("2017".into()), Some("whenever".into())).unwrap();
    assert_eq!(broken.resolve(now()), None);
}
