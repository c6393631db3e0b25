use super::*;
use reqwest::header::HeaderValue;

fn ids(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("id{n}")).collect()
}

fn names(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("name{n}")).collect()
}

fn headers(entries: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in entries {
        map.insert(
            reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

#[test]
fn test_25_ids_at_limit_10_chunk_as_10_10_5() {
    let mut plan = BatchPlan::new(ids(25), Vec::new(), 10).unwrap();
    let sizes: Vec<usize> = std::iter::from_fn(|| plan.next_chunk().map(|c| c.len())).collect();
    assert_eq!(sizes, [10, 10, 5]);
}

#[test]
fn test_ids_are_packed_before_names() {
    let mut plan = BatchPlan::new(ids(3), names(3), 4).unwrap();
    let first = plan.next_chunk().unwrap();
    assert_eq!(
        first,
        [
            QueryEntry::Id("id0".to_owned()),
            QueryEntry::Id("id1".to_owned()),
            QueryEntry::Id("id2".to_owned()),
            QueryEntry::Name("name0".to_owned()),
        ]
    );
    let second = plan.next_chunk().unwrap();
    assert_eq!(
        second,
        [
            QueryEntry::Name("name1".to_owned()),
            QueryEntry::Name("name2".to_owned()),
        ]
    );
    assert_eq!(plan.next_chunk(), None);
}

#[test]
fn test_empty_inputs_are_a_usage_error() {
    let err = BatchPlan::new(Vec::new(), Vec::new(), 10).unwrap_err();
    assert!(matches!(err, RlError::EmptyQuery));
}

#[test]
fn test_requeue_rechunks_remaining_entries_at_new_limit() {
    let mut plan = BatchPlan::new(ids(12), Vec::new(), 10).unwrap();
    let rejected = plan.next_chunk().unwrap();
    assert_eq!(rejected.len(), 10);

    // server said the real limit is 5
    plan.requeue(rejected, 5);
    let sizes: Vec<usize> = std::iter::from_fn(|| plan.next_chunk().map(|c| c.len())).collect();
    assert_eq!(sizes, [5, 5, 2]);
}

#[test]
fn test_requeue_preserves_entry_order() {
    let mut plan = BatchPlan::new(ids(3), Vec::new(), 3).unwrap();
    let rejected = plan.next_chunk().unwrap();
    plan.requeue(rejected, 2);
    let first = plan.next_chunk().unwrap();
    assert_eq!(
        first,
        [
            QueryEntry::Id("id0".to_owned()),
            QueryEntry::Id("id1".to_owned()),
        ]
    );
}

#[test]
fn test_chunk_params_put_platform_first() {
    let chunk = [
        QueryEntry::Id("76561198012345678".to_owned()),
        QueryEntry::Name("SomePlayer".to_owned()),
    ];
    let params = chunk_params(Platform::Steam, &chunk);
    assert_eq!(
        params,
        [
            ("platform".to_owned(), "steam".to_owned()),
            ("id[]".to_owned(), "76561198012345678".to_owned()),
            ("name[]".to_owned(), "SomePlayer".to_owned()),
        ]
    );
}

#[test]
fn test_violated_limit_requires_count_over_limit() {
    let rejected = headers(&[("X-Search-Query-Limit", "5"), ("X-Search-Query-Count", "10")]);
    assert_eq!(violated_limit(&rejected), Some(5));

    // a 400 for some other reason, count within bounds
    let other = headers(&[("X-Search-Query-Limit", "10"), ("X-Search-Query-Count", "3")]);
    assert_eq!(violated_limit(&other), None);

    assert_eq!(violated_limit(&HeaderMap::new()), None);
}

#[test]
fn test_advertised_limit_parses_header() {
    let map = headers(&[("X-Search-Query-Limit", "50")]);
    assert_eq!(advertised_limit(&map), Some(50));
    assert_eq!(advertised_limit(&HeaderMap::new()), None);
}
