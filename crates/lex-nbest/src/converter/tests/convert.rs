use crate::converter::testutil::{scenario_conn, scenario_dict, test_dict, zero_conn_with_fw, NOUN};
use crate::converter::{
    Candidate, ConvertError, DefaultCostFunction, ImmutableConverter, NoFilter, RequestType,
    RolePolicy, Segment, SegmentType, Segments,
};
use crate::dict::{ConnectionMatrix, TrieDictionary};

fn run(
    dict: &TrieDictionary,
    conn: &ConnectionMatrix,
    segments: &mut Segments,
) -> Result<(), ConvertError> {
    let cost_fn = DefaultCostFunction::with_segment_penalty(Some(conn), 0);
    let policy = RolePolicy::new(conn);
    ImmutableConverter::new(dict, &cost_fn, &policy, &NoFilter).convert(segments)
}

fn top_values(segments: &Segments) -> Vec<&str> {
    segments
        .iter()
        .map(|s| s.candidate(0).map_or("", |c| c.value.as_str()))
        .collect()
}

fn keys(segments: &Segments) -> Vec<&str> {
    segments.iter().map(|s| s.key()).collect()
}

#[test]
fn test_convert_splits_free_segment() {
    let mut segments = Segments::from_keys(&[("わたしのなまえはなかのです", SegmentType::Free)]);
    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();

    assert_eq!(keys(&segments), vec!["わたしの", "なまえは", "なかのです"]);
    assert_eq!(top_values(&segments), vec!["私の", "名前は", "中野です"]);
    assert!(segments[2]
        .candidates()
        .iter()
        .any(|c| c.value == "仲野です"));
    assert!(segments[0].candidate(0).unwrap().partially_key_consumed);
}

#[test]
fn test_convert_fixed_boundary_uses_only_mid() {
    let mut segments = Segments::from_keys(&[
        ("しんこう", SegmentType::FixedBoundary),
        ("する", SegmentType::Free),
    ]);
    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();

    assert_eq!(keys(&segments), vec!["しんこう", "する"]);
    assert_eq!(segments[0].segment_type(), SegmentType::FixedBoundary);
    let values: Vec<&str> = segments[0]
        .candidates()
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(values, vec!["進行", "信仰", "深耕"]);
    assert_eq!(segments[1].candidate(0).unwrap().value, "する");
}

#[test]
fn test_convert_fixed_value_segment() {
    let mut fixed = Segment::new("しんこう", SegmentType::FixedValue);
    let mut committed = Candidate::new("しんこう", "深耕");
    committed.lid = NOUN;
    committed.rid = NOUN;
    fixed.push_candidate(committed);
    let mut segments = Segments::new(RequestType::Conversion);
    segments.push(fixed);
    segments.push(Segment::new("する", SegmentType::Free));

    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].candidates().len(), 1);
    assert_eq!(segments[0].candidate(0).unwrap().value, "深耕");
    assert_eq!(segments[0].segment_type(), SegmentType::FixedValue);
}

#[test]
fn test_convert_prediction_single_window() {
    let mut segments = Segments::from_keys(&[("とうきょうかなごやにいきたい", SegmentType::Free)]);
    segments.set_request_type(RequestType::Prediction);
    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();

    assert_eq!(segments.len(), 1);
    let top = segments[0].candidate(0).unwrap();
    assert_eq!(top.value, "東京か名古屋に行きたい");
    assert_eq!(top.inner_segments().count(), 3);
    assert!(!top.partially_key_consumed);
}

#[test]
fn test_convert_candidate_limit() {
    let conn = scenario_conn();
    let cost_fn = DefaultCostFunction::with_segment_penalty(Some(&conn), 0);
    let policy = RolePolicy::new(&conn);
    let dict = scenario_dict();
    let mut segments = Segments::from_keys(&[("わたしのなまえはなかのです", SegmentType::Free)]);
    segments.set_request_type(RequestType::Prediction);

    ImmutableConverter::new(&dict, &cost_fn, &policy, &NoFilter)
        .with_candidates_per_segment(2)
        .convert(&mut segments)
        .unwrap();
    assert_eq!(segments[0].candidates().len(), 2);
}

#[test]
fn test_convert_without_role_table() {
    // without a role table every class id is a content word
    let conn = zero_conn_with_fw(10, 0, 0);
    let mut segments = Segments::from_keys(&[("きょうはいいてんき", SegmentType::Free)]);
    run(&test_dict(), &conn, &mut segments).unwrap();
    assert_eq!(top_values(&segments), vec!["今日", "は", "良い", "天気"]);
}

#[test]
fn test_convert_empty_key() {
    let mut segments = Segments::from_keys(&[]);
    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();
    assert!(segments.is_empty());

    let mut segments = Segments::from_keys(&[("", SegmentType::Free)]);
    run(&scenario_dict(), &scenario_conn(), &mut segments).unwrap();
    assert!(segments.is_empty());
}

#[test]
fn test_convert_rejects_invalid_requests() {
    let mut segments = Segments::from_keys(&[("しんこう", SegmentType::FixedValue)]);
    assert_eq!(
        run(&scenario_dict(), &scenario_conn(), &mut segments),
        Err(ConvertError::MissingFixedValue { index: 0 })
    );

    let mut segments =
        Segments::from_keys(&[("しんこう", SegmentType::Free), ("", SegmentType::Free)]);
    assert_eq!(
        run(&scenario_dict(), &scenario_conn(), &mut segments),
        Err(ConvertError::EmptySegment { index: 1 })
    );
}
