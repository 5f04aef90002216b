use super::*;

fn row(grapheme: &str, attrs: &[(&str, &str)]) -> SpecRow {
    let mut row = vec![(GRAPHEME_COL.to_string(), AttrValue::from(grapheme))];
    row.extend(attrs.iter().map(|&(k, v)| (k.to_string(), AttrValue::from(v))));
    row
}

#[test]
fn test_missing_grapheme() {
    let rows = vec![row("a", &[]), vec![("IPA".to_string(), AttrValue::from("b"))]];
    let err = Profile::new(rows).unwrap_err();
    assert!(matches!(err, ProfileError::MissingGrapheme { row: 1 }));
}

#[test]
fn test_empty_grapheme() {
    let err = Profile::new([row("", &[])]).unwrap_err();
    assert!(matches!(err, ProfileError::EmptyGrapheme { row: 0 }));

    let null = vec![(GRAPHEME_COL.to_string(), AttrValue::Null)];
    let err = Profile::new([null]).unwrap_err();
    assert!(matches!(err, ProfileError::EmptyGrapheme { row: 0 }));
}

#[test]
fn test_fields_with_tsv_separators_rejected() {
    let err = Profile::new([row("a\tb", &[])]).unwrap_err();
    assert!(
        matches!(err, ProfileError::InvalidField { row: 0, ref column } if column == GRAPHEME_COL)
    );

    let err = Profile::new([row("a", &[]), row("b", &[("IPA", "x\ny")])]).unwrap_err();
    assert!(matches!(err, ProfileError::InvalidField { row: 1, ref column } if column == "IPA"));
    assert_eq!(err.to_string(), "row 1: IPA contains a tab or line break");

    let many = vec![
        (GRAPHEME_COL.to_string(), AttrValue::from("a")),
        (
            "Segments".to_string(),
            AttrValue::Many(vec!["x".into(), "y\tz".into()]),
        ),
    ];
    assert!(matches!(
        Profile::new([many]),
        Err(ProfileError::InvalidField { .. })
    ));
}

#[test]
fn test_to_tsv_reads_back() {
    let profile = Profile::new([
        row("a", &[("IPA", "a")]),
        row("ch", &[("XSAMPA", "tS")]),
    ])
    .unwrap();
    let rows = source::parse_tsv(&profile.to_tsv("NULL"), "NULL").unwrap();
    let reread = Profile::new(rows).unwrap();
    assert_eq!(reread.to_tsv("NULL"), profile.to_tsv("NULL"));
}

#[test]
fn test_duplicates_keep_first_row() {
    let profile = Profile::new([
        row("a", &[("IPA", "a")]),
        row("b", &[("IPA", "b")]),
        row("a", &[("IPA", "ɑ"), ("Note", "dup")]),
    ])
    .unwrap();
    assert_eq!(profile.len(), 2);
    assert_eq!(profile.get("a").unwrap().get("IPA"), Some(&AttrValue::from("a")));
    assert_eq!(profile.diagnostics().len(), 1);
    assert_eq!(
        profile.diagnostics()[0].to_string(),
        "line 4: duplicate grapheme in profile: a"
    );
    // Columns of the dropped row still count.
    assert!(profile.has_column("Note"));
}

#[test]
fn test_columns_in_first_seen_order() {
    let profile = Profile::new([
        row("a", &[("IPA", "a")]),
        row("b", &[("XSAMPA", "b"), ("IPA", "b")]),
    ])
    .unwrap();
    assert_eq!(profile.column_labels(), ["IPA", "XSAMPA"]);
    assert!(profile.has_column(GRAPHEME_COL));
    assert!(!profile.has_column("Other"));
}

#[test]
fn test_form_normalizes_keys_and_values() {
    let options = ProfileOptions {
        form: Some(NormalizationForm::Nfd),
        ..Default::default()
    };
    let profile = Profile::with_options([row("\u{f1}", &[("IPA", "\u{f1}")])], options).unwrap();
    assert!(profile.contains("n\u{303}"));
    assert!(!profile.contains("\u{f1}"));
    assert_eq!(
        profile.get("n\u{303}").unwrap().get("IPA"),
        Some(&AttrValue::from("n\u{303}"))
    );
    assert!(profile.trie().contains("n\u{303}"));
}

#[test]
fn test_from_text_frequencies() {
    let profile = Profile::from_text("abcdabcab", "mapping");
    let order: Vec<&str> = profile.graphemes().map(|s| s.grapheme()).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);

    let a = profile.get("a").unwrap();
    assert_eq!(a.get("frequency"), Some(&AttrValue::from("3")));
    assert_eq!(a.get("mapping"), Some(&AttrValue::from("a")));
    assert_eq!(
        profile.get("d").unwrap().get("frequency"),
        Some(&AttrValue::from("1"))
    );
    assert_eq!(profile.column_labels(), ["frequency", "mapping"]);
}

#[test]
fn test_from_text_skips_whitespace_and_keeps_clusters() {
    let profile = Profile::from_text("n\u{303}a a\n", "IPA");
    assert_eq!(profile.len(), 2);
    assert!(profile.contains("n\u{303}"));
    assert!(!profile.contains(" "));
    assert_eq!(
        profile.get("a").unwrap().get("frequency"),
        Some(&AttrValue::from("2"))
    );
}

#[test]
fn test_from_text_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    fs::write(&path, "ab\nba\n").unwrap();
    let profile = Profile::from_text_file(&path, "mapping").unwrap();
    assert_eq!(profile.len(), 2);
    assert_eq!(
        profile.get("b").unwrap().get("frequency"),
        Some(&AttrValue::from("2"))
    );
}

#[test]
fn test_to_tsv() {
    let profile = Profile::new([
        row("a", &[("IPA", "a")]),
        row("ch", &[("XSAMPA", "tS")]),
    ])
    .unwrap();
    assert_eq!(
        profile.to_tsv("NULL"),
        "Grapheme\tIPA\tXSAMPA\na\ta\tNULL\nch\tNULL\ttS"
    );
    assert_eq!(profile.to_string(), profile.to_tsv("NULL"));
}

#[test]
fn test_rows_round_trip() {
    let profile = Profile::new([
        row("a", &[("IPA", "a")]),
        row("ch", &[("XSAMPA", "tS")]),
    ])
    .unwrap();
    let rebuilt = Profile::new(profile.rows()).unwrap();
    assert_eq!(rebuilt.to_tsv("-"), profile.to_tsv("-"));
    assert_eq!(rebuilt.get("ch").unwrap().get("IPA"), Some(&AttrValue::Null));
}

#[test]
fn test_attr_value_segments() {
    assert!(AttrValue::Null.segments().is_empty());
    assert_eq!(AttrValue::from("x").segments(), ["x"]);
    assert_eq!(AttrValue::from(None::<String>), AttrValue::Null);
    assert_eq!(
        AttrValue::from(vec!["x".to_string(), "y".to_string()]).segments(),
        ["x", "y"]
    );
}
