use cosmic_map::{ColumnStandardizer, SYNONYMS, token_sort_ratio};
use cosmic_model::{MappingMethod, StandardizerOptions};
use proptest::prelude::*;

const CATALOG_COLUMNS: [&str; 7] = [
    "RA_J2000",
    "Dec_deg",
    "FluX_Val",
    "obj_name",
    "T_eff_K",
    "Unknown_Col",
    "v_rad",
];

#[test]
fn catalog_columns_standardize() {
    let result = ColumnStandardizer::default().standardize(&CATALOG_COLUMNS);
    let standard: Vec<&str> = CATALOG_COLUMNS
        .iter()
        .map(|column| result.standard_name(column))
        .collect();
    assert_eq!(
        standard,
        [
            "position_ra",
            "position_dec",
            "brightness",
            "object_id",
            "temperature",
            "Unknown_Col",
            "velocity",
        ]
    );
    assert_eq!(result.matched_count(), 6);
}

#[test]
fn catalog_log_snapshot() {
    let result = ColumnStandardizer::default().standardize(&CATALOG_COLUMNS);
    insta::assert_json_snapshot!(result.log, @r#"
    [
      {
        "original": "RA_J2000",
        "standard": "position_ra",
        "method": "dictionary_exact",
        "confidence": 100
      },
      {
        "original": "Dec_deg",
        "standard": "position_dec",
        "method": "dictionary_exact",
        "confidence": 100
      },
      {
        "original": "FluX_Val",
        "standard": "brightness",
        "method": "dictionary_exact",
        "confidence": 100
      },
      {
        "original": "obj_name",
        "standard": "object_id",
        "method": "dictionary_exact",
        "confidence": 100
      },
      {
        "original": "T_eff_K",
        "standard": "temperature",
        "method": "fuzzy_match",
        "confidence": 83,
        "matched_key": "t_eff"
      },
      {
        "original": "Unknown_Col",
        "standard": "Unknown_Col",
        "method": "no_match",
        "confidence": 50,
        "matched_key": "count"
      },
      {
        "original": "v_rad",
        "standard": "velocity",
        "method": "dictionary_exact",
        "confidence": 100
      }
    ]
    "#);
}

#[test]
fn override_applies_to_unknown_columns() {
    let options = StandardizerOptions::default().with_override("unknown_col", "quality_flag");
    let result = ColumnStandardizer::new(&options).standardize(&CATALOG_COLUMNS);
    assert_eq!(result.standard_name("Unknown_Col"), "quality_flag");
    assert_eq!(result.log[5].method, MappingMethod::Override);
}

fn dictionary_key() -> impl Strategy<Value = String> {
    let keys: Vec<String> = SYNONYMS
        .iter()
        .flat_map(|(field, synonyms)| {
            synonyms
                .iter()
                .map(|synonym| (*synonym).to_string())
                .chain(std::iter::once((*field).to_string()))
        })
        .collect();
    proptest::sample::select(keys)
}

fn flip_case(text: &str, mask: u64) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if mask >> (i % 64) & 1 == 1 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn dictionary_keys_match_exactly_in_any_case(key in dictionary_key(), mask in any::<u64>()) {
        let column = flip_case(&key, mask);
        let entry = ColumnStandardizer::default().map_column(&column);
        prop_assert_eq!(entry.method, MappingMethod::DictionaryExact);
        prop_assert_eq!(entry.confidence, 100);
    }

    #[test]
    fn overrides_always_win(key in dictionary_key(), target in "[a-z]{1,12}") {
        let options = StandardizerOptions::default().with_override(key.clone(), target.clone());
        let entry = ColumnStandardizer::new(&options).map_column(&key);
        prop_assert_eq!(entry.method, MappingMethod::Override);
        prop_assert_eq!(entry.standard, target);
    }

    #[test]
    fn unmatched_columns_keep_their_name(column in "[A-Za-z_ ]{0,16}", threshold in 0u8..=100) {
        let options = StandardizerOptions::default().with_threshold(threshold);
        let entry = ColumnStandardizer::new(&options).map_column(&column);
        prop_assert!(entry.confidence <= 100);
        match entry.method {
            MappingMethod::NoMatch => {
                prop_assert_eq!(&entry.standard, &column);
                prop_assert!(entry.confidence < threshold);
            }
            MappingMethod::FuzzyMatch => prop_assert!(entry.confidence >= threshold),
            MappingMethod::DictionaryExact => prop_assert_eq!(entry.confidence, 100),
            MappingMethod::Override => prop_assert!(false, "no overrides configured"),
        }
    }

    #[test]
    fn ratio_is_symmetric(a in "[a-z_]{0,12}", b in "[a-z_]{0,12}") {
        prop_assert_eq!(token_sort_ratio(&a, &b), token_sort_ratio(&b, &a));
    }
}
