use colframe::dataframe::{Column, DataFrame, Mode, Value};
use colframe::io;
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(df: &DataFrame) -> u64 {
    let mut hasher = DefaultHasher::new();
    df.hash(&mut hasher);
    hasher.finish()
}

fn table(
    ints: Vec<Option<i32>>,
    words: Vec<Option<String>>,
    bools: Vec<Option<bool>>,
) -> DataFrame {
    let n = ints.len().min(words.len()).min(bools.len());
    DataFrame::from_columns(
        Mode::Nullable,
        vec![
            Column::from_options("i", ints[..n].to_vec()).unwrap(),
            Column::from_options("w", words[..n].to_vec()).unwrap(),
            Column::from_options("b", bools[..n].to_vec()).unwrap(),
        ],
    )
    .unwrap()
}

fn arb_table() -> impl Strategy<Value = DataFrame> {
    (
        prop::collection::vec(any::<Option<i32>>(), 0..40),
        prop::collection::vec(prop::option::of("[a-c]{0,3}"), 0..40),
        prop::collection::vec(any::<Option<bool>>(), 0..40),
    )
        .prop_map(|(i, w, b)| table(i, w, b))
}

proptest! {
    #[test]
    fn prop_codec_round_trip(df in arb_table(), slack in 0usize..30) {
        let mut grown = df.clone();
        for _ in 0..slack {
            grown.add_row(&vec![Value::Null; 3].into()).unwrap();
        }
        let n = df.n_rows();
        grown.remove_rows(n..n + slack).unwrap();

        let bytes = io::serialize(&grown).unwrap();
        prop_assert_eq!(&bytes, &io::serialize(&df).unwrap());
        let decoded = io::deserialize(&bytes).unwrap();
        prop_assert_eq!(&decoded, &df);
        prop_assert_eq!(hash_of(&decoded), hash_of(&df));
        prop_assert_eq!(hash_of(&df.clone()), hash_of(&df));
        prop_assert_eq!(decoded.capacity(), decoded.n_rows());
    }

    #[test]
    fn prop_capacity_is_invisible(df in arb_table(), extra in 1usize..20) {
        let mut grown = df.clone();
        for _ in 0..extra {
            grown.add_row(&vec![Value::Int(1), Value::from("x"), Value::Null].into()).unwrap();
        }
        for _ in 0..extra {
            grown.remove_row(grown.n_rows() - 1).unwrap();
        }
        prop_assert_eq!(&grown, &df);
        prop_assert_eq!(hash_of(&grown), hash_of(&df));
    }

    #[test]
    fn prop_unique_counts_agree(df in arb_table()) {
        for name in ["i", "w", "b"] {
            let unique = df.unique(name).unwrap();
            prop_assert_eq!(df.count_unique(name).unwrap(), unique.len());
            if df.n_rows() == 0 {
                prop_assert!(unique.is_empty());
            }
            let total: usize = df.value_counts(name).unwrap().iter().map(|(_, n)| n).sum();
            prop_assert_eq!(total, df.n_rows());
        }
    }

    #[test]
    fn prop_filter_keeps_matching_rows(df in arb_table(), threshold in any::<i32>()) {
        let kept = df
            .filter_by(|r| matches!(r.get("i").unwrap(), Value::Int(x) if x > threshold))
            .unwrap();
        prop_assert!(kept.n_rows() <= df.n_rows());
        let expected = df
            .column("i")
            .unwrap()
            .iter()
            .filter(|v| matches!(v, Value::Int(x) if *x > threshold))
            .count();
        prop_assert_eq!(kept.n_rows(), expected);
        prop_assert_eq!(kept.capacity(), kept.n_rows());
    }

    #[test]
    fn prop_index_of_is_first_match(df in arb_table()) {
        let all = df.index_of_all("w", "a").unwrap();
        prop_assert!(all.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(df.index_of("w", "a").unwrap(), all.first().copied());
    }
}
