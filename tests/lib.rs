use colframe::dataframe::{
    Column, DataFrame, DataType, MatchSpec, Matcher, Mode, Row, Rower, Value,
};
use colframe::error::DataFrameError;
use colframe::io::{self, CodecOptions, CsvOptions};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fs;
use std::hash::{Hash, Hasher};

fn scenario() -> DataFrame {
    DataFrame::from_columns(
        Mode::Default,
        vec![
            Column::from_vec("A", vec![1, 2, 3]).unwrap(),
            Column::from_vec("B", vec![4.4f32, 5.5, 6.6]).unwrap(),
            Column::from_vec("C", vec!["cat", "dog", "horse"]).unwrap(),
        ],
    )
    .unwrap()
}

fn hash_of(df: &DataFrame) -> u64 {
    let mut hasher = DefaultHasher::new();
    df.hash(&mut hasher);
    hasher.finish()
}

struct GreaterThan {
    col: usize,
    threshold: i64,
}

impl Rower for GreaterThan {
    fn visit(&mut self, r: &Row) -> bool {
        r[self.col].as_i64().map_or(false, |x| x > self.threshold)
    }
}

#[test]
fn test_scenario() {
    let df = scenario();
    let filtered = df
        .filter(&mut GreaterThan {
            col: 0,
            threshold: 1,
        })
        .unwrap();
    assert_eq!(filtered.n_rows(), 2);
    assert_eq!(filtered.get(0, "A").unwrap(), Value::Int(2));
    assert_eq!(filtered.get(1, "C").unwrap(), Value::from("horse"));
    assert_eq!(filtered.capacity(), 2);

    assert_eq!(df.index_of("C", "dog").unwrap(), Some(1));
    assert_eq!(df.index_of("C", "cow").unwrap(), None);

    let decoded = io::deserialize(&io::serialize(&df).unwrap()).unwrap();
    assert_eq!(decoded, df);
    assert_eq!(hash_of(&decoded), hash_of(&df));
    assert_eq!(hash_of(&df.clone()), hash_of(&df));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.df");
    let mut df = scenario();
    df.flush();
    io::write_file(&path, &df).unwrap();
    assert_eq!(io::read_file(&path).unwrap(), df);

    let compressed = dir.path().join("compressed.df");
    io::write_file_with(&compressed, &df, &CodecOptions::new().compress(true)).unwrap();
    assert_eq!(io::read_file(&compressed).unwrap(), df);
}

#[test]
fn test_corrupt_file_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.df");
    let mut bytes = io::serialize(&scenario()).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&path, bytes).unwrap();
    match io::read_file(&path) {
        Err(DataFrameError::MalformedFile(msg)) => assert!(msg.contains("broken.df")),
        other => panic!("expected a malformed file error, got {:?}", other),
    }
    assert!(matches!(
        io::read_file(dir.path().join("missing.df")),
        Err(DataFrameError::Io(_))
    ));
}

#[test]
fn test_directory_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut nullable = DataFrame::new(Mode::Nullable);
    nullable
        .add_column(Column::from_options("x", vec![Some(1.5f64), None]).unwrap())
        .unwrap();

    let mut tables = BTreeMap::new();
    tables.insert("first".to_string(), scenario());
    tables.insert("second.df".to_string(), nullable.clone());
    io::write_dir(dir.path(), &tables).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a table").unwrap();

    let read = io::read_dir_strict(dir.path()).unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read["first"], scenario());
    assert_eq!(read["second"], nullable);

    fs::write(dir.path().join("third.df"), b"DFRM").unwrap();
    let read = io::read_dir(dir.path()).unwrap();
    assert_eq!(read.len(), 3);
    assert!(read["first"].is_ok());
    assert!(matches!(read["third"], Err(DataFrameError::MalformedFile(_))));
    assert!(io::read_dir_strict(dir.path()).is_err());

    let mut bad = BTreeMap::new();
    bad.insert("a/b".to_string(), scenario());
    assert!(matches!(
        io::write_dir(dir.path(), &bad),
        Err(DataFrameError::InvalidArgument(_))
    ));
}

#[test]
fn test_directory_batch_rejects_colliding_names() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tables");

    let mut tables = BTreeMap::new();
    tables.insert("t".to_string(), scenario());
    tables.insert("t.df".to_string(), DataFrame::new(Mode::Nullable));
    assert!(matches!(
        io::write_dir(&out, &tables),
        Err(DataFrameError::InvalidArgument(_))
    ));
    assert!(!out.exists());

    // names are all checked before the first file is written
    let mut tables = BTreeMap::new();
    tables.insert("a".to_string(), scenario());
    tables.insert("b/c".to_string(), scenario());
    tables.insert(".df".to_string(), scenario());
    assert!(io::write_dir(&out, &tables).is_err());
    assert!(!out.exists());
}

#[test]
fn test_csv_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.csv");
    let df = scenario();
    let opts = CsvOptions::new().annotate_types(true).separator(b'\t');
    io::write_csv(&path, &df, &opts).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap().lines().next(),
        Some("A:int\tB:float\tC:string")
    );
    assert_eq!(io::read_csv(&path, &opts).unwrap(), df);
}

#[test]
fn test_csv_to_binary() {
    let text = "id,name,score\n1,ann,3.5\n2,null,4\n";
    let df = io::read_csv_from(text.as_bytes(), &CsvOptions::default()).unwrap();
    assert_eq!(df.mode(), Mode::Nullable);
    assert_eq!(df.column("score").unwrap().data_type(), DataType::Double);
    let back = io::from_base64(&io::to_base64(&df).unwrap()).unwrap();
    assert_eq!(back, df);
    assert!(back.is_null(1, "name").unwrap());
}

#[test]
fn test_match_edit_and_sort() {
    let mut df = DataFrame::from_columns(
        Mode::Nullable,
        vec![
            Column::from_options("animal", vec![Some("dog"), Some("cat"), None, Some("dog")])
                .unwrap(),
            Column::from_options("age", vec![Some(3i64), Some(9), Some(1), None]).unwrap(),
        ],
    )
    .unwrap();

    assert_eq!(df.count("animal", "dog").unwrap(), 2);
    assert_eq!(df.index_of_all("age", Matcher::IsNull).unwrap(), vec![3]);
    assert_eq!(
        df.index_of_all("animal", Matcher::regex("d.g|c.*").unwrap()).unwrap(),
        vec![0, 1, 3]
    );

    let spec = MatchSpec::on("animal", "dog").and("age", Matcher::IsNull);
    assert_eq!(df.replace_by_match(&spec, "age", 4).unwrap(), 1);
    assert_eq!(df.get(3, "age").unwrap(), Value::Long(4));

    df.sort_descending_by("age").unwrap();
    assert_eq!(df.column("age").unwrap().to_values(), vec![
        Value::Long(9),
        Value::Long(4),
        Value::Long(3),
        Value::Long(1),
    ]);

    let removed = df
        .remove_rows_by_match(&MatchSpec::on("animal", Matcher::IsNull))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(df.n_rows(), 3);
    assert_eq!(df.count_unique("animal").unwrap(), 2);
    assert_eq!(
        df.value_counts("animal").unwrap()[0],
        (Value::from("dog"), 2)
    );
}

#[test]
fn test_factor_and_numeric() {
    let mut df = scenario();
    let codes = df.factor("C").unwrap();
    assert_eq!(codes.len(), 3);
    assert_eq!(codes[&2], Value::from("dog"));
    assert_eq!(df.column("C").unwrap().data_type(), DataType::Int);
    assert_eq!(df.get(2, "C").unwrap(), Value::Int(3));

    df.ceil("B").unwrap();
    assert_eq!(df.get(0, "B").unwrap(), Value::Float(5.0));
    assert_eq!(df.sum("A").unwrap(), 6.0);
    assert_eq!(df.maximum("B").unwrap(), Some(Value::Float(7.0)));
    assert!(df.sum("missing").is_err());
}

#[test]
fn test_combine_tables() {
    let sales = io::read_csv_from(
        "shop,item,qty\nnorth,apple,3\nsouth,pear,5\nnorth,pear,4\nwest,plum,1\n".as_bytes(),
        &CsvOptions::default(),
    )
    .unwrap();
    let shops = io::read_csv_from(
        "shop,city\nnorth,Oslo\nsouth,Rome\neast,null\n".as_bytes(),
        &CsvOptions::default(),
    )
    .unwrap();

    let totals = sales.group_sum_by("shop").unwrap();
    assert_eq!(totals.column_names(), vec!["shop", "qty"]);
    assert_eq!(totals.get(0, "qty").unwrap(), Value::Double(7.0));
    assert_eq!(sales.group_maximum_by("shop").unwrap().get(0, "qty").unwrap(), Value::Int(4));
    assert_eq!(sales.median("qty").unwrap(), Some(3.5));

    let joined = sales.join(&shops).unwrap();
    assert_eq!(joined.mode(), Mode::Nullable);
    assert_eq!(joined.column_names(), vec!["shop", "item", "qty", "city"]);
    assert_eq!(joined.n_rows(), 3);
    assert_eq!(joined.get(1, "city").unwrap(), Value::from("Rome"));

    let keys = sales.include(&["shop"]).unwrap();
    let other_keys = shops.include(&["shop"]).unwrap();
    assert_eq!(keys.union_rows(&other_keys).unwrap().n_rows(), 4);
    assert_eq!(keys.intersection_rows(&other_keys).unwrap().n_rows(), 2);
    assert_eq!(keys.difference_rows(&other_keys).unwrap().n_rows(), 2);

    let wide = DataFrame::merge(&[&sales, &sales.include(&["qty"]).unwrap()]).unwrap();
    assert_eq!(wide.column_names(), vec!["shop", "item", "qty_0", "qty_1"]);
    let narrow = wide.intersection_columns(&sales).unwrap();
    assert_eq!(narrow.column_names(), vec!["shop", "item"]);

    let mut more = sales.like();
    assert_eq!(more.add_rows(&sales).unwrap(), 4);
    assert_eq!(more.add_rows(&joined).unwrap(), 3);
    assert_eq!(more.n_rows(), 7);
    assert!(more.contains("item", "plum").unwrap());
    assert_eq!(more.exclude("item", "pear").unwrap(), 4);
    assert!(!more.contains("item", "pear").unwrap());
}

#[test]
fn test_capacity_is_invisible() {
    let df = scenario();
    let mut grown = scenario();
    for _ in 0..20 {
        grown.add_row(&df.get_row(0).unwrap()).unwrap();
    }
    grown.remove_rows(3..23).unwrap();
    assert!(grown.capacity() > df.capacity());
    assert_eq!(grown, df);
    assert_eq!(hash_of(&grown), hash_of(&df));
    assert_eq!(io::serialize(&grown).unwrap(), io::serialize(&df).unwrap());
    assert!(grown.memory_usage() > df.memory_usage());
}

#[test]
fn test_serde_round_trip() {
    let df = scenario();
    let bytes = bincode::serialize(&df).unwrap();
    let back: DataFrame = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, df);
}
