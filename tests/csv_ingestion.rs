use nominal_encoding::ingestion::csv::{ingest_csv_from_path, ingest_csv_from_reader};
use nominal_encoding::options::EncodingOptions;
use nominal_encoding::pipeline::EncodingPipeline;
use nominal_encoding::types::{Field, Schema, Value};

fn weather_schema() -> Schema {
    Schema::new(vec![
        Field::nominal("outlook", ["sunny", "overcast", "rainy"]),
        Field::numeric("temperature"),
        Field::nominal("windy", ["false", "true"]),
        Field::nominal("play", ["no", "yes"]),
    ])
}

#[test]
fn ingest_csv_from_path_happy_path() {
    let ds = ingest_csv_from_path("tests/fixtures/weather.csv", &weather_schema(), "play").unwrap();

    assert_eq!(ds.row_count(), 8);
    assert_eq!(ds.target_index(), 3);
    assert_eq!(
        ds.rows[2],
        vec![
            Value::Nominal(1),
            Value::Float64(83.0),
            Value::Nominal(0),
            Value::Nominal(1),
        ]
    );
    assert!(ds.validate().is_ok());
}

#[test]
fn ingest_csv_allows_reordered_columns_and_missing_marker() {
    let ds = ingest_csv_from_path("tests/fixtures/weather_test.csv", &weather_schema(), "play").unwrap();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::Nominal(1));
    assert_eq!(ds.rows[0][1], Value::Float64(71.0));
    assert_eq!(ds.rows[1][0], Value::Null);
}

#[test]
fn ingest_csv_errors_on_missing_required_column() {
    let input = "outlook,temperature,play\nsunny,85,no\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &weather_schema(), "play").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'windy'"));
}

#[test]
fn ingest_csv_errors_on_unknown_label() {
    let input = "outlook,temperature,windy,play\nfoggy,85,false,no\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &weather_schema(), "play").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to parse value at row 2"));
    assert!(msg.contains("column 'outlook'"));
}

#[test]
fn ingest_csv_errors_on_unknown_target() {
    let input = "outlook,temperature,windy,play\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &weather_schema(), "humidity").unwrap_err();
    assert!(err.to_string().contains("target column 'humidity'"));
}

#[test]
fn train_file_codes_are_applied_to_test_file() {
    let schema = weather_schema();
    let train = ingest_csv_from_path("tests/fixtures/weather.csv", &schema, "play").unwrap();
    let test = ingest_csv_from_path("tests/fixtures/weather_test.csv", &schema, "play").unwrap();

    let mut pipeline = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
    let encoded_train = pipeline.transform(&train).unwrap();
    assert_eq!(encoded_train.rows[0][0], Value::Float64(0.0));
    assert_eq!(encoded_train.rows[2][0], Value::Float64(1.0));

    let encoded_test = pipeline.transform(&test).unwrap();
    assert_eq!(encoded_test.rows[0][0], Value::Float64(1.0));
    assert_eq!(encoded_test.rows[0][2], Value::Float64(1.0 / 3.0));
    assert_eq!(encoded_test.rows[1][0], Value::Null);
    assert_eq!(encoded_test.rows[1][2], Value::Float64(0.6));
    assert_eq!(encoded_test.rows[1][3], Value::Nominal(0));
}
