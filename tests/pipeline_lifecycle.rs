use std::sync::{Arc, Mutex};

use nominal_encoding::code_table::CodeTable;
use nominal_encoding::observability::{EncodingEvent, EncodingObserver, EncodingSeverity};
use nominal_encoding::options::EncodingOptions;
use nominal_encoding::pipeline::{EncodingPipeline, PipelineState};
use nominal_encoding::types::{DataSet, Field, Schema, Value};
use nominal_encoding::EncodingError;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<EncodingEvent>>,
}

impl EncodingObserver for RecordingObserver {
    fn on_event(&self, event: &EncodingEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn train() -> DataSet {
    let schema = Schema::new(vec![
        Field::numeric("age"),
        Field::nominal("job", ["clerk", "chef", "pilot"]),
        Field::nominal("bought", ["no", "yes"]),
    ]);
    DataSet::new(
        schema,
        vec![
            vec![Value::Float64(31.0), Value::Nominal(0), Value::Nominal(1)],
            vec![Value::Float64(45.0), Value::Nominal(0), Value::Nominal(0)],
            vec![Value::Float64(27.0), Value::Nominal(1), Value::Nominal(1)],
            vec![Value::Float64(52.0), Value::Nominal(0), Value::Nominal(1)],
        ],
        2,
    )
}

#[test]
fn observer_sees_fit_then_reuse() {
    let obs = Arc::new(RecordingObserver::default());
    let mut pipeline = EncodingPipeline::new(&EncodingOptions::default())
        .unwrap()
        .with_observer(obs.clone());

    let _ = pipeline.transform(&train()).unwrap();
    let _ = pipeline.transform(&train()).unwrap();

    let events = obs.events.lock().unwrap().clone();
    let fits = events
        .iter()
        .filter(|e| matches!(e, EncodingEvent::FitStarted { .. }))
        .count();
    assert_eq!(fits, 1);

    let refits: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            EncodingEvent::TransformFinished { refit, rows, .. } => {
                assert_eq!(*rows, 4);
                Some(*refit)
            }
            _ => None,
        })
        .collect();
    assert_eq!(refits, vec![true, false]);

    let fallback = events
        .iter()
        .find(|e| e.severity() == EncodingSeverity::Warning)
        .cloned();
    assert_eq!(
        fallback,
        Some(EncodingEvent::FallbackApplied {
            column: 1,
            categories: vec![2],
            fallback: 0.75,
        })
    );
}

#[test]
fn observer_sees_failures() {
    let obs = Arc::new(RecordingObserver::default());
    let mut pipeline = EncodingPipeline::new(&EncodingOptions::default())
        .unwrap()
        .with_observer(obs.clone());

    let mut bad = train();
    bad.rows[1].pop();
    let err = pipeline.transform(&bad).unwrap_err();
    assert!(matches!(err, EncodingError::InvalidDataSet { .. }));

    let events = obs.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), EncodingSeverity::Error);
}

#[test]
fn schema_mismatch_after_fit_leaves_table_untouched() {
    let mut pipeline = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
    let _ = pipeline.transform(&train()).unwrap();
    let table = pipeline.code_table().cloned().unwrap();

    let mut grown = train();
    grown.schema.fields[1] = Field::nominal("job", ["clerk", "chef", "pilot", "nurse"]);
    let err = pipeline.transform(&grown).unwrap_err();
    assert!(matches!(err, EncodingError::SchemaMismatch { .. }));

    let mut moved_target = train();
    moved_target.schema.fields[0] = Field::nominal("age", ["young", "old"]);
    for row in &mut moved_target.rows {
        row[0] = Value::Nominal(0);
    }
    moved_target.target_index = 0;
    let err = pipeline.transform(&moved_target).unwrap_err();
    assert!(matches!(err, EncodingError::SchemaMismatch { .. }));

    assert_eq!(pipeline.code_table(), Some(&table));
}

#[test]
fn reset_allows_a_fresh_fit() {
    let mut pipeline = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
    let _ = pipeline.transform(&train()).unwrap();

    let mut grown = train();
    grown.schema.fields[1] = Field::nominal("job", ["clerk", "chef", "pilot", "nurse"]);
    grown.rows[0][1] = Value::Nominal(3);

    pipeline.reset();
    assert_eq!(pipeline.state(), &PipelineState::Unfitted);
    let out = pipeline.transform(&grown).unwrap();
    assert_eq!(out.rows[0][1], Value::Float64(1.0));
}

#[test]
fn persisted_table_restores_an_equivalent_pipeline() {
    let options = EncodingOptions::default();
    let mut pipeline = EncodingPipeline::new(&options).unwrap();
    let expected = pipeline.transform(&train()).unwrap();

    let json = pipeline.code_table().unwrap().to_json().unwrap();
    let schema = pipeline.fitted_schema().cloned().unwrap();

    let table = CodeTable::from_json(&json).unwrap();
    assert_eq!(table.global_mean(), Some(0.75));
    let mut restored = EncodingPipeline::restore(&options, table, schema, 2).unwrap();
    assert!(restored.is_fitted());
    assert_eq!(restored.transform(&train()).unwrap(), expected);
}

#[test]
fn restore_rejects_incomplete_tables() {
    let mut table = CodeTable::with_global_mean(0.5);
    table.insert(1, vec![0.1, 0.2]);

    let err = EncodingPipeline::restore(&EncodingOptions::default(), table, train().schema, 2).unwrap_err();
    assert!(err.to_string().contains("2 codes for 3 categories"));

    let err = EncodingPipeline::restore(
        &EncodingOptions::default(),
        CodeTable::with_global_mean(0.5),
        train().schema,
        2,
    )
    .unwrap_err();
    assert!(matches!(err, EncodingError::SchemaMismatch { .. }));
}

#[test]
fn pipelines_can_run_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let mut pipeline = EncodingPipeline::new(&EncodingOptions::default()).unwrap();
                pipeline.transform(&train()).unwrap()
            })
        })
        .collect();

    let outputs: Vec<DataSet> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}
