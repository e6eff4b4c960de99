mod common;

use candle_core::Device;
use common::{loader, strings, ConstantLectin};
use glyco_infer::{
    get_lectin_preds, get_multi_pred, BackgroundCorrection, EmbeddingStore, LectinPredOptions,
    MultiPredOptions, ProteinInput,
};
use glyco_test_data::TestFile;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

const LECTIN: &str = "MKTAYIAKQRQISFVKSHFSRQ";

/// Records the fields of every WARN event as `name=value` pairs.
#[derive(Clone, Default)]
struct WarnRecorder(Arc<Mutex<Vec<String>>>);

struct FieldText(String);

impl Visit for FieldText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.push_str(&format!("{}={:?} ", field.name(), value));
    }
}

impl<S: Subscriber> Layer<S> for WarnRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut text = FieldText(String::new());
            event.record(&mut text);
            self.0.lock().unwrap().push(text.0);
        }
    }
}

fn with_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let recorder = WarnRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let warnings = recorder.0.lock().unwrap().clone();
    (out, warnings)
}

fn store() -> anyhow::Result<EmbeddingStore> {
    let (path, _handle) = TestFile::lectin_embeddings_01().create_temp()?;
    Ok(EmbeddingStore::from_json_file(path)?)
}

#[test]
fn test_missing_glycans_warn_once_across_batches() -> anyhow::Result<()> {
    let table =
        BackgroundCorrection::from_csv_bytes(TestFile::background_correction_01().bytes())?;
    let embeddings = store()?;
    // Glc, Man and Fuc have no background value
    let glycans = strings(&["Glc", "Gal(b1-4)Glc", "Man", "Fuc"]);
    let options = MultiPredOptions::builder()
        .background_correction(true)
        .batch_size(1)
        .build();

    let (preds, warnings) = with_warnings(|| {
        get_multi_pred(
            &LECTIN.into(),
            &glycans,
            &ConstantLectin(2.0),
            &loader(),
            &embeddings,
            Some(&table),
            &options,
            &Device::Cpu,
        )
    });
    assert_eq!(preds?, vec![2.0, 1.75, 2.0, 2.0]);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("background correction table"));
    assert!(warnings[0].contains("missing=3"));
    Ok(())
}

#[test]
fn test_empty_bundled_table_is_reported() -> anyhow::Result<()> {
    let embeddings = store()?;
    let glycans = strings(&["Glc", "Gal(b1-4)Glc", "Man(a1-2)Man"]);
    let options = MultiPredOptions::builder()
        .background_correction(true)
        .build();

    let (preds, warnings) = with_warnings(|| {
        get_multi_pred(
            &LECTIN.into(),
            &glycans,
            &ConstantLectin(2.0),
            &loader(),
            &embeddings,
            None,
            &options,
            &Device::Cpu,
        )
    });
    let preds = preds?;
    assert_eq!(preds, vec![2.0; 3]);
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    assert!(warnings[0].contains("bundled background correction table is empty"));
    assert!(warnings[1].contains("missing=3"));

    let bundled = BackgroundCorrection::bundled()?;
    assert!(bundled.is_empty());
    assert_eq!(bundled.subtract(&glycans, &preds)?.missing, glycans);
    Ok(())
}

#[test]
fn test_lectin_preds_empty_bundled_table_is_reported() -> anyhow::Result<()> {
    let embeddings = store()?;
    let glycans = strings(&["Glc", "Gal(b1-4)Glc"]);
    let options = LectinPredOptions::builder()
        .background_correction(true)
        .sort(false)
        .build();

    let (table, warnings) = with_warnings(|| {
        get_lectin_preds(
            &LECTIN.into(),
            &glycans,
            &ConstantLectin(0.5),
            &loader(),
            &embeddings,
            None,
            &options,
            &Device::Cpu,
        )
    });
    assert_eq!(table?.preds(), vec![0.5, 0.5]);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("bundled background correction table is empty"));
    Ok(())
}

#[test]
fn test_given_embedding_needs_no_store() -> anyhow::Result<()> {
    let (table, warnings) = with_warnings(|| {
        get_lectin_preds(
            &ProteinInput::Embedding(vec![0.1, 0.2]),
            &strings(&["Glc"]),
            &ConstantLectin(0.5),
            &loader(),
            &EmbeddingStore::new(),
            None,
            &LectinPredOptions::default(),
            &Device::Cpu,
        )
    });
    assert_eq!(table?.len(), 1);
    assert!(warnings.is_empty(), "{warnings:?}");
    Ok(())
}
