use medchat_generation::{build_generator, GeneratorConfig, FALLBACK_MAX_LENGTH};
use medchat_protocol::ErrorEnvelope;
use medchat_records::RecordStore;
use serde::Serialize;
use std::path::Path;

const PROBE_PROMPT: &str = "What is a fever?";

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub dataset: String,
    pub dataset_ok: bool,
    pub records: usize,
    pub rows_dropped: usize,
    pub dataset_error: Option<ErrorEnvelope>,
    pub generation_mode: String,
    pub model: String,
    pub generator_ok: bool,
    pub generator_error: Option<ErrorEnvelope>,
    pub probe_output: Option<String>,
}

impl DoctorReport {
    pub fn ok(&self) -> bool {
        self.dataset_ok && self.generator_ok
    }
}

/// Check that the dataset loads and the generator can be built. With
/// `probe`, also send one generation request.
pub async fn doctor(dataset: &Path, config: &GeneratorConfig, probe: bool) -> DoctorReport {
    let mut report = DoctorReport {
        dataset: dataset.display().to_string(),
        dataset_ok: false,
        records: 0,
        rows_dropped: 0,
        dataset_error: None,
        generation_mode: config.mode.as_str().to_string(),
        model: config.model.clone(),
        generator_ok: false,
        generator_error: None,
        probe_output: None,
    };

    match RecordStore::load(dataset) {
        Ok(store) => {
            let stats = store.stats();
            report.dataset_ok = true;
            report.records = stats.records;
            report.rows_dropped = stats.rows_dropped;
        }
        Err(err) => {
            report.dataset_error = Some(error_envelope("dataset_unavailable", err.to_string()));
        }
    }

    let generator = match build_generator(config) {
        Ok(generator) => generator,
        Err(err) => {
            report.generator_error = Some(error_envelope("model_unavailable", err.to_string()));
            return report;
        }
    };

    if !probe {
        report.generator_ok = true;
        return report;
    }

    match generator.generate(PROBE_PROMPT, FALLBACK_MAX_LENGTH).await {
        Ok(text) => {
            report.generator_ok = true;
            report.probe_output = Some(text);
        }
        Err(err) => {
            report.generator_error = Some(error_envelope("model_unavailable", err.to_string()));
        }
    }
    report
}

pub(crate) fn error_envelope(code: &str, message: String) -> ErrorEnvelope {
    let hint = match code {
        "dataset_unavailable" => Some(
            "Check --dataset / MEDCHAT_DATASET points at a CSV with 'question' and 'answer' columns."
                .to_string(),
        ),
        "model_unavailable" => Some(
            "Check MEDCHAT_GENERATION_MODE, MEDCHAT_MODEL and MEDCHAT_INFERENCE_URL, or pass --generation-mode stub."
                .to_string(),
        ),
        _ => None,
    };
    ErrorEnvelope {
        code: code.to_string(),
        message,
        hint,
    }
}

pub(crate) fn render_text(report: &DoctorReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Dataset: {}\n", report.dataset));
    match &report.dataset_error {
        None => out.push_str(&format!(
            "  ok: {} records ({} rows dropped without an answer)\n",
            report.records, report.rows_dropped
        )),
        Some(err) => push_error(&mut out, err),
    }

    out.push_str(&format!(
        "Generator: {} ({})\n",
        report.model, report.generation_mode
    ));
    match &report.generator_error {
        None => {
            out.push_str("  ok\n");
            if let Some(text) = &report.probe_output {
                out.push_str(&format!("  probe: {text}\n"));
            }
        }
        Some(err) => push_error(&mut out, err),
    }
    out
}

fn push_error(out: &mut String, err: &ErrorEnvelope) {
    out.push_str(&format!("  error: {}\n", err.message));
    if let Some(hint) = &err.hint {
        out.push_str(&format!("  hint: {hint}\n"));
    }
}
