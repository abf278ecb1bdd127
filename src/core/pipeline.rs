use crate::core::calculator::{SeedingCalculator, SeedingResponse};
use crate::core::format::{format_significant, format_volume};
use crate::domain::ports::{CatalogProvider, ConfigProvider, Pipeline, Storage};
use crate::utils::error::{CalcError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

pub const CSV_FILENAME: &str = "seeding_plan.csv";
pub const JSON_FILENAME: &str = "seeding_plan.json";

const CSV_HEADERS: [&str; 8] = [
    "Label",
    "Mode",
    "Status",
    "Seed cells",
    "Slurry volume",
    "Media volume",
    "Final concentration",
    "Note",
];

/// One request row read from the bulk input.
#[derive(Debug, Clone)]
pub struct PlanRow {
    pub line: u64,
    pub label: String,
    pub payload: Value,
}

#[derive(Debug)]
pub struct PlannedRow {
    pub line: u64,
    pub label: String,
    pub outcome: Result<SeedingResponse>,
}

#[derive(Debug)]
pub struct PlanBatch {
    pub rows: Vec<PlannedRow>,
    pub csv_output: String,
    pub json_output: String,
}

impl PlanBatch {
    pub fn failed(&self) -> usize {
        self.rows.iter().filter(|row| row.outcome.is_err()).count()
    }
}

#[derive(Serialize)]
struct PlanReport<'a> {
    generated_at: String,
    planned: usize,
    failed: usize,
    plans: Vec<PlanEntry<'a>>,
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    line: u64,
    label: &'a str,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<&'a SeedingResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub struct BulkSeedingPipeline<S: Storage, C: ConfigProvider, K: CatalogProvider> {
    storage: S,
    config: C,
    calculator: SeedingCalculator<K>,
}

impl<S: Storage, C: ConfigProvider, K: CatalogProvider> BulkSeedingPipeline<S, C, K> {
    pub fn new(storage: S, config: C, catalog: K) -> Self {
        Self {
            storage,
            config,
            calculator: SeedingCalculator::new(catalog),
        }
    }

    fn output_file(&self, name: &str) -> String {
        let base = self.config.output_path().trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }

    fn parse_rows(&self, data: &[u8]) -> Result<Vec<PlanRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);

            let mut payload = Map::new();
            let mut label = None;
            let mut vessel_name = None;
            for (header, cell) in headers.iter().zip(record.iter()) {
                if cell.is_empty() {
                    continue;
                }
                match header {
                    "label" => label = Some(cell.to_string()),
                    "vessel" => vessel_name = Some(cell.to_string()),
                    key => {
                        payload.insert(key.to_string(), Value::String(cell.to_string()));
                    }
                }
            }

            if let Some(name) = vessel_name.filter(|_| !payload.contains_key("vessel_id")) {
                match self.calculator.catalog().vessel_by_name(&name) {
                    Some(vessel) => {
                        payload.insert("vessel_id".to_string(), Value::from(vessel.id));
                    }
                    None => tracing::warn!("Line {}: unknown vessel '{}'", line, name),
                }
            }

            rows.push(PlanRow {
                line,
                label: label.unwrap_or_else(|| format!("row {}", index + 1)),
                payload: Value::Object(payload),
            });
        }
        Ok(rows)
    }

    fn render_csv(rows: &[PlannedRow]) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(CSV_HEADERS)?;

        for row in rows {
            let record = match &row.outcome {
                Ok(SeedingResponse::Confluency(plan)) => [
                    row.label.clone(),
                    plan.mode.to_string(),
                    "ok".to_string(),
                    format_significant(Some(plan.required_cells_total), 2).unwrap_or_default(),
                    plan.volume_needed_total_formatted.clone().unwrap_or_default(),
                    String::new(),
                    String::new(),
                    plan.note_suggestion.clone(),
                ],
                Ok(SeedingResponse::Dilution(plan)) => [
                    row.label.clone(),
                    plan.mode.to_string(),
                    "ok".to_string(),
                    format_significant(Some(plan.cells_needed), 2).unwrap_or_default(),
                    format_volume(Some(plan.slurry_volume_ml)).unwrap_or_default(),
                    format_volume(Some(plan.media_volume_ml)).unwrap_or_default(),
                    format_significant(Some(plan.final_concentration), 2).unwrap_or_default(),
                    plan.note_suggestion.clone(),
                ],
                Err(e) => [
                    row.label.clone(),
                    String::new(),
                    format!("error: {}", e.user_friendly_message()),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                ],
            };
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| CalcError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| {
            CalcError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn render_json(rows: &[PlannedRow]) -> Result<String> {
        let plans: Vec<PlanEntry> = rows
            .iter()
            .map(|row| match &row.outcome {
                Ok(response) => PlanEntry {
                    line: row.line,
                    label: &row.label,
                    status: 200,
                    response: Some(response),
                    error: None,
                },
                Err(e) => PlanEntry {
                    line: row.line,
                    label: &row.label,
                    status: e.status_code(),
                    response: None,
                    error: Some(e.user_friendly_message()),
                },
            })
            .collect();
        let failed = plans.iter().filter(|entry| entry.response.is_none()).count();

        let report = PlanReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            planned: plans.len() - failed,
            failed,
            plans,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, K: CatalogProvider> Pipeline for BulkSeedingPipeline<S, C, K> {
    type Row = PlanRow;
    type Output = PlanBatch;

    async fn extract(&self) -> Result<Vec<PlanRow>> {
        tracing::debug!("Reading bulk requests from: {}", self.config.input_file());
        let data = self.storage.read_file(self.config.input_file()).await?;
        self.parse_rows(&data)
    }

    async fn transform(&self, rows: Vec<PlanRow>) -> Result<PlanBatch> {
        let planned: Vec<PlannedRow> = rows
            .into_iter()
            .map(|row| {
                let outcome = self.calculator.calculate(&row.payload);
                match &outcome {
                    Ok(response) => {
                        tracing::debug!("Line {}: {}", row.line, response.note_suggestion())
                    }
                    Err(e) => tracing::warn!("Line {} ({}): {}", row.line, row.label, e),
                }
                PlannedRow {
                    line: row.line,
                    label: row.label,
                    outcome,
                }
            })
            .collect();

        let csv_output = Self::render_csv(&planned)?;
        let json_output = Self::render_json(&planned)?;

        Ok(PlanBatch {
            rows: planned,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, batch: PlanBatch) -> Result<String> {
        let csv_path = self.output_file(CSV_FILENAME);
        let json_path = self.output_file(JSON_FILENAME);

        let failed = batch.failed();
        if failed > 0 {
            tracing::warn!("{} of {} requests could not be planned", failed, batch.rows.len());
        }
        tracing::debug!("Writing {} plans to {}", batch.rows.len(), csv_path);
        self.storage
            .write_file(&csv_path, batch.csv_output.as_bytes())
            .await?;
        self.storage
            .write_file(&json_path, batch.json_output.as_bytes())
            .await?;

        Ok(csv_path)
    }
}
