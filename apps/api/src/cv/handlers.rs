use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cv::processor::{process_document, DocumentInput, PipelineConfig, ProcessedCv};
use crate::cv::summary::{compose_summary, EvidencePayload};
use crate::errors::AppError;
use crate::evidence::countries::detect_nationality;
use crate::evidence::languages::detect_languages;
use crate::evidence::roles::resolve_primary_role;
use crate::evidence::{collect_evidence, Evidence};
use crate::ingest::extract_text;
use crate::models::cv::WorkEntry;
use crate::state::AppState;
use crate::text::{canonicalize, redact};

const FILES_FIELD: &str = "files";
const FALLBACK_FIELD: &str = "fallback_position";

#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub code: &'static str,
    pub message: String,
}

/// Outcome for one uploaded file; exactly one of `cv` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<ProcessedCv>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

impl FileResult {
    fn failed(file_name: String, err: &AppError) -> Self {
        Self {
            file_name,
            cv: None,
            error: Some(FileError {
                code: err.code(),
                message: err.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<FileResult>,
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// POST /api/v1/cv/process
/// Multipart upload of one or more PDF/DOCX files under `files`, plus an
/// optional `fallback_position`. Files are processed concurrently; results
/// come back in upload order with per-file errors.
pub async fn handle_process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let mut uploads = Vec::new();
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FALLBACK_FIELD) => {
                fallback = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.to_string()))?,
                );
            }
            Some(FILES_FIELD) => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                uploads.push(Upload { file_name, bytes });
            }
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(AppError::Validation(format!(
            "At least one file is required in the '{FILES_FIELD}' field"
        )));
    }

    let config = state.pipeline_config(fallback.as_deref());
    let file_names: Vec<String> = uploads.iter().map(|u| u.file_name.clone()).collect();
    info!(
        "Processing batch of {} file(s), llm={}",
        uploads.len(),
        config.use_llm
    );

    let mut tasks = JoinSet::new();
    for (index, upload) in uploads.into_iter().enumerate() {
        let state = state.clone();
        let config = config.clone();
        tasks.spawn(async move { (index, process_upload(&state, &config, upload).await) });
    }

    let mut slots: Vec<Option<FileResult>> = vec![None; file_names.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => error!("CV processing task failed: {e}"),
        }
    }

    let results = slots
        .into_iter()
        .zip(file_names)
        .map(|(slot, file_name)| {
            slot.unwrap_or_else(|| {
                let err = AppError::Internal(anyhow::anyhow!("processing task failed"));
                FileResult::failed(file_name, &err)
            })
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}

async fn process_upload(state: &AppState, config: &PipelineConfig, upload: Upload) -> FileResult {
    let Upload { file_name, bytes } = upload;

    let name = file_name.clone();
    let raw_text = match tokio::task::spawn_blocking(move || extract_text(&name, &bytes)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Text extraction failed for '{file_name}': {e}");
            return FileResult::failed(file_name, &AppError::from(e));
        }
        Err(e) => {
            let err = AppError::Internal(anyhow::anyhow!("text extraction task failed: {e}"));
            return FileResult::failed(file_name, &err);
        }
    };

    let input = DocumentInput {
        file_name: file_name.clone(),
        raw_text,
        work_experiences: None,
    };
    let cv = process_document(input, config, state.collaborators()).await;
    FileResult {
        file_name,
        cv: Some(cv),
        error: None,
    }
}

#[derive(Debug, Deserialize)]
pub struct ProcessTextRequest {
    #[serde(default)]
    pub raw_text: String,
    pub file_name: Option<String>,
    pub fallback_position: Option<String>,
    /// When supplied, LLM extraction is skipped.
    pub work_experiences: Option<Vec<WorkEntry>>,
}

/// POST /api/v1/cv/process-text
/// Same pipeline as the upload endpoint for text that is already extracted.
pub async fn handle_process_text(
    State(state): State<AppState>,
    Json(req): Json<ProcessTextRequest>,
) -> Result<Json<ProcessedCv>, AppError> {
    if req.raw_text.trim().is_empty() && req.work_experiences.is_none() {
        return Err(AppError::Validation(
            "raw_text must not be empty unless work_experiences are supplied".to_string(),
        ));
    }

    let config = state.pipeline_config(req.fallback_position.as_deref());
    let input = DocumentInput {
        file_name: req.file_name.unwrap_or_else(|| "text".to_string()),
        raw_text: req.raw_text,
        work_experiences: req.work_experiences,
    };
    Ok(Json(
        process_document(input, &config, state.collaborators()).await,
    ))
}

#[derive(Debug, Deserialize)]
pub struct EvidenceRequest {
    pub text: String,
    #[serde(default)]
    pub work_experiences: Vec<WorkEntry>,
    pub fallback_position: Option<String>,
    pub total_experience_months: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EvidenceReport {
    pub evidence: Evidence,
    pub nationality: Option<String>,
    pub languages: Vec<String>,
    pub primary_role: String,
    /// Deterministic paragraph; this endpoint never calls the LLM.
    pub summary: String,
    /// What the summary generator would receive.
    pub payload: Value,
}

/// POST /api/v1/evidence
/// Deterministic classifiers only, for inspecting what a text yields.
pub async fn handle_evidence(
    State(state): State<AppState>,
    Json(req): Json<EvidenceRequest>,
) -> Result<Json<EvidenceReport>, AppError> {
    let config = state.pipeline_config(req.fallback_position.as_deref());
    Ok(Json(evidence_report(&req, &config)))
}

fn evidence_report(req: &EvidenceRequest, config: &PipelineConfig) -> EvidenceReport {
    let text = redact(&canonicalize(&req.text));
    let evidence = collect_evidence(&text, &req.work_experiences, req.total_experience_months);
    let primary_role = resolve_primary_role(&req.work_experiences, &config.fallback_position);
    let summary = compose_summary(&evidence, &primary_role, &config.fallback_position);
    let payload = EvidencePayload::from_evidence(
        &evidence,
        &primary_role,
        req.total_experience_months.unwrap_or(0),
    )
    .to_redacted_json();

    EvidenceReport {
        nationality: detect_nationality(&text),
        languages: detect_languages(&text),
        evidence,
        primary_role,
        summary,
        payload,
    }
}
