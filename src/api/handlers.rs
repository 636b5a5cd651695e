use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::export;
use crate::extract::ArchiveWorkspace;
use crate::models::{Diagnostic, MatchMode, ReconcileReport};
use crate::service::ReconcilePipeline;
use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// 响应体
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub records: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub csv: Option<String>,
}

impl ReconcileResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            records: 0,
            diagnostics: Vec::new(),
            csv: None,
        }
    }
}

/// 上传内容
#[derive(Default)]
struct UploadForm {
    summary: Option<Vec<u8>>,
    archive: Option<Vec<u8>>,
    mode: Option<MatchMode>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 对账接口: multipart 字段 summary (PDF), archive (zip), 可选 mode
pub async fn reconcile(
    State(config): State<Arc<ReconcileConfig>>,
    multipart: Multipart,
) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ReconcileResponse::failure(message))).into_response()
        }
    };

    let mut config = (*config).clone();
    if let Some(mode) = form.mode {
        config.match_mode = mode;
    }

    let result = tokio::task::spawn_blocking(move || run_upload(&config, form)).await;

    match result {
        Ok(Ok((report, csv))) => {
            let response = ReconcileResponse {
                success: true,
                message: format!(
                    "Analysis complete: {} ROs, {} rows, {} warnings",
                    report.associations.len(),
                    report.records.len(),
                    report.warning_count()
                ),
                records: report.records.len(),
                diagnostics: report.diagnostics,
                csv: Some(csv),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!("对账失败: {}", e);
            let status = match e {
                ReconcileError::InputMissing(_) => StatusCode::BAD_REQUEST,
                ReconcileError::DocumentParse(_) | ReconcileError::Archive(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ReconcileResponse::failure(format!("Error: {}", e)))).into_response()
        }
        Err(e) => {
            tracing::error!("对账任务异常退出: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReconcileResponse::failure(format!("Error: {}", e))),
            )
                .into_response()
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, String> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "summary" => form.summary = Some(field.bytes().await.map_err(|e| e.to_string())?.to_vec()),
            "archive" => form.archive = Some(field.bytes().await.map_err(|e| e.to_string())?.to_vec()),
            "mode" => {
                let text = field.text().await.map_err(|e| e.to_string())?;
                form.mode = Some(text.parse()?);
            }
            other => tracing::debug!("忽略未知字段 {}", other),
        }
    }

    Ok(form)
}

/// 阻塞执行: 解压 -> 对账 -> CSV; 临时目录随 workspace 释放
fn run_upload(
    config: &ReconcileConfig,
    form: UploadForm,
) -> Result<(ReconcileReport, String), ReconcileError> {
    let summary = form
        .summary
        .filter(|b| !b.is_empty())
        .ok_or(ReconcileError::InputMissing("summary"))?;
    let archive = form
        .archive
        .filter(|b| !b.is_empty())
        .ok_or(ReconcileError::InputMissing("archive"))?;

    let pipeline = ReconcilePipeline::new(config)?;
    let workspace = ArchiveWorkspace::extract(&archive)?;
    let files = workspace.load_spreadsheets()?;

    let report = pipeline.run(&summary, &files)?;
    let csv = export::to_csv_string(&report).map_err(|e| ReconcileError::Io(e.into()))?;
    Ok((report, csv))
}
