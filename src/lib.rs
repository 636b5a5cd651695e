pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod service;

pub use config::{AppConfig, FileMatch, ReconcileConfig};
pub use error::{ReconcileError, SpreadsheetLoadError};
pub use models::{EnrichedRecord, MatchMode, ReconcileReport};
pub use service::ReconcilePipeline;

use std::collections::BTreeMap;

/// 一次完整对账: PDF 字节 + (文件名 -> xlsx 字节) -> 结果表与警告
pub fn reconcile(
    config: &ReconcileConfig,
    document: &[u8],
    files: &BTreeMap<String, Vec<u8>>,
) -> Result<ReconcileReport, ReconcileError> {
    ReconcilePipeline::new(config)?.run(document, files)
}
