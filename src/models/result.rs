use super::{MatchMode, RoAssociation, SkuGroup};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 最终输出行: 一个 RO 下的一个 SKU 汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub ro_number: String,
    pub invoice_number: Option<String>,
    pub debit_note: Option<String>,
    #[serde(flatten)]
    pub group: SkuGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 压缩包中找不到 RO 对应的文件
    UnresolvedReference,
    /// RO 文件无法读取或缺少工作表/列
    SpreadsheetLoad,
}

/// 非致命问题, 随结果一起返回给用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub ro_number: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// 一次对账运行的完整结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub match_mode: MatchMode,
    pub associations: Vec<RoAssociation>,
    pub records: Vec<EnrichedRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub generated_at: DateTime<Utc>,
}

impl ReconcileReport {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len()
    }
}
