use crate::config::{FileMatch, ReconcileConfig};
use crate::error::ReconcileError;
use crate::extract;
use crate::models::{
    Diagnostic, DiagnosticKind, EnrichedRecord, MatchMode, ReconcileReport, RoAssociation,
};
use crate::service::aggregator::Aggregator;
use crate::service::normalizer::SpreadsheetNormalizer;
use crate::service::resolver::{MatchPolicy, ReferenceResolver};
use chrono::Utc;
use indexmap::IndexSet;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// 单个 RO 的处理结果
enum RoOutcome {
    Records(Vec<EnrichedRecord>),
    Skipped(Diagnostic),
}

/// 对账流水线: 文档解析 -> RO 关联 -> 逐 RO 汇总
pub struct ReconcilePipeline {
    resolver: ReferenceResolver,
    normalizer: SpreadsheetNormalizer,
    aggregator: Aggregator,
    file_match: FileMatch,
    parallel: bool,
}

impl ReconcilePipeline {
    pub fn new(config: &ReconcileConfig) -> Result<Self, ReconcileError> {
        Ok(Self {
            resolver: ReferenceResolver::new(MatchPolicy::from_config(config)?),
            normalizer: SpreadsheetNormalizer::new(config.sheet_name.clone()),
            aggregator: Aggregator::new(config.tax_rate_percent),
            file_match: config.file_match,
            parallel: config.parallel,
        })
    }

    pub fn match_mode(&self) -> MatchMode {
        self.resolver.mode()
    }

    /// 入口: PDF 字节 + (文件名 -> xlsx 字节)
    pub fn run(
        &self,
        document: &[u8],
        files: &BTreeMap<String, Vec<u8>>,
    ) -> Result<ReconcileReport, ReconcileError> {
        if document.is_empty() {
            return Err(ReconcileError::InputMissing("summary document"));
        }
        let lines = extract::extract_lines(document)?;
        Ok(self.run_lines(&lines, files))
    }

    /// 已抽取好文本行时的入口
    pub fn run_lines<S: AsRef<str>>(
        &self,
        lines: &[S],
        files: &BTreeMap<String, Vec<u8>>,
    ) -> ReconcileReport {
        let associations = self.resolver.resolve(lines);

        let distinct_ros: IndexSet<&str> =
            associations.iter().map(|a| a.ro_number.as_str()).collect();
        let distinct_invoices: IndexSet<&str> = associations
            .iter()
            .filter_map(|a| a.invoice_number.as_deref())
            .collect();
        tracing::info!(
            "开始处理: {} 条 RO 记录 ({} 个不同 RO, {} 张发票), {} 个文件",
            associations.len(),
            distinct_ros.len(),
            distinct_invoices.len(),
            files.len()
        );

        let outcomes: Vec<RoOutcome> = if self.parallel {
            associations
                .par_iter()
                .map(|a| self.process_ro(a, files))
                .collect()
        } else {
            associations
                .iter()
                .map(|a| self.process_ro(a, files))
                .collect()
        };

        let mut records = Vec::new();
        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            match outcome {
                RoOutcome::Records(mut r) => records.append(&mut r),
                RoOutcome::Skipped(d) => diagnostics.push(d),
            }
        }

        tracing::info!(
            "处理完成: 输出 {} 行, 警告 {} 条",
            records.len(),
            diagnostics.len()
        );

        ReconcileReport {
            match_mode: self.resolver.mode(),
            associations,
            records,
            diagnostics,
            generated_at: Utc::now(),
        }
    }

    fn process_ro(&self, association: &RoAssociation, files: &BTreeMap<String, Vec<u8>>) -> RoOutcome {
        let ro = &association.ro_number;

        let Some((file_name, bytes)) = self.find_file(ro, files) else {
            tracing::warn!("File not found for {}", ro);
            return RoOutcome::Skipped(Diagnostic {
                ro_number: ro.clone(),
                kind: DiagnosticKind::UnresolvedReference,
                message: format!("File not found for {}", ro),
            });
        };

        let items = match self.normalizer.normalize(bytes) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("{} ({}) 读取失败: {}", ro, file_name, e);
                return RoOutcome::Skipped(Diagnostic {
                    ro_number: ro.clone(),
                    kind: DiagnosticKind::SpreadsheetLoad,
                    message: format!("{}: {}", file_name, e),
                });
            }
        };

        let row_count = items.len();
        let groups = self.aggregator.aggregate(items);
        tracing::debug!("{} <- {}: {} 行, {} 个 SKU 分组", ro, file_name, row_count, groups.len());

        let records = groups
            .into_iter()
            .map(|group| EnrichedRecord {
                ro_number: ro.clone(),
                invoice_number: association.invoice_number.clone(),
                debit_note: association.debit_note.clone(),
                group,
            })
            .collect();

        RoOutcome::Records(records)
    }

    /// 按策略查找 RO 文件
    fn find_file<'a>(
        &self,
        ro: &str,
        files: &'a BTreeMap<String, Vec<u8>>,
    ) -> Option<(&'a str, &'a [u8])> {
        let found = match self.file_match {
            FileMatch::Contains => files
                .iter()
                .find(|(name, _)| name.ends_with(".xlsx") && name.contains(ro)),
            FileMatch::Exact => files.get_key_value(&format!("RO-{}.xlsx", ro)),
        };
        found.map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use rust_xlsxwriter::Workbook;

    fn ro_workbook(rows: &[(&str, f64, &str)]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("RO").unwrap();
        for (col, name) in ["PO Code", "Brand", "Reject Reason", "Unnamed"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        for (i, (po, value, reason)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, *po).unwrap();
            sheet.write_string(row, 1, "Acme").unwrap();
            sheet.write_number(row, 2, *value).unwrap();
            sheet.write_string(row, 3, *reason).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    fn pipeline(config: ReconcileConfig) -> ReconcilePipeline {
        ReconcilePipeline::new(&config).unwrap()
    }

    const LINES: [&str; 6] = [
        "Invoice Number",
        "BHR2-0001-AB:CD",
        "Remarks RO0000000001",
        "Invoice Number",
        "BHR2-0002-AB:CD",
        "Remarks RO0000000002",
    ];

    #[test]
    fn unresolved_ro_is_skipped_with_warning() {
        let mut files = BTreeMap::new();
        files.insert(
            "RO-RO0000000002.xlsx".to_string(),
            ro_workbook(&[("PO1", 118.0, "Damaged"), ("PO1", 236.0, "Damaged")]),
        );

        let report = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);

        assert_eq!(report.associations.len(), 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].ro_number, "RO0000000002");
        assert_eq!(report.records[0].invoice_number.as_deref(), Some("BHR2-0002-AB:CD"));
        assert_eq!(report.records[0].group.quantity, 2);
        assert_eq!(report.records[0].group.total_amount_with_tax, BigDecimal::from(354));

        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].ro_number, "RO0000000001");
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
    }

    #[test]
    fn unreadable_file_is_isolated() {
        let mut files = BTreeMap::new();
        files.insert("RO0000000001.xlsx".to_string(), b"broken".to_vec());
        files.insert("RO0000000002.xlsx".to_string(), ro_workbook(&[("PO9", 59.0, "Stain")]));

        let report = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::SpreadsheetLoad);
        assert!(report.diagnostics[0].message.starts_with("RO0000000001.xlsx"));
    }

    #[test]
    fn exact_strategy_ignores_partial_names() {
        let mut files = BTreeMap::new();
        files.insert("old_RO0000000001.xlsx".to_string(), ro_workbook(&[("PO1", 1.0, "x")]));
        files.insert("RO-RO0000000002.xlsx".to_string(), ro_workbook(&[("PO2", 2.0, "y")]));

        let contains = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);
        assert_eq!(contains.records.len(), 2);

        let exact = pipeline(ReconcileConfig {
            file_match: FileMatch::Exact,
            ..ReconcileConfig::default()
        })
        .run_lines(&LINES, &files);
        assert_eq!(exact.records.len(), 1);
        assert_eq!(exact.records[0].ro_number, "RO0000000002");
        assert_eq!(exact.diagnostics.len(), 1);
    }

    #[test]
    fn contains_strategy_skips_non_xlsx() {
        let mut files = BTreeMap::new();
        files.insert("RO0000000001.csv".to_string(), b"a,b".to_vec());

        let report = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);
        assert!(report.records.is_empty());
        assert_eq!(report.diagnostics.len(), 2);
    }

    #[test]
    fn empty_sheet_contributes_nothing() {
        let mut files = BTreeMap::new();
        files.insert("RO0000000001.xlsx".to_string(), ro_workbook(&[]));
        files.insert("RO0000000002.xlsx".to_string(), ro_workbook(&[("PO2", 2.0, "y")]));

        let report = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);
        assert_eq!(report.records.len(), 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn sheet_without_cells_contributes_nothing() {
        let mut empty = Workbook::new();
        empty.add_worksheet().set_name("RO").unwrap();

        let mut files = BTreeMap::new();
        files.insert("RO0000000001.xlsx".to_string(), empty.save_to_buffer().unwrap());
        files.insert("RO0000000002.xlsx".to_string(), ro_workbook(&[("PO2", 2.0, "y")]));

        let report = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].ro_number, "RO0000000002");
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn parallel_run_matches_serial_order() {
        let mut files = BTreeMap::new();
        files.insert(
            "RO0000000001.xlsx".to_string(),
            ro_workbook(&[("PO1", 1.0, "a"), ("PO3", 3.0, "c")]),
        );
        files.insert("RO0000000002.xlsx".to_string(), ro_workbook(&[("PO2", 2.0, "b")]));

        let serial = pipeline(ReconcileConfig::default()).run_lines(&LINES, &files);
        let parallel = pipeline(ReconcileConfig {
            parallel: true,
            ..ReconcileConfig::default()
        })
        .run_lines(&LINES, &files);

        assert_eq!(serial.records, parallel.records);
        assert_eq!(serial.records.len(), 3);
    }

    #[test]
    fn detailed_mode_carries_debit_note() {
        let lines = [
            "Debit Note Reference",
            "123456789",
            "Invoice Number",
            "INV/77",
            "Remarks RO0000000001",
        ];
        let mut files = BTreeMap::new();
        files.insert("RO0000000001.xlsx".to_string(), ro_workbook(&[("PO1", 1.18, "a")]));

        let report = pipeline(ReconcileConfig {
            match_mode: MatchMode::Detailed,
            ..ReconcileConfig::default()
        })
        .run_lines(&lines, &files);

        assert_eq!(report.match_mode, MatchMode::Detailed);
        assert_eq!(report.records[0].invoice_number.as_deref(), Some("INV/77"));
        assert_eq!(report.records[0].debit_note.as_deref(), Some("123456789"));
        assert_eq!(report.records[0].group.base_value, BigDecimal::from(1));
    }

    #[test]
    fn empty_document_is_input_missing() {
        let err = pipeline(ReconcileConfig::default())
            .run(&[], &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, ReconcileError::InputMissing(_)));
    }
}
