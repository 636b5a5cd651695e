use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::models::{InvoiceAnchor, MatchMode, RoAssociation};
use regex::{Regex, RegexBuilder};

const INVOICE_MARKER: &str = "invoice number";
const DEBIT_NOTE_MARKER: &str = "debit note reference";
const REMARKS_MARKER: &str = "remarks";

/// 锚点识别策略
#[derive(Debug, Clone)]
pub struct MatchPolicy {
    pub mode: MatchMode,
    /// simple 模式的发票号格式
    pub invoice_pattern: Regex,
    pub debit_note_lookback: usize,
}

impl MatchPolicy {
    pub fn from_config(config: &ReconcileConfig) -> Result<Self, ReconcileError> {
        let invoice_pattern = RegexBuilder::new(&config.invoice_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ReconcileError::Config(format!("invoice_pattern: {}", e)))?;

        Ok(Self {
            mode: config.match_mode,
            invoice_pattern,
            debit_note_lookback: config.debit_note_lookback,
        })
    }
}

/// 文档行 -> RO/发票关联表
pub struct ReferenceResolver {
    policy: MatchPolicy,
    ro_pattern: Regex,
    digits_pattern: Regex,
}

impl ReferenceResolver {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            policy,
            ro_pattern: Regex::new(r"(?i)RO\d{10,}").expect("static regex"),
            digits_pattern: Regex::new(r"\d{6,}").expect("static regex"),
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.policy.mode
    }

    /// 扫描全部行, 识别发票锚点和 RO, 按位置关联
    pub fn resolve<S: AsRef<str>>(&self, lines: &[S]) -> Vec<RoAssociation> {
        let anchors = self.find_anchors(lines);
        let mut associations = Vec::new();

        for (position, line) in lines.iter().enumerate() {
            let Some(ro_number) = self.detect_ro(line.as_ref()) else {
                continue;
            };

            let anchor = nearest_preceding(&anchors, position);
            if anchor.is_none() {
                tracing::debug!("{} (第 {} 行) 之前没有发票锚点", ro_number, position);
            }

            associations.push(RoAssociation {
                position,
                ro_number,
                invoice_number: anchor.map(|a| a.invoice_number.clone()),
                debit_note: anchor.and_then(|a| a.debit_note.clone()),
            });
        }

        tracing::info!(
            "[{:?}] 识别到 {} 个发票锚点, {} 个 RO",
            self.policy.mode,
            anchors.len(),
            associations.len()
        );
        associations
    }

    /// 按位置升序返回所有发票锚点
    pub fn find_anchors<S: AsRef<str>>(&self, lines: &[S]) -> Vec<InvoiceAnchor> {
        let mut anchors = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(next) = lines.get(i + 1) else {
                continue;
            };
            let line = line.as_ref();
            let invoice_number = next.as_ref().trim();

            let anchor = match self.policy.mode {
                MatchMode::Simple => {
                    if line.trim().to_lowercase() != INVOICE_MARKER {
                        continue;
                    }
                    if !self.policy.invoice_pattern.is_match(invoice_number) {
                        tracing::debug!("第 {} 行发票号格式不符, 丢弃: {:?}", i + 1, invoice_number);
                        continue;
                    }
                    InvoiceAnchor {
                        position: i,
                        invoice_number: invoice_number.to_string(),
                        debit_note: None,
                    }
                }
                MatchMode::Detailed => {
                    if !line.to_lowercase().contains(INVOICE_MARKER) || invoice_number.is_empty() {
                        continue;
                    }
                    InvoiceAnchor {
                        position: i,
                        invoice_number: invoice_number.to_string(),
                        debit_note: self.find_debit_note(lines, i),
                    }
                }
            };

            anchors.push(anchor);
        }

        anchors
    }

    /// 从锚点向上查找 Debit Note Reference, 越近越优先
    fn find_debit_note<S: AsRef<str>>(&self, lines: &[S], anchor: usize) -> Option<String> {
        let start = anchor.saturating_sub(self.policy.debit_note_lookback);

        for j in (start..anchor).rev() {
            let line = lines[j].as_ref();
            if !line.to_lowercase().contains(DEBIT_NOTE_MARKER) {
                continue;
            }
            if let Some(m) = self.digits_pattern.find(line) {
                return Some(m.as_str().to_string());
            }
            if let Some(m) = lines.get(j + 1).and_then(|next| self.digits_pattern.find(next.as_ref())) {
                return Some(m.as_str().to_string());
            }
        }

        None
    }

    /// Remarks 行中的第一个 RO 号
    fn detect_ro(&self, line: &str) -> Option<String> {
        if !line.to_lowercase().contains(REMARKS_MARKER) || !line.contains("RO") {
            return None;
        }
        self.ro_pattern.find(line).map(|m| m.as_str().trim().to_string())
    }
}

/// 位置严格小于 position 的锚点中位置最大的一个
fn nearest_preceding(anchors: &[InvoiceAnchor], position: usize) -> Option<&InvoiceAnchor> {
    let idx = anchors.partition_point(|a| a.position < position);
    idx.checked_sub(1).map(|i| &anchors[i])
}
