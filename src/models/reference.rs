use serde::{Deserialize, Serialize};

/// 发票锚点识别模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// 整行等于 "Invoice Number", 下一行须符合发票号格式
    #[default]
    Simple,
    /// 行内包含 "Invoice Number", 下一行直接作为发票号, 并向上查找 Debit Note
    Detailed,
}

impl MatchMode {
    /// 输出表是否包含 Debit Note Reference 列
    pub fn has_debit_note(&self) -> bool {
        matches!(self, MatchMode::Detailed)
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(MatchMode::Simple),
            "detailed" => Ok(MatchMode::Detailed),
            other => Err(format!("unknown match mode: {}", other)),
        }
    }
}

/// 发票锚点: 文档中某一行确立的发票号 (及 Debit Note)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAnchor {
    pub position: usize,
    pub invoice_number: String,
    pub debit_note: Option<String>,
}

/// RO 与发票的关联
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoAssociation {
    /// Remarks 行所在位置
    #[serde(skip)]
    pub position: usize,
    pub ro_number: String,
    pub invoice_number: Option<String>,
    pub debit_note: Option<String>,
}
