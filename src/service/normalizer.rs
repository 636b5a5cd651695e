use crate::error::SpreadsheetLoadError;
use crate::models::sku::{ITEM_VALUE, REJECT_REASON};
use crate::models::{ReturnLineItem, SkuKey, SKU_KEY_COLUMNS};
use bigdecimal::BigDecimal;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;
use std::str::FromStr;

/// 工作表原始内容: 首行为列名
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl SheetTable {
    /// 列名第一次出现的位置
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 修复列错位: "Reject Reason" 列实际是金额, 其后一列才是退货原因
    ///
    /// 返回是否发生了修复。
    pub fn repair_columns(&mut self) -> bool {
        let Some(idx) = self.column_index(REJECT_REASON) else {
            return false;
        };

        self.columns[idx] = ITEM_VALUE.to_string();
        if let Some(next) = self.columns.get_mut(idx + 1) {
            *next = REJECT_REASON.to_string();
        }
        true
    }
}

/// RO 明细表读取与规范化
pub struct SpreadsheetNormalizer {
    sheet_name: String,
}

impl SpreadsheetNormalizer {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// 读取 xlsx 并返回规范化后的明细行
    pub fn normalize(&self, bytes: &[u8]) -> Result<Vec<ReturnLineItem>, SpreadsheetLoadError> {
        let table = self.load_table(bytes)?;
        normalize_table(table)
    }

    /// 读取目标工作表
    pub fn load_table(&self, bytes: &[u8]) -> Result<SheetTable, SpreadsheetLoadError> {
        let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
            .map_err(|e| SpreadsheetLoadError::Open(e.to_string()))?;

        if !workbook.sheet_names().iter().any(|n| n == &self.sheet_name) {
            return Err(SpreadsheetLoadError::SheetNotFound(self.sheet_name.clone()));
        }

        let range = workbook
            .worksheet_range(&self.sheet_name)
            .map_err(|e| SpreadsheetLoadError::Open(e.to_string()))?;

        let mut rows = range.rows();
        let columns = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(idx, cell)| cell_text(cell).unwrap_or_else(|| format!("Unnamed: {}", idx)))
                .collect(),
            None => Vec::new(),
        };

        let rows = rows
            .filter(|row| !row.iter().all(is_blank))
            .map(|row| row.to_vec())
            .collect();

        Ok(SheetTable { columns, rows })
    }
}

/// 列修复 + 金额转换 + 分组键抽取
pub fn normalize_table(mut table: SheetTable) -> Result<Vec<ReturnLineItem>, SpreadsheetLoadError> {
    // 空工作表: 没有表头也没有数据
    if table.columns.is_empty() {
        return Ok(Vec::new());
    }

    if table.repair_columns() {
        tracing::debug!("已修复列错位: {:?}", table.columns);
    }

    let value_idx = table
        .column_index(ITEM_VALUE)
        .ok_or_else(|| SpreadsheetLoadError::MissingColumn(ITEM_VALUE.to_string()))?;

    // 缺失的分组列按空值处理
    let key_idx: Vec<Option<usize>> = SKU_KEY_COLUMNS
        .iter()
        .map(|name| table.column_index(name))
        .collect();

    let items = table
        .rows
        .iter()
        .map(|row| {
            let values: [Option<String>; 8] = std::array::from_fn(|k| {
                key_idx[k].and_then(|idx| row.get(idx)).and_then(cell_text)
            });
            ReturnLineItem {
                key: SkuKey::from_values(values),
                item_value: row.get(value_idx).and_then(coerce_decimal),
            }
        })
        .collect();

    Ok(items)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

/// 单元格 -> 分组键文本, 空值返回 None
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        other => Some(other.to_string()),
    }
}

/// 单元格 -> 金额, 无法解析时返回 None
pub fn coerce_decimal(cell: &Data) -> Option<BigDecimal> {
    match cell {
        Data::Int(i) => Some(BigDecimal::from(*i)),
        Data::Float(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
        Data::Bool(b) => Some(BigDecimal::from(u8::from(*b))),
        Data::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
