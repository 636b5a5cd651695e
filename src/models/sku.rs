use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

pub const PO_CODE: &str = "PO Code";
pub const VENDOR_ARTICLE_NAME: &str = "Vendor Article Name";
pub const VENDOR_ARTICLE_NUMBER: &str = "Vendor Article Number";
pub const GTIN: &str = "GTIN";
pub const SIZE: &str = "Size";
pub const COLOUR: &str = "Colour";
pub const BRAND: &str = "Brand";
pub const REJECT_REASON: &str = "Reject Reason";
pub const ITEM_VALUE: &str = "Item Value";

/// 分组键的列名 (顺序即输出顺序)
pub const SKU_KEY_COLUMNS: [&str; 8] = [
    PO_CODE,
    VENDOR_ARTICLE_NAME,
    VENDOR_ARTICLE_NUMBER,
    GTIN,
    SIZE,
    COLOUR,
    BRAND,
    REJECT_REASON,
];

/// SKU 分组键, 缺失值 (None) 同样参与分组
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkuKey {
    pub po_code: Option<String>,
    pub vendor_article_name: Option<String>,
    pub vendor_article_number: Option<String>,
    pub gtin: Option<String>,
    pub size: Option<String>,
    pub colour: Option<String>,
    pub brand: Option<String>,
    pub reject_reason: Option<String>,
}

impl SkuKey {
    /// 按 SKU_KEY_COLUMNS 顺序构建
    pub fn from_values(values: [Option<String>; 8]) -> Self {
        let [po_code, vendor_article_name, vendor_article_number, gtin, size, colour, brand, reject_reason] =
            values;
        Self {
            po_code,
            vendor_article_name,
            vendor_article_number,
            gtin,
            size,
            colour,
            brand,
            reject_reason,
        }
    }

    /// 按 SKU_KEY_COLUMNS 顺序输出
    pub fn values(&self) -> [Option<&str>; 8] {
        [
            self.po_code.as_deref(),
            self.vendor_article_name.as_deref(),
            self.vendor_article_number.as_deref(),
            self.gtin.as_deref(),
            self.size.as_deref(),
            self.colour.as_deref(),
            self.brand.as_deref(),
            self.reject_reason.as_deref(),
        ]
    }
}

/// 规范化后的退货明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnLineItem {
    pub key: SkuKey,
    /// 含税金额, 无法转换为数值时为 None
    pub item_value: Option<BigDecimal>,
}

/// SKU 汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuGroup {
    pub key: SkuKey,
    pub quantity: u64,
    pub total_amount_with_tax: BigDecimal,
    pub base_value: BigDecimal,
    pub tax_value: BigDecimal,
}
