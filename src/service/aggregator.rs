use crate::models::{ReturnLineItem, SkuGroup, SkuKey};
use bigdecimal::{BigDecimal, Zero};
use std::collections::BTreeMap;

/// 除法结果保留的有效数字位数 (decimal128 精度)
pub const DIVISION_PRECISION: u64 = 34;

/// SKU 分组汇总与含税金额拆分
#[derive(Debug, Clone)]
pub struct Aggregator {
    /// 1 + 税率
    divisor: BigDecimal,
}

impl Aggregator {
    pub fn new(tax_rate_percent: u32) -> Self {
        let divisor = BigDecimal::from(100 + u64::from(tax_rate_percent)) / BigDecimal::from(100);
        Self { divisor }
    }

    pub fn divisor(&self) -> &BigDecimal {
        &self.divisor
    }

    /// 按 8 个字段分组, 输出按分组键排序
    ///
    /// 数量为行数 (含金额缺失的行), 金额缺失按 0 计入合计。
    pub fn aggregate(&self, items: Vec<ReturnLineItem>) -> Vec<SkuGroup> {
        let mut groups: BTreeMap<SkuKey, (u64, BigDecimal)> = BTreeMap::new();

        for item in items {
            let entry = groups
                .entry(item.key)
                .or_insert_with(|| (0, BigDecimal::zero()));
            entry.0 += 1;
            if let Some(value) = item.item_value {
                entry.1 += value;
            }
        }

        groups
            .into_iter()
            .map(|(key, (quantity, total))| self.split(key, quantity, total))
            .collect()
    }

    /// 含税金额 -> 不含税金额 + 税额
    fn split(&self, key: SkuKey, quantity: u64, total: BigDecimal) -> SkuGroup {
        let base_value = (&total / &self.divisor)
            .with_prec(DIVISION_PRECISION)
            .normalized();
        let tax_value = &total - &base_value;
        SkuGroup {
            key,
            quantity,
            total_amount_with_tax: total,
            base_value,
            tax_value,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(18)
    }
}
