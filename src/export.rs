use crate::models::{EnrichedRecord, MatchMode, ReconcileReport};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_OUTPUT_NAME: &str = "ro_invoice_mapping_detailed.csv";

const SKU_HEADERS: [&str; 12] = [
    "PO Code",
    "Vendor Article Name",
    "Vendor Article Number",
    "GTIN",
    "Size",
    "Colour",
    "Brand",
    "Reject Reason",
    "Quantity",
    "Total_Amount_With_Tax",
    "Base_Value",
    "Tax_Value",
];

/// 输出列名, detailed 模式多一列 Debit Note Reference
pub fn headers(mode: MatchMode) -> Vec<&'static str> {
    let mut headers = vec!["RO Number", "Invoice Number"];
    if mode.has_debit_note() {
        headers.push("Debit Note Reference");
    }
    headers.extend(SKU_HEADERS);
    headers
}

fn record_fields(record: &EnrichedRecord, mode: MatchMode) -> Vec<String> {
    let group = &record.group;
    let mut fields = vec![
        record.ro_number.clone(),
        record.invoice_number.clone().unwrap_or_default(),
    ];
    if mode.has_debit_note() {
        fields.push(record.debit_note.clone().unwrap_or_default());
    }
    fields.extend(
        group
            .key
            .values()
            .iter()
            .map(|v| v.unwrap_or_default().to_string()),
    );
    fields.push(group.quantity.to_string());
    fields.push(group.total_amount_with_tax.to_string());
    fields.push(group.base_value.to_string());
    fields.push(group.tax_value.to_string());
    fields
}

/// 写出 CSV (含表头)
pub fn write_csv<W: Write>(report: &ReconcileReport, out: W) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(headers(report.match_mode))?;
    for record in &report.records {
        writer.write_record(record_fields(record, report.match_mode))?;
    }
    writer.flush()?;
    Ok(())
}

/// CSV 文本 (UTF-8)
pub fn to_csv_string(report: &ReconcileReport) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(report, &mut buf)?;
    // csv 写入的全部是 String 字段
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 导出到文件
pub fn export_to_csv(report: &ReconcileReport, output_path: &Path) -> Result<(), csv::Error> {
    let file = File::create(output_path)?;
    write_csv(report, file)
}
