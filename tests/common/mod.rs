#![allow(dead_code)]

use lopdf::dictionary;
use lopdf::{Document, Object, Stream};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// 一行 RO 明细: (PO Code, GTIN, Size, Item Value, 退货原因)
pub struct Row<'a> {
    pub po: &'a str,
    pub gtin: &'a str,
    pub size: &'a str,
    pub value: Option<&'a str>,
    pub reason: &'a str,
}

pub fn row<'a>(po: &'a str, gtin: &'a str, size: &'a str, value: Option<&'a str>, reason: &'a str) -> Row<'a> {
    Row { po, gtin, size, value, reason }
}

/// 按真实导出格式生成 RO 工作簿: 金额在 "Reject Reason" 列, 原因在其后的无名列
pub fn ro_workbook(rows: &[Row]) -> Vec<u8> {
    let headers = [
        "PO Code",
        "Vendor Article Name",
        "Vendor Article Number",
        "GTIN",
        "Size",
        "Colour",
        "Brand",
        "Reject Reason",
        "",
    ];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("RO").unwrap();
    for (col, name) in headers.iter().enumerate() {
        if !name.is_empty() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
    }

    for (i, r) in rows.iter().enumerate() {
        let line = i as u32 + 1;
        sheet.write_string(line, 0, r.po).unwrap();
        sheet.write_string(line, 1, "Slim Fit Tee").unwrap();
        sheet.write_string(line, 2, "VA-100").unwrap();
        sheet.write_string(line, 3, r.gtin).unwrap();
        sheet.write_string(line, 4, r.size).unwrap();
        sheet.write_string(line, 5, "Navy").unwrap();
        sheet.write_string(line, 6, "Roadster").unwrap();
        if let Some(v) = r.value {
            match v.parse::<f64>() {
                Ok(n) => sheet.write_number(line, 7, n).unwrap(),
                Err(_) => sheet.write_string(line, 7, v).unwrap(),
            };
        }
        sheet.write_string(line, 8, r.reason).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

pub fn make_zip(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn file_map(entries: Vec<(&str, Vec<u8>)>) -> BTreeMap<String, Vec<u8>> {
    entries
        .into_iter()
        .map(|(name, bytes)| (name.to_string(), bytes))
        .collect()
}

/// 生成带文本层的多页 PDF
pub fn make_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut content = String::from("BT /F1 12 Tf 72 720 Td ");
        for line in lines.iter() {
            content.push_str(&format!("({}) Tj 0 -40 Td ", line));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
