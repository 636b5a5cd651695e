use crate::error::ReconcileError;

/// 将 PDF 按页抽取为文本行, 页内自上而下, 页间按页码顺序
///
/// 不做过滤和去重, 空行保留 (行号即位置)。
pub fn extract_lines(document: &[u8]) -> Result<Vec<String>, ReconcileError> {
    let pages = guarded(|| pdf_extract::extract_text_from_mem_by_pages(document))?;

    let lines = lines_from_pages(&pages);
    tracing::info!("PDF 抽取完成: {} 页, {} 行", pages.len(), lines.len());
    Ok(lines)
}

/// 执行按页抽取, 库报错或 panic 均视为文档解析失败
///
/// pdf_extract 对畸形 PDF 可能 panic。
fn guarded<F, E>(extract: F) -> Result<Vec<String>, ReconcileError>
where
    F: FnOnce() -> Result<Vec<String>, E>,
    E: std::fmt::Display,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(extract)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ReconcileError::DocumentParse(e.to_string())),
        Err(_) => Err(ReconcileError::DocumentParse(
            "PDF extraction panicked (malformed PDF)".to_string(),
        )),
    }
}

/// 各页文本按换行拆分后顺序拼接
pub fn lines_from_pages<S: AsRef<str>>(pages: &[S]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|page| page.as_ref().split('\n'))
        .map(str::to_string)
        .collect()
}
