use thiserror::Error;

/// 致命错误: 整个运行中止, 不产生部分结果
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("required input missing: {0}")]
    InputMissing(&'static str),

    #[error("document parse failed: {0}")]
    DocumentParse(String),

    #[error("archive extraction failed: {0}")]
    Archive(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 单个 RO 文件的加载错误, 只影响该 RO
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetLoadError {
    #[error("workbook unreadable: {0}")]
    Open(String),

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),
}
