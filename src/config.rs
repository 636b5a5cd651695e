use crate::models::MatchMode;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 默认发票号格式: 字母数字段以 - / : 连接, 例如 BHR2-0001-AB:CD
pub const DEFAULT_INVOICE_PATTERN: &str = r"^[A-Z0-9]+(?:[-/:][A-Z0-9]+)+$";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 上传请求体上限 (字节)
    pub max_upload_bytes: usize,
}

/// RO 文件定位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMatch {
    /// 文件名包含 RO 号 (按文件名排序后取第一个)
    Contains,
    /// 文件名严格等于 `RO-{ro}.xlsx`
    Exact,
}

/// 对账流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub match_mode: MatchMode,
    pub file_match: FileMatch,
    /// 明细所在工作表
    pub sheet_name: String,
    /// 含税金额中的税率 (百分比)
    pub tax_rate_percent: u32,
    /// simple 模式下发票号校验正则 (忽略大小写)
    pub invoice_pattern: String,
    /// detailed 模式下向上查找 Debit Note 的行数
    pub debit_note_lookback: usize,
    /// 按 RO 并行处理 (输出顺序不变)
    pub parallel: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Simple,
            file_match: FileMatch::Contains,
            sheet_name: "RO".to_string(),
            tax_rate_percent: 18,
            invoice_pattern: DEFAULT_INVOICE_PATTERN.to_string(),
            debit_note_lookback: 5,
            parallel: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_upload_bytes: 64 * 1024 * 1024,
            },
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < recon.toml (可选) < 环境变量 RECON_*
    ///
    /// 嵌套字段用 `__` 分隔, 例如 `RECON_RECONCILE__MATCH_MODE=detailed`。
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("recon").required(false))
            .add_source(
                Environment::with_prefix("RECON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
