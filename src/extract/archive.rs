use crate::error::ReconcileError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

/// 单次运行的压缩包解压目录, drop 时删除
pub struct ArchiveWorkspace {
    dir: TempDir,
}

impl ArchiveWorkspace {
    /// 将 zip 解压到新的临时目录
    pub fn extract(archive: &[u8]) -> Result<Self, ReconcileError> {
        let dir = tempfile::Builder::new().prefix("ro-recon-").tempdir()?;

        let mut zip = ZipArchive::new(Cursor::new(archive))
            .map_err(|e| ReconcileError::Archive(e.to_string()))?;
        zip.extract(dir.path())
            .map_err(|e| ReconcileError::Archive(e.to_string()))?;

        tracing::debug!("压缩包已解压到 {} ({} 个条目)", dir.path().display(), zip.len());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 读取所有 .xlsx 文件, 以文件名为键
    ///
    /// 子目录中的文件同样收集; 文件名重复时保留路径排序靠前的一个。
    /// macOS 打包产生的 `__MACOSX` 目录和 `._` 前缀文件会被忽略。
    pub fn load_spreadsheets(&self) -> Result<BTreeMap<String, Vec<u8>>, ReconcileError> {
        let mut paths = Vec::new();
        collect_xlsx(self.dir.path(), &mut paths)?;
        paths.sort();

        let mut files = BTreeMap::new();
        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if files.contains_key(name) {
                tracing::warn!("压缩包中存在重名文件 {}, 忽略 {}", name, path.display());
                continue;
            }
            let bytes = fs::read(&path)?;
            files.insert(name.to_string(), bytes);
        }

        tracing::info!("压缩包中共 {} 个 xlsx 文件", files.len());
        Ok(files)
    }
}

fn collect_xlsx(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ReconcileError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type()?.is_dir() {
            if name != "__MACOSX" {
                collect_xlsx(&path, out)?;
            }
            continue;
        }

        if name.ends_with(".xlsx") && !name.starts_with("._") {
            out.push(path);
        }
    }
    Ok(())
}
