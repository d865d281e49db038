use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::presenter::ResultView;

/// 把 AI 原始返回写入 `dir/<download_name>`，目录不存在时自动创建
pub fn save_result(dir: &Path, view: &ResultView) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
    let path = dir.join(&view.download_name);
    fs::write(&path, &view.raw_response)
        .with_context(|| format!("写入结果文件失败: {}", path.display()))?;
    info!("💾 结果已保存: {}", path.display());
    Ok(path)
}
