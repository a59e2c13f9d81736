//! 打包服务
//!
//! 运行结束后把输出目录整体压缩成一个 zip

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, FileError};

#[async_trait]
pub trait BundleArchiver: Send + Sync {
    /// 把 `source` 目录压缩到 `dest`，返回写入的文件数
    async fn archive_folder(&self, source: &Path, dest: &Path) -> Result<usize>;
}

/// zip 打包实现
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

#[async_trait]
impl BundleArchiver for ZipArchiver {
    async fn archive_folder(&self, source: &Path, dest: &Path) -> Result<usize> {
        let source = source.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || archive_folder(&source, &dest))
            .await
            .context("打包任务异常退出")?
    }
}

/// 压缩目录
///
/// 先写入 `{dest}.part`，完成后再改名，失败时不会留下不完整的压缩包。
/// 压缩包位于 `source` 内部时会跳过自身。
pub fn archive_folder(source: &Path, dest: &Path) -> Result<usize> {
    if !source.is_dir() {
        return Err(AppError::File(FileError::NotFound {
            path: source.display().to_string(),
        })
        .into());
    }

    let part_path = part_path(dest);
    let file = File::create(&part_path)
        .with_context(|| format!("无法创建压缩包: {}", part_path.display()))?;

    let written = match write_entries(source, file, &[&part_path, dest]) {
        Ok(count) => count,
        Err(e) => {
            let _ = fs::remove_file(&part_path);
            return Err(e);
        }
    };

    fs::rename(&part_path, dest)
        .with_context(|| format!("无法写入压缩包: {}", dest.display()))?;
    info!("📦 已打包 {} 个文件 -> {}", written, dest.display());
    Ok(written)
}

fn write_entries(source: &Path, file: File, skip: &[&Path]) -> Result<usize> {
    let skip: Vec<PathBuf> = skip.iter().filter_map(|p| fs::canonicalize(p).ok()).collect();
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(file);
    let mut written = 0;

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if let Ok(canonical) = fs::canonicalize(path) {
            if skip.contains(&canonical) {
                continue;
            }
        }

        let name = path
            .strip_prefix(source)?
            .to_string_lossy()
            .replace('\\', "/");
        zip.start_file(name.as_str(), options)?;
        let mut input =
            File::open(path).with_context(|| format!("无法读取文件: {}", path.display()))?;
        io::copy(&mut input, &mut zip)?;
        debug!("已加入压缩包: {}", name);
        written += 1;
    }

    zip.finish()?;
    Ok(written)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn archives_every_file_with_relative_names() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output");
        fs::create_dir_all(output.join("nested")).unwrap();
        fs::write(output.join("1.pdf"), b"pdf").unwrap();
        fs::write(output.join("1.png"), b"png").unwrap();
        fs::write(output.join("nested").join("note.txt"), b"hello").unwrap();
        let dest = dir.path().join("merged.zip");

        let count = archive_folder(&output, &dest).unwrap();

        assert_eq!(count, 3);
        assert_eq!(entry_names(&dest), vec!["1.pdf", "1.png", "nested/note.txt"]);
        assert!(!part_path(&dest).exists());

        let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut content = String::new();
        archive
            .by_name("nested/note.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn archive_inside_source_skips_itself() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2.pdf"), b"pdf").unwrap();
        let dest = dir.path().join("merged.zip");

        let count = archive_folder(dir.path(), &dest).unwrap();

        assert_eq!(count, 1);
        assert_eq!(entry_names(&dest), vec!["2.pdf"]);
    }

    #[test]
    fn missing_source_is_an_error_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("merged.zip");

        let err = archive_folder(&dir.path().join("missing"), &dest).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::File(FileError::NotFound { .. }))
        ));
        assert!(!dest.exists());
    }
}
