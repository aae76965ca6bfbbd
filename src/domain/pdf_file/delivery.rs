//! 完成した PDF をユーザーに届ける処理。

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

/// 実行ごとに一意になる出力ファイル名を作る (例: `document_1718000000000.pdf`)。
pub fn generate_file_name(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}_{}.pdf", prefix, millis)
}

pub trait Delivery {
    /// バイト列を `file_name` として届け、最終的な保存先を返す。
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// 出力ディレクトリへ書き出す `Delivery`。
///
/// 一時ファイルに書いてから名前を付けるので、書き込みに失敗しても
/// 途中までのファイルが見えることはない。同名ファイルがあれば `_1`, `_2`, ... を付ける。
#[derive(Debug)]
pub struct DirectoryDelivery {
    output_dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn persist(&self, mut temp: NamedTempFile, file_name: &str) -> io::Result<PathBuf> {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());

        let mut suffix = 0u32;
        loop {
            let candidate = if suffix == 0 {
                self.output_dir.join(file_name)
            } else {
                self.output_dir.join(format!("{}_{}.pdf", stem, suffix))
            };
            // persist_noclobber は既存ファイルを上書きしない
            match temp.persist_noclobber(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    temp = e.file;
                    suffix += 1;
                }
                Err(e) => return Err(e.error),
            }
        }
    }
}

impl Delivery for DirectoryDelivery {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut temp = NamedTempFile::new_in(&self.output_dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;
        self.persist(temp, file_name)
    }
}
