use super::admission::{AdmissionError, Candidate};
use super::has_image_extension;
use super::path_error::PathError;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// ZIPファイルへのパスを表現し、その妥当性を保証する構造体。
#[derive(Debug)]
pub struct ZipFilePath(PathBuf);

impl ZipFilePath {
    // --- Public Methods ---

    /// 新しい `ZipFilePath` インスタンスを生成する。
    ///
    /// パスが存在し、ファイルであり、かつ拡張子が `.zip` であることを検証する。
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はファイルではありません。",
                path.display()
            )));
        }
        if !is_zip_extension(path) {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は.zipファイルではありません。",
                path.display()
            )));
        }
        Ok(Self(path.to_path_buf()))
    }

    /// アーカイブ内の画像エントリ名を名前順で返す。
    pub fn image_entry_names(&self) -> Result<Vec<String>, PathError> {
        let archive = self.open_archive()?;
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/') && has_image_extension(Path::new(name)))
            .map(|name| name.to_string())
            .collect();
        // ファイル名の順序を安定させるため、エントリ名をソートする。
        names.sort();
        Ok(names)
    }

    /// 画像エントリをすべて読み込み、受け入れ候補に変換する。
    ///
    /// 壊れたエントリはそのエントリだけの失敗になる。
    pub fn candidates(&self) -> Result<Vec<Result<Candidate, AdmissionError>>, PathError> {
        let names = self.image_entry_names()?;
        let mut archive = self.open_archive()?;
        let archive_name = self
            .0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let candidates = names
            .into_iter()
            .map(|name| {
                let display = format!("{}:{}", archive_name, name);
                Self::find_entry_in_archive(&mut archive, &name)
                    .and_then(|mut entry| Self::read_entry_content(&mut entry))
                    .map(|bytes| Candidate::new(display.clone(), bytes))
                    .map_err(|e| AdmissionError::Unreadable {
                        name: display,
                        reason: e.to_string(),
                    })
            })
            .collect();
        Ok(candidates)
    }

    // --- Private Helper Methods ---

    /// ZIPファイルを開き、ZipArchiveを生成する。
    fn open_archive(&self) -> Result<ZipArchive<std::fs::File>, PathError> {
        let file = std::fs::File::open(&self.0)
            .map_err(|e| PathError::InvalidPath(format!("ZIPファイルを開けません: {}", e)))?;
        ZipArchive::new(file)
            .map_err(|e| PathError::InvalidPath(format!("無効なZIPファイル: {}", e)))
    }

    /// アーカイブから指定されたエントリを見つける。
    fn find_entry_in_archive<'a>(
        archive: &'a mut ZipArchive<std::fs::File>,
        name: &str,
    ) -> Result<zip::read::ZipFile<'a>, PathError> {
        archive
            .by_name(name)
            .map_err(|e| PathError::InvalidPath(format!("エントリ '{}' を開けません: {}", name, e)))
    }

    /// エントリの内容を読み込む。
    ///
    /// ヘッダーに書かれた展開後サイズは信用せず、実際に読めた分だけ確保する。
    fn read_entry_content(entry: &mut zip::read::ZipFile) -> Result<Vec<u8>, PathError> {
        let mut buffer = Vec::new();
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| PathError::InvalidPath(format!("エントリの読み取りに失敗: {}", e)))?;
        Ok(buffer)
    }
}

/// 拡張子が `.zip` (大文字小文字を問わない) かどうか。
pub(crate) fn is_zip_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

// Displayトレイトの実装（表示用）
impl fmt::Display for ZipFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
