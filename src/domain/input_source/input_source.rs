use super::admission::{AdmissionError, Candidate};
use super::directory_path::{display_name, DirectoryPath};
use super::path_error::PathError;
use super::zip_file_path::{is_zip_extension, ZipFilePath};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 入力ソースを表現する列挙型。
/// 単体の画像ファイル、画像を含むディレクトリ、ZIPファイルのいずれかを保持する。
#[derive(Debug)]
pub enum InputSource {
    ImageFile(PathBuf),
    Directory(DirectoryPath),
    ZipFile(ZipFilePath),
}

impl InputSource {
    /// パスの種類を判定して `InputSource` を作る。
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(InputSource::Directory(DirectoryPath::new(path)?));
        }
        if path.is_file() {
            if is_zip_extension(path) {
                return Ok(InputSource::ZipFile(ZipFilePath::new(path)?));
            }
            return Ok(InputSource::ImageFile(path.to_path_buf()));
        }
        Err(PathError::InvalidPath(format!(
            "パス '{}' は存在しません。",
            path.display()
        )))
    }

    /// ソースに含まれる画像を、入力順の受け入れ候補として読み込む。
    ///
    /// 単体ファイルは拡張子で絞り込まず、そのまま受け入れ判定に回す。
    pub fn candidates(&self) -> Result<Vec<Result<Candidate, AdmissionError>>, PathError> {
        match self {
            InputSource::ImageFile(path) => {
                let name = display_name(path);
                let candidate = fs::read(path)
                    .map(|bytes| Candidate::new(name.clone(), bytes))
                    .map_err(|e| AdmissionError::Unreadable {
                        name,
                        reason: e.to_string(),
                    });
                Ok(vec![candidate])
            }
            InputSource::Directory(dir) => dir.candidates(),
            InputSource::ZipFile(zip) => zip.candidates(),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::ImageFile(path) => write!(f, "ファイル {}", path.display()),
            InputSource::Directory(dir) => write!(f, "ディレクトリ {}", dir),
            InputSource::ZipFile(zip) => write!(f, "ZIP {}", zip),
        }
    }
}
