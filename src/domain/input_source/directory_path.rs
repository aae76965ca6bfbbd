use super::admission::{AdmissionError, Candidate};
use super::path_error::PathError;
use super::has_image_extension;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// 構造体としてDirectoryPathを定義
#[derive(Debug)]
pub struct DirectoryPath {
    pub path: PathBuf,
}

impl DirectoryPath {
    // コンストラクタ: パスを受け取り、バリデーションを行う
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let path = path.as_ref();

        // パスが存在し、かつディレクトリであることを検証
        if !path.exists() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' は存在しません。",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(PathError::InvalidPath(format!(
                "パス '{}' はディレクトリではありません。",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    // 内部のPathBufへの参照を返す
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// ディレクトリ直下の画像ファイルを、ファイル名順に返します。
    ///
    /// サブディレクトリは辿りません。拡張子で簡易的に絞り込み、形式の最終判定は受け入れ時に行う。
    pub fn image_files(&self) -> Result<Vec<PathBuf>, PathError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && has_image_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// 画像ファイルを読み込み、受け入れ候補に変換します。
    ///
    /// 個々のファイルの読み込み失敗はそのファイルだけの失敗として返し、全体は止めない。
    pub fn candidates(&self) -> Result<Vec<Result<Candidate, AdmissionError>>, PathError> {
        let candidates = self
            .image_files()?
            .into_iter()
            .map(|path| {
                let name = display_name(&path);
                fs::read(&path)
                    .map(|bytes| Candidate::new(name.clone(), bytes))
                    .map_err(|e| AdmissionError::Unreadable {
                        name,
                        reason: e.to_string(),
                    })
            })
            .collect();
        Ok(candidates)
    }
}

/// パスからファイル名部分を取り出す。取り出せなければパス全体を使う。
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// Displayトレイトの実装（表示用）
impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input_source::admission::test_images::png;
    use tempfile::tempdir;

    /// 正常なディレクトリパスでDirectoryPathが作成できるかテスト
    #[test]
    fn test_valid_directory_path() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path();

        let result = DirectoryPath::new(path);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_path(), path);
    }

    /// 存在しないパスでエラーが返されるかテスト
    #[test]
    fn test_non_existent_path_returns_error() {
        let path = PathBuf::from("this_directory_should_not_exist");
        let err = DirectoryPath::new(&path).unwrap_err();
        if let PathError::InvalidPath(msg) = err {
            assert!(msg.contains("存在しません"));
        } else {
            panic!("予期せぬエラーが返されました: {:?}", err);
        }
    }

    /// ファイルパスでエラーが返されるかテスト
    #[test]
    fn test_file_path_returns_error() {
        let file_path = PathBuf::from("Cargo.toml"); // 常に存在するファイル
        let err = DirectoryPath::new(&file_path).unwrap_err();
        if let PathError::InvalidPath(msg) = err {
            assert!(msg.contains("ディレクトリではありません"));
        } else {
            panic!("予期せぬエラーが返されました: {:?}", err);
        }
    }

    /// image_files()が画像だけをファイル名順に返すかテスト
    #[test]
    fn test_image_files_are_sorted_and_filtered() {
        let dir = tempdir().expect("Failed to create temp directory");
        fs::write(dir.path().join("b.PNG"), png(2, 2)).unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello world").unwrap();
        fs::write(dir.path().join(".hidden"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let dir_path = DirectoryPath::new(dir.path()).unwrap();
        let names: Vec<String> = dir_path
            .image_files()
            .unwrap()
            .iter()
            .map(|p| display_name(p))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    /// candidates()がファイル内容を読み込むかテスト
    #[test]
    fn test_candidates_read_file_contents() {
        let dir = tempdir().expect("Failed to create temp directory");
        let bytes = png(3, 3);
        fs::write(dir.path().join("only.png"), &bytes).unwrap();

        let dir_path = DirectoryPath::new(dir.path()).unwrap();
        let candidates = dir_path.candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].as_ref().unwrap(),
            &Candidate::new("only.png", bytes)
        );
    }

    /// 空のディレクトリでは候補が空になるかテスト
    #[test]
    fn test_empty_directory_has_no_candidates() {
        let empty_dir = tempdir().expect("Failed to create empty directory");
        let dir_path = DirectoryPath::new(empty_dir.path()).unwrap();
        assert!(dir_path.candidates().unwrap().is_empty());
    }

    /// 走査中のI/OエラーがPathError::IoErrorになるかテスト
    #[test]
    fn test_image_files_returns_io_error() {
        // new()のバリデーションをスキップして、存在しないパスを持つインスタンスを強制的に作成
        let dir_path = DirectoryPath {
            path: PathBuf::from("this_path_definitely_does_not_exist"),
        };
        let err = dir_path.image_files().unwrap_err();
        assert!(matches!(err, PathError::IoError(_)), "{:?}", err);
    }
}
