use crate::domain::assembly::AssemblyError;
use crate::domain::image_sequence::SequenceError;
use crate::domain::input_source::path_error::PathError;
use crate::domain::settings::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/Oエラーが発生しました: {0}")]
    Io(#[from] std::io::Error),

    #[error("パス関連のエラー: {0}")]
    Path(#[from] PathError),

    #[error("設定エラー: {0}")]
    Settings(#[from] SettingsError),

    #[error("並べ替えエラー: {0}")]
    Sequence(#[from] SequenceError),

    #[error("PDF生成エラー: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("ロガーを初期化できません: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("--clear で全画像を消去するには --yes で確認してください")]
    ClearNotConfirmed,
}
