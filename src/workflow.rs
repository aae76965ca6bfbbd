//! アプリケーションのメインワークフローを定義するモジュール。
//!
//! このモジュールは、UI層（`cli`）とドメイン層（`domain`）を仲介し、
//! 読み込み → 並べ替え → PDF変換 → 保存 の処理フローを実装します。

use crate::cli::Args;
use image_pdf_assembler::domain::assembly::{Assembler, CancelFlag};
use image_pdf_assembler::domain::image_record::ImageId;
use image_pdf_assembler::domain::image_sequence::ImageSequence;
use image_pdf_assembler::domain::input_source::admission::{admit_all, MAX_IMAGES};
use image_pdf_assembler::domain::input_source::directory_path::DirectoryPath;
use image_pdf_assembler::domain::input_source::input_source::InputSource;
use image_pdf_assembler::domain::pdf_file::{DirectoryDelivery, LopdfSink};
use image_pdf_assembler::domain::settings::{ConversionSettings, Quality};
use image_pdf_assembler::error::AppError;
use std::fs;
use std::path::{Path, PathBuf};

// --- public な main 関数 ---

/// アプリケーションのメインロジックを実行します。
///
/// # 戻り値
/// * `Ok(())`: PDFが保存された場合。画像が1枚もなくても 0 ページの PDF を保存する。
/// * `Err(AppError)`: 設定の不備、並べ替えの失敗、変換の失敗・キャンセルの場合。
pub async fn run(args: Args) -> Result<(), AppError> {
    // 1. 設定の検証 (画像を読み込む前に弾く)
    let settings = settings_from(&args)?;
    if args.clear && !args.yes {
        return Err(AppError::ClearNotConfirmed);
    }

    let output_dir = prepare_output_dir(args.output_dir.as_deref())?;

    // 2. 入力の読み込み
    let mut sequence = load_sequence(&args.inputs);

    // 3. 変換前の編集
    apply_edits(&mut sequence, &args)?;
    for (position, record) in sequence.iter().enumerate() {
        log::debug!("{:>2}. {} {}", position + 1, record.id(), record.name());
    }

    // 4. 変換と保存
    let mut assembler = Assembler::new(args.name_prefix.as_str());
    watch_ctrl_c(assembler.cancel_flag());

    log::info!(
        "{} 枚の画像を変換します (品質 {}, 向き {}, 用紙 {:?})",
        sequence.len(),
        settings.quality,
        settings.orientation_mode,
        settings.paper
    );
    let document = assembler
        .assemble(
            &sequence,
            settings,
            &mut LopdfSink,
            &mut DirectoryDelivery::new(output_dir.as_path()),
            |progress| log::info!("[{:>3.0}%] {}", progress.percent, progress.message),
        )
        .await?;

    log::info!(
        "完了: {} ページの PDF を保存しました: {} ({} バイト)",
        document.page_count,
        document.path.display(),
        document.byte_len
    );
    Ok(())
}

// --- private なヘルパー関数 ---

fn settings_from(args: &Args) -> Result<ConversionSettings, AppError> {
    Ok(ConversionSettings {
        quality: Quality::new(args.quality)?,
        orientation_mode: args.orientation.into(),
        paper: args.paper.into(),
    })
}

/// 出力先ディレクトリを決め、なければ作成します。
///
/// 指定がなければカレントディレクトリ。既存のパスがディレクトリでなければエラー。
fn prepare_output_dir(output_dir: Option<&Path>) -> Result<DirectoryPath, AppError> {
    let output_dir = output_dir.unwrap_or_else(|| Path::new("."));
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    }
    Ok(DirectoryPath::new(output_dir)?)
}

/// 入力を指定順に読み込み、受け入れた画像をシーケンスに追加します。
///
/// 読み込めない入力や受け入れられない画像は警告を出して読み飛ばし、他の入力の処理は続ける。
fn load_sequence(inputs: &[PathBuf]) -> ImageSequence {
    let mut sequence = ImageSequence::new();
    for input in inputs {
        let candidates = match InputSource::new(input).and_then(|source| {
            log::debug!("[読み込み] {}", source);
            source.candidates()
        }) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("[警告] '{}' を読み込めません: {}", input.display(), e);
                continue;
            }
        };

        let remaining = MAX_IMAGES.saturating_sub(sequence.len());
        let report = admit_all(candidates, remaining);
        for image in report.admitted {
            let name = image.name().to_string();
            let id = sequence.push(image);
            log::info!("追加: {} {}", id, name);
        }
        for rejected in report.rejected {
            log::warn!("[警告] {}", rejected);
        }
    }
    sequence
}

/// `--remove`、`--move`、`--clear` の順に編集を適用します。
fn apply_edits(sequence: &mut ImageSequence, args: &Args) -> Result<(), AppError> {
    for id in &args.removals {
        let removed = sequence.remove(ImageId(*id))?;
        log::info!("削除: {} {}", removed.id(), removed.name());
    }
    for step in &args.moves {
        sequence.move_item(step.from, step.to)?;
        log::debug!("移動: {} → {}", step.from + 1, step.to + 1);
    }
    if args.clear {
        if !args.yes {
            return Err(AppError::ClearNotConfirmed);
        }
        let cleared = sequence.clear();
        log::info!("{} 枚の画像を消去しました", cleared);
    }
    Ok(())
}

/// Ctrl-C で実行中の変換にキャンセルを要求する。
fn watch_ctrl_c(flag: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("キャンセルを要求しました。現在の画像の処理後に停止します");
            flag.cancel();
        }
    });
}
