//! 画像シーケンスから1つの PDF を組み立てる処理。
//!
//! 1回の実行は `Idle → Running → {Completed, Failed, Cancelled}` と遷移します。
//! 画像ごとに向きの決定・レイアウト計算・ページ追加・画像配置を行い、画像の間で
//! 一度スケジューラに制御を返します。どこかで失敗した時点で残りは処理せず、
//! 途中までの文書は書き出しません。

use crate::domain::image_sequence::ImageSequence;
use crate::domain::orientation::choose_page_orientation;
use crate::domain::page_layout::{page_geometry, LayoutError, PageGeometry};
use crate::domain::pdf_file::delivery::{generate_file_name, Delivery};
use crate::domain::pdf_file::sink::{DocumentSink, SinkError};
use crate::domain::settings::ConversionSettings;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

// 進捗の報告範囲 (%)。ページ追加は PROGRESS_OPEN〜PROGRESS_PAGES_END に収め、前後を初期化と書き出しに残す。
pub const PROGRESS_OPEN: f64 = 5.0;
pub const PROGRESS_PAGES_END: f64 = 90.0;
pub const PROGRESS_FINALIZE: f64 = 95.0;
pub const PROGRESS_DONE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblyState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("変換は既に実行中です")]
    AlreadyRunning,
    #[error("PDFを開始できません: {0}")]
    Open(#[source] SinkError),
    #[error("{}枚目の画像 '{name}' のページを計算できません: {source}", .index + 1)]
    Layout {
        index: usize,
        name: String,
        #[source]
        source: LayoutError,
    },
    #[error("{}枚目の画像 '{name}' の処理に失敗しました: {source}", .index + 1)]
    Sink {
        index: usize,
        name: String,
        #[source]
        source: SinkError,
    },
    #[error("PDFを完成できません: {0}")]
    Finalize(#[source] SinkError),
    #[error("PDFを保存できません: {0}")]
    Delivery(#[source] io::Error),
    #[error("変換はキャンセルされました ({completed}ページ処理済み)")]
    Cancelled { completed: usize },
}

/// 進捗通知1件分。
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub message: String,
}

impl Progress {
    fn new(percent: f64, message: impl Into<String>) -> Self {
        Self {
            percent,
            message: message.into(),
        }
    }
}

/// 実行中の変換を協調的に止めるためのフラグ。画像ごとの中断点で確認される。
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// 書き出しまで完了した文書の情報。
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub path: PathBuf,
    pub page_count: usize,
    pub byte_len: usize,
    pub pages: Vec<PageGeometry>,
}

/// `i` 枚目 (0 始まり) を処理し終えた時点の進捗率。
fn page_progress(index: usize, total: usize) -> f64 {
    let fraction = (index + 1) as f64 / total as f64;
    PROGRESS_OPEN + fraction * (PROGRESS_PAGES_END - PROGRESS_OPEN)
}

/// 実行の終わりに後始末をするガード。
///
/// 実行中に future が破棄された場合は状態を `Cancelled` へ落とす。どの終わり方でも
/// キャンセル要求はこの実行で消費し、次の実行には持ち越さない。
struct RunGuard<'a> {
    state: &'a mut AssemblyState,
    cancel: CancelFlag,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if *self.state == AssemblyState::Running {
            *self.state = AssemblyState::Cancelled;
        }
        self.cancel.reset();
    }
}

/// 変換の実行役。同じ `Assembler` で2つの変換が同時に走ることはない。
#[derive(Debug)]
pub struct Assembler {
    state: AssemblyState,
    cancel: CancelFlag,
    name_prefix: String,
}

impl Assembler {
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            state: AssemblyState::Idle,
            cancel: CancelFlag::default(),
            name_prefix: name_prefix.into(),
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// シーケンスを先頭から順に1画像1ページで PDF に変換し、`delivery` に渡します。
    ///
    /// シーケンスは開始時にスナップショットを取り、以後はそのコピーだけを使います。
    /// `settings` は値で受け取るので、実行中に呼び出し側が設定を変えても影響しません。
    ///
    /// # エラー
    /// 既に実行中なら `AlreadyRunning`。それ以外の失敗では残りの画像を処理せず、
    /// 何も書き出さずに状態を `Failed` (キャンセル時は `Cancelled`) にします。
    pub async fn assemble<S, D, F>(
        &mut self,
        sequence: &ImageSequence,
        settings: ConversionSettings,
        sink: &mut S,
        delivery: &mut D,
        mut on_progress: F,
    ) -> Result<AssembledDocument, AssemblyError>
    where
        S: DocumentSink,
        D: Delivery,
        F: FnMut(&Progress),
    {
        if self.state == AssemblyState::Running {
            return Err(AssemblyError::AlreadyRunning);
        }
        self.state = AssemblyState::Running;

        let cancel = self.cancel.clone();
        let file_name = generate_file_name(&self.name_prefix);
        let guard = RunGuard {
            state: &mut self.state,
            cancel: cancel.clone(),
        };

        let result = run(
            sequence,
            settings,
            sink,
            delivery,
            &mut on_progress,
            &cancel,
            &file_name,
        )
        .await;

        *guard.state = match &result {
            Ok(_) => AssemblyState::Completed,
            Err(AssemblyError::Cancelled { .. }) => AssemblyState::Cancelled,
            Err(_) => AssemblyState::Failed,
        };
        result
    }
}

async fn run<S, D, F>(
    sequence: &ImageSequence,
    settings: ConversionSettings,
    sink: &mut S,
    delivery: &mut D,
    on_progress: &mut F,
    cancel: &CancelFlag,
    file_name: &str,
) -> Result<AssembledDocument, AssemblyError>
where
    S: DocumentSink,
    D: Delivery,
    F: FnMut(&Progress),
{
    on_progress(&Progress::new(PROGRESS_OPEN, "PDFを初期化しています..."));
    if cancel.is_cancelled() {
        return Err(AssemblyError::Cancelled { completed: 0 });
    }

    let records = sequence.snapshot();
    let total = records.len();
    let title = file_name.trim_end_matches(".pdf");
    let mut doc = sink.open(title).map_err(AssemblyError::Open)?;

    let mut pages = Vec::with_capacity(total);
    for (index, record) in records.iter().enumerate() {
        let orientation =
            choose_page_orientation(record.width(), record.height(), settings.orientation_mode);
        let geometry = page_geometry(settings.paper, orientation, record.width(), record.height())
            .map_err(|source| AssemblyError::Layout {
                index,
                name: record.name().to_string(),
                source,
            })?;

        let sink_error = |source| AssemblyError::Sink {
            index,
            name: record.name().to_string(),
            source,
        };
        sink.add_page(&mut doc, geometry.page, orientation)
            .map_err(sink_error)?;
        sink.place_image(
            &mut doc,
            record.payload(),
            geometry.placement,
            settings.quality,
        )
        .map_err(sink_error)?;
        pages.push(geometry);

        log::debug!(
            "{} {} ({}x{}) -> {}ページ目 {}",
            record.id(),
            record.name(),
            record.width(),
            record.height(),
            index + 1,
            orientation
        );
        on_progress(&Progress::new(
            page_progress(index, total),
            format!("画像 {} / {} を追加しました", index + 1, total),
        ));

        // 長い変換の間も他の処理が進めるよう、画像ごとに制御を返す
        tokio::task::yield_now().await;
        if cancel.is_cancelled() {
            return Err(AssemblyError::Cancelled {
                completed: index + 1,
            });
        }
    }

    on_progress(&Progress::new(PROGRESS_FINALIZE, "PDFを書き出しています..."));
    let bytes = sink.finalize(doc).map_err(AssemblyError::Finalize)?;
    let path = delivery
        .deliver(file_name, &bytes)
        .map_err(AssemblyError::Delivery)?;

    on_progress(&Progress::new(PROGRESS_DONE, "変換が完了しました"));
    Ok(AssembledDocument {
        path,
        page_count: pages.len(),
        byte_len: bytes.len(),
        pages,
    })
}
