//! 文書を書き出す側 (シンク) との境界。
//!
//! 組み立て処理はこのトレイト越しにページ追加と画像配置を指示するだけで、
//! シンクから何かを読み戻すことはありません。

use crate::domain::image_record::EncodedImage;
use crate::domain::orientation::PageOrientation;
use crate::domain::page_layout::{PageSize, Rect};
use crate::domain::settings::Quality;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    #[error("ページを追加できません: {0}")]
    Page(String),
    #[error("画像を配置できません: {0}")]
    Placement(String),
    #[error("PDFの書き出しに失敗しました: {0}")]
    Finalize(String),
}

pub trait DocumentSink {
    /// 構築中の文書。`finalize` で消費される。
    type Handle;

    /// 新しい文書を開く。返される文書はページを1枚も持たない。
    fn open(&mut self, title: &str) -> Result<Self::Handle, SinkError>;

    /// 指定サイズ・向きのページを末尾に追加する。以後の配置はこのページに対して行われる。
    fn add_page(
        &mut self,
        doc: &mut Self::Handle,
        size: PageSize,
        orientation: PageOrientation,
    ) -> Result<(), SinkError>;

    /// 最後に追加したページに画像を配置する。`rect` は左上原点のポイント座標。
    fn place_image(
        &mut self,
        doc: &mut Self::Handle,
        image: &EncodedImage,
        rect: Rect,
        quality: Quality,
    ) -> Result<(), SinkError>;

    /// 文書を完成させ、PDF のバイト列を返す。
    fn finalize(&mut self, doc: Self::Handle) -> Result<Vec<u8>, SinkError>;
}
