//! 用紙サイズと、画像をページ中央に収めるためのレイアウト計算。
//!
//! 座標はすべてポイント (1/72 インチ) 単位で、原点はページの左上です。
//! PDF の座標系 (左下原点) への変換はシンク側で行います。

use super::orientation::PageOrientation;
use thiserror::Error;

/// 全ページ共通の余白 (pt)。
pub const MARGIN_PT: f64 = 10.0;

/// 文書全体で使う物理的な用紙サイズ。向きだけがページごとに変わる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// (短辺, 長辺) をポイントで返します。
    pub fn dimensions_pt(self) -> (f64, f64) {
        match self {
            PaperSize::A3 => (841.89, 1190.55),
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::A5 => (419.53, 595.28),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
        }
    }

    /// 向きを適用したページサイズ。横向きでは短辺と長辺を入れ替える。
    pub fn page_size(self, orientation: PageOrientation) -> PageSize {
        let (short, long) = self.dimensions_pt();
        match orientation {
            PageOrientation::Portrait => PageSize {
                width_pt: short,
                height_pt: long,
            },
            PageOrientation::Landscape => PageSize {
                width_pt: long,
                height_pt: short,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f64,
    pub height_pt: f64,
}

/// ページ上に配置された画像の矩形 (左上原点)。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// 1枚の画像に対して算出されたページの幾何情報。画像ごとに毎回作り直す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page: PageSize,
    pub orientation: PageOrientation,
    pub placement: Rect,
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("余白に対してページが小さすぎます (印刷可能領域 {printable_width} x {printable_height} pt)")]
    PageTooSmall {
        printable_width: f64,
        printable_height: f64,
    },
}

/// 画像を縦横比を保ったまま印刷可能領域に収め、中央に配置した矩形を返します。
///
/// 倍率は幅・高さそれぞれの比率の小さい方を採用するため、どちらの軸にもはみ出しません。
/// 少なくとも一方の軸は印刷可能領域の境界にちょうど接します。
///
/// # エラー
/// 余白を引いた印刷可能領域のどちらかが 0 以下なら `LayoutError::PageTooSmall`。
pub fn layout_image_on_page(
    image_width: u32,
    image_height: u32,
    page_width: f64,
    page_height: f64,
    margin: f64,
) -> Result<Rect, LayoutError> {
    let printable_width = page_width - 2.0 * margin;
    let printable_height = page_height - 2.0 * margin;
    if printable_width <= 0.0 || printable_height <= 0.0 {
        return Err(LayoutError::PageTooSmall {
            printable_width,
            printable_height,
        });
    }

    let image_width = f64::from(image_width);
    let image_height = f64::from(image_height);

    let width_ratio = printable_width / image_width;
    let height_ratio = printable_height / image_height;
    let scale = width_ratio.min(height_ratio);

    let width = image_width * scale;
    let height = image_height * scale;

    Ok(Rect {
        x: margin + (printable_width - width) / 2.0,
        y: margin + (printable_height - height) / 2.0,
        width,
        height,
    })
}

/// 用紙・向き・画像寸法から1ページ分の幾何情報をまとめて求めます。
pub fn page_geometry(
    paper: PaperSize,
    orientation: PageOrientation,
    image_width: u32,
    image_height: u32,
) -> Result<PageGeometry, LayoutError> {
    let page = paper.page_size(orientation);
    let placement = layout_image_on_page(
        image_width,
        image_height,
        page.width_pt,
        page.height_pt,
        MARGIN_PT,
    )?;
    Ok(PageGeometry {
        page,
        orientation,
        placement,
    })
}
