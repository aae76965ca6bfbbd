//! ページの向きを決定するポリシー。

use std::fmt;

/// ユーザーが選択する向きのモード。
///
/// `Auto` は画像ごとに縦横比から判定し、`Portrait` / `Landscape` は全ページを強制する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationMode {
    #[default]
    Auto,
    Portrait,
    Landscape,
}

/// 1ページに実際に適用される向き。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// 画像の寸法とモードから、そのページの向きを決定します。
///
/// `Auto` の場合、幅が高さより大きい画像だけが横向きになります。
/// 正方形の画像は縦向きです。
pub fn choose_page_orientation(width: u32, height: u32, mode: OrientationMode) -> PageOrientation {
    match mode {
        OrientationMode::Portrait => PageOrientation::Portrait,
        OrientationMode::Landscape => PageOrientation::Landscape,
        OrientationMode::Auto => {
            if width > height {
                PageOrientation::Landscape
            } else {
                PageOrientation::Portrait
            }
        }
    }
}

impl fmt::Display for OrientationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationMode::Auto => write!(f, "auto"),
            OrientationMode::Portrait => write!(f, "portrait"),
            OrientationMode::Landscape => write!(f, "landscape"),
        }
    }
}

impl fmt::Display for PageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOrientation::Portrait => write!(f, "縦"),
            PageOrientation::Landscape => write!(f, "横"),
        }
    }
}
