//! 変換対象となる画像1枚分の不変な記述子。

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 画像のセッション内識別子。受け入れ時に単調増加で採番される。
///
/// ファイル名は同名の別ファイルが存在しうるため識別子には使わない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// シンクに伝える画像形式のタグ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatTag {
    Jpeg,
    Png,
}

impl fmt::Display for ImageFormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormatTag::Jpeg => write!(f, "JPEG"),
            ImageFormatTag::Png => write!(f, "PNG"),
        }
    }
}

/// エンコード済みの画像データと形式タグ。
///
/// バイト列は `Arc` で共有するため、変換開始時のスナップショットは安価に取れる。
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    bytes: Arc<[u8]>,
    format: ImageFormatTag,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, format: ImageFormatTag) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormatTag {
        self.format
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("画像 '{name}' の寸法が不正です: {width} x {height}")]
pub struct InvalidDimensions {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// 受け入れ済みで、まだ識別子が付いていない画像。
///
/// 幅・高さが正であることは `new` で保証される。
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedImage {
    name: String,
    payload: EncodedImage,
    width: u32,
    height: u32,
}

impl AdmittedImage {
    pub fn new(
        name: impl Into<String>,
        payload: EncodedImage,
        width: u32,
        height: u32,
    ) -> Result<Self, InvalidDimensions> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(InvalidDimensions {
                name,
                width,
                height,
            });
        }
        Ok(Self {
            name,
            payload,
            width,
            height,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// シーケンスに格納された画像。生成後に変更されることはない。
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    id: ImageId,
    name: String,
    payload: EncodedImage,
    width: u32,
    height: u32,
}

impl ImageRecord {
    pub(crate) fn from_admitted(id: ImageId, admitted: AdmittedImage) -> Self {
        Self {
            id,
            name: admitted.name,
            payload: admitted.payload,
            width: admitted.width,
            height: admitted.height,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn payload(&self) -> &EncodedImage {
        &self.payload
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
}
