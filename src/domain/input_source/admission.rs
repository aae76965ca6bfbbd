//! 読み込んだ生バイト列を `AdmittedImage` として受け入れるかどうかの判定。
//!
//! 判定はファイルごとに独立しています。1つのファイルが失敗しても、他のファイルの
//! 受け入れには影響しません (all-settled 方式の集約)。

use crate::domain::image_record::{AdmittedImage, EncodedImage, ImageFormatTag};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

/// シーケンスに保持できる画像の最大枚数。
pub const MAX_IMAGES: usize = 20;

/// 受け入れ判定の前の、名前付きの生データ。
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AdmissionError {
    #[error("画像 '{name}' を読み込めません: {reason}")]
    Unreadable { name: String, reason: String },
    #[error("'{name}' は対応していない形式です (JPEG / PNG / WebP のみ)")]
    UnsupportedFormat { name: String },
    #[error("画像は最大 {limit} 枚までです。'{name}' は追加されませんでした")]
    CapacityExceeded { name: String, limit: usize },
}

impl AdmissionError {
    pub fn name(&self) -> &str {
        match self {
            AdmissionError::Unreadable { name, .. }
            | AdmissionError::UnsupportedFormat { name }
            | AdmissionError::CapacityExceeded { name, .. } => name,
        }
    }
}

/// 受け入れ結果の集計。成功分は入力順を保つ。
#[derive(Debug, Default)]
pub struct AdmissionReport {
    pub admitted: Vec<AdmittedImage>,
    pub rejected: Vec<AdmissionError>,
}

/// 1つの候補を検査し、受け入れ可能なら `AdmittedImage` を返します。
///
/// 形式は拡張子ではなく内容から判定します。PNG 以外の許可形式は JPEG として埋め込まれます。
pub fn admit(candidate: Candidate) -> Result<AdmittedImage, AdmissionError> {
    let Candidate { name, bytes } = candidate;

    let format = match image::guess_format(&bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => format,
        _ => return Err(AdmissionError::UnsupportedFormat { name }),
    };

    let (width, height) = match ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
    {
        Ok(dimensions) => dimensions,
        Err(e) => {
            return Err(AdmissionError::Unreadable {
                name,
                reason: e.to_string(),
            })
        }
    };

    let tag = if format == ImageFormat::Png {
        ImageFormatTag::Png
    } else {
        ImageFormatTag::Jpeg
    };

    AdmittedImage::new(name, EncodedImage::new(bytes, tag), width, height).map_err(|e| {
        AdmissionError::Unreadable {
            reason: e.to_string(),
            name: e.name,
        }
    })
}

/// 候補をすべて検査し、成功と失敗を集計します。
///
/// `remaining_capacity` 枚を受け入れた時点で、以降の候補は `CapacityExceeded` になります。
/// 読み取り段階で既に失敗している候補はそのまま失敗として記録されます。
pub fn admit_all<I>(candidates: I, remaining_capacity: usize) -> AdmissionReport
where
    I: IntoIterator<Item = Result<Candidate, AdmissionError>>,
{
    let mut report = AdmissionReport::default();
    for candidate in candidates {
        let result = candidate.and_then(|c| {
            if report.admitted.len() >= remaining_capacity {
                Err(AdmissionError::CapacityExceeded {
                    name: c.name,
                    limit: MAX_IMAGES,
                })
            } else {
                admit(c)
            }
        });
        match result {
            Ok(image) => report.admitted.push(image),
            Err(e) => report.rejected.push(e),
        }
    }
    report
}

#[cfg(test)]
pub(crate) mod test_images {
    use image::codecs::jpeg::JpegEncoder;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let buf = vec![128u8; (width * height * 3) as usize];
        let mut result = Vec::new();
        PngEncoder::new(&mut result)
            .write_image(&buf, width, height, ExtendedColorType::Rgb8)
            .expect("PNGのエンコードに失敗");
        result
    }

    pub fn png_with_alpha(width: u32, height: u32) -> Vec<u8> {
        let buf = vec![200u8; (width * height * 4) as usize];
        let mut result = Vec::new();
        PngEncoder::new(&mut result)
            .write_image(&buf, width, height, ExtendedColorType::Rgba8)
            .expect("PNGのエンコードに失敗");
        result
    }

    pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let buf = vec![64u8; (width * height * 3) as usize];
        let mut result = Vec::new();
        JpegEncoder::new_with_quality(&mut result, 90)
            .write_image(&buf, width, height, ExtendedColorType::Rgb8)
            .expect("JPEGのエンコードに失敗");
        result
    }
}
