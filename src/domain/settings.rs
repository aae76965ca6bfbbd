use super::orientation::OrientationMode;
use super::page_layout::PaperSize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("品質は 0.0 から 1.0 の範囲で指定してください: {0}")]
    QualityOutOfRange(f32),
}

/// JPEG エンコードの品質 (0.0〜1.0)。
///
/// 可逆形式 (PNG) の配置では使われませんが、常にシンクまで渡されます。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Result<Self, SettingsError> {
        // NaN もここで弾かれる
        if !(0.0..=1.0).contains(&value) {
            return Err(SettingsError::QualityOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// `image` クレートの JPEG エンコーダが受け付ける 1〜100 の値に変換します。
    pub fn as_jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

/// 変換1回分の設定。実行開始時に値としてコピーされ、実行中に変わることはない。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConversionSettings {
    pub quality: Quality,
    pub orientation_mode: OrientationMode,
    pub paper: PaperSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_accepts_the_closed_unit_range() {
        assert_eq!(Quality::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Quality::new(1.0).unwrap().value(), 1.0);
        assert_eq!(Quality::new(0.3).unwrap().value(), 0.3);
    }

    #[test]
    fn quality_rejects_out_of_range_values() {
        assert_eq!(
            Quality::new(1.1),
            Err(SettingsError::QualityOutOfRange(1.1))
        );
        assert!(Quality::new(-0.01).is_err());
        assert!(Quality::new(f32::NAN).is_err());
    }

    #[test]
    fn jpeg_quality_is_clamped_to_encoder_range() {
        assert_eq!(Quality::new(0.0).unwrap().as_jpeg_quality(), 1);
        assert_eq!(Quality::new(0.75).unwrap().as_jpeg_quality(), 75);
        assert_eq!(Quality::new(1.0).unwrap().as_jpeg_quality(), 100);
    }

    #[test]
    fn defaults_match_the_cli_defaults() {
        let settings = ConversionSettings::default();
        assert_eq!(settings.quality.value(), 0.8);
        assert_eq!(settings.orientation_mode, OrientationMode::Auto);
        assert_eq!(settings.paper, PaperSize::A4);
        assert_eq!(settings.quality.to_string(), "80%");
    }
}
