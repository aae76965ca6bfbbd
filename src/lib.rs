//! 画像の並びを1画像1ページの PDF にまとめるライブラリ。

pub mod domain;
pub mod error;
