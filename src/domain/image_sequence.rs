//! 変換順を保持する画像シーケンス。
//!
//! 並び順はこのコンテナの要素順そのものです。変更は追加・識別子による削除・移動・全消去の
//! 4 操作だけで、要素自体が書き換えられることはありません。

use super::image_record::{AdmittedImage, ImageId, ImageRecord};
use std::slice;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SequenceError {
    #[error("画像 {0} はシーケンスに存在しません")]
    UnknownId(ImageId),
    #[error("位置 {index} は範囲外です (画像数: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Default)]
pub struct ImageSequence {
    records: Vec<ImageRecord>,
    next_id: u64,
}

impl ImageSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に画像を追加し、新しく採番した識別子を返します。
    ///
    /// 同じ名前の画像が既にあっても統合せず、別の要素として扱います。
    pub fn push(&mut self, image: AdmittedImage) -> ImageId {
        self.next_id += 1;
        let id = ImageId(self.next_id);
        self.records.push(ImageRecord::from_admitted(id, image));
        id
    }

    /// 識別子で指定した画像を取り除き、その画像を返します。
    pub fn remove(&mut self, id: ImageId) -> Result<ImageRecord, SequenceError> {
        let index = self.position(id).ok_or(SequenceError::UnknownId(id))?;
        Ok(self.records.remove(index))
    }

    /// `from` の画像を取り出し、`to` の位置に挿入します。
    ///
    /// ドラッグ&ドロップでの並べ替えと同じく、`to` は取り出した後の並びでの位置です。
    /// `from == to` の場合は何も変わりません。
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), SequenceError> {
        let len = self.records.len();
        for index in [from, to] {
            if index >= len {
                return Err(SequenceError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let record = self.records.remove(from);
            self.records.insert(to, record);
        }
        Ok(())
    }

    /// すべての画像を取り除き、取り除いた枚数を返します。
    ///
    /// 識別子の採番は継続するため、消去前の識別子が再利用されることはない。
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }

    /// 変換実行用の凍結コピー。以後のシーケンス変更の影響を受けない。
    pub fn snapshot(&self) -> Vec<ImageRecord> {
        self.records.clone()
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImageSequence {
    type Item = &'a ImageRecord;
    type IntoIter = slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
