pub mod admission;
pub mod directory_path;
pub mod input_source;
pub mod path_error;
pub mod zip_file_path;

use std::path::Path;

/// ディレクトリやZIPの中から拾う画像の拡張子。
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// パスが画像ファイルらしい拡張子を持つか、大文字小文字を区別せずに判定します。
pub(crate) fn has_image_extension(path: &Path) -> bool {
    // `file_stem` がないとドットファイル (`.DS_Store` など) を誤判定するためチェック
    if path.file_stem().is_none() {
        return false;
    }
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
