// --- 依存モジュール ---

use super::sink::{DocumentSink, SinkError};
use crate::domain::image_record::{EncodedImage, ImageFormatTag};
use crate::domain::orientation::PageOrientation;
use crate::domain::page_layout::{PageSize, Rect};
use crate::domain::settings::Quality;

// PDF オブジェクトの組み立てには lopdf を、画像の再エンコードには image クレートを使います。
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

const PRODUCER: &str = "image_pdf_assembler";

/// ページを確定させる前の中間表現。
///
/// `Pages` ツリーの親参照は書き出し時にしか決まらないため、ここではサイズ・リソース・
/// コンテンツだけを貯めておく。
#[derive(Debug)]
struct PendingPage {
    size: PageSize,
    xobjects: Dictionary,
    content: String,
}

/// 構築中の PDF 文書。
///
/// `LopdfSink::open` で作られ、`finalize` で消費されます。開いた直前の状態ではページを持たないので、
/// 画像が1枚もなければ0ページの文書がそのまま書き出されます。
#[derive(Debug)]
pub struct PdfBuilder {
    /// 全てのPDFオブジェクト（ディクショナリ、ストリーム等）を保持する lopdf のドキュメント。
    doc: Document,
    title: String,
    pages: Vec<PendingPage>,
    /// XObject にユニークなリソース名を付けるためのカウンター。
    image_counter: u32,
}

impl PdfBuilder {
    fn new(title: &str) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            title: title.to_string(),
            pages: Vec::new(),
            image_counter: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 画像 XObject をドキュメントに登録し、その ObjectId を返す。
    fn add_image_xobject(
        &mut self,
        image: &EncodedImage,
        quality: Quality,
    ) -> Result<ObjectId, SinkError> {
        let decoded = image::load_from_memory(image.bytes())
            .map_err(|e| SinkError::Placement(format!("画像のデコードに失敗しました: {}", e)))?;

        let stream = match image.format() {
            ImageFormatTag::Jpeg => jpeg_stream(&decoded, quality)?,
            ImageFormatTag::Png => {
                let mut stream = flate_rgb_stream(&decoded)?;
                // 透過情報はソフトマスクとして別ストリームに持たせる
                if decoded.color().has_alpha() {
                    let mask_id = self.doc.add_object(alpha_mask_stream(&decoded)?);
                    stream.dict.set("SMask", mask_id);
                }
                stream
            }
        };
        Ok(self.doc.add_object(stream))
    }

    /// `Pages` ツリーとカタログを組み立て、バイト列に保存する。
    fn into_bytes(self) -> Result<Vec<u8>, SinkError> {
        let PdfBuilder {
            mut doc,
            title,
            pages,
            ..
        } = self;

        let pages_id = doc.new_object_id();
        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let contents_id =
                doc.add_object(Stream::new(Dictionary::new(), page.content.into_bytes()));

            let mut resources = Dictionary::new();
            resources.set("XObject", page.xobjects);

            let mut page_dict = Dictionary::new();
            page_dict.set("Type", "Page");
            page_dict.set("Parent", pages_id);
            page_dict.set(
                "MediaBox",
                vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.size.width_pt as f32),
                    Object::Real(page.size.height_pt as f32),
                ],
            );
            page_dict.set("Resources", resources);
            page_dict.set("Contents", contents_id);
            kids.push(Object::Reference(doc.add_object(page_dict)));
        }

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", "Pages");
        pages_dict.set("Count", Object::Integer(kids.len() as i64));
        pages_dict.set("Kids", Object::Array(kids));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", "Catalog");
        catalog.set("Pages", pages_id);
        let catalog_id = doc.add_object(catalog);

        let mut info = Dictionary::new();
        info.set("Title", Object::string_literal(title));
        info.set("Producer", Object::string_literal(PRODUCER));
        let info_id = doc.add_object(info);

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| SinkError::Finalize(e.to_string()))?;
        Ok(buffer)
    }
}

/// lopdf でPDFを組み立てるシンク。
#[derive(Debug, Default)]
pub struct LopdfSink;

impl DocumentSink for LopdfSink {
    type Handle = PdfBuilder;

    fn open(&mut self, title: &str) -> Result<PdfBuilder, SinkError> {
        Ok(PdfBuilder::new(title))
    }

    fn add_page(
        &mut self,
        doc: &mut PdfBuilder,
        size: PageSize,
        orientation: PageOrientation,
    ) -> Result<(), SinkError> {
        if size.width_pt <= 0.0 || size.height_pt <= 0.0 {
            return Err(SinkError::Page(format!(
                "不正なページサイズ {} x {} pt",
                size.width_pt, size.height_pt
            )));
        }
        log::debug!(
            "ページ {} を追加 ({}, {:.2} x {:.2} pt)",
            doc.pages.len() + 1,
            orientation,
            size.width_pt,
            size.height_pt
        );
        doc.pages.push(PendingPage {
            size,
            xobjects: Dictionary::new(),
            content: String::new(),
        });
        Ok(())
    }

    fn place_image(
        &mut self,
        doc: &mut PdfBuilder,
        image: &EncodedImage,
        rect: Rect,
        quality: Quality,
    ) -> Result<(), SinkError> {
        if doc.pages.is_empty() {
            return Err(SinkError::Page(
                "ページを追加する前に画像を配置しようとしました".to_string(),
            ));
        }

        let image_id = doc.add_image_xobject(image, quality)?;
        doc.image_counter += 1;
        let resource_name = format!("Im{}", doc.image_counter);

        let page = doc
            .pages
            .last_mut()
            .ok_or_else(|| SinkError::Page("配置先のページがありません".to_string()))?;

        // レイアウトは左上原点、PDF のユーザー空間は左下原点なので y を反転する
        let pdf_y = page.size.height_pt - rect.y - rect.height;
        page.content.push_str(&format!(
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/{} Do\nQ\n",
            rect.width, rect.height, rect.x, pdf_y, resource_name
        ));
        page.xobjects.set(resource_name, image_id);
        Ok(())
    }

    fn finalize(&mut self, doc: PdfBuilder) -> Result<Vec<u8>, SinkError> {
        doc.into_bytes()
    }
}

fn image_dictionary(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut xobject = Dictionary::new();
    xobject.set("Type", "XObject");
    xobject.set("Subtype", "Image");
    xobject.set("Width", Object::Integer(i64::from(width)));
    xobject.set("Height", Object::Integer(i64::from(height)));
    xobject.set("ColorSpace", color_space);
    xobject.set("BitsPerComponent", Object::Integer(8));
    xobject.set("Filter", filter);
    xobject
}

/// 透過を持つ画像を白地に合成して RGB にする。透過がなければそのまま変換する。
fn flatten_onto_white(decoded: &DynamicImage) -> RgbImage {
    if !decoded.color().has_alpha() {
        return decoded.to_rgb8();
    }
    let rgba = decoded.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// 指定品質で JPEG に再エンコードし、`DCTDecode` のストリームにする。
///
/// JPEG は透過を持てないので、透過部分は白として埋め込まれる。
fn jpeg_stream(decoded: &DynamicImage, quality: Quality) -> Result<Stream, SinkError> {
    let rgb = flatten_onto_white(decoded);
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.as_jpeg_quality())
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| SinkError::Placement(format!("JPEGのエンコードに失敗しました: {}", e)))?;

    let dict = image_dictionary(rgb.width(), rgb.height(), "DeviceRGB", "DCTDecode");
    Ok(Stream::new(dict, jpeg))
}

/// 可逆のまま RGB サンプルを Flate 圧縮したストリームにする。品質設定は使わない。
fn flate_rgb_stream(decoded: &DynamicImage) -> Result<Stream, SinkError> {
    let rgb = decoded.to_rgb8();
    let data = deflate(rgb.as_raw())?;
    let dict = image_dictionary(rgb.width(), rgb.height(), "DeviceRGB", "FlateDecode");
    Ok(Stream::new(dict, data))
}

fn alpha_mask_stream(decoded: &DynamicImage) -> Result<Stream, SinkError> {
    let rgba = decoded.to_rgba8();
    let alpha: Vec<u8> = rgba.pixels().map(|p| p[3]).collect();
    let data = deflate(&alpha)?;
    let dict = image_dictionary(rgba.width(), rgba.height(), "DeviceGray", "FlateDecode");
    Ok(Stream::new(dict, data))
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>, SinkError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| SinkError::Placement(format!("画像データの圧縮に失敗しました: {}", e)))
}
