//! PDF 页面操作
//!
//! 只做一件事：把图片作为新页面追加到 PDF 末尾，原有页面保持不变

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageFormat;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

/// A4 页面宽度（pt）
pub const PAGE_WIDTH: i64 = 595;
/// A4 页面高度（pt）
pub const PAGE_HEIGHT: i64 = 842;
const PAGE_MARGIN: i64 = 36;

/// 创建只有空页面树的文档
pub fn empty_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// 把图片逐张追加为 `target` 的新页面
///
/// `append` 为 false 或目标不存在时，先新建空文档（覆盖旧文件）。
/// 返回追加的页数。
pub fn append_image_pages(images: &[&Path], target: &Path, append: bool) -> Result<usize> {
    let mut doc = if append && target.exists() {
        Document::load(target).with_context(|| format!("无法读取 PDF: {}", target.display()))?
    } else {
        empty_document()
    };

    let pages_id = pages_root(&doc)?;
    for image_path in images {
        let page_id = add_image_page(&mut doc, pages_id, image_path)?;
        push_page(&mut doc, pages_id, page_id)?;
        debug!("已追加图片页: {}", image_path.display());
    }

    doc.save(target)
        .with_context(|| format!("无法写入 PDF: {}", target.display()))?;
    Ok(images.len())
}

fn pages_root(doc: &Document) -> Result<ObjectId> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.get_object(root_id)?.as_dict()?.get(b"Pages")?.as_reference()?;
    Ok(pages_id)
}

fn push_page(doc: &mut Document, pages_id: ObjectId, page_id: ObjectId) -> Result<()> {
    let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    pages.get_mut(b"Kids")?.as_array_mut()?.push(Object::Reference(page_id));
    let count = pages.get(b"Count")?.as_i64()?;
    pages.set("Count", count + 1);
    Ok(())
}

fn add_image_page(doc: &mut Document, pages_id: ObjectId, image_path: &Path) -> Result<ObjectId> {
    let img = image::open(image_path)
        .with_context(|| format!("无法读取图片: {}", image_path.display()))?;
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    let (width, height) = (rgb.width() as i64, rgb.height() as i64);

    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .with_context(|| format!("无法编码图片: {}", image_path.display()))?;

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let (draw_width, draw_height) = fit_to_page(width, height);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    draw_width.into(),
                    0.into(),
                    0.into(),
                    draw_height.into(),
                    PAGE_MARGIN.into(),
                    (PAGE_HEIGHT - PAGE_MARGIN - draw_height).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });
    Ok(page_id)
}

/// 等比缩放到页边距以内，不放大
fn fit_to_page(width: i64, height: i64) -> (i64, i64) {
    let max_width = PAGE_WIDTH - 2 * PAGE_MARGIN;
    let max_height = PAGE_HEIGHT - 2 * PAGE_MARGIN;
    let scale = 1f64
        .min(max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64);
    (
        ((width as f64 * scale).round() as i64).max(1),
        ((height as f64 * scale).round() as i64).max(1),
    )
}

/// 统计文档中的图片对象数量
pub fn count_images(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter(|object| match object {
            Object::Stream(stream) => {
                matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
            }
            _ => false,
        })
        .count()
}
