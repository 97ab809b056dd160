//! # 文本栅格化模块
//!
//! 将文本水印渲染成白底黑字的图像面板，用于生成对比图。

use crate::constants::{TEXT_FONT_SIZE, TEXT_MARGIN};
use ab_glyph::{Font, FontRef, GlyphId, PxScale, PxScaleFont, ScaleFont, point};
use image::{Rgb, RgbImage};
use std::sync::LazyLock;
use tracing::error;

const FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSansMono-Bold.ttf");

static FONT: LazyLock<Option<FontRef<'static>>> =
    LazyLock::new(|| FontRef::try_from_slice(FONT_DATA).ok());

/// 文本排版后的尺寸 (像素)。
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextExtent {
    width: f32,
    ascent: f32,
    descent: f32,
}

fn measure(scaled: &PxScaleFont<&FontRef<'static>>, text: &str) -> TextExtent {
    let mut width = 0.0f32;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    TextExtent {
        width,
        ascent: scaled.ascent(),
        descent: -scaled.descent(),
    }
}

/// 将 `text` 渲染为图像面板。
///
/// 宽度为文本排版宽度加左右留白，高度为字体上伸高度、基线以下的下伸高度与上下留白之和。
/// 任何输入 (包括空字符串) 都会得到一张宽高均为正的图像。
pub fn render_text(text: &str) -> RgbImage {
    let white = Rgb([255u8, 255, 255]);

    let Some(font) = FONT.as_ref() else {
        error!("embedded font failed to load, rendering a blank panel");
        return RgbImage::from_pixel(2 * TEXT_MARGIN, 2 * TEXT_MARGIN, white);
    };

    let scale = PxScale::from(TEXT_FONT_SIZE);
    let scaled = font.as_scaled(scale);
    let extent = measure(&scaled, text);

    let width = extent.width.ceil() as u32 + 2 * TEXT_MARGIN;
    let height = extent.ascent.ceil() as u32 + extent.descent.ceil() as u32 + 2 * TEXT_MARGIN;
    let mut canvas = RgbImage::from_pixel(width, height, white);

    let baseline = TEXT_MARGIN as f32 + extent.ascent.ceil();
    let mut cursor = TEXT_MARGIN as f32;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            cursor += scaled.kern(prev, id);
        }

        let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    return;
                }
                let ink = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))) as u8;
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                // 相邻字形可能重叠，取较深的值
                for channel in pixel.0.iter_mut() {
                    *channel = (*channel).min(ink);
                }
            });
        }

        cursor += scaled.h_advance(id);
        prev = Some(id);
    }

    canvas
}
