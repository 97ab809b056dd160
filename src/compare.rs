//! # 对比图模块
//!
//! 确定用于对比的水印面板 (水印图像、水印文本或嵌入时的文本参数)，
//! 并将水印、处理后图像和原始图像统一高度后横向拼接为一张对比图。

use crate::cli::Cli;
use crate::render::render_text;
use anyhow::{Context, Result};
use colored::Colorize;
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 对比图中水印面板的来源，按优先级依次为：水印图像 > 水印文本 > 隐式文本参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkSource<'a> {
    Image(&'a Path),
    Text(&'a str),
    Absent,
}

/// 解析后的水印面板。
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Raster(RgbImage),
    /// 指定了水印图像，但无法读取。
    Unreadable(PathBuf),
    Absent,
}

impl<'a> WatermarkSource<'a> {
    /// 根据选项与隐式文本参数选择水印来源。
    ///
    /// `implicit` 只在嵌入流程中提供，即作为位置参数传入的水印文本。
    pub fn select(opts: &'a Cli, implicit: Option<&'a str>) -> Self {
        match (opts.wm_img.as_deref(), opts.wm_text.as_deref(), implicit) {
            (Some(path), _, _) => WatermarkSource::Image(path),
            (None, Some(text), _) => WatermarkSource::Text(text),
            (None, None, Some(text)) => WatermarkSource::Text(text),
            (None, None, None) => WatermarkSource::Absent,
        }
    }

    pub fn load(self) -> Payload {
        match self {
            WatermarkSource::Image(path) => match load_rgb(path) {
                Some(image) => Payload::Raster(image),
                None => Payload::Unreadable(path.to_path_buf()),
            },
            WatermarkSource::Text(text) => Payload::Raster(render_text(text)),
            WatermarkSource::Absent => Payload::Absent,
        }
    }
}

/// 读取图像，失败时返回 `None`。
pub fn load_rgb(path: &Path) -> Option<RgbImage> {
    match image::open(path) {
        Ok(image) => Some(image.to_rgb8()),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "comparison image not loaded");
            None
        }
    }
}

/// 等比缩放到指定高度，宽度四舍五入且至少为 1。
pub fn resize_to_height(image: &RgbImage, height: u32) -> RgbImage {
    if image.height() == height {
        return image.clone();
    }
    let width = (image.width() as u64 * height as u64 + image.height() as u64 / 2)
        / image.height().max(1) as u64;
    imageops::resize(image, width.max(1) as u32, height, FilterType::Triangle)
}

/// 将三张图像统一为其中的最大高度后，按 [水印, 处理后, 原图] 的顺序横向拼接。
pub fn compose(panels: [&RgbImage; 3]) -> RgbImage {
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let resized: Vec<RgbImage> = panels
        .iter()
        .map(|panel| resize_to_height(panel, height))
        .collect();

    let width = resized.iter().map(|p| p.width()).sum();
    debug!(width, height, "composing comparison image");

    let mut canvas = RgbImage::new(width, height);
    let mut x = 0i64;
    for panel in &resized {
        imageops::replace(&mut canvas, panel, x, 0);
        x += panel.width() as i64;
    }
    canvas
}

/// 生成对比图的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOutcome {
    Saved(PathBuf),
    WatermarkNotSpecified,
    ImagesNotFound,
}

impl CompareOutcome {
    /// 面向用户的提示信息。
    pub fn message(&self) -> String {
        match self {
            CompareOutcome::Saved(path) => format!(
                "Comparison image saved to {}",
                path.to_string_lossy().green().bold()
            ),
            CompareOutcome::WatermarkNotSpecified => {
                "Watermark for comparison not specified".yellow().to_string()
            }
            CompareOutcome::ImagesNotFound => "Images for comparison not found".yellow().to_string(),
        }
    }
}

/// 生成 [水印, 处理后图像, 原图] 的对比图并写入 `output`。
///
/// 缺少水印或任一图像无法读取时不写入任何文件。
///
/// # Errors
///
/// 仅当对比图无法写入 `output` 时返回错误。
pub fn make_compare(
    opts: &Cli,
    implicit: Option<&str>,
    processed: &Path,
    origin: &Path,
    output: &Path,
) -> Result<CompareOutcome> {
    let source = WatermarkSource::select(opts, implicit);
    debug!(?source, "selected comparison watermark");

    let watermark = match source.load() {
        Payload::Raster(image) => image,
        Payload::Absent => return Ok(CompareOutcome::WatermarkNotSpecified),
        Payload::Unreadable(_) => return Ok(CompareOutcome::ImagesNotFound),
    };

    let (Some(processed), Some(origin)) = (load_rgb(processed), load_rgb(origin)) else {
        return Ok(CompareOutcome::ImagesNotFound);
    };

    let comparison = compose([&watermark, &processed, &origin]);
    comparison.save(output).with_context(|| {
        format!(
            "Unable to write comparison image: {}",
            output.to_string_lossy().red().bold()
        )
    })?;

    Ok(CompareOutcome::Saved(output.to_path_buf()))
}
