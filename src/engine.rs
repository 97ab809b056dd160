//! # 水印引擎模块
//!
//! [`WatermarkEngine`] 描述调度器所依赖的引擎接口；[`WaterMark`] 是基于
//! 密码置乱与最低有效位的盲水印实现。提取时不需要原图，只需要密码和水印长度。

use crate::steganography::{bits_to_text, gather, scatter, text_to_bits};
use anyhow::{Context, Result};
use colored::Colorize;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, warn};

/// 调度器使用的水印引擎接口 (字符串模式)。
pub trait WatermarkEngine {
    /// 读取待嵌入水印的载体图像。
    fn read_img(&mut self, path: &Path) -> Result<()>;

    /// 读取文本水印。
    fn read_wm(&mut self, text: &str);

    /// 当前水印的比特长度，即提取时需要的 `--wm_shape`。
    fn wm_bit_len(&self) -> usize;

    /// 嵌入水印并将结果写入 `output`。
    fn embed(&mut self, output: &Path) -> Result<()>;

    /// 从 `path` 中提取长度为 `wm_shape` 比特的文本水印。
    fn extract(&mut self, path: &Path, wm_shape: usize) -> Result<String>;
}

/// 以密码为种子的最低有效位盲水印引擎。
#[derive(Debug, Clone)]
pub struct WaterMark {
    password: u64,
    image: Option<RgbImage>,
    wm_bits: Vec<bool>,
}

impl WaterMark {
    pub fn new(password: u64) -> Self {
        WaterMark {
            password,
            image: None,
            wm_bits: Vec::new(),
        }
    }
}

fn open_rgb(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    Ok(image.to_rgb8())
}

fn is_lossy(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
}

impl WatermarkEngine for WaterMark {
    fn read_img(&mut self, path: &Path) -> Result<()> {
        let image = open_rgb(path)?;
        debug!(
            width = image.width(),
            height = image.height(),
            "loaded carrier image"
        );
        self.image = Some(image);
        Ok(())
    }

    fn read_wm(&mut self, text: &str) {
        self.wm_bits = text_to_bits(text);
    }

    fn wm_bit_len(&self) -> usize {
        self.wm_bits.len()
    }

    fn embed(&mut self, output: &Path) -> Result<()> {
        let mut image = self
            .image
            .clone()
            .context("No carrier image loaded. Call read_img before embed.")?;

        anyhow::ensure!(
            !self.wm_bits.is_empty(),
            "The watermark text is empty, nothing to embed."
        );

        let capacity = image.as_raw().len();
        anyhow::ensure!(
            capacity >= self.wm_bits.len(),
            "Not enough space in the image to embed the watermark. \nRequired: {}, Available: {}",
            self.wm_bits.len().to_string().red().bold(),
            capacity.to_string().green().bold()
        );

        if is_lossy(output) {
            warn!(
                path = %output.display(),
                "lossy output format will damage the embedded watermark"
            );
        }

        debug!(bits = self.wm_bits.len(), capacity, "embedding watermark");
        scatter(&self.wm_bits, &mut image, self.password)
            .with_context(|| "Failed to embed the watermark into the image.")?;

        image.save(output).with_context(|| {
            format!(
                "Unable to write to target image file: {}",
                output.to_string_lossy().red().bold()
            )
        })?;

        Ok(())
    }

    fn extract(&mut self, path: &Path, wm_shape: usize) -> Result<String> {
        let image = open_rgb(path)?;

        let bits = gather(image.as_raw(), self.password, wm_shape).with_context(|| {
            format!(
                "Failed to extract a watermark of {} bits from '{}'.",
                wm_shape.to_string().red().bold(),
                path.to_string_lossy().red().bold()
            )
        })?;

        Ok(bits_to_text(&bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn carrier(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) * 7) as u8])
        })
    }

    #[test]
    fn test_embed_then_extract() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("ori.png");
        let output = dir.path().join("embedded.png");
        carrier(40, 30).save(&input)?;

        let mut engine = WaterMark::new(1234);
        engine.read_img(&input)?;
        engine.read_wm("watermark text");
        assert_eq!(engine.wm_bit_len(), 111);
        engine.embed(&output)?;

        let recovered = WaterMark::new(1234).extract(&output, 111)?;
        assert_eq!(recovered, "watermark text");
        Ok(())
    }

    #[test]
    fn test_wrong_password_does_not_recover() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("ori.png");
        let output = dir.path().join("embedded.png");
        carrier(64, 64).save(&input)?;

        let mut engine = WaterMark::new(1);
        engine.read_img(&input)?;
        engine.read_wm("secret message");
        engine.embed(&output)?;

        let shape = engine.wm_bit_len();
        let recovered = WaterMark::new(2).extract(&output, shape)?;
        assert_ne!(recovered, "secret message");
        Ok(())
    }

    #[test]
    fn test_embed_requires_image_and_text() -> Result<()> {
        let dir = tempdir()?;
        let output = dir.path().join("out.png");

        let mut engine = WaterMark::new(1);
        engine.read_wm("text");
        assert!(engine.embed(&output).is_err());

        let input = dir.path().join("ori.png");
        carrier(8, 8).save(&input)?;
        engine.read_img(&input)?;
        engine.read_wm("");
        assert!(engine.embed(&output).is_err());
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_missing_image_is_reported() {
        let mut engine = WaterMark::new(1);
        let err = engine.read_img(Path::new("/nonexistent/ori.png")).unwrap_err();
        assert!(err.to_string().contains("Unable to read image file"));
    }
}
