//! # 攻击模块
//!
//! 包含用于检验水印鲁棒性的图像攻击，以及按名称查找攻击的注册表。
//! 每个注册的攻击都满足同一接口：读取 `input`，变换后写入 `output`。

use crate::constants::{
    BRIGHT_RATIO, CUT_REGION, RESIZE_SHAPE, ROTATE_DEGREES, SALT_PEPPER_RATIO, SHELTER_COUNT,
    SHELTER_RATIO,
};
use anyhow::{Context, Result};
use colored::Colorize;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::rect::Rect;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// 一次攻击：读取 `input` 指向的图像，将攻击结果写入 `output`。
pub trait Attack {
    fn apply(&self, input: &Path, output: &Path) -> Result<()>;
}

impl<F> Attack for F
where
    F: Fn(&Path, &Path) -> Result<()>,
{
    fn apply(&self, input: &Path, output: &Path) -> Result<()> {
        self(input, output)
    }
}

/// 攻击名称到攻击实现的映射。
pub struct AttackRegistry {
    entries: BTreeMap<String, Box<dyn Attack>>,
}

impl AttackRegistry {
    /// 创建一个空的注册表。
    pub fn new() -> Self {
        AttackRegistry {
            entries: BTreeMap::new(),
        }
    }

    /// 注册攻击；同名的已有攻击会被替换。
    pub fn register(&mut self, name: impl Into<String>, attack: impl Attack + 'static) {
        self.entries.insert(name.into(), Box::new(attack));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Attack> {
        self.entries.get(name).map(|attack| attack.as_ref())
    }

    /// 已注册的攻击名称 (按字母顺序)。
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for AttackRegistry {
    /// 内置的六种攻击。
    fn default() -> Self {
        let mut registry = AttackRegistry::new();
        registry.register("shelter", |input: &Path, output: &Path| {
            transform_file(input, output, |mut img| {
                shelter(&mut img, SHELTER_RATIO, SHELTER_COUNT, &mut rand::rng());
                img
            })
        });
        registry.register("salt_pepper", |input: &Path, output: &Path| {
            transform_file(input, output, |mut img| {
                salt_pepper(&mut img, SALT_PEPPER_RATIO, &mut rand::rng());
                img
            })
        });
        registry.register("resize", |input: &Path, output: &Path| {
            transform_file(input, output, |img| resize(&img, RESIZE_SHAPE))
        });
        registry.register("bright", |input: &Path, output: &Path| {
            transform_file(input, output, |mut img| {
                bright(&mut img, BRIGHT_RATIO);
                img
            })
        });
        registry.register("rotate", |input: &Path, output: &Path| {
            transform_file(input, output, |img| rotate(&img, ROTATE_DEGREES))
        });
        registry.register("cut", |input: &Path, output: &Path| {
            transform_file(input, output, |img| cut(&img, CUT_REGION))
        });
        registry
    }
}

/// 读取 `input`，应用 `transform`，并将结果写入 `output`。
pub fn transform_file(
    input: &Path,
    output: &Path,
    transform: impl FnOnce(RgbImage) -> RgbImage,
) -> Result<()> {
    let image = image::open(input)
        .with_context(|| {
            format!(
                "Unable to read image file: {}",
                input.to_string_lossy().red().bold()
            )
        })?
        .to_rgb8();

    transform(image).save(output).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            output.to_string_lossy().red().bold()
        )
    })
}

/// 遮挡攻击：在随机位置覆盖 `count` 个白色矩形，每个矩形占宽高的 `ratio`。
pub fn shelter(img: &mut RgbImage, ratio: f32, count: usize, rng: &mut impl Rng) {
    let (width, height) = img.dimensions();
    let block_w = ((width as f32 * ratio) as u32).max(1);
    let block_h = ((height as f32 * ratio) as u32).max(1);
    debug!(block_w, block_h, count, "shelter attack");

    for _ in 0..count {
        let x = rng.random_range(0..=width.saturating_sub(block_w));
        let y = rng.random_range(0..=height.saturating_sub(block_h));
        draw_filled_rect_mut(
            img,
            Rect::at(x as i32, y as i32).of_size(block_w, block_h),
            Rgb([255, 255, 255]),
        );
    }
}

/// 椒盐噪声攻击：每个像素以概率 `ratio` 被替换为纯白或纯黑。
pub fn salt_pepper(img: &mut RgbImage, ratio: f64, rng: &mut impl Rng) {
    for pixel in img.pixels_mut() {
        if rng.random_bool(ratio) {
            let value = if rng.random_bool(0.5) { 255 } else { 0 };
            *pixel = Rgb([value; 3]);
        }
    }
}

/// 缩放攻击：缩放到固定的 `(宽, 高)`。
pub fn resize(img: &RgbImage, shape: (u32, u32)) -> RgbImage {
    imageops::resize(img, shape.0.max(1), shape.1.max(1), FilterType::Triangle)
}

/// 亮度攻击：每个通道乘以 `ratio` 并截断到 [0, 255]。
pub fn bright(img: &mut RgbImage, ratio: f32) {
    for channel in img.iter_mut() {
        *channel = (*channel as f32 * ratio).round().clamp(0.0, 255.0) as u8;
    }
}

/// 旋转攻击：绕中心旋转 `degrees` 度，画布大小不变，空白处填黑。
pub fn rotate(img: &RgbImage, degrees: f32) -> RgbImage {
    rotate_about_center(
        img,
        degrees.to_radians(),
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
    )
}

/// 剪切攻击：保留 `((起始行, 起始列), (结束行, 结束列))` 比例描述的区域。
pub fn cut(img: &RgbImage, region: ((f32, f32), (f32, f32))) -> RgbImage {
    let (width, height) = img.dimensions();
    let ((top, left), (bottom, right)) = region;

    let y1 = ((height as f32 * top).round() as u32).min(height.saturating_sub(1));
    let x1 = ((width as f32 * left).round() as u32).min(width.saturating_sub(1));
    let y2 = ((height as f32 * bottom).round() as u32).clamp(y1 + 1, height.max(y1 + 1));
    let x2 = ((width as f32 * right).round() as u32).clamp(x1 + 1, width.max(x1 + 1));

    imageops::crop_imm(img, x1, y1, x2 - x1, y2 - y1).to_image()
}
