/// 嵌入模式的用法示例。
pub const USAGE_EMBED: &str = r#"blind_watermark --embed --pwd 1234 image.jpg "watermark text" embed.png"#;

/// 提取模式的用法示例。
pub const USAGE_EXTRACT: &str = "blind_watermark --extract --pwd 1234 --wm_shape 111 embed.png";

/// 攻击模式的用法示例。
pub const USAGE_ATTACK: &str = "blind_watermark --attack shelter embed.png attacked.png";

/// 文本水印渲染使用的字体像素大小。
pub const TEXT_FONT_SIZE: f32 = 32.0;

/// 文本面板四周的留白 (像素)。
pub const TEXT_MARGIN: u32 = 10;

/// `shelter` 攻击：每个遮挡块占图像宽高的比例。
pub const SHELTER_RATIO: f32 = 0.1;

/// `shelter` 攻击：遮挡块的数量。
pub const SHELTER_COUNT: usize = 3;

/// `salt_pepper` 攻击：单个像素被替换的概率。
pub const SALT_PEPPER_RATIO: f64 = 0.01;

/// `resize` 攻击的目标尺寸 (宽, 高)。
pub const RESIZE_SHAPE: (u32, u32) = (500, 500);

/// `bright` 攻击的亮度系数。
pub const BRIGHT_RATIO: f32 = 0.8;

/// `rotate` 攻击的旋转角度 (度)。
pub const ROTATE_DEGREES: f32 = 45.0;

/// `cut` 攻击保留的区域：((起始行, 起始列), (结束行, 结束列))，均为相对比例。
pub const CUT_REGION: ((f32, f32), (f32, f32)) = ((0.3, 0.1), (0.7, 0.9));

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_UNKNOWN_ATTACK: u8 = 3;
pub const EXIT_MISSING_INPUT: u8 = 4;
