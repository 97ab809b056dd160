//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的全部选项。解析结果 [`Cli`] 只在 `main` 中构造一次，
//! 之后以引用的形式传递给调度器、水印解析器和对比图合成器。

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

const EXAMPLES: &str = "Examples:
  blind_watermark --embed --pwd 1234 image.jpg \"watermark text\" embed.png
  blind_watermark --extract --pwd 1234 --wm_shape 111 embed.png
  blind_watermark --attack shelter embed.png attacked.png
  blind_watermark --attack shelter embed.png attacked.png --origin ori.jpg --wm_text \"wm\" --compare compare.png";

/// 一款盲水印命令行工具：在图像中嵌入文本水印、提取水印，或对图像施加攻击以检验鲁棒性。
#[derive(Parser, Debug, Default, Clone)]
#[command(
    version,
    about,
    long_about = "一款盲水印命令行工具：在图像中嵌入文本水印、提取水印，或对图像施加攻击以检验鲁棒性。",
    after_help = EXAMPLES
)]
#[command(group(ArgGroup::new("work_mode").args(["embed", "extract"])))]
pub struct Cli {
    /// 将水印嵌入图像。位置参数：<输入图像> <水印文本> <输出图像>
    #[arg(long)]
    pub embed: bool,

    /// 从图像中提取水印。位置参数：<已嵌入水印的图像>
    #[arg(long)]
    pub extract: bool,

    /// 密码 (整数)，例如 1234。嵌入和提取时必需。
    #[arg(short = 'p', long = "pwd", value_name = "PWD")]
    pub password: Option<u64>,

    /// 水印长度 (比特数)，例如 111。提取时必需，由嵌入时输出。
    #[arg(long = "wm_shape", value_name = "BITS")]
    pub wm_shape: Option<usize>,

    /// 攻击类型，例如 shelter。位置参数：<输入图像> <输出图像>
    #[arg(long, value_name = "NAME")]
    pub attack: Option<String>,

    /// 对比图的保存路径。
    #[arg(long, value_name = "PATH")]
    pub compare: Option<PathBuf>,

    /// 用于对比的原始图像 (攻击模式下生成对比图时必需)。
    #[arg(long, value_name = "PATH")]
    pub origin: Option<PathBuf>,

    /// 用于对比的水印文本。
    #[arg(long = "wm_text", value_name = "TEXT")]
    pub wm_text: Option<String>,

    /// 用于对比的水印图像文件，优先于 `--wm_text`。
    #[arg(long = "wm_img", value_name = "PATH")]
    pub wm_img: Option<PathBuf>,

    /// 位置参数，含义取决于工作模式。
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// 由 `--embed` / `--extract` 选定的工作模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkMode {
    Embed,
    Extract,
    Idle,
}

impl Cli {
    pub fn work_mode(&self) -> WorkMode {
        match (self.embed, self.extract) {
            (true, _) => WorkMode::Embed,
            (_, true) => WorkMode::Extract,
            _ => WorkMode::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embed_invocation() {
        let cli = Cli::try_parse_from([
            "blind_watermark",
            "--embed",
            "--pwd",
            "1234",
            "ori.jpg",
            "watermark text",
            "out.png",
        ])
        .unwrap();

        assert_eq!(cli.work_mode(), WorkMode::Embed);
        assert_eq!(cli.password, Some(1234));
        assert_eq!(cli.args, vec!["ori.jpg", "watermark text", "out.png"]);
    }

    #[test]
    fn test_options_may_follow_positionals() {
        let cli = Cli::try_parse_from([
            "blind_watermark",
            "--attack",
            "shelter",
            "in.png",
            "out.png",
            "--origin",
            "ori.jpg",
            "--compare",
            "cmp.png",
            "--wm_text",
            "hi",
        ])
        .unwrap();

        assert_eq!(cli.work_mode(), WorkMode::Idle);
        assert_eq!(cli.attack.as_deref(), Some("shelter"));
        assert_eq!(cli.args, vec!["in.png", "out.png"]);
        assert_eq!(cli.wm_text.as_deref(), Some("hi"));
        assert_eq!(cli.compare, Some(PathBuf::from("cmp.png")));
    }

    #[test]
    fn test_embed_and_extract_are_exclusive() {
        let result = Cli::try_parse_from(["blind_watermark", "--embed", "--extract", "a.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let pwd = Cli::try_parse_from(["blind_watermark", "--extract", "--pwd", "abc", "a.png"]);
        assert!(pwd.is_err());

        let shape = Cli::try_parse_from([
            "blind_watermark",
            "--extract",
            "--pwd",
            "1",
            "--wm_shape",
            "1.5",
            "a.png",
        ]);
        assert!(shape.is_err());
    }
}
