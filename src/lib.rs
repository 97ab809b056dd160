//! # blind_watermark 库
//!
//! 本库包含盲水印命令行工具的核心逻辑：水印引擎、攻击、对比图与命令调度。

pub mod attack;
pub mod cli;
pub mod compare;
pub mod constants;
pub mod engine;
pub mod handler;
pub mod render;
pub mod steganography;
