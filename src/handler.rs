//! # 命令处理逻辑模块
//!
//! 根据选项依次处理攻击、嵌入和提取：校验位置参数个数、调用攻击注册表或水印引擎、
//! 向用户报告结果，并在需要时生成对比图。
//!
//! 所有面向用户的提示都写入调用方提供的 `out`，不会因用法错误而中断进程；
//! 只有引擎或攻击本身的 I/O 错误会以 `Err` 返回。

use crate::attack::AttackRegistry;
use crate::cli::{Cli, WorkMode};
use crate::compare::{CompareOutcome, make_compare};
use crate::constants::{
    EXIT_MISSING_INPUT, EXIT_UNKNOWN_ATTACK, EXIT_USAGE, USAGE_ATTACK, USAGE_EMBED, USAGE_EXTRACT,
};
use crate::engine::WatermarkEngine;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// 一次调用的最终状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// 既没有指定工作模式，也没有指定攻击。
    Idle,
    UsageError,
    UnknownAttack,
    MissingInput,
}

impl Outcome {
    /// 进程退出码。
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Completed | Outcome::Idle => 0,
            Outcome::UsageError => EXIT_USAGE,
            Outcome::UnknownAttack => EXIT_UNKNOWN_ATTACK,
            Outcome::MissingInput => EXIT_MISSING_INPUT,
        }
    }
}

/// 执行一次调用。
///
/// 攻击先于嵌入/提取处理；攻击未成功完成时不再处理工作模式。
/// `make_engine` 以密码构造水印引擎，仅在嵌入或提取通过参数校验后调用。
///
/// # Errors
///
/// 引擎或攻击在读写图像时失败，或写入 `out` 失败。
pub fn run<W, E, F>(opts: &Cli, registry: &AttackRegistry, make_engine: F, out: &mut W) -> Result<Outcome>
where
    W: Write,
    E: WatermarkEngine,
    F: FnOnce(u64) -> E,
{
    let mut attacked = false;
    if let Some(name) = opts.attack.as_deref() {
        let outcome = handle_attack(opts, name, registry, out)?;
        if outcome != Outcome::Completed {
            return Ok(outcome);
        }
        attacked = true;
    }

    match opts.work_mode() {
        WorkMode::Embed => handle_embed(opts, make_engine, out),
        WorkMode::Extract => handle_extract(opts, make_engine, out),
        WorkMode::Idle if attacked => Ok(Outcome::Completed),
        WorkMode::Idle => {
            debug!("no work mode or attack selected, nothing to do");
            Ok(Outcome::Idle)
        }
    }
}

fn usage_error<W: Write>(out: &mut W, usage: &str) -> Result<Outcome> {
    writeln!(out, "{}", "Error! Usage: ".red().bold())?;
    writeln!(out, "{usage}")?;
    Ok(Outcome::UsageError)
}

fn missing_option<W: Write>(out: &mut W, option: &str, usage: &str) -> Result<Outcome> {
    writeln!(
        out,
        "{} option {} is required.",
        "Error!".red().bold(),
        option.yellow()
    )?;
    writeln!(out, "{usage}")?;
    Ok(Outcome::UsageError)
}

/// 输入图像不存在时报告并返回 `Some(MissingInput)`。
fn check_input<W: Write>(out: &mut W, input: &Path) -> Result<Option<Outcome>> {
    if input.exists() {
        return Ok(None);
    }
    writeln!(
        out,
        "{} {}",
        "Input image not found:".red().bold(),
        input.to_string_lossy()
    )?;
    Ok(Some(Outcome::MissingInput))
}

fn report_compare<W: Write>(out: &mut W, result: Result<CompareOutcome>) -> Result<()> {
    match result {
        Ok(outcome) => writeln!(out, "{}", outcome.message())?,
        Err(err) => writeln!(out, "{} {err:#}", "Comparison failed:".red().bold())?,
    }
    Ok(())
}

/// 处理 `--attack`：查找攻击、校验参数、执行攻击，并可选地生成对比图。
///
/// 未知的攻击名称不会触发任何文件读写。
pub fn handle_attack<W: Write>(
    opts: &Cli,
    name: &str,
    registry: &AttackRegistry,
    out: &mut W,
) -> Result<Outcome> {
    let Some(attack) = registry.get(name) else {
        writeln!(out, "{} {}", "Unknown attack:".red().bold(), name)?;
        writeln!(
            out,
            "Available attacks: {}",
            registry.names().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(out, "{USAGE_ATTACK}")?;
        return Ok(Outcome::UnknownAttack);
    };

    let [input, output] = opts.args.as_slice() else {
        return usage_error(out, USAGE_ATTACK);
    };
    let (input, output) = (Path::new(input), Path::new(output));
    if let Some(outcome) = check_input(out, input)? {
        return Ok(outcome);
    }

    debug!(attack = name, input = %input.display(), output = %output.display(), "running attack");
    attack.apply(input, output)?;
    writeln!(
        out,
        "Attack {} succeed! to file {}",
        name.green().bold(),
        output.to_string_lossy().green().bold()
    )?;

    match (opts.compare.as_deref(), opts.origin.as_deref()) {
        (Some(compare), Some(origin)) => {
            report_compare(out, make_compare(opts, None, output, origin, compare))?;
        }
        (Some(_), None) => debug!("--compare without --origin, skipping comparison"),
        _ => {}
    }

    Ok(Outcome::Completed)
}

/// 处理 `--embed`：位置参数为 <输入图像> <水印文本> <输出图像>。
pub fn handle_embed<W, E, F>(opts: &Cli, make_engine: F, out: &mut W) -> Result<Outcome>
where
    W: Write,
    E: WatermarkEngine,
    F: FnOnce(u64) -> E,
{
    let [input, text, output] = opts.args.as_slice() else {
        return usage_error(out, USAGE_EMBED);
    };
    let Some(password) = opts.password else {
        return missing_option(out, "--pwd", USAGE_EMBED);
    };
    let (input, output) = (Path::new(input), Path::new(output));
    if let Some(outcome) = check_input(out, input)? {
        return Ok(outcome);
    }

    let mut engine = make_engine(password);
    engine.read_img(input)?;
    engine.read_wm(text);
    engine.embed(output)?;

    writeln!(
        out,
        "Embed succeed! to file {}",
        output.to_string_lossy().green().bold()
    )?;
    writeln!(
        out,
        "Put down watermark size: {}",
        engine.wm_bit_len().to_string().green().bold()
    )?;

    if let Some(compare) = opts.compare.as_deref() {
        report_compare(out, make_compare(opts, Some(text.as_str()), output, input, compare))?;
    }

    Ok(Outcome::Completed)
}

/// 处理 `--extract`：位置参数为 <已嵌入水印的图像>，需要 `--pwd` 与 `--wm_shape`。
pub fn handle_extract<W, E, F>(opts: &Cli, make_engine: F, out: &mut W) -> Result<Outcome>
where
    W: Write,
    E: WatermarkEngine,
    F: FnOnce(u64) -> E,
{
    let [input] = opts.args.as_slice() else {
        return usage_error(out, USAGE_EXTRACT);
    };
    let Some(password) = opts.password else {
        return missing_option(out, "--pwd", USAGE_EXTRACT);
    };
    let Some(wm_shape) = opts.wm_shape else {
        return missing_option(out, "--wm_shape", USAGE_EXTRACT);
    };
    let input = Path::new(input);
    if let Some(outcome) = check_input(out, input)? {
        return Ok(outcome);
    }

    let mut engine = make_engine(password);
    let watermark = engine.extract(input, wm_shape)?;

    writeln!(out, "{}", "Extract succeed! watermark is:".green().bold())?;
    writeln!(out, "{watermark}")?;

    Ok(Outcome::Completed)
}
