//! dirtree 主程序入口
//!
//! 本模块实现 `dirtree` 命令行工具的主入口，串联以下流程：
//!
//! 1. **CLI 解析**：解析命令行参数并验证配置，产出 `ParseResult`
//! 2. **树形渲染**：遍历目录并渲染为文本，产出 `RenderResult`
//! 3. **结果输出**：输出到 stdout 或文件
//!
//! 日志通过 `tracing` 输出到 stderr，默认级别为 `warn`，可用 `RUST_LOG` 覆盖。
//! Ctrl-C 会设置取消标志，渲染在下一个目录处中止。
//!
//! # 退出码
//!
//! - `0`：成功
//! - `1`：参数或配置错误
//! - `2`：渲染错误
//! - `3`：输出错误
//!
//! 文件: src/main.rs
//! 作者: WaterRun
//! 更新于: 2026-10-18

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use dirtree::cli::{self, CliError, CliParser, ParseResult};
use dirtree::config::Config;
use dirtree::error::{DirtreeError, RenderError, path_display};
use dirtree::output::{self, OutputTarget};
use dirtree::render::TreeRenderer;

/// 退出码：成功
const EXIT_SUCCESS: u8 = 0;

/// 退出码：参数或配置错误
const EXIT_CLI_ERROR: u8 = 1;

/// 退出码：渲染错误
const EXIT_RENDER_ERROR: u8 = 2;

/// 退出码：输出错误
const EXIT_OUTPUT_ERROR: u8 = 3;

/// 程序主入口
fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            let code = error_to_exit_code(&e);
            print_error(&e);
            ExitCode::from(code)
        }
    }
}

/// 初始化日志订阅器（输出到 stderr）
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// 执行主流程
fn run() -> Result<(), DirtreeError> {
    let parse_result = CliParser::from_env().parse()?;

    match parse_result {
        ParseResult::Help => {
            cli::print_help();
            Ok(())
        }
        ParseResult::Version => {
            cli::print_version();
            Ok(())
        }
        ParseResult::Config(config) => render_and_output(&config),
    }
}

/// 渲染目录树并输出结果
fn render_and_output(config: &Config) -> Result<(), DirtreeError> {
    debug!(?config, "config validated");

    let renderer = TreeRenderer::new(config.render).with_cancel_flag(install_cancel_handler());

    let result = if config.output.show_progress {
        let mut report = |fraction: f64| {
            eprint!("\rProgress: {:>3.0}%", fraction * 100.0);
            let _ = io::stderr().flush();
        };
        let result = renderer.render(&config.root_path, Some(&mut report));
        eprintln!();
        result?
    } else {
        renderer.render(&config.root_path, None)?
    };

    debug!(
        directories = result.directory_count,
        files = result.file_count,
        "tree rendered"
    );

    if let OutputTarget::File(path) = output::execute_output(&result, config)? {
        println!("Tree structure saved to {}", path_display(&path));
    }
    Ok(())
}

/// 安装 Ctrl-C 处理器，返回取消标志
///
/// 处理器安装失败时仅记录警告，渲染仍可正常进行。
fn install_cancel_handler() -> Arc<AtomicBool> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("failed to install Ctrl-C handler: {e}");
    }
    cancelled
}

/// 将错误映射为退出码
fn error_to_exit_code(err: &DirtreeError) -> u8 {
    match err {
        DirtreeError::Cli(_) => EXIT_CLI_ERROR,
        DirtreeError::Render(_) => EXIT_RENDER_ERROR,
        DirtreeError::Output(_) => EXIT_OUTPUT_ERROR,
    }
}

/// 打印错误信息到 stderr
fn print_error(err: &DirtreeError) {
    let prefix = match err {
        DirtreeError::Cli(_) => "CLI error",
        DirtreeError::Render(_) => "Render error",
        DirtreeError::Output(_) => "Output error",
    };

    eprintln!("dirtree: {prefix}: {err}");

    match err {
        DirtreeError::Cli(CliError::UnknownOption { .. }) => {
            eprintln!("Hint: run `dirtree --help` to list available options");
        }
        DirtreeError::Cli(CliError::MultiplePaths { .. }) => {
            eprintln!("Hint: only one target path can be specified.");
        }
        DirtreeError::Render(RenderError::Cancelled) => {
            eprintln!("Hint: no output was written.");
        }
        _ => {}
    }
}
