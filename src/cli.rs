//! 命令行参数解析模块
//!
//! 本模块实现 `dirtree` 命令行工具的参数解析功能，支持三种参数风格混用：
//!
//! - Windows CMD 风格 (`/F`)，大小写不敏感
//! - Unix 短参数风格 (`-f`)，大小写敏感
//! - GNU 长参数风格 (`--format`)，大小写敏感，支持 `--format=html`
//!
//! 以 `/` 开头但不匹配任何 CMD 选项的参数视为路径（Unix 绝对路径）。
//! 参数以 `OsString` 读取；非 UTF-8 参数不会是选项，可作为路径或
//! `--output` 的值（需使用分开的 `--output <PATH>` 形式）。
//!
//! 解析完成后产出 [`Config`] 结构体，供后续渲染、输出模块使用。
//!
//! # 示例
//!
//! ```no_run
//! use dirtree::cli::{CliParser, ParseResult};
//!
//! let args = vec!["./project".to_string(), "--format".to_string(), "md".to_string()];
//! match CliParser::new(args).parse() {
//!     Ok(ParseResult::Config(config)) => println!("{:?}", config),
//!     Ok(ParseResult::Help) => println!("显示帮助"),
//!     Ok(ParseResult::Version) => println!("显示版本"),
//!     Err(e) => eprintln!("错误: {}", e),
//! }
//! ```
//!
//! 文件: src/cli.rs
//! 作者: WaterRun
//! 更新于: 2026-10-18

#![forbid(unsafe_code)]

use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::config::{Config, MAX_INDENT_WIDTH, OutputFormat};
pub use crate::error::CliError;

// ============================================================================
// 解析结果枚举
// ============================================================================

/// 解析结果
///
/// 表示命令行解析后的三种可能结果。
#[derive(Debug)]
pub enum ParseResult {
    /// 正常配置，需要执行渲染
    Config(Config),
    /// 用户请求显示帮助信息
    Help,
    /// 用户请求显示版本信息
    Version,
}

// ============================================================================
// 参数定义
// ============================================================================

/// 参数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    /// 标志型参数（无需值）
    Flag,
    /// 带值型参数（需要后跟一个值）
    Value,
}

/// 参数定义结构体
struct ArgDef {
    /// 规范名称（用于重复检测和错误消息）
    canonical: &'static str,
    /// 参数类型
    kind: ArgKind,
    /// Windows CMD 风格 (`/X`)，大小写不敏感
    cmd_patterns: &'static [&'static str],
    /// Unix 短参数 (`-x`)，大小写敏感
    short_patterns: &'static [&'static str],
    /// GNU 长参数 (`--xxx`)，大小写敏感
    long_patterns: &'static [&'static str],
}

/// 所有支持的参数定义
const ARG_DEFINITIONS: &[ArgDef] = &[
    // 信息显示类
    ArgDef {
        canonical: "help",
        kind: ArgKind::Flag,
        cmd_patterns: &["/?"],
        short_patterns: &["-h"],
        long_patterns: &["--help"],
    },
    ArgDef {
        canonical: "version",
        kind: ArgKind::Flag,
        cmd_patterns: &["/V"],
        short_patterns: &["-v"],
        long_patterns: &["--version"],
    },
    // 渲染类
    ArgDef {
        canonical: "format",
        kind: ArgKind::Value,
        cmd_patterns: &["/F"],
        short_patterns: &["-f"],
        long_patterns: &["--format"],
    },
    ArgDef {
        canonical: "indent",
        kind: ArgKind::Value,
        cmd_patterns: &["/I"],
        short_patterns: &["-i"],
        long_patterns: &["--indent"],
    },
    ArgDef {
        canonical: "unsorted",
        kind: ArgKind::Flag,
        cmd_patterns: &["/U"],
        short_patterns: &["-u"],
        long_patterns: &["--unsorted"],
    },
    // 输出控制类
    ArgDef {
        canonical: "output",
        kind: ArgKind::Value,
        cmd_patterns: &["/O"],
        short_patterns: &["-o"],
        long_patterns: &["--output"],
    },
    ArgDef {
        canonical: "stdout",
        kind: ArgKind::Flag,
        cmd_patterns: &["/S"],
        short_patterns: &["-s"],
        long_patterns: &["--stdout"],
    },
    ArgDef {
        canonical: "progress",
        kind: ArgKind::Flag,
        cmd_patterns: &["/P"],
        short_patterns: &["-p"],
        long_patterns: &["--progress"],
    },
];

// ============================================================================
// 参数匹配结果
// ============================================================================

/// 参数匹配结果
struct MatchedArg {
    /// 匹配到的参数定义
    definition: &'static ArgDef,
    /// 参数值（如果是带值参数）
    value: Option<OsString>,
}

// ============================================================================
// 命令行解析器
// ============================================================================

/// 命令行参数解析器
///
/// # 路径位置规则
///
/// 路径参数可以出现在任意位置，包括选项之前、之后或之间。
///
/// # Examples
///
/// ```
/// use dirtree::cli::{CliParser, ParseResult};
///
/// let parser = CliParser::new(vec!["--help".to_string()]);
/// assert!(matches!(parser.parse(), Ok(ParseResult::Help)));
/// ```
pub struct CliParser {
    /// 待解析的参数列表
    args: Vec<OsString>,
    /// 当前解析位置
    position: usize,
    /// 已使用的规范名称集合（用于重复检测）
    seen_canonical_names: HashSet<String>,
}

impl CliParser {
    /// 从参数列表创建解析器
    ///
    /// # 参数
    ///
    /// * `args` - 命令行参数列表（不包含程序名）
    #[must_use]
    pub fn new<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            position: 0,
            seen_canonical_names: HashSet::new(),
        }
    }

    /// 从环境参数创建解析器
    ///
    /// 自动跳过程序名（第一个参数）。
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env::args_os().skip(1))
    }

    /// 解析命令行参数
    ///
    /// 解析完成后调用 `Config::validate()` 验证配置有效性。
    ///
    /// # Errors
    ///
    /// - `CliError::UnknownOption` - 遇到未知参数
    /// - `CliError::MissingValue` - 需要值的参数缺少值
    /// - `CliError::InvalidValue` - 参数值无效
    /// - `CliError::DuplicateOption` - 参数重复
    /// - `CliError::MultiplePaths` - 指定了多个路径
    /// - `CliError::InvalidConfig` - 配置验证失败
    pub fn parse(mut self) -> Result<ParseResult, CliError> {
        let mut config = Config::default();
        let mut collected_paths: Vec<OsString> = Vec::new();

        while self.position < self.args.len() {
            let current_arg = self.args[self.position].clone();

            // 非 UTF-8 参数只能是路径
            let Some(arg) = current_arg.to_str() else {
                if Self::is_dash_option(&current_arg.to_string_lossy()) {
                    return Err(CliError::UnknownOption {
                        option: current_arg.to_string_lossy().into_owned(),
                    });
                }
                collected_paths.push(current_arg);
                self.position += 1;
                continue;
            };

            if let Some(matched) = self.try_match_argument(arg)? {
                self.register_canonical_name(matched.definition.canonical)?;

                // 帮助和版本信息立即返回
                if matched.definition.canonical == "help" {
                    return Ok(ParseResult::Help);
                }
                if matched.definition.canonical == "version" {
                    return Ok(ParseResult::Version);
                }

                Self::apply_to_config(&mut config, &matched)?;
            } else if Self::is_dash_option(arg) {
                return Err(CliError::UnknownOption {
                    option: arg.to_string(),
                });
            } else {
                // 非选项参数视为路径
                collected_paths.push(current_arg);
            }

            self.position += 1;
        }

        Self::validate_paths(&collected_paths, &mut config)?;

        let validated_config = config.validate()?;
        Ok(ParseResult::Config(validated_config))
    }

    /// 判断是否为 `-x` / `--xxx` 形式的参数（单独的 `-` 不算）
    fn is_dash_option(arg: &str) -> bool {
        arg.starts_with('-') && arg.len() > 1
    }

    /// 判断参数是否为已知选项
    fn is_known_option(arg: &str) -> bool {
        let arg_upper = arg.to_uppercase();
        ARG_DEFINITIONS.iter().any(|def| {
            def.cmd_patterns.iter().any(|p| arg_upper == p.to_uppercase())
                || def.short_patterns.iter().any(|p| *p == arg)
                || def.long_patterns.iter().any(|p| {
                    arg == *p || arg.starts_with(&format!("{p}="))
                })
        })
    }

    /// 尝试匹配参数到已知定义
    fn try_match_argument(&mut self, arg: &str) -> Result<Option<MatchedArg>, CliError> {
        for def in ARG_DEFINITIONS {
            if let Some(matched) = self.try_match_definition(arg, def)? {
                return Ok(Some(matched));
            }
        }
        Ok(None)
    }

    /// 尝试将参数与特定定义匹配
    fn try_match_definition(
        &mut self,
        arg: &str,
        def: &'static ArgDef,
    ) -> Result<Option<MatchedArg>, CliError> {
        let arg_upper = arg.to_uppercase();

        // CMD 风格匹配（大小写不敏感）
        let cmd_hit = def
            .cmd_patterns
            .iter()
            .any(|pattern| arg_upper == pattern.to_uppercase());
        // Unix 短参数与 GNU 长参数匹配（大小写敏感）
        let exact_hit = def.short_patterns.iter().any(|p| *p == arg)
            || def.long_patterns.iter().any(|p| *p == arg);

        if cmd_hit || exact_hit {
            let value = self.consume_value_if_required(def, arg)?;
            return Ok(Some(MatchedArg {
                definition: def,
                value,
            }));
        }

        // 支持 --option=value 语法
        if def.kind == ArgKind::Value {
            for pattern in def.long_patterns {
                if let Some(value) = arg.strip_prefix(&format!("{pattern}=")) {
                    return Ok(Some(MatchedArg {
                        definition: def,
                        value: Some(OsString::from(value)),
                    }));
                }
            }
        }

        Ok(None)
    }

    /// 如果参数需要值，消费下一个参数作为值
    fn consume_value_if_required(
        &mut self,
        def: &ArgDef,
        arg: &str,
    ) -> Result<Option<OsString>, CliError> {
        if def.kind == ArgKind::Flag {
            return Ok(None);
        }

        let next_position = self.position + 1;
        let Some(next_arg) = self.args.get(next_position) else {
            return Err(CliError::MissingValue {
                option: arg.to_string(),
            });
        };

        let looks_like_option = next_arg
            .to_str()
            .is_some_and(|s| Self::is_dash_option(s) || Self::is_known_option(s));
        if looks_like_option {
            return Err(CliError::MissingValue {
                option: arg.to_string(),
            });
        }

        let value = next_arg.clone();
        self.position += 1;
        Ok(Some(value))
    }

    /// 注册已使用的规范名称，检测重复
    fn register_canonical_name(&mut self, canonical: &str) -> Result<(), CliError> {
        if !self.seen_canonical_names.insert(canonical.to_string()) {
            return Err(CliError::DuplicateOption {
                option: canonical.to_string(),
            });
        }
        Ok(())
    }

    /// 将匹配的参数应用到配置
    fn apply_to_config(config: &mut Config, matched: &MatchedArg) -> Result<(), CliError> {
        let canonical = matched.definition.canonical;
        let value = matched.value.clone().unwrap_or_default();
        let text = value.to_string_lossy();
        let invalid = |reason: String| CliError::InvalidValue {
            option: canonical.to_string(),
            value: text.to_string(),
            reason,
        };

        match canonical {
            "format" => {
                config.render.format = OutputFormat::from_str_loose(&text).ok_or_else(|| {
                    invalid(format!("expected one of {}", OutputFormat::valid_names().join(", ")))
                })?;
                config.output.format_explicit = true;
            }
            "indent" => {
                let width: usize = text
                    .parse()
                    .map_err(|_| invalid("must be a positive integer".to_string()))?;
                if width > MAX_INDENT_WIDTH {
                    return Err(invalid(format!(
                        "indent width must not exceed {MAX_INDENT_WIDTH}"
                    )));
                }
                config.render.indent_width = NonZeroUsize::new(width)
                    .ok_or_else(|| invalid("indent width must be greater than 0".to_string()))?;
            }
            "unsorted" => config.render.sort_entries = false,
            "output" => config.output.output_path = Some(PathBuf::from(&value)),
            "stdout" => config.output.to_stdout = true,
            "progress" => config.output.show_progress = true,
            _ => {}
        }

        Ok(())
    }

    /// 验证路径参数
    fn validate_paths(paths: &[OsString], config: &mut Config) -> Result<(), CliError> {
        match paths {
            [] => Ok(()),
            [single] => {
                config.root_path = PathBuf::from(single);
                Ok(())
            }
            _ => Err(CliError::MultiplePaths {
                paths: paths
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
            }),
        }
    }
}

// ============================================================================
// 帮助与版本信息
// ============================================================================

/// 获取帮助信息字符串
///
/// # Examples
///
/// ```
/// use dirtree::cli::help_text;
///
/// assert!(help_text().contains("--format"));
/// ```
#[must_use]
pub fn help_text() -> &'static str {
    r#"dirtree: Render a directory hierarchy as a text, Markdown or HTML tree.

Usage:
  dirtree [<PATH>] [<OPTIONS>...]

Options:
  --help, -h, /?                Show help information
  --version, -v, /V             Show version information
  --format, -f, /F <FORMAT>     Output format: text (default), markdown, html
  --indent, -i, /I <N>          Indentation width per level, 1-64 (default: 4)
  --unsorted, -u, /U            Keep filesystem order instead of sorting by name
  --output, -o, /O <FILE>       Write output to FILE (.txt, .md, .html)
  --stdout, -s, /S              Print to stdout instead of writing a file
  --progress, -p, /P            Report progress on stderr

Without --output or --stdout the tree is saved as
<PATH>/<name>_tree_<timestamp>.<ext>.

Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostic logging."#
}

/// 获取版本信息字符串
#[must_use]
pub fn version_text() -> String {
    format!(
        "dirtree version {}\n\nRender a directory hierarchy as a text, Markdown or HTML tree.\n\nauthor: WaterRun",
        env!("CARGO_PKG_VERSION")
    )
}

/// 打印帮助信息到标准输出
pub fn print_help() {
    println!("{}", help_text());
}

/// 打印版本信息到标准输出
pub fn print_version() {
    println!("{}", version_text());
}

// ============================================================================
// 单元测试
// ============================================================================
