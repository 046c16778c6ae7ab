//! 配置模块：定义全量 Config 及其子配置结构
//!
//! 本模块是用户意图的**单一事实来源**（Single Source of Truth）。
//! 所有命令行参数经 CLI 层解析后，统一转换为 `Config` 结构，
//! 后续遍历、渲染、输出各层仅依赖此配置，不再直接访问原始参数。
//!
//! 作者: WaterRun
//! 更新于: 2026-10-18

#![forbid(unsafe_code)]

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// 错误类型
// ============================================================================

/// 配置验证错误
///
/// 表示用户输入的参数组合不合法或无法满足运行条件时产生的错误。
///
/// # Examples
///
/// ```
/// use dirtree::config::ConfigError;
///
/// let err = ConfigError::ConflictingOptions {
///     opt_a: "--stdout".to_string(),
///     opt_b: "--output".to_string(),
///     reason: "choose one destination".to_string(),
/// };
/// assert!(err.to_string().contains("--stdout"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 选项之间存在冲突
    #[error("Option conflict: {opt_a} and {opt_b} cannot be used together ({reason})")]
    ConflictingOptions {
        /// 冲突选项 A
        opt_a: String,
        /// 冲突选项 B
        opt_b: String,
        /// 冲突原因
        reason: String,
    },

    /// 参数值无效
    #[error("Invalid value: {option} = {value} ({reason})")]
    InvalidValue {
        /// 选项名称
        option: String,
        /// 提供的值
        value: String,
        /// 无效原因
        reason: String,
    },

    /// 路径不存在或不可访问
    #[error("Invalid path: {path} ({reason})")]
    InvalidPath {
        /// 路径
        path: PathBuf,
        /// 原因
        reason: String,
    },

    /// 输出格式无法推导
    #[error(
        "Cannot infer output format from {path} (supported extensions: .txt, .md, .markdown, .html, .htm)"
    )]
    UnknownOutputFormat {
        /// 输出文件路径
        path: PathBuf,
    },
}

/// 配置验证结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

// ============================================================================
// 枚举类型定义
// ============================================================================

/// 输出格式
///
/// 决定每一行的语法以及整体包装方式。
///
/// # Examples
///
/// ```
/// use dirtree::config::OutputFormat;
///
/// assert_eq!(OutputFormat::from_str_loose("MD"), Some(OutputFormat::Markdown));
/// assert_eq!(OutputFormat::Text.extension(), "txt");
/// assert_eq!(OutputFormat::Html.extension(), "html");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 纯文本格式（默认）
    #[default]
    Text,
    /// Markdown 列表
    Markdown,
    /// HTML 文档
    Html,
}

impl OutputFormat {
    /// 从字符串松散解析输出格式（大小写不敏感）
    ///
    /// # Examples
    ///
    /// ```
    /// use dirtree::config::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_str_loose("text"), Some(OutputFormat::Text));
    /// assert_eq!(OutputFormat::from_str_loose("HTML"), Some(OutputFormat::Html));
    /// assert_eq!(OutputFormat::from_str_loose("pdf"), None);
    /// ```
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "markdown" | "md" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// 从文件扩展名推导输出格式
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use dirtree::config::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_extension(Path::new("out.txt")), Some(OutputFormat::Text));
    /// assert_eq!(OutputFormat::from_extension(Path::new("out.md")), Some(OutputFormat::Markdown));
    /// assert_eq!(OutputFormat::from_extension(Path::new("out.htm")), Some(OutputFormat::Html));
    /// assert_eq!(OutputFormat::from_extension(Path::new("out.unknown")), None);
    /// ```
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str_loose)
    }

    /// 获取格式对应的默认扩展名
    ///
    /// 文本格式为 `txt`，其余格式直接使用格式名。
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    /// 获取格式名称
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Html => "html",
        }
    }

    /// 获取所有有效的格式名称
    #[must_use]
    pub const fn valid_names() -> &'static [&'static str] {
        &["text", "txt", "markdown", "md", "html", "htm"]
    }
}

// ============================================================================
// 子配置结构
// ============================================================================

/// 默认缩进宽度
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// 缩进宽度上限
pub const MAX_INDENT_WIDTH: usize = 64;

/// 渲染选项
///
/// 单次渲染调用期间不可变。
///
/// # Examples
///
/// ```
/// use dirtree::config::{OutputFormat, RenderOptions};
///
/// let opts = RenderOptions::default();
/// assert_eq!(opts.format, OutputFormat::Text);
/// assert_eq!(opts.indent_width.get(), 4);
/// assert!(opts.sort_entries);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// 输出格式
    pub format: OutputFormat,
    /// 每层缩进宽度（文本/Markdown 为空格数，HTML 为像素）
    ///
    /// 不得超过 [`MAX_INDENT_WIDTH`]，否则渲染返回 `RenderError::IndentTooWide`。
    pub indent_width: NonZeroUsize,
    /// 是否按名称排序（否则保留文件系统枚举顺序）
    pub sort_entries: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            indent_width: NonZeroUsize::new(DEFAULT_INDENT_WIDTH).unwrap_or(NonZeroUsize::MIN),
            sort_entries: true,
        }
    }
}

impl RenderOptions {
    /// 以指定格式创建渲染选项，其余字段取默认值
    #[must_use]
    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// 缩进宽度是否在允许范围内
    #[must_use]
    pub const fn indent_in_range(&self) -> bool {
        self.indent_width.get() <= MAX_INDENT_WIDTH
    }
}

/// 输出选项
///
/// # Examples
///
/// ```
/// use dirtree::config::OutputOptions;
///
/// let opts = OutputOptions::default();
/// assert!(opts.output_path.is_none());
/// assert!(!opts.to_stdout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputOptions {
    /// 显式指定的输出文件路径（None 表示自动生成文件名）
    pub output_path: Option<PathBuf>,
    /// 是否仅输出到标准输出（不写文件）
    pub to_stdout: bool,
    /// 是否在 stderr 显示进度
    pub show_progress: bool,
    /// 是否显式指定了输出格式
    pub format_explicit: bool,
}

// ============================================================================
// 主配置结构
// ============================================================================

/// 全量配置
///
/// 用户意图的单一事实来源。CLI 解析后生成此结构，
/// 后续所有模块均依赖此配置运行。
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use dirtree::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.root_path, PathBuf::from("."));
/// assert!(!config.output.to_stdout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 根路径（起始目录）
    pub root_path: PathBuf,
    /// 渲染选项
    pub render: RenderOptions,
    /// 输出选项
    pub output: OutputOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            render: RenderOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

impl Config {
    /// 创建具有指定根路径的配置
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use dirtree::config::Config;
    ///
    /// let config = Config::with_root(PathBuf::from("/srv/data"));
    /// assert_eq!(config.root_path, PathBuf::from("/srv/data"));
    /// ```
    #[must_use]
    pub fn with_root(root_path: PathBuf) -> Self {
        Self {
            root_path,
            ..Self::default()
        }
    }

    /// 验证配置并补齐派生字段
    ///
    /// 执行以下操作：
    /// - 检查选项冲突
    /// - 验证根路径存在性并规范化
    /// - 未显式指定格式时，从输出路径扩展名推导格式
    ///
    /// # Errors
    ///
    /// 返回 `ConfigError` 如果：
    /// - `--stdout` 与 `--output` 同时出现
    /// - 根路径不存在或不是目录
    /// - 未指定格式且输出路径扩展名无法识别
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use dirtree::config::{Config, OutputFormat};
    ///
    /// let mut config = Config::default();
    /// config.output.output_path = Some(PathBuf::from("tree.html"));
    ///
    /// let validated = config.validate().unwrap();
    /// assert_eq!(validated.render.format, OutputFormat::Html);
    /// ```
    pub fn validate(mut self) -> ConfigResult<Self> {
        // 1. 选项冲突检查
        self.check_conflicts()?;

        // 2. 根路径验证与规范化
        self.validate_and_canonicalize_root_path()?;

        // 3. 派生字段：从输出路径推导格式
        if !self.output.format_explicit {
            if let Some(ref path) = self.output.output_path {
                self.render.format = OutputFormat::from_extension(path)
                    .ok_or_else(|| ConfigError::UnknownOutputFormat { path: path.clone() })?;
            }
        }

        Ok(self)
    }

    /// 验证根路径并规范化
    ///
    /// 使用 dunce 规范化路径，避免 Windows 上的 `\\?\` 前缀问题。
    fn validate_and_canonicalize_root_path(&mut self) -> ConfigResult<()> {
        if !self.root_path.exists() {
            return Err(ConfigError::InvalidPath {
                path: self.root_path.clone(),
                reason: "path does not exist".to_string(),
            });
        }

        if !self.root_path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: self.root_path.clone(),
                reason: "path is not a directory".to_string(),
            });
        }

        match dunce::canonicalize(&self.root_path) {
            Ok(canonical) => {
                self.root_path = canonical;
                Ok(())
            }
            Err(e) => Err(ConfigError::InvalidPath {
                path: self.root_path.clone(),
                reason: format!("cannot canonicalize path: {e}"),
            }),
        }
    }

    /// 检查选项冲突
    fn check_conflicts(&self) -> ConfigResult<()> {
        if self.output.to_stdout && self.output.output_path.is_some() {
            return Err(ConfigError::ConflictingOptions {
                opt_a: "--stdout".to_string(),
                opt_b: "--output".to_string(),
                reason: "output goes either to stdout or to a file".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ------------------------------------------------------------------------
    // OutputFormat 测试
    // ------------------------------------------------------------------------

    #[test]
    fn output_format_from_str_loose_should_parse_valid_names() {
        for name in OutputFormat::valid_names() {
            assert!(OutputFormat::from_str_loose(name).is_some(), "{name}");
        }
        assert_eq!(OutputFormat::from_str_loose("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str_loose("Markdown"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str_loose("htm"), Some(OutputFormat::Html));
    }

    #[test]
    fn output_format_from_str_loose_should_reject_unknown() {
        assert_eq!(OutputFormat::from_str_loose(""), None);
        assert_eq!(OutputFormat::from_str_loose("json"), None);
        assert_eq!(OutputFormat::from_str_loose("rtf"), None);
    }

    #[test]
    fn output_format_from_extension_should_recognize_valid_extensions() {
        assert_eq!(
            OutputFormat::from_extension(Path::new("a.TXT")),
            Some(OutputFormat::Text)
        );
        assert_eq!(
            OutputFormat::from_extension(Path::new("a.markdown")),
            Some(OutputFormat::Markdown)
        );
        assert_eq!(
            OutputFormat::from_extension(Path::new("dir/a.html")),
            Some(OutputFormat::Html)
        );
        assert_eq!(OutputFormat::from_extension(Path::new("a")), None);
        assert_eq!(OutputFormat::from_extension(Path::new("a.json")), None);
    }

    #[test]
    fn output_format_extension_should_follow_naming_rule() {
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Markdown.extension(), "markdown");
        assert_eq!(OutputFormat::Html.extension(), "html");
    }

    #[test]
    fn output_format_default_should_be_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    // ------------------------------------------------------------------------
    // RenderOptions / OutputOptions 测试
    // ------------------------------------------------------------------------

    #[test]
    fn render_options_default_should_have_expected_values() {
        let opts = RenderOptions::default();
        assert_eq!(opts.format, OutputFormat::Text);
        assert_eq!(opts.indent_width.get(), DEFAULT_INDENT_WIDTH);
        assert!(opts.sort_entries);
    }

    #[test]
    fn render_options_with_format_keeps_defaults() {
        let opts = RenderOptions::with_format(OutputFormat::Html);
        assert_eq!(opts.format, OutputFormat::Html);
        assert_eq!(opts.indent_width.get(), 4);
    }

    #[test]
    fn output_options_default_should_have_expected_values() {
        let opts = OutputOptions::default();
        assert!(opts.output_path.is_none());
        assert!(!opts.to_stdout);
        assert!(!opts.show_progress);
        assert!(!opts.format_explicit);
    }

    // ------------------------------------------------------------------------
    // Config 测试
    // ------------------------------------------------------------------------

    #[test]
    fn config_default_should_use_current_directory() {
        let config = Config::default();
        assert_eq!(config.root_path, PathBuf::from("."));
        assert_eq!(config.render, RenderOptions::default());
        assert_eq!(config.output, OutputOptions::default());
    }

    #[test]
    fn validate_should_canonicalize_root() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let config = Config::with_root(dir.path().to_path_buf());
        let validated = config.validate().expect("验证应通过");
        assert!(validated.root_path.is_absolute());
        assert_eq!(
            validated.root_path,
            dunce::canonicalize(dir.path()).expect("规范化失败")
        );
    }

    #[test]
    fn validate_should_reject_missing_root() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let config = Config::with_root(dir.path().join("missing"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn validate_should_reject_file_root() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").expect("写入失败");
        let err = Config::with_root(file).validate().unwrap_err();
        match err {
            ConfigError::InvalidPath { reason, .. } => assert!(reason.contains("not a directory")),
            other => panic!("期望 InvalidPath，实际: {other:?}"),
        }
    }

    #[test]
    fn validate_should_infer_format_from_output_extension() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let mut config = Config::with_root(dir.path().to_path_buf());
        config.output.output_path = Some(PathBuf::from("tree.md"));
        let validated = config.validate().expect("验证应通过");
        assert_eq!(validated.render.format, OutputFormat::Markdown);
    }

    #[test]
    fn validate_should_keep_explicit_format() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let mut config = Config::with_root(dir.path().to_path_buf());
        config.render.format = OutputFormat::Html;
        config.output.format_explicit = true;
        config.output.output_path = Some(PathBuf::from("tree.txt"));
        let validated = config.validate().expect("验证应通过");
        assert_eq!(validated.render.format, OutputFormat::Html);
    }

    #[test]
    fn validate_should_reject_unknown_extension_without_format() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let mut config = Config::with_root(dir.path().to_path_buf());
        config.output.output_path = Some(PathBuf::from("tree.json"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOutputFormat { .. }));
    }

    #[test]
    fn validate_should_reject_stdout_with_output() {
        let dir = TempDir::new().expect("创建临时目录失败");
        let mut config = Config::with_root(dir.path().to_path_buf());
        config.output.to_stdout = true;
        config.output.output_path = Some(PathBuf::from("tree.txt"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingOptions { .. }));
    }
}
