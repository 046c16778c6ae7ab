//! 遍历模块：目录树的先序流式遍历
//!
//! 本模块负责目录树的遍历，提供：
//!
//! - **条目流**：`DirectoryEntry` 按先序深度优先顺序逐个产出，不构建树结构
//! - **分组顺序**：每个目录行之后先列出其直接文件，再进入子目录
//! - **确定性排序**：默认按名称排序，可关闭以保留文件系统枚举顺序
//! - **深度校验**：以相对根路径的组件数计算深度，并与遍历深度比对
//! - **预计数**：`count_entries` 统计根下条目总数，供进度计算使用
//!
//! 符号链接不跟随。除目录外的一切条目（普通文件、符号链接（包括指向目录的链接）、
//! FIFO、套接字、设备文件）都按 `EntryKind::File` 输出，因此目录链接会显示为
//! 一行文件而不会被展开或省略。
//!
//! 作者: WaterRun
//! 更新于: 2026-10-18

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::RenderError;

// ============================================================================
// 类型定义
// ============================================================================

/// 文件系统条目类型
///
/// # Examples
///
/// ```
/// use dirtree::walk::EntryKind;
///
/// assert_ne!(EntryKind::Directory, EntryKind::File);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// 目录
    Directory,
    /// 文件（含未跟随的符号链接）
    File,
}

/// 遍历产出的单个条目
///
/// 文件条目的深度等于其父目录深度加一。
///
/// # Examples
///
/// ```
/// use dirtree::walk::{DirectoryEntry, EntryKind};
///
/// let entry = DirectoryEntry::new(1, "main.rs", EntryKind::File);
/// assert_eq!(entry.depth, 1);
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// 相对根目录的层级（根为 0）
    pub depth: usize,
    /// 条目名称（不含路径）
    pub name: String,
    /// 条目类型
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// 创建条目
    #[must_use]
    pub fn new(depth: usize, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            depth,
            name: name.into(),
            kind,
        }
    }

    /// 是否为目录
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

// ============================================================================
// 遍历器
// ============================================================================

/// 目录树遍历器
///
/// 对根目录执行一次先序深度优先遍历，产出 `DirectoryEntry` 流。
///
/// # Examples
///
/// ```no_run
/// use dirtree::walk::TreeWalker;
///
/// let walker = TreeWalker::new(".", true);
/// for entry in walker.entries() {
///     let entry = entry.expect("遍历失败");
///     println!("{} {}", entry.depth, entry.name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// 根路径
    root: PathBuf,
    /// 是否按名称排序
    sort_entries: bool,
}

impl TreeWalker {
    /// 创建遍历器
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, sort_entries: bool) -> Self {
        Self {
            root: root.into(),
            sort_entries,
        }
    }

    /// 按先序产出所有条目（含根目录自身）
    ///
    /// 任一 IO 错误以 `RenderError::Traversal` 形式出现在流中。
    pub fn entries(&self) -> impl Iterator<Item = Result<DirectoryEntry, RenderError>> + '_ {
        let by_name = self.sort_entries;
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by(move |a, b| compare_entries(a, b, by_name))
            .into_iter()
            .map(move |item| {
                item.map_err(RenderError::from)
                    .and_then(|dent| self.to_entry(&dent))
            })
    }

    /// 将 walkdir 条目转换为 `DirectoryEntry`，并校验深度
    fn to_entry(&self, dent: &walkdir::DirEntry) -> Result<DirectoryEntry, RenderError> {
        let walk_depth = dent.depth();
        let path_depth = component_depth(&self.root, dent.path());

        if path_depth != Some(walk_depth) {
            return Err(RenderError::DepthMismatch {
                path: dent.path().to_path_buf(),
                walk_depth,
                path_depth: path_depth.unwrap_or(usize::MAX),
            });
        }

        if walk_depth == 0 {
            return Ok(DirectoryEntry::new(
                0,
                root_name(&self.root),
                EntryKind::Directory,
            ));
        }

        let kind = if dent.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        trace!(path = %dent.path().display(), depth = walk_depth, "visit");

        Ok(DirectoryEntry::new(
            walk_depth,
            dent.file_name().to_string_lossy().into_owned(),
            kind,
        ))
    }
}

/// 统计根目录下的条目总数（不含根自身）
///
/// # Errors
///
/// 遍历过程中的任一 IO 错误返回 `RenderError::Traversal`。
pub fn count_entries(root: &Path) -> Result<usize, RenderError> {
    let mut total = 0;
    for item in WalkDir::new(root).min_depth(1).follow_links(false) {
        item?;
        total += 1;
    }
    Ok(total)
}

/// 根目录显示名称
///
/// 优先使用路径最后一个组件；对于 `.`、`..` 或文件系统根这类没有名称的路径，
/// 先规范化再取名称，仍无名称时退回完整路径。
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dirtree::walk::root_name;
///
/// assert_eq!(root_name(Path::new("/srv/project")), "project");
/// assert_eq!(root_name(Path::new("/")), "/");
/// ```
#[must_use]
pub fn root_name(root: &Path) -> String {
    if let Some(name) = root.file_name() {
        return name.to_string_lossy().into_owned();
    }
    dunce::canonicalize(root)
        .ok()
        .and_then(|canonical| {
            canonical
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}

// ============================================================================
// 内部辅助函数
// ============================================================================

/// 由路径组件计算相对根目录的深度
fn component_depth(root: &Path, path: &Path) -> Option<usize> {
    path.strip_prefix(root)
        .ok()
        .map(|relative| relative.components().count())
}

/// 同级条目排序：文件在前、目录在后；按名称排序时忽略大小写，再以原名定序
fn compare_entries(a: &walkdir::DirEntry, b: &walkdir::DirEntry, by_name: bool) -> Ordering {
    let kind_order = a.file_type().is_dir().cmp(&b.file_type().is_dir());
    if kind_order != Ordering::Equal || !by_name {
        return kind_order;
    }

    let a_name = a.file_name().to_string_lossy();
    let b_name = b.file_name().to_string_lossy();
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // ------------------------------------------------------------------------
    // 测试辅助函数
    // ------------------------------------------------------------------------

    /// 创建基本测试目录结构
    ///
    /// ```text
    /// root/
    ///   Cargo.toml
    ///   README.md
    ///   src/
    ///     lib.rs
    ///     main.rs
    ///     bin/
    ///       tool.rs
    ///   empty/
    /// ```
    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().expect("创建临时目录失败");
        let root = dir.path();

        fs::create_dir_all(root.join("src/bin")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::write(root.join("Cargo.toml"), "[package]").unwrap();
        fs::write(root.join("README.md"), "# Test").unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("src/lib.rs"), "pub fn lib() {}").unwrap();
        fs::write(root.join("src/bin/tool.rs"), "fn main() {}").unwrap();

        dir
    }

    fn collect(root: &Path, sort: bool) -> Vec<DirectoryEntry> {
        TreeWalker::new(root, sort)
            .entries()
            .collect::<Result<Vec<_>, _>>()
            .expect("遍历失败")
    }

    // ------------------------------------------------------------------------
    // 遍历顺序测试
    // ------------------------------------------------------------------------

    #[test]
    fn test_walk_emits_root_first_at_depth_zero() {
        let dir = setup_test_dir();
        let entries = collect(dir.path(), true);

        let root = &entries[0];
        assert_eq!(root.depth, 0);
        assert!(root.is_dir());
        assert_eq!(root.name, root_name(dir.path()));
    }

    #[test]
    fn test_walk_sorted_order_lists_files_before_subdirectories() {
        let dir = setup_test_dir();
        let entries: Vec<(usize, String)> = collect(dir.path(), true)
            .into_iter()
            .skip(1)
            .map(|e| (e.depth, e.name))
            .collect();

        let expected: Vec<(usize, String)> = vec![
            (1, "Cargo.toml"),
            (1, "README.md"),
            (1, "empty"),
            (1, "src"),
            (2, "lib.rs"),
            (2, "main.rs"),
            (2, "bin"),
            (3, "tool.rs"),
        ]
        .into_iter()
        .map(|(d, n)| (d, n.to_string()))
        .collect();

        assert_eq!(entries, expected);
    }

    #[test]
    fn test_walk_file_depth_is_parent_depth_plus_one() {
        let dir = setup_test_dir();
        let entries = collect(dir.path(), true);

        let mut dir_stack: Vec<usize> = Vec::new();
        for entry in &entries {
            while dir_stack.last().is_some_and(|&d| d >= entry.depth) {
                dir_stack.pop();
            }
            if entry.depth > 0 {
                assert_eq!(dir_stack.last().copied(), Some(entry.depth - 1), "{entry:?}");
            }
            if entry.is_dir() {
                dir_stack.push(entry.depth);
            }
        }
    }

    #[test]
    fn test_walk_sort_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("beta.txt"), "").unwrap();
        fs::write(dir.path().join("Alpha.txt"), "").unwrap();
        fs::write(dir.path().join("gamma.txt"), "").unwrap();

        let names: Vec<String> = collect(dir.path(), true)
            .into_iter()
            .skip(1)
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Alpha.txt", "beta.txt", "gamma.txt"]);
    }

    #[test]
    fn test_walk_unsorted_still_groups_files_first() {
        let dir = setup_test_dir();
        let entries = collect(dir.path(), false);

        let top_level: Vec<&DirectoryEntry> = entries.iter().filter(|e| e.depth == 1).collect();
        let first_dir = top_level.iter().position(|e| e.is_dir()).unwrap();
        assert!(top_level[first_dir..].iter().all(|e| e.is_dir()));
        assert_eq!(entries.len(), 9);
    }

    #[test]
    fn test_walk_is_deterministic_when_sorted() {
        let dir = setup_test_dir();
        assert_eq!(collect(dir.path(), true), collect(dir.path(), true));
    }

    #[test]
    fn test_walk_empty_root_yields_only_root() {
        let dir = TempDir::new().unwrap();
        let entries = collect(dir.path(), true);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].depth, 0);
    }

    #[test]
    fn test_walk_missing_root_yields_traversal_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let first = TreeWalker::new(&missing, true).entries().next();
        assert!(matches!(first, Some(Err(RenderError::Traversal { .. }))));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_does_not_follow_symlinks() {
        let dir = setup_test_dir();
        std::os::unix::fs::symlink(dir.path().join("src"), dir.path().join("link")).unwrap();

        let entries = collect(dir.path(), true);
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert_eq!(link.kind, EntryKind::File);
        assert_eq!(link.depth, 1);
        // src 的内容只出现一次
        assert_eq!(entries.iter().filter(|e| e.name == "tool.rs").count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_renders_socket_as_file() {
        let dir = TempDir::new().unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(dir.path().join("ctl.sock")).unwrap();

        let entries = collect(dir.path(), true);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], DirectoryEntry::new(1, "ctl.sock", EntryKind::File));
    }

    // ------------------------------------------------------------------------
    // 计数与辅助函数测试
    // ------------------------------------------------------------------------

    #[test]
    fn test_count_entries_excludes_root() {
        let dir = setup_test_dir();
        assert_eq!(count_entries(dir.path()).unwrap(), 8);
    }

    #[test]
    fn test_count_entries_empty_dir_is_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(count_entries(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_component_depth() {
        let root = Path::new("/a/b");
        assert_eq!(component_depth(root, Path::new("/a/b")), Some(0));
        assert_eq!(component_depth(root, Path::new("/a/b/c/d")), Some(2));
        assert_eq!(component_depth(root, Path::new("/x")), None);
    }

    #[test]
    fn test_root_name_resolves_current_dir() {
        let name = root_name(Path::new("."));
        assert!(!name.is_empty());
        assert_ne!(name, ".");
    }
}
