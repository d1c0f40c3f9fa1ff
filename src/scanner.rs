use std::path::Path;

use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::types::{Occurrence, SourceLocation};

/// Documentation file extensions that are scanned for directives.
const DOC_EXTENSIONS: [&str; 3] = ["md", "rst", "txt"];

/// How a documentation file is marked up, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markup {
    /// `.md`: only MyST fences declare objects.
    Markdown,
    /// `.rst` and `.txt`: only `.. prefix:directive::` lines declare objects.
    Restructured,
}

impl Markup {
    /// Markup of a document path. Anything that is not `.md` reads as reST.
    pub fn of(document: &Path) -> Self {
        return match document.extension().and_then(|e| return e.to_str()) {
            Some("md") => Self::Markdown,
            _ => Self::Restructured,
        };
    }
}

/// Compiled directive-line patterns for reStructuredText and MyST markdown.
pub struct DirectivePatterns {
    /// `.. code-block::` and friends, whose indented body is literal text.
    literal_directive: Regex,
    /// `` ```{go:function} signature `` fence openers.
    myst: Regex,
    /// `.. go:function:: signature` lines.
    rst: Regex,
}

impl DirectivePatterns {
    /// Compile the directive-line patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn compile() -> Result<Self, Error> {
        return Ok(Self {
            literal_directive: Regex::new(
                r"^\s*\.\.\s+(?:code-block|code|sourcecode|parsed-literal)::",
            )?,
            myst: Regex::new(
                r"^\s*(?:`{3,}|~{3,})\{(?P<prefix>[A-Za-z][\w-]*):(?P<directive>[a-z]+)\}\s*(?P<signature>.*?)\s*$",
            )?,
            rst: Regex::new(
                r"^\s*\.\.\s+(?P<prefix>[A-Za-z][\w-]*):(?P<directive>[a-z]+)::(?:\s+(?P<signature>.*?))?\s*$",
            )?,
        });
    }
}

/// Scan all documentation files under `root` and extract prefixed directives
/// in traversal order: files sorted by path, lines top to bottom.
/// Applies the config's include/exclude filters. Files that are not UTF-8
/// are skipped with a warning.
///
/// # Errors
///
/// Returns `Error::Io` if any documentation file cannot be read.
pub fn scan(root: &Path, config: &Config, patterns: &DirectivePatterns) -> Result<Vec<Occurrence>, Error> {
    let mut occurrences = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| return e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file() && has_doc_extension(e.path()))
    {
        let doc_path = entry.path();
        let relative = doc_path.strip_prefix(root).unwrap_or(doc_path).to_path_buf();

        if !config.should_scan(&relative.to_string_lossy()) {
            tracing::debug!(document = %relative.display(), "skipped by config");
            continue;
        }

        let content = match String::from_utf8(std::fs::read(doc_path)?) {
            Err(e) => {
                tracing::warn!(document = %relative.display(), "skipped, not UTF-8: {}", e.utf8_error());
                continue;
            },
            Ok(c) => c,
        };
        let before = occurrences.len();
        extract_directives_from_content(&content, &relative, patterns, &mut occurrences);
        tracing::debug!(
            document = %relative.display(),
            directives = occurrences.len().saturating_sub(before),
            "scanned"
        );
    }

    return Ok(occurrences);
}

/// Extract every prefixed directive from one document's content. The
/// document's extension picks the syntax; code examples are never read as
/// declarations.
pub fn extract_directives_from_content(
    content: &str,
    document: &Path,
    patterns: &DirectivePatterns,
    out: &mut Vec<Occurrence>,
) {
    let lines: Vec<&str> = content.lines().collect();
    let declaring = match Markup::of(document) {
        Markup::Markdown => markdown_directive_lines(&lines, &patterns.myst),
        Markup::Restructured => rst_directive_lines(&lines, patterns),
    };

    for (idx, caps) in declaring {
        let line_number = u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX);
        let following = lines.get(idx.saturating_add(1)..).unwrap_or_default();
        let no_index = directive_options(following).any(|o| return o == "noindex" || o == "no-index");
        out.push(Occurrence {
            directive: caps.name("directive").map_or("", |m| return m.as_str()).to_string(),
            location: SourceLocation { document: document.to_path_buf(), line: line_number },
            no_index,
            prefix: caps.name("prefix").map_or("", |m| return m.as_str()).to_string(),
            signature: caps.name("signature").map_or("", |m| return m.as_str()).to_string(),
        });
    }
}

// ── Markdown ──────────────────────────────────────────────────────────

/// An open code fence.
#[derive(Debug, Clone, Copy)]
struct Fence {
    /// Whether the fence is a MyST directive, whose body is still markup.
    directive: bool,
    /// Fence character, backtick or tilde.
    marker: char,
    /// Length of the opening run.
    width: usize,
}

/// The fence run at the start of a line: its character, length, and the
/// text after it. At most three spaces of indentation.
fn fence_run(line: &str) -> Option<(char, usize, &str)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len().saturating_sub(trimmed.len()) > 3 {
        return None;
    }
    let marker = trimmed.chars().next().filter(|c| return *c == '`' || *c == '~')?;
    let width = trimmed.chars().take_while(|c| return *c == marker).count();
    if width < 3 {
        return None;
    }
    return Some((marker, width, trimmed.get(width..).unwrap_or_default()));
}

/// Lines of a markdown document that open a MyST directive. Lines inside
/// ordinary code fences are literal and never match.
fn markdown_directive_lines<'l>(lines: &[&'l str], myst: &Regex) -> Vec<(usize, Captures<'l>)> {
    let mut found = Vec::new();
    let mut open: Vec<Fence> = Vec::new();

    for (idx, line) in lines.iter().copied().enumerate() {
        let run = fence_run(line);

        if let (Some(top), Some((marker, width, rest))) = (open.last(), run)
            && marker == top.marker
            && width >= top.width
            && rest.trim().is_empty()
        {
            open.pop();
            continue;
        }
        if open.last().is_some_and(|f| return !f.directive) {
            continue;
        }
        let Some((marker, width, _)) = run else {
            continue;
        };

        if let Some(caps) = myst.captures(line) {
            found.push((idx, caps));
            open.push(Fence { directive: true, marker, width });
        } else {
            open.push(Fence { directive: false, marker, width });
        }
    }
    return found;
}

// ── reStructuredText ──────────────────────────────────────────────────

/// Columns of leading whitespace.
fn indent_of(line: &str) -> usize {
    return line.len().saturating_sub(line.trim_start().len());
}

/// Lines of a reST document that are object directives. The indented body
/// after a `::` paragraph or a `.. code-block::` is literal and skipped.
fn rst_directive_lines<'l>(lines: &[&'l str], patterns: &DirectivePatterns) -> Vec<(usize, Captures<'l>)> {
    let mut found = Vec::new();
    let mut literal_indent: Option<usize> = None;

    for (idx, line) in lines.iter().copied().enumerate() {
        if let Some(marker_indent) = literal_indent {
            if line.trim().is_empty() || indent_of(line) > marker_indent {
                continue;
            }
            literal_indent = None;
        }

        if let Some(caps) = patterns.rst.captures(line) {
            found.push((idx, caps));
            continue;
        }

        let trimmed = line.trim();
        let explicit_markup = trimmed.starts_with("..");
        if patterns.literal_directive.is_match(line) || (!explicit_markup && trimmed.ends_with("::")) {
            literal_indent = Some(indent_of(line));
        }
    }
    return found;
}

/// Option names from the `:name: value` block directly under a directive.
/// The block ends at the first line that is not an option.
fn directive_options<'l>(following: &'l [&'l str]) -> impl Iterator<Item = &'l str> {
    return following
        .iter()
        .map(|line| return line.trim())
        .take_while(|line| return line.starts_with(':'))
        .filter_map(|line| return line.get(1..)?.split_once(':').map(|(name, _)| return name));
}

/// Whether the path ends in a scanned documentation extension.
pub(crate) fn has_doc_extension(path: &Path) -> bool {
    return path
        .extension()
        .and_then(|e| return e.to_str())
        .is_some_and(|ext| return DOC_EXTENSIONS.contains(&ext));
}

/// Dot-directories (`.git`, build output) are never documentation.
pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    return name.to_string_lossy().starts_with('.');
}
