//! Content discovery.
//!
//! A `ContentScanner` turns content globs into a lazy stream of documents.
//! Each call to [`ContentScanner::scan`] walks the file system again; the
//! stream is single-pass and stops for good after the first fatal error.

use crate::error::ScanError;
use globset::{GlobBuilder, GlobMatcher};
use sieve_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Characters that make a path component a glob rather than a literal.
const GLOB_META: &[char] = &['*', '?', '[', '{', '\\'];

/// A matched document and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    /// File extension without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// One step of a scan.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    Document(Document),
    /// The document matched but is not text; scanning continues.
    Skipped(DiagnosticMessage),
}

/// Expands content globs into documents.
///
/// Patterns use `globset` syntax: `*` and `?` stay within one path
/// component, `**` crosses components and `{a,b}` picks alternatives.
#[derive(Debug, Clone, Default)]
pub struct ContentScanner {
    patterns: Vec<String>,
    root: Option<PathBuf>,
}

impl ContentScanner {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            root: None,
        }
    }

    /// Resolve relative patterns against `root` instead of the working directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Start a scan.
    ///
    /// Matches are yielded pattern by pattern, in pattern order, skipping
    /// directories and any file already yielded under another pattern.
    /// Within a pattern, files come in file-name order, depth first.
    pub fn scan(&self) -> Documents {
        let anchor = match &self.root {
            Some(root) if !root.as_os_str().is_empty() => root.clone(),
            _ => PathBuf::from("."),
        };

        Documents {
            anchor,
            pending: self.patterns.iter().cloned().collect(),
            current: None,
            seen: HashSet::new(),
            finished: false,
        }
    }
}

/// A pattern split into the directory to walk and the glob to match below it.
#[derive(Debug)]
struct CompiledPattern {
    base: PathBuf,
    /// `None` when the pattern names a single path.
    matcher: Option<GlobMatcher>,
}

fn compile(pattern: &str, anchor: &Path) -> Result<CompiledPattern, ScanError> {
    let relative = pattern.strip_prefix("./").unwrap_or(pattern);
    let components: Vec<&str> = relative.split('/').collect();
    let literal_len = components
        .iter()
        .position(|component| component.contains(GLOB_META))
        .unwrap_or(components.len());

    let literal = components[..literal_len].join("/");
    let base = if literal.is_empty() {
        anchor.to_path_buf()
    } else {
        anchor.join(&literal)
    };

    let rest = &components[literal_len..];
    if rest.is_empty() {
        return Ok(CompiledPattern { base, matcher: None });
    }

    let matcher = GlobBuilder::new(&rest.join("/"))
        .literal_separator(true)
        .build()
        .map_err(|err| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.kind().to_string(),
        })?
        .compile_matcher();

    Ok(CompiledPattern {
        base,
        matcher: Some(matcher),
    })
}

/// Lazy stream of scan events. See [`ContentScanner::scan`].
pub struct Documents {
    anchor: PathBuf,
    pending: VecDeque<String>,
    current: Option<ActivePattern>,
    seen: HashSet<PathBuf>,
    finished: bool,
}

struct ActivePattern {
    pattern: String,
    compiled: CompiledPattern,
    walk: walkdir::IntoIter,
    matched: usize,
}

impl ActivePattern {
    fn new(pattern: String, compiled: CompiledPattern) -> Self {
        let walker = WalkDir::new(&compiled.base)
            .follow_links(true)
            .sort_by_file_name();
        let walker = match compiled.matcher {
            Some(_) => walker.min_depth(1),
            None => walker.max_depth(0),
        };

        Self {
            pattern,
            walk: walker.into_iter(),
            compiled,
            matched: 0,
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match &self.compiled.matcher {
            Some(matcher) => path
                .strip_prefix(&self.compiled.base)
                .is_ok_and(|relative| matcher.is_match(relative)),
            None => true,
        }
    }
}

impl Documents {
    fn fail(&mut self, err: ScanError) -> Option<Result<ScanEvent, ScanError>> {
        self.finished = true;
        self.current = None;
        self.pending.clear();
        Some(Err(err))
    }

    fn next_path(&mut self) -> Option<Result<PathBuf, ScanError>> {
        loop {
            if let Some(active) = &mut self.current {
                match active.walk.next() {
                    Some(Ok(entry)) => {
                        if entry.file_type().is_dir() || !active.matches(entry.path()) {
                            continue;
                        }
                        active.matched += 1;
                        let path = entry.into_path();
                        let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                        if self.seen.insert(key) {
                            return Some(Ok(path));
                        }
                    }
                    // A base directory that does not exist matches nothing.
                    Some(Err(err))
                        if err.depth() == 0
                            && err
                                .io_error()
                                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) =>
                    {
                        continue;
                    }
                    Some(Err(err)) => {
                        let path = err
                            .path()
                            .map_or_else(|| active.compiled.base.clone(), Path::to_path_buf);
                        return Some(Err(ScanError::DocumentRead {
                            path,
                            source: err.into(),
                        }));
                    }
                    None => {
                        if active.matched == 0 {
                            debug!(pattern = %active.pattern, "content pattern matched no files");
                        }
                        self.current = None;
                    }
                }
            }

            let pattern = self.pending.pop_front()?;
            match compile(&pattern, &self.anchor) {
                Ok(compiled) => self.current = Some(ActivePattern::new(pattern, compiled)),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl Iterator for Documents {
    type Item = Result<ScanEvent, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let path = match self.next_path() {
            Some(Ok(path)) => path,
            Some(Err(err)) => return self.fail(err),
            None => {
                self.finished = true;
                return None;
            }
        };

        match fs::read(&path) {
            Ok(bytes) => Some(Ok(decode(path, bytes))),
            Err(source) => self.fail(ScanError::DocumentRead { path, source }),
        }
    }
}

impl FusedIterator for Documents {}

impl std::fmt::Debug for Documents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Documents")
            .field("pending", &self.pending.len())
            .field("seen", &self.seen.len())
            .field("finished", &self.finished)
            .finish()
    }
}

fn decode(path: PathBuf, bytes: Vec<u8>) -> ScanEvent {
    if bytes.contains(&0) {
        debug!(path = %path.display(), "skipping binary document");
        return ScanEvent::Skipped(undecodable(&path, "contains NUL bytes"));
    }

    match String::from_utf8(bytes) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "read document");
            ScanEvent::Document(Document { path, text })
        }
        Err(err) => {
            debug!(path = %path.display(), "skipping non-UTF-8 document");
            ScanEvent::Skipped(undecodable(
                &path,
                &format!("invalid UTF-8 at byte {}", err.utf8_error().valid_up_to()),
            ))
        }
    }
}

fn undecodable(path: &Path, reason: &str) -> DiagnosticMessage {
    DiagnosticMessageBuilder::warning("Skipped undecodable document")
        .with_code("S-2-2")
        .problem(format!("`{}` is not UTF-8 text", path.display()))
        .add_detail(reason.to_string())
        .add_note("Class names in this document are not counted as used")
        .with_location(path.display().to_string())
        .build()
}
