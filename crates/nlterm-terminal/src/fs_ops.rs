//! Filesystem operations behind the built-in commands.
//!
//! Every operation resolves its targets against the [`Session`] working
//! directory and works on a single target; the multi-target builtins loop
//! over these and report one outcome per target.

use std::fs::{self, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use nlterm_types::error::{Result, TermError};

use crate::session::Session;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// Metadata shown by `ls -l`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMeta {
    /// Ten-character mode string, e.g. `drwxr-xr-x`.
    pub mode: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub name: String,
    pub kind: EntryKind,
    /// `None` when the entry's metadata could not be read.
    pub meta: Option<EntryMeta>,
}

impl ListEntry {
    /// Render the entry as an `ls -l` line, with placeholders for unreadable
    /// metadata.
    pub fn long_line(&self) -> String {
        match &self.meta {
            Some(meta) => {
                let mtime = meta
                    .modified
                    .map(|t| t.format("%b %d %H:%M").to_string())
                    .unwrap_or_else(|| "? ? ?".to_string());
                format!("{} {:>8} {mtime:>12} {}", meta.mode, meta.size, self.name)
            },
            None => format!("?????????? {:>8} {:>12} {}", "?", "? ? ?", self.name),
        }
    }
}

/// `ls` flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub long: bool,
    pub all: bool,
}

/// Direct-child counts produced by `count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    pub files: usize,
    pub directories: usize,
    /// Entries that are neither (broken links, sockets, ...).
    pub other: usize,
}

impl EntryCounts {
    pub fn total(&self) -> usize {
        self.files + self.directories + self.other
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

/// List a directory, sorted by name. Dotfiles are hidden unless `opts.all`.
pub fn list(session: &Session, path: Option<&str>, opts: ListOptions) -> Result<Vec<ListEntry>> {
    let shown = path.unwrap_or(".");
    let dir = match path {
        Some(p) => session.resolve(p),
        None => session.cwd().to_path_buf(),
    };
    let meta = fs::metadata(&dir).map_err(|e| TermError::from_io(shown, e))?;
    if !meta.is_dir() {
        return Err(TermError::NotADirectory(shown.to_string()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&dir).map_err(|e| TermError::from_io(shown, e))? {
        let entry = entry.map_err(|e| TermError::from_io(shown, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !opts.all && name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let (kind, meta) = match fs::metadata(&path) {
            Ok(m) => (kind_of(&m, &path), Some(entry_meta(&m, &path))),
            // Broken symlink or unreadable entry: keep it, without metadata.
            Err(_) => {
                let kind = match entry.file_type() {
                    Ok(t) if t.is_symlink() => EntryKind::Symlink,
                    _ => EntryKind::Unknown,
                };
                (kind, None)
            },
        };
        entries.push(ListEntry { name, kind, meta });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn kind_of(meta: &Metadata, path: &Path) -> EntryKind {
    if meta.is_dir() {
        EntryKind::Directory
    } else if meta.is_file() {
        match fs::symlink_metadata(path) {
            Ok(m) if m.file_type().is_symlink() => EntryKind::Symlink,
            _ => EntryKind::File,
        }
    } else {
        EntryKind::Unknown
    }
}

fn entry_meta(meta: &Metadata, path: &Path) -> EntryMeta {
    EntryMeta {
        mode: mode_string(meta, path),
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Local>::from),
    }
}

#[cfg(unix)]
fn mode_string(meta: &Metadata, path: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = meta.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(type_glyph(meta, path));
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn mode_string(meta: &Metadata, path: &Path) -> String {
    let perms = if meta.permissions().readonly() {
        "r--r--r--"
    } else {
        "rw-rw-rw-"
    };
    format!("{}{perms}", type_glyph(meta, path))
}

fn type_glyph(meta: &Metadata, path: &Path) -> char {
    match fs::symlink_metadata(path) {
        Ok(m) if m.file_type().is_symlink() => 'l',
        _ if meta.is_dir() => 'd',
        _ => '-',
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

/// Change the session directory.
///
/// `None` and `~` go home, `-` returns to the previously recorded directory
/// (or stays put when there is none). The session is only updated once the
/// target is confirmed to be an existing directory. Returns `(from, to)`.
pub fn change_directory(session: &mut Session, target: Option<&str>) -> Result<(PathBuf, PathBuf)> {
    let shown = target.unwrap_or("~");
    let resolved = match shown {
        "-" => session
            .previous_dir()
            .unwrap_or_else(|| session.cwd())
            .to_path_buf(),
        other => session.resolve(other),
    };
    match fs::metadata(&resolved) {
        Ok(meta) if meta.is_dir() => {
            let from = session.commit_directory(resolved.clone());
            Ok((from, resolved))
        },
        Ok(_) => Err(TermError::NotFound(shown.to_string())),
        Err(e) => Err(TermError::from_io(shown, e)),
    }
}

// ---------------------------------------------------------------------------
// mkdir / rmdir
// ---------------------------------------------------------------------------

/// Create a directory (and missing parents). Returns `false` if it already
/// existed, which is not an error.
pub fn make_directory(session: &Session, name: &str) -> Result<bool> {
    let path = session.resolve(name);
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(&path).map_err(|e| TermError::from_io(name, e))?;
    Ok(true)
}

/// Remove a directory. Without `recursive` the directory must be empty.
pub fn remove_directory(session: &Session, name: &str, recursive: bool) -> Result<()> {
    let path = session.resolve(name);
    let meta = fs::symlink_metadata(&path).map_err(|e| TermError::from_io(name, e))?;
    if !meta.is_dir() {
        return Err(TermError::NotADirectory(name.to_string()));
    }
    if recursive {
        fs::remove_dir_all(&path).map_err(|e| TermError::from_io(name, e))
    } else {
        let mut children = fs::read_dir(&path).map_err(|e| TermError::from_io(name, e))?;
        if children.next().is_some() {
            return Err(TermError::NotEmpty(name.to_string()));
        }
        fs::remove_dir(&path).map_err(|e| TermError::from_io(name, e))
    }
}

// ---------------------------------------------------------------------------
// rm / touch / cat
// ---------------------------------------------------------------------------

/// Remove a file. Directories are refused, never recursed into.
pub fn remove_file(session: &Session, name: &str) -> Result<()> {
    let path = session.resolve(name);
    let meta = fs::symlink_metadata(&path).map_err(|e| TermError::from_io(name, e))?;
    if meta.is_dir() {
        return Err(TermError::IsDirectory(name.to_string()));
    }
    fs::remove_file(&path).map_err(|e| TermError::from_io(name, e))
}

/// Create an empty file, or bump the modification time of an existing one
/// without changing its content. Returns `true` if the file was created.
pub fn touch(session: &Session, name: &str) -> Result<bool> {
    let path = session.resolve(name);
    let now = SystemTime::now();
    if path.is_dir() {
        let dir = fs::File::open(&path).map_err(|e| TermError::from_io(name, e))?;
        dir.set_modified(now)
            .map_err(|e| TermError::from_io(name, e))?;
        return Ok(false);
    }
    let existed = path.exists();
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| TermError::from_io(name, e))?;
    if existed {
        file.set_modified(now)
            .map_err(|e| TermError::from_io(name, e))?;
    }
    Ok(!existed)
}

/// Read a file as text. Invalid UTF-8 is replaced, not rejected.
pub fn read_file(session: &Session, name: &str) -> Result<String> {
    let path = session.resolve(name);
    if path.is_dir() {
        return Err(TermError::IsDirectory(name.to_string()));
    }
    let data = fs::read(&path).map_err(|e| TermError::from_io(name, e))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Truncate `dst` and write `content` to it. Returns the absolute path and
/// the number of bytes written.
pub fn write_file(session: &Session, content: &str, dst: &str) -> Result<(PathBuf, usize)> {
    let path = session.resolve(dst);
    if path.is_dir() {
        return Err(TermError::IsDirectory(dst.to_string()));
    }
    fs::write(&path, content.as_bytes()).map_err(|e| TermError::from_io(dst, e))?;
    Ok((path, content.len()))
}

// ---------------------------------------------------------------------------
// cp / mv
// ---------------------------------------------------------------------------

/// Copy a file, preserving permissions and access/modification times.
/// An existing destination file is overwritten; a destination directory
/// receives the file under its original name.
pub fn copy(session: &Session, src: &str, dst: &str) -> Result<PathBuf> {
    let from = session.resolve(src);
    let meta = fs::metadata(&from).map_err(|e| TermError::from_io(src, e))?;
    if meta.is_dir() {
        return Err(TermError::IsDirectory(src.to_string()));
    }
    let to = destination(&from, session.resolve(dst));
    if same_file(&from, &to) {
        return Err(TermError::InvalidArgument(format!(
            "'{src}' and '{dst}' are the same file"
        )));
    }
    copy_preserving(&from, &to, &meta).map_err(|e| TermError::from_io(dst, e))?;
    Ok(to)
}

/// Move or rename a file or directory. Falls back to copy-and-delete when
/// the destination is on another device.
pub fn move_entry(session: &Session, src: &str, dst: &str) -> Result<PathBuf> {
    let from = session.resolve(src);
    fs::symlink_metadata(&from).map_err(|e| TermError::from_io(src, e))?;
    let to = destination(&from, session.resolve(dst));
    if from == to {
        return Ok(to);
    }
    match fs::rename(&from, &to) {
        Ok(()) => Ok(to),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!("mv across devices: {} -> {}", from.display(), to.display());
            copy_tree(&from, &to).map_err(|e| TermError::from_io(dst, e))?;
            remove_tree(&from).map_err(|e| TermError::from_io(src, e))?;
            Ok(to)
        },
        Err(e) => Err(TermError::from_io(src, e)),
    }
}

/// `cp a dir` and `mv a dir` land at `dir/a`.
fn destination(from: &Path, to: PathBuf) -> PathBuf {
    match (to.is_dir(), from.file_name()) {
        (true, Some(name)) => to.join(name),
        _ => to,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_preserving(from: &Path, to: &Path, meta: &Metadata) -> io::Result<()> {
    fs::copy(from, to)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    // A read-only source yields a read-only copy; its times stay as copied.
    match fs::OpenOptions::new().write(true).open(to) {
        Ok(file) => file.set_times(times),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            log::debug!("cannot restore times on {}: {e}", to.display());
            Ok(())
        },
        Err(e) => Err(e),
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from)?;
    if !meta.is_dir() {
        return copy_preserving(from, to, &meta);
    }
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        copy_tree(&entry.path(), &to.join(entry.file_name()))?;
    }
    Ok(())
}

fn remove_tree(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

// ---------------------------------------------------------------------------
// count
// ---------------------------------------------------------------------------

/// Count direct children of a directory by kind (non-recursive).
pub fn count(session: &Session, path: Option<&str>) -> Result<EntryCounts> {
    let shown = path.unwrap_or(".");
    let dir = match path {
        Some(p) => session.resolve(p),
        None => session.cwd().to_path_buf(),
    };
    let mut counts = EntryCounts::default();
    for entry in fs::read_dir(&dir).map_err(|e| TermError::from_io(shown, e))? {
        let entry = entry.map_err(|e| TermError::from_io(shown, e))?;
        match fs::metadata(entry.path()) {
            Ok(m) if m.is_dir() => counts.directories += 1,
            Ok(m) if m.is_file() => counts.files += 1,
            _ => counts.other += 1,
        }
    }
    Ok(counts)
}
