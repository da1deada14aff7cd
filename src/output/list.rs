//! The textual duplicate list.
//!
//! A detection pass writes its groups in this format; the user edits the
//! file, deleting the lines of the copies they want to keep; the cleanup
//! pass then reads back whatever paths remain.
//!
//! ```text
//! --------
//! /photos/a.jpg\t20480B\t9e107d9d372bb6826bd81d3542a419d6
//! /backup/a.jpg\t20480B\t9e107d9d372bb6826bd81d3542a419d6
//! --------
//! /docs/x.pdf\t512B\te4d909c290d0fb1ca068ffaddf22cbd0
//! ```
//!
//! Every group starts with a [`GROUP_DELIMITER`] line. A record line is the
//! path, a tab, the decimal size followed by `B`, a tab, and the lowercase
//! hex digest.
//!
//! The reader skips delimiter lines and keeps only the text before the first
//! tab of every other line, so a line holding a bare path is accepted. An
//! empty (or whitespace-only) line is rejected outright: guessing what it
//! meant could delete the wrong file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DuplicateGroups;

/// Line written before each group.
pub const GROUP_DELIMITER: &str = "--------";

/// Errors raised while writing or reading a duplicate list.
#[derive(Debug, Error)]
pub enum ListError {
    /// There were no groups to write.
    #[error("no duplicates found")]
    NoDuplicates,

    /// The list file could not be created.
    #[error("cannot create list {path}: {source}")]
    Create {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing the list failed part way.
    #[error("cannot write list {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A list file could not be opened.
    #[error("cannot open list {path}: {source}")]
    Open {
        /// List file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A list file could not be read (including invalid UTF-8).
    #[error("cannot read list {path}: {source}")]
    Read {
        /// List file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A list line was empty.
    #[error("malformed list {list}: line {line} is empty")]
    EmptyLine {
        /// List file (or stream name) holding the line
        list: PathBuf,
        /// 1-based line number
        line: usize,
    },
}

/// Write `groups` in list format.
///
/// Group order and record order follow the iteration order of `groups`,
/// which is unspecified. Records whose path would not read back unchanged
/// (not UTF-8, or holding a tab or line break) are left out with a warning,
/// and so is any group that drops below two records.
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn write_groups<W: Write>(writer: &mut W, groups: &DuplicateGroups) -> io::Result<()> {
    write_entries(writer, &listable_groups(groups))
}

/// Persist `groups` to `path`, optionally mirroring every byte to `mirror`.
///
/// The file is created (or truncated) only when there is something to
/// write.
///
/// # Errors
///
/// - `NoDuplicates` if no group has two listable records
/// - `Create` if the file cannot be created
/// - `Write` if writing to the file or the mirror fails
pub fn save_list(
    path: &Path,
    groups: &DuplicateGroups,
    mirror: Option<&mut dyn Write>,
) -> Result<(), ListError> {
    let entries = listable_groups(groups);
    if entries.is_empty() {
        return Err(ListError::NoDuplicates);
    }

    let file = File::create(path).map_err(|source| ListError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tee = Tee {
        primary: BufWriter::new(file),
        mirror,
    };

    write_entries(&mut tee, &entries).map_err(|source| ListError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Wrote {} groups ({} files) to {}",
        entries.len(),
        entries.iter().map(|group| group.files.len()).sum::<usize>(),
        path.display()
    );
    Ok(())
}

/// One group as it appears in the list: paths already checked to read back unchanged.
struct ListedGroup<'a> {
    hash: &'a str,
    files: Vec<(&'a str, u64)>,
}

/// The path as list text, or `None` if [`parse_list`] could not recover it.
///
/// Non-UTF-8 paths would be written lossily, and a tab or line break
/// would split the line into a different path.
fn list_text(path: &Path) -> Option<&str> {
    path.to_str().filter(|text| !text.contains(['\t', '\n', '\r']))
}

/// Drop records whose path cannot be listed, then groups left with fewer than two.
fn listable_groups(groups: &DuplicateGroups) -> Vec<ListedGroup<'_>> {
    let mut listed = Vec::with_capacity(groups.len());

    for (hash, files) in groups.iter() {
        let files: Vec<(&str, u64)> = files
            .iter()
            .filter_map(|file| match list_text(&file.path) {
                Some(text) => Some((text, file.size)),
                None => {
                    log::warn!(
                        "Not listing {:?}: the path cannot be written to a list unambiguously",
                        file.path
                    );
                    None
                }
            })
            .collect();

        if files.len() < 2 {
            log::warn!("Not listing group {hash}: fewer than two listable files remain");
            continue;
        }
        listed.push(ListedGroup { hash, files });
    }

    listed
}

fn write_entries<W: Write>(writer: &mut W, groups: &[ListedGroup<'_>]) -> io::Result<()> {
    for group in groups {
        writeln!(writer, "{GROUP_DELIMITER}")?;
        for (path, size) in &group.files {
            writeln!(writer, "{path}\t{size}B\t{}", group.hash)?;
        }
    }
    writer.flush()
}

/// Writer that copies everything to a second, optional sink.
struct Tee<'a, W: Write> {
    primary: W,
    mirror: Option<&'a mut dyn Write>,
}

impl<W: Write> Write for Tee<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.primary.write(buf)?;
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.write_all(&buf[..written])?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.flush()?;
        }
        Ok(())
    }
}

/// Extract the path column from an edited list.
///
/// `source` only names the input in errors.
///
/// # Errors
///
/// - `EmptyLine` for the first empty or whitespace-only line
/// - `Read` if the reader fails
pub fn parse_list<R: BufRead>(reader: R, source: &Path) -> Result<Vec<PathBuf>, ListError> {
    let mut paths = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ListError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;

        if line.trim().is_empty() {
            return Err(ListError::EmptyLine {
                list: source.to_path_buf(),
                line: index + 1,
            });
        }
        if line == GROUP_DELIMITER {
            continue;
        }

        let path = line.split('\t').next().unwrap_or(&line);
        log::trace!("List entry: {}", path);
        paths.push(PathBuf::from(path));
    }

    Ok(paths)
}

/// Read and concatenate the path columns of several list files, in order.
///
/// # Errors
///
/// Returns the first [`ListError`] encountered; no paths are returned in
/// that case.
pub fn read_delete_lists(lists: &[PathBuf]) -> Result<Vec<PathBuf>, ListError> {
    let mut paths = Vec::new();

    for list in lists {
        let file = File::open(list).map_err(|source| ListError::Open {
            path: list.clone(),
            source,
        })?;
        let parsed = parse_list(BufReader::new(file), list)?;
        log::debug!("Read {} paths from {}", parsed.len(), list.display());
        paths.extend(parsed);
    }

    Ok(paths)
}
