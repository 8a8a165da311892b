use std::fs::{self, ReadDir};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ToolError};

/// File name suffix of workbooks picked up by the walk.
pub const SPREADSHEET_EXTENSION: &str = ".xlsx";
/// Prefix of the credentials workbook that lives alongside the class folders.
pub const LOGIN_DATA_PREFIX: &str = "LoginData";
/// Prefix of the lock files spreadsheet editors leave next to open workbooks.
pub const LOCK_FILE_PREFIX: &str = "~$";

/// A workbook selected for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Folder of the workbook relative to the data root, `.` for the root itself.
    pub class_name: String,
    /// File name without its extension.
    pub subject_name: String,
}

/// Returns true when a file with this name should be parsed.
pub fn is_eligible(file_name: &str) -> bool {
    file_name.ends_with(SPREADSHEET_EXTENSION)
        && !file_name.starts_with(LOGIN_DATA_PREFIX)
        && !file_name.starts_with(LOCK_FILE_PREFIX)
}

/// Starts a lazy, depth-first walk below `root`.
///
/// The root itself is opened eagerly so a missing data directory fails
/// before any work is done.
pub fn walk(root: &Path) -> Result<SourceFiles> {
    let entries = fs::read_dir(root).map_err(|error| match error.kind() {
        std::io::ErrorKind::NotFound => ToolError::MissingInput(root.to_path_buf()),
        _ => ToolError::Io(error),
    })?;
    Ok(SourceFiles {
        root: root.to_path_buf(),
        pending: vec![(root.to_path_buf(), entries)],
    })
}

/// Iterator over the eligible workbooks of a data tree, in directory order.
#[derive(Debug)]
pub struct SourceFiles {
    root: PathBuf,
    pending: Vec<(PathBuf, ReadDir)>,
}

impl SourceFiles {
    fn class_name(&self, folder: &Path) -> String {
        let relative = folder.strip_prefix(&self.root).unwrap_or(folder);
        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        }
    }
}

impl Iterator for SourceFiles {
    type Item = Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (folder, next_entry) = {
                let (folder, entries) = self.pending.last_mut()?;
                (folder.clone(), entries.next())
            };

            let entry = match next_entry {
                None => {
                    self.pending.pop();
                    continue;
                }
                Some(Err(error)) => return Some(Err(error.into())),
                Some(Ok(entry)) => entry,
            };

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(error) => return Some(Err(error.into())),
            };
            let path = entry.path();

            if file_type.is_dir() {
                match fs::read_dir(&path) {
                    Ok(entries) => self.pending.push((path, entries)),
                    Err(error) => return Some(Err(error.into())),
                }
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_eligible(&file_name) || !path.is_file() {
                debug!(file = %path.display(), "ignoring file");
                continue;
            }

            let subject_name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();

            return Some(Ok(SourceFile {
                class_name: self.class_name(&folder),
                subject_name,
                path,
            }));
        }
    }
}
