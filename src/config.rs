use std::path::{Path, PathBuf};

/// Folder under the root that holds the class/subject spreadsheets.
pub const DATA_DIR_NAME: &str = "Data";
/// Folder under the root that receives the aggregated document.
pub const OUTPUT_DIR_NAME: &str = ".tmp";
/// File name of the aggregated document.
pub const OUTPUT_FILE_NAME: &str = "debug_data.json";

/// What to do with a data row whose name cell is blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlankRowPolicy {
    /// Leave the row out and keep reading later rows.
    #[default]
    Skip,
    /// Treat the row as the end of the student list.
    Stop,
}

/// Settings for a single extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the spreadsheet tree, laid out as `<ClassName>/<Subject>.xlsx`.
    pub data_dir: PathBuf,
    /// Path the aggregated JSON document is written to.
    pub output_file: PathBuf,
    pub blank_rows: BlankRowPolicy,
}

impl Config {
    /// Builds the conventional layout below `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            data_dir: root.join(DATA_DIR_NAME),
            output_file: root.join(OUTPUT_DIR_NAME).join(OUTPUT_FILE_NAME),
            blank_rows: BlankRowPolicy::default(),
        }
    }
}

impl Default for Config {
    /// Roots the layout at the package directory so the data folder sits
    /// next to the tool.
    fn default() -> Self {
        Self::from_root(env!("CARGO_MANIFEST_DIR"))
    }
}
