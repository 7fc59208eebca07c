//! The skeleton files every generated workbook is built from.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

use crate::error::{ExcelrError, Result};

/// Styles document; receives the generated `numFmts` and `cellXfs` elements.
pub const STYLES_PATH: &str = "xl/styles.xml";
/// Worksheet document; receives the generated rows.
pub const WORKSHEET_PATH: &str = "xl/worksheets/sheet1.xml";

/// Replaced by the `<numFmts>` element in the styles document.
pub const NUM_FMTS_MARKER: &str = "<!--excelr:numFmts-->";
/// Replaced by the `<cellXfs>` element in the styles document.
pub const CELL_XFS_MARKER: &str = "<!--excelr:cellXfs-->";

/// Markup appended after the last row.
pub const WORKSHEET_CLOSE: &str = "</sheetData></worksheet>";
const SHEET_DATA_OPEN: &str = "<sheetData>";

static BUILTIN: Lazy<Arc<TemplateTree>> = Lazy::new(|| {
    let files = vec![
        TemplateFile::borrowed("[Content_Types].xml", include_bytes!("../xlsx_template/[Content_Types].xml")),
        TemplateFile::borrowed("_rels/.rels", include_bytes!("../xlsx_template/_rels/.rels")),
        TemplateFile::borrowed("docProps/app.xml", include_bytes!("../xlsx_template/docProps/app.xml")),
        TemplateFile::borrowed("docProps/core.xml", include_bytes!("../xlsx_template/docProps/core.xml")),
        TemplateFile::borrowed(STYLES_PATH, include_bytes!("../xlsx_template/xl/styles.xml")),
        TemplateFile::borrowed("xl/workbook.xml", include_bytes!("../xlsx_template/xl/workbook.xml")),
        TemplateFile::borrowed(
            "xl/_rels/workbook.xml.rels",
            include_bytes!("../xlsx_template/xl/_rels/workbook.xml.rels"),
        ),
        TemplateFile::borrowed(WORKSHEET_PATH, include_bytes!("../xlsx_template/xl/worksheets/sheet1.xml")),
    ];
    let dirs = dirs_of(&files);
    Arc::new(TemplateTree { dirs, files })
});

/// One file of a template tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateFile {
    path: String,
    contents: Cow<'static, [u8]>,
}

impl TemplateFile {
    fn borrowed(path: &str, contents: &'static [u8]) -> Self {
        TemplateFile {
            path: path.to_string(),
            contents: Cow::Borrowed(contents),
        }
    }

    /// Relative path inside the archive, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File contents.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Path of this file below `root` on the local filesystem.
    pub fn local_path(&self, root: &Path) -> PathBuf {
        local_path(root, &self.path)
    }
}

/// An ordered, immutable set of template directories and files.
///
/// File order is the order of entries in the generated archive.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateTree {
    dirs: Vec<String>,
    files: Vec<TemplateFile>,
}

impl TemplateTree {
    /// The tree compiled into the library, loaded once and shared.
    pub fn builtin() -> Arc<TemplateTree> {
        Arc::clone(&BUILTIN)
    }

    /// Build a tree from `(path, contents)` pairs, kept in the given order.
    pub fn from_entries<I, P, C>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        let mut files = Vec::new();
        for (path, contents) in entries {
            let path = normalize(path.into())?;
            if files.iter().any(|f: &TemplateFile| f.path == path) {
                return Err(ExcelrError::template(format!("duplicate template file {}", path)));
            }
            files.push(TemplateFile {
                path,
                contents: Cow::Owned(contents.into()),
            });
        }
        let dirs = dirs_of(&files);
        let tree = TemplateTree { dirs, files };
        tree.validate()?;
        Ok(tree)
    }

    /// Load a tree from a directory.
    ///
    /// Entries are read top-down: the files of a directory in name order, then each
    /// sub-directory in name order.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut tree = TemplateTree {
            dirs: Vec::new(),
            files: Vec::new(),
        };
        walk(root, "", &mut tree).map_err(|e| {
            ExcelrError::template(format!("cannot read template directory {}: {}", root.display(), e))
        })?;
        tree.validate()?;
        debug!("loaded {} template files from {}", tree.files.len(), root.display());
        Ok(tree)
    }

    /// Directories in creation order, parents first.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    /// Files in archive order.
    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    /// Look up a file by its relative path.
    pub fn get(&self, path: &str) -> Option<&TemplateFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Check that the documents receiving generated content are present and marked.
    pub fn validate(&self) -> Result<()> {
        let styles = self
            .get(STYLES_PATH)
            .ok_or_else(|| ExcelrError::template(format!("missing {}", STYLES_PATH)))?;
        let styles = std::str::from_utf8(styles.contents())
            .map_err(|_| ExcelrError::template(format!("{} is not UTF-8", STYLES_PATH)))?;
        for marker in [NUM_FMTS_MARKER, CELL_XFS_MARKER] {
            if !styles.contains(marker) {
                return Err(ExcelrError::template(format!("{} lacks placeholder {}", STYLES_PATH, marker)));
            }
        }

        let sheet = self
            .get(WORKSHEET_PATH)
            .ok_or_else(|| ExcelrError::template(format!("missing {}", WORKSHEET_PATH)))?;
        let body = sheet.contents();
        let end = body.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(0, |i| i + 1);
        if !body[..end].ends_with(SHEET_DATA_OPEN.as_bytes()) {
            return Err(ExcelrError::template(format!("{} must end with {}", WORKSHEET_PATH, SHEET_DATA_OPEN)));
        }
        Ok(())
    }
}

fn walk(dir: &Path, prefix: &str, tree: &mut TemplateTree) -> std::io::Result<()> {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            subdirs.push(name);
        } else {
            files.push(name);
        }
    }
    files.sort();
    subdirs.sort();

    for name in files {
        let contents = fs::read(dir.join(&name))?;
        tree.files.push(TemplateFile {
            path: format!("{}{}", prefix, name),
            contents: Cow::Owned(contents),
        });
    }
    for name in subdirs {
        let rel = format!("{}{}", prefix, name);
        tree.dirs.push(rel.clone());
        walk(&dir.join(&name), &format!("{}/", rel), tree)?;
    }
    Ok(())
}

/// Parent directories of every file, parents before children, first use first.
fn dirs_of(files: &[TemplateFile]) -> Vec<String> {
    let mut dirs: Vec<String> = Vec::new();
    for file in files {
        let mut end = 0;
        while let Some(pos) = file.path[end..].find('/') {
            end += pos;
            let dir = &file.path[..end];
            if !dirs.iter().any(|d| d == dir) {
                dirs.push(dir.to_string());
            }
            end += 1;
        }
    }
    dirs
}

fn normalize(path: String) -> Result<String> {
    let path = path.replace('\\', "/");
    let valid = !path.starts_with('/')
        && path.split('/').all(|part| !part.is_empty() && part != "." && part != "..");
    if valid {
        Ok(path)
    } else {
        Err(ExcelrError::template(format!("invalid template path {:?}", path)))
    }
}

/// Map a `/`-separated template path below a local directory.
pub(crate) fn local_path(root: &Path, path: &str) -> PathBuf {
    root.join(path.split('/').collect::<PathBuf>())
}
