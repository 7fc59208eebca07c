//! Turning rows into a finished `.xlsx` archive.
//!
//! The template tree is copied into a scratch directory, the styles and worksheet
//! documents are completed there, and the whole directory is then zipped in template
//! order. The scratch directory is removed when the conversion returns, whether it
//! succeeded or not.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace};
use tempfile::TempDir;
use zip::ZipWriter;

use crate::cell::CellValue;
use crate::error::{ExcelrError, Result, Stage, StageContext};
use crate::options::ExcelOptions;
use crate::style::StyleTable;
use crate::template::{
    local_path, TemplateTree, CELL_XFS_MARKER, NUM_FMTS_MARKER, STYLES_PATH, WORKSHEET_CLOSE,
    WORKSHEET_PATH,
};
use crate::writer::RowWriter;

/// Write `rows` as a spreadsheet into `output` and hand the sink back.
///
/// # Example
/// ```no_run
/// use excelr_core::{to_excel, CellValue, ExcelOptions};
/// use std::fs::File;
///
/// let rows = vec![
///     vec![CellValue::from("name"), CellValue::from("share")],
///     vec![CellValue::from("a"), CellValue::from(0.25)],
/// ];
/// let options = ExcelOptions::new().with_column_format(1, "0.00%");
/// to_excel(File::create("report.xlsx").unwrap(), rows, &options).unwrap();
/// ```
pub fn to_excel<W, I, R, V>(output: W, rows: I, options: &ExcelOptions) -> Result<W>
where
    W: Write + Seek,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    try_to_excel(output, rows.into_iter().map(Ok), options)
}

/// Like [`to_excel`], for row sources that can fail part way through.
pub fn try_to_excel<W, I, R, V>(output: W, rows: I, options: &ExcelOptions) -> Result<W>
where
    W: Write + Seek,
    I: IntoIterator<Item = Result<R>>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    let template = options.template_tree();
    let mut builder = tempfile::Builder::new();
    builder.prefix("excelr-");
    let scratch = match &options.scratch_dir {
        Some(dir) => builder.tempdir_in(dir),
        None => builder.tempdir(),
    }
    .stage(Stage::Staging)?;
    let root = scratch.path();
    debug!("staging {} template files in {}", template.files().len(), root.display());

    stage_templates(&template, root)?;

    let styles = StyleTable::new(&options.column_formats);
    write_styles(root, &styles)?;

    let rows_written = write_worksheet(root, rows, &styles, options)?;
    debug!("worksheet complete: {} rows, {} styles", rows_written, styles.len());

    let output = package(&template, root, output, options)?;
    close_scratch(scratch)?;
    Ok(output)
}

/// Write a spreadsheet to `path`, creating or truncating the file.
///
/// The file is removed again if the conversion fails.
pub fn to_excel_path<P, I, R, V>(path: P, rows: I, options: &ExcelOptions) -> Result<PathBuf>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    try_to_excel_path(path, rows.into_iter().map(Ok), options)
}

/// Like [`to_excel_path`], for row sources that can fail part way through.
pub fn try_to_excel_path<P, I, R, V>(path: P, rows: I, options: &ExcelOptions) -> Result<PathBuf>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Result<R>>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    let path = path.as_ref();
    let file = File::create(path).stage(Stage::Output)?;

    let result = try_to_excel(BufWriter::new(file), rows, options).and_then(|mut writer| {
        writer.flush().stage(Stage::Output)?;
        Ok(())
    });
    if let Err(err) = result {
        if let Err(remove_err) = fs::remove_file(path) {
            debug!("could not remove incomplete {}: {}", path.display(), remove_err);
        }
        return Err(err);
    }
    Ok(path.to_path_buf())
}

/// Build the spreadsheet in memory.
pub fn to_excel_bytes<I, R, V>(rows: I, options: &ExcelOptions) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    Ok(to_excel(Cursor::new(Vec::new()), rows, options)?.into_inner())
}

fn stage_templates(template: &TemplateTree, root: &Path) -> Result<()> {
    for dir in template.dirs() {
        fs::create_dir_all(local_path(root, dir)).stage(Stage::Staging)?;
    }
    for file in template.files() {
        fs::write(file.local_path(root), file.contents()).stage(Stage::Staging)?;
    }
    Ok(())
}

fn write_styles(root: &Path, styles: &StyleTable) -> Result<()> {
    let path = local_path(root, STYLES_PATH);
    let xml = fs::read_to_string(&path).stage(Stage::Styles)?;

    for marker in [NUM_FMTS_MARKER, CELL_XFS_MARKER] {
        if !xml.contains(marker) {
            return Err(ExcelrError::template(format!("{} lacks placeholder {}", STYLES_PATH, marker)));
        }
    }
    let xml = xml
        .replacen(NUM_FMTS_MARKER, &styles.num_fmts_xml(), 1)
        .replacen(CELL_XFS_MARKER, &styles.cell_xfs_xml(), 1);

    fs::write(&path, xml).stage(Stage::Styles)
}

fn write_worksheet<I, R, V>(root: &Path, rows: I, styles: &StyleTable, options: &ExcelOptions) -> Result<u32>
where
    I: IntoIterator<Item = Result<R>>,
    R: IntoIterator<Item = V>,
    V: Into<CellValue>,
{
    let path = local_path(root, WORKSHEET_PATH);
    let file = OpenOptions::new()
        .append(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ExcelrError::template(format!("missing {}", WORKSHEET_PATH)),
            _ => ExcelrError::Io { stage: Stage::Rows, source: e },
        })?;

    let mut writer = RowWriter::new(BufWriter::new(file), styles, &options.coalesce, options.overflow);
    let rows_written = writer.try_write_rows(rows)?;

    let mut sink = writer.into_inner();
    sink.write_all(WORKSHEET_CLOSE.as_bytes()).stage(Stage::Rows)?;
    sink.flush().stage(Stage::Rows)?;
    Ok(rows_written)
}

fn package<W: Write + Seek>(template: &TemplateTree, root: &Path, output: W, options: &ExcelOptions) -> Result<W> {
    let file_options = options.compression.file_options();
    let mut zip = ZipWriter::new(output);

    for file in template.files() {
        zip.start_file(file.path(), file_options.clone())?;
        let mut staged = File::open(file.local_path(root)).stage(Stage::Packaging)?;
        let copied = io::copy(&mut staged, &mut zip).stage(Stage::Packaging)?;
        trace!("archived {} ({} bytes)", file.path(), copied);
    }

    Ok(zip.finish()?)
}

fn close_scratch(scratch: TempDir) -> Result<()> {
    let path = scratch.path().to_path_buf();
    scratch.close().stage(Stage::Packaging)?;
    trace!("removed scratch directory {}", path.display());
    Ok(())
}
