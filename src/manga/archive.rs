use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Packs the given files into a new zip at `zip_path`, every entry named
/// after the file's base name. Stops at the first file that can't be added,
/// whatever was written up to that point stays on disk.
pub fn zip_files(files: &[PathBuf], zip_path: &Path) -> Result<()> {
    let archive = File::create(zip_path)
        .with_context(|| format!("Unable to create archive {}", zip_path.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(archive));
    // Pages are already JPEG compressed
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for file in files {
        add_file(&mut writer, file, options)
            .with_context(|| format!("Adding {} to {}", file.display(), zip_path.display()))?;
    }

    writer.finish()?.flush()?;
    Ok(())
}

fn add_file<W: Write + io::Seek>(
    writer: &mut ZipWriter<W>,
    path: &Path,
    options: FileOptions,
) -> Result<()> {
    let mut source = File::open(path)?;
    let name = path
        .file_name()
        .context("Missing file name")?
        .to_string_lossy();
    writer.start_file(name, options)?;
    io::copy(&mut source, writer)?;
    Ok(())
}
