//! Splitting files into chunks and joining them back

use anyhow::{bail, Context as _};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Number of chunks needed for `len` bytes, an empty file still getting one
fn chunk_count(len: u64, size: u64) -> u64 {
    len.div_ceil(size).max(1)
}

/// Name of chunk `index`, zero padded to the width of the last index
pub fn chunk_name(file_name: &str, separator: &str, index: u64, count: u64) -> String {
    let width = (count - 1).max(1).to_string().len();
    format!("{}{}{:0width$}", file_name, separator, index, width = width)
}

/// Split `path` into chunks of `size` bytes written in `dir`, next to the file by default
///
/// Returns the paths of the chunks.
pub fn split_file(
    path: &Path,
    size: u64,
    separator: &str,
    dir: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    if size == 0 {
        bail!("chunk size must be positive");
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let len = file.metadata()?.len();
    let count = chunk_count(len, size);

    let file_name = path
        .file_name()
        .with_context(|| format!("{} is not a file", path.display()))?
        .to_string_lossy();
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let mut reader = BufReader::new(file);
    let mut chunks = Vec::with_capacity(count as usize);
    for index in 0..count {
        let chunk = dir.join(chunk_name(&file_name, separator, index, count));
        let mut writer = BufWriter::new(
            File::create(&chunk).with_context(|| format!("failed to create {}", chunk.display()))?,
        );
        io::copy(&mut (&mut reader).take(size), &mut writer)?;
        writer.flush()?;
        tracing::debug!(chunk = %chunk.display(), "wrote chunk");
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Concatenate `chunks` in order into `out`
pub fn join_files<W: Write>(chunks: &[String], out: &mut W) -> anyhow::Result<u64> {
    let mut total = 0;
    for chunk in chunks {
        let mut file = File::open(chunk).with_context(|| format!("failed to open {}", chunk))?;
        total += io::copy(&mut file, out)?;
    }
    out.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_chunk_names_are_padded() {
        assert_eq!(chunk_name("file1", "_", 0, 1), "file1_0");
        assert_eq!(chunk_name("file2", "_", 3, 12), "file2_03");
        assert_eq!(chunk_name("file2", "_", 11, 12), "file2_11");
    }

    #[test]
    fn test_split_then_join() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        let data: Vec<u8> = (0..2500u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let chunks = split_file(&path, 1024, "_", None).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(fs::metadata(&chunks[2]).unwrap().len(), 452);

        let names: Vec<String> = chunks.iter().map(|c| c.display().to_string()).collect();
        let mut joined = Vec::new();
        join_files(&names, &mut joined).unwrap();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_split_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty");
        fs::write(&path, b"").unwrap();

        let out = temp_dir.path().join("out");
        let chunks = split_file(&path, 10, ".", Some(&out)).unwrap();
        assert_eq!(chunks, vec![out.join("empty.0")]);
    }

    #[test]
    fn test_zero_size() {
        assert!(split_file(Path::new("whatever"), 0, "_", None).is_err());
    }
}
