//! Block-wise content comparison

use crate::error::{Error, Result};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::Path;

/// Size of each block fed to the running digests
pub const BLOCK_SIZE: usize = 8192;

/// Strategy used once two files are known to have the same size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checksum {
    /// Streamed MD5 digest of both files
    #[default]
    Md5,
    /// Modification time equality
    Mtime,
    /// Inode change time equality
    Ctime,
}

/// Outcome of comparing two files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Different,
}

impl Comparison {
    fn from_match(matches: bool) -> Self {
        if matches { Self::Equal } else { Self::Different }
    }

    /// Check if the files compared equal
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }
}

/// Compare `src` against `dest`.
///
/// Identical paths are equal without touching the filesystem. Files of
/// different sizes are different without reading content. Otherwise the
/// configured [`Checksum`] strategy decides.
pub fn compare(src: &Path, dest: &Path, checksum: Checksum) -> Result<Comparison> {
    if src == dest {
        return Ok(Comparison::Equal);
    }

    let src_meta = stat(src)?;
    let dest_meta = stat(dest)?;
    if src_meta.len() != dest_meta.len() {
        return Ok(Comparison::Different);
    }

    match checksum {
        Checksum::Md5 => compare_digests(src, dest),
        Checksum::Mtime => {
            let src_time = src_meta.modified().map_err(|source| Error::Stat {
                path: src.to_path_buf(),
                source,
            })?;
            let dest_time = dest_meta.modified().map_err(|source| Error::Stat {
                path: dest.to_path_buf(),
                source,
            })?;
            Ok(Comparison::from_match(src_time == dest_time))
        }
        Checksum::Ctime => Ok(Comparison::from_match(
            change_time(&src_meta) == change_time(&dest_meta),
        )),
    }
}

fn stat(path: &Path) -> Result<Metadata> {
    fs::metadata(path).map_err(|source| Error::Stat {
        path: path.to_path_buf(),
        source,
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Stream both files block by block, stopping at the first digest divergence
fn compare_digests(src: &Path, dest: &Path) -> Result<Comparison> {
    let mut src_file = open(src)?;
    let mut dest_file = open(dest)?;

    let mut src_hash = Md5::new();
    let mut dest_hash = Md5::new();
    let mut src_block = [0u8; BLOCK_SIZE];
    let mut dest_block = [0u8; BLOCK_SIZE];

    loop {
        let src_len = read_block(&mut src_file, &mut src_block).map_err(|source| Error::Read {
            path: src.to_path_buf(),
            source,
        })?;
        let dest_len =
            read_block(&mut dest_file, &mut dest_block).map_err(|source| Error::Read {
                path: dest.to_path_buf(),
                source,
            })?;

        src_hash.update(&src_block[..src_len]);
        dest_hash.update(&dest_block[..dest_len]);

        if src_len != dest_len || src_hash.clone().finalize() != dest_hash.clone().finalize() {
            log::debug!(
                "Content differs: {} vs {}",
                src.display(),
                dest.display()
            );
            return Ok(Comparison::Different);
        }

        // A short block means both streams hit EOF at the same offset
        if src_len < BLOCK_SIZE {
            return Ok(Comparison::Equal);
        }
    }
}

/// Fill `buf` as far as the reader allows; a short count means EOF
fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn change_time(meta: &Metadata) -> (i64, i64) {
    use std::os::unix::fs::MetadataExt;
    (meta.ctime(), meta.ctime_nsec())
}

#[cfg(not(unix))]
fn change_time(meta: &Metadata) -> Option<std::time::SystemTime> {
    meta.modified().ok()
}
