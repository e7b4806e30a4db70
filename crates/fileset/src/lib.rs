//! # Fileset
//!
//! Directory-scoped file operations for deploying flat sets of files.
//!
//! This crate provides functionality to:
//! - Compare two files by size and a block-wise streamed MD5 digest
//! - Copy every regular file of a source directory into a destination
//! - Remove from a destination the files a source directory names
//! - Verify that a destination holds identical copies of a source's files
//!
//! ## Example
//!
//! ```no_run
//! use fileset::{Checksum, check_all, copy_all};
//! use std::path::Path;
//!
//! let src = Path::new("/opt/pkg/conf");
//! let dest = Path::new("/etc/app/conf.d");
//!
//! if !check_all(src, dest, Checksum::Md5) {
//!     let copied = copy_all(src, dest)?;
//!     println!("copied {copied} files");
//! }
//! # Ok::<(), fileset::Error>(())
//! ```

mod compare;
mod error;
mod ops;

pub use compare::{BLOCK_SIZE, Checksum, Comparison, compare};
pub use error::{Error, Result};
pub use ops::{check_all, copy_all, delete_all, none_present, regular_files};
