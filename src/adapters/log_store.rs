//! File-backed event log store.
//!
//! Implements [`LogStore`] on top of `std::fs`.  On the device the file
//! lives on the SPIFFS partition mounted at `/spiffs` by
//! [`mount_spiffs`]; on the host any directory works.
//!
//! Every record is one newline-terminated line, written with a single
//! `write_all` on a file opened in append mode, so a power loss can at
//! worst truncate the last line.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{LogStore, StorageError};

/// Mount point of the SPIFFS partition.
pub const SPIFFS_BASE_PATH: &str = "/spiffs";

pub struct FileLogStore {
    path: PathBuf,
}

impl FileLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("FileLogStore: records go to {}", path.display());
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogStore for FileLogStore {
    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                warn!("FileLogStore: open for append failed: {}", e);
                StorageError::Unavailable
            })?;

        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        file.write_all(record.as_bytes()).map_err(|e| {
            warn!("FileLogStore: write failed: {}", e);
            StorageError::IoError
        })
    }

    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        let mut file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound,
            _ => {
                warn!("FileLogStore: open for read failed: {}", e);
                StorageError::Unavailable
            }
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| {
            warn!("FileLogStore: read failed: {}", e);
            StorageError::IoError
        })?;
        Ok(bytes)
    }

    fn size(&self) -> Result<u64, StorageError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(_) => Err(StorageError::IoError),
        }
    }
}

/// Register the SPIFFS partition with the VFS at [`SPIFFS_BASE_PATH`],
/// formatting it if it has never been mounted.
#[cfg(target_os = "espidf")]
pub fn mount_spiffs() -> crate::Result<()> {
    use esp_idf_svc::sys::*;

    let base_path = b"/spiffs\0";
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr() as *const _,
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    // SAFETY: called once from the main task during boot; `conf` and the
    // static base path outlive the call (SPIFFS copies the path).
    let ret = unsafe { esp_vfs_spiffs_register(&conf) };
    if ret != ESP_OK {
        log::error!("SPIFFS mount failed ({})", ret);
        return Err(StorageError::Unavailable.into());
    }
    info!("SPIFFS mounted at {}", SPIFFS_BASE_PATH);
    Ok(())
}
