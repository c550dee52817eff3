use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::error::{FileError, FileResult};
use super::{PageId, PAGE_SIZE};

/// Handle to an open file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(usize);

impl FileHandle {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Manages paged file operations
pub struct PagedFileManager {
    /// Map from file handles to open files
    open_files: HashMap<FileHandle, FileEntry>,
    /// Map from file paths to handles (for checking if already open)
    path_to_handle: HashMap<PathBuf, FileHandle>,
    /// Next available file handle
    next_handle: usize,
    /// Maximum number of open files
    max_open_files: usize,
}

struct FileEntry {
    file: File,
    path: PathBuf,
}

impl PagedFileManager {
    /// Create a new paged file manager
    pub fn new() -> Self {
        Self::with_max_files(128)
    }

    /// Create a new paged file manager with specified max open files
    pub fn with_max_files(max_open_files: usize) -> Self {
        Self {
            open_files: HashMap::new(),
            path_to_handle: HashMap::new(),
            next_handle: 0,
            max_open_files,
        }
    }

    /// Create a new file
    pub fn create_file<P: AsRef<Path>>(&mut self, path: P) -> FileResult<()> {
        let path = path.as_ref();

        if path.exists() {
            return Err(FileError::FileExists(path.display().to_string()));
        }

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        File::create(path)?;
        Ok(())
    }

    /// Open an existing file
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> FileResult<FileHandle> {
        let path_ref = path.as_ref();
        let path = path_ref
            .canonicalize()
            .map_err(|_| FileError::FileNotFound(path_ref.display().to_string()))?;

        // Check if file is already open
        if let Some(&handle) = self.path_to_handle.get(&path) {
            return Ok(handle);
        }

        if self.open_files.len() >= self.max_open_files {
            return Err(FileError::TooManyOpenFiles);
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let handle = FileHandle(self.next_handle);
        self.next_handle += 1;

        self.open_files.insert(
            handle,
            FileEntry {
                file,
                path: path.clone(),
            },
        );
        self.path_to_handle.insert(path, handle);

        Ok(handle)
    }

    /// Close a file
    pub fn close_file(&mut self, handle: FileHandle) -> FileResult<()> {
        let entry = self
            .open_files
            .remove(&handle)
            .ok_or(FileError::InvalidHandle(handle.0))?;

        self.path_to_handle.remove(&entry.path);
        Ok(())
    }

    /// Remove (delete) a file
    pub fn remove_file<P: AsRef<Path>>(&mut self, path: P) -> FileResult<()> {
        let path = path.as_ref();

        // If file is open, close it first
        if let Ok(canonical_path) = path.canonicalize() {
            if let Some(&handle) = self.path_to_handle.get(&canonical_path) {
                self.close_file(handle)?;
            }
        }

        std::fs::remove_file(path)?;
        Ok(())
    }

    /// Read a page from a file
    pub fn read_page(
        &mut self,
        handle: FileHandle,
        page_no: PageId,
        buffer: &mut [u8],
    ) -> FileResult<()> {
        if buffer.len() != PAGE_SIZE {
            return Err(FileError::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: buffer.len(),
            });
        }

        let entry = self
            .open_files
            .get_mut(&handle)
            .ok_or(FileError::InvalidHandle(handle.0))?;

        let offset = page_no as u64 * PAGE_SIZE as u64;
        entry.file.seek(SeekFrom::Start(offset))?;

        let bytes_read = entry.file.read(buffer)?;

        // If we read less than PAGE_SIZE, fill the rest with zeros
        if bytes_read < PAGE_SIZE {
            buffer[bytes_read..].fill(0);
        }

        Ok(())
    }

    /// Write a page to a file
    pub fn write_page(
        &mut self,
        handle: FileHandle,
        page_no: PageId,
        buffer: &[u8],
    ) -> FileResult<()> {
        if buffer.len() != PAGE_SIZE {
            return Err(FileError::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: buffer.len(),
            });
        }

        let entry = self
            .open_files
            .get_mut(&handle)
            .ok_or(FileError::InvalidHandle(handle.0))?;

        let offset = page_no as u64 * PAGE_SIZE as u64;
        let required_size = offset + PAGE_SIZE as u64;

        // Extend file if necessary to ensure we can write at this offset
        let current_size = entry.file.metadata()?.len();
        if current_size < required_size {
            entry.file.set_len(required_size)?;
        }

        entry.file.seek(SeekFrom::Start(offset))?;
        entry.file.write_all(buffer)?;
        // Don't sync on every write; sync_file/sync_all batch that up.

        Ok(())
    }

    /// Get the number of pages in a file
    pub fn page_count(&mut self, handle: FileHandle) -> FileResult<usize> {
        let entry = self
            .open_files
            .get_mut(&handle)
            .ok_or(FileError::InvalidHandle(handle.0))?;

        let file_size = entry.file.metadata()?.len();
        Ok(file_size.div_ceil(PAGE_SIZE as u64) as usize)
    }

    /// Get the first page number of a file.
    /// Fails with `EmptyFile` when no page has been allocated yet.
    pub fn get_first_page(&mut self, handle: FileHandle) -> FileResult<PageId> {
        if self.page_count(handle)? == 0 {
            let path = self
                .open_files
                .get(&handle)
                .map(|e| e.path.display().to_string())
                .unwrap_or_default();
            return Err(FileError::EmptyFile(path));
        }
        Ok(0)
    }

    /// Allocate a new page at the end of the file and return its number.
    /// The page is written out zeroed so subsequent reads are well defined.
    pub fn allocate_page(&mut self, handle: FileHandle) -> FileResult<PageId> {
        let page_no = self.page_count(handle)? as PageId;
        let zeroes = vec![0u8; PAGE_SIZE];
        self.write_page(handle, page_no, &zeroes)?;
        Ok(page_no)
    }

    /// Release a page back to the file.
    /// The page is zeroed in place; page numbers are not reused.
    pub fn dispose_page(&mut self, handle: FileHandle, page_no: PageId) -> FileResult<()> {
        let zeroes = vec![0u8; PAGE_SIZE];
        self.write_page(handle, page_no, &zeroes)
    }

    /// Sync a file to disk (flush all OS buffers)
    pub fn sync_file(&mut self, handle: FileHandle) -> FileResult<()> {
        let entry = self
            .open_files
            .get_mut(&handle)
            .ok_or(FileError::InvalidHandle(handle.0))?;

        entry.file.sync_data()?;
        Ok(())
    }

    /// Sync all open files to disk
    pub fn sync_all(&mut self) -> FileResult<()> {
        for entry in self.open_files.values_mut() {
            entry.file.sync_data()?;
        }
        Ok(())
    }

    /// Check if a file is open
    pub fn is_file_open(&self, handle: FileHandle) -> bool {
        self.open_files.contains_key(&handle)
    }

    /// Get the number of currently open files
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }
}

impl Default for PagedFileManager {
    fn default() -> Self {
        Self::new()
    }
}
