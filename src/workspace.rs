//! The working directory holding extracted frames.
//!
//! [`Workspace`] resets the directory before a run and lists its frames in
//! natural order (numeric-aware), so `10_frame.png` sorts after
//! `2_frame.png`.

use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FrameGifError;

/// A working directory for one pipeline run.
///
/// # Example
///
/// ```no_run
/// use framegif::Workspace;
///
/// let workspace = Workspace::new("./assets/image");
/// workspace.reset()?;
/// assert!(workspace.frame_paths()?.is_empty());
/// # Ok::<(), framegif::FrameGifError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Wrap a directory path. Nothing is touched on disk.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if missing. For first-run setup.
    pub fn create(&self) -> Result<(), FrameGifError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Delete the directory with everything in it, then recreate it empty.
    ///
    /// # Errors
    ///
    /// [`FrameGifError::WorkspaceMissing`] if the directory does not exist;
    /// no existence check is done up front and nothing is created.
    pub fn reset(&self) -> Result<(), FrameGifError> {
        fs::remove_dir_all(&self.root).map_err(|error| match error.kind() {
            ErrorKind::NotFound => FrameGifError::WorkspaceMissing(self.root.clone()),
            _ => FrameGifError::IoError(error),
        })?;
        fs::create_dir(&self.root)?;
        log::debug!("Reset working directory {}", self.root.display());
        Ok(())
    }

    /// Regular files in the directory, in natural file-name order.
    pub fn frame_paths(&self) -> Result<Vec<PathBuf>, FrameGifError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort_by(|a, b| natural_file_order(a, b));
        Ok(paths)
    }
}

/// Natural (numeric-aware) ordering on file names.
///
/// `0_frame.png < 1_frame.png < 2_frame.png < 10_frame.png`.
pub fn natural_file_order(a: &Path, b: &Path) -> Ordering {
    let a_name = a.file_name().map(|name| name.to_string_lossy());
    let b_name = b.file_name().map(|name| name.to_string_lossy());
    match (a_name, b_name) {
        (Some(a_name), Some(b_name)) => natord::compare(&a_name, &b_name),
        (a_name, b_name) => a_name.cmp(&b_name),
    }
}
