use anyhow::{Context as _, Result};
use std::path::Path;
use std::path::PathBuf;

cfg_if::cfg_if! {
    if #[cfg(target_os = "windows")] {
        use dunce::simplified;
    }
}

/// Absolute form of `path` without touching the filesystem.
pub fn absolutize<P>(path: P) -> Result<PathBuf>
where
    P: AsRef<Path>,
{
    let abs = path_abs::PathAbs::new(path.as_ref())
        .with_context(|| format!("Can not absolutize {:?}", path.as_ref()))?;

    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            Ok(simplified(abs.as_path()).to_path_buf())
        } else {
            Ok(abs.as_path().to_path_buf())
        }
    }
}

/// Create `path` and its parents if needed.
pub fn ensure_dir<P>(path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    std::fs::create_dir_all(path.as_ref())
        .with_context(|| format!("Can not create directory {:?}", path.as_ref()))
}
