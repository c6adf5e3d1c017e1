use std::env;
use std::path::{Path, PathBuf};

/// Directory holding the running executable, or the working directory when
/// that cannot be determined
pub fn app_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn beside_exe(file_name: impl AsRef<Path>) -> PathBuf {
    app_dir().join(file_name)
}
