use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::db::Store;
use crate::dialog::{DB_FILES, Dialogs};
use crate::error::{AppError, AppResult};

const BACKUP_FILE_NAME: &str = "ricemill-backup.db";

/// Copies the live store file byte for byte to a destination the user picks.
pub fn backup(store: &Store, dialogs: &dyn Dialogs) -> AppResult<PathBuf> {
    if !store.path().exists() {
        return Err(AppError::NotFound("DB not found".to_string()));
    }
    let dest = dialogs
        .save_file(BACKUP_FILE_NAME)
        .ok_or(AppError::UserCanceled)?;
    let bytes = fs::copy(store.path(), &dest)?;
    info!(dest = %dest.display(), bytes, "store backed up");
    Ok(dest)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replaces the live store file with one the user picks and reconnects.
/// The chosen file is not checked; a foreign file fails on next use.
/// Returns the live store path.
pub fn restore(store: &mut Store, dialogs: &dyn Dialogs) -> AppResult<PathBuf> {
    let source = dialogs.open_file(DB_FILES).ok_or(AppError::UserCanceled)?;
    let live = store.path().to_path_buf();

    store.close();
    let copied = if same_file(&source, &live) {
        Ok(0)
    } else {
        fs::copy(&source, &live)
    };
    // Reconnect even when the copy failed so the store stays usable.
    let reopened = store.reopen();
    let bytes = copied?;
    reopened?;

    if bytes == 0 {
        warn!(source = %source.display(), "restore source is the live store or empty");
    }
    info!(source = %source.display(), bytes, "store restored");
    Ok(live)
}
