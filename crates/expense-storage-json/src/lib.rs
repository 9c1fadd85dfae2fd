use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use expense_core::{CoreError, LedgerStore};
use expense_domain::LedgerRow;
use tracing::debug;

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Append-only ledger kept as a JSON array of rows in a single file.
///
/// Every append rewrites the file through a temporary sibling and a rename, so a
/// failed batch leaves the previous contents in place.
pub struct JsonLedgerStore {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    write_lock: Mutex<()>,
}

#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl JsonLedgerStore {
    /// Backups land in a `backups` directory next to the ledger file.
    pub fn new(path: PathBuf) -> Result<Self, CoreError> {
        let backups_dir = path
            .parent()
            .map(|parent| parent.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"));
        Self::with_retention(path, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        path: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            path,
            backups_dir,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list_backups(&self) -> Result<Vec<BackupMetadata>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut rows = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let size_bytes = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            rows.push(BackupMetadata {
                name: name.to_string(),
                created_at: parse_backup_timestamp(name),
                size_bytes,
                path: path.clone(),
            });
        }
        rows.sort_by_key(|meta| Reverse(meta.created_at));
        Ok(rows)
    }

    /// Replaces the ledger with a backup's rows, backing up the current file first.
    pub fn restore_backup(&self, name: &str) -> Result<Vec<LedgerRow>, CoreError> {
        let source = self.backups_dir.join(name);
        if !source.exists() {
            return Err(CoreError::Persistence(format!("backup `{}` not found", name)));
        }
        let rows = load_rows_from_path(&source)?;
        let _guard = self.lock()?;
        self.backup_existing_file()?;
        save_rows_to_path(&rows, &self.path)?;
        Ok(rows)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, CoreError> {
        self.write_lock
            .lock()
            .map_err(|_| CoreError::Persistence("ledger lock poisoned".into()))
    }

    fn backup_existing_file(&self) -> Result<(), CoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{}_{}.{}", self.stem(), timestamp, LEDGER_EXTENSION);
        fs::copy(&self.path, self.backups_dir.join(file_name))?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for entry in self.list_backups()?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("ledger")
            .to_string()
    }
}

impl LedgerStore for JsonLedgerStore {
    fn read_all(&self) -> Result<Vec<LedgerRow>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        load_rows_from_path(&self.path)
    }

    fn append_all(&self, rows: Vec<LedgerRow>) -> Result<(), CoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let _guard = self.lock()?;
        let mut existing = self.read_all()?;
        let appended = rows.len();
        existing.extend(rows);
        self.backup_existing_file()?;
        save_rows_to_path(&existing, &self.path)?;
        debug!(rows = appended, total = existing.len(), path = %self.path.display(), "ledger rows appended");
        Ok(())
    }
}

/// Writes rows to `path` through a temporary file and a rename.
pub fn save_rows_to_path(rows: &[LedgerRow], path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_rows(rows)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_rows_from_path(path: &Path) -> Result<Vec<LedgerRow>, CoreError> {
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", LEDGER_EXTENSION))?;
    let mut segments = trimmed.rsplitn(3, '_');
    let time = segments.next()?;
    let date = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{}{}", date, time), "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    Ok(())
}

fn serialize_rows(rows: &[LedgerRow]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(rows).map_err(|err| CoreError::Serde(err.to_string()))
}
