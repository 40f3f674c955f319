use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::warn;

use crate::pipeline::Record;

const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger not found: {0}")]
    Missing(PathBuf),
    #[error("ledger is locked by another process")]
    Locked,
    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

/// Where a run's records actually landed.
#[derive(Debug)]
pub struct AppendOutcome {
    pub destination: PathBuf,
    /// True when the primary ledger was locked and the run went to a
    /// freshly named alternate file instead.
    pub diverted: bool,
    pub records_added: usize,
}

#[derive(Debug)]
pub struct LedgerStats {
    pub invoices: usize,
    pub runs: usize,
}

/// Create a fresh ledger at `path` (the one operation allowed to create the
/// file; appends never will).
pub fn init(path: &Path) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|_| LedgerError::Missing(path.to_path_buf()))?;
    }
    let conn = Connection::open(path).map_err(classify)?;
    init_schema(&conn)
}

/// Append a run's records, in order, as one transaction, plus one history
/// entry. A missing ledger aborts with no write. A locked ledger diverts the
/// whole run to a timestamped alternate file; the run still succeeds.
pub fn append_run(
    dest: &Path,
    records: &[Record],
    source_name: &str,
) -> Result<AppendOutcome, LedgerError> {
    match append_to(dest, records, source_name, false) {
        Ok(added) => Ok(AppendOutcome {
            destination: dest.to_path_buf(),
            diverted: false,
            records_added: added,
        }),
        Err(LedgerError::Locked) => {
            let alternate = alternate_path(dest);
            warn!(
                "Ledger {} is locked, diverting run to {}",
                dest.display(),
                alternate.display()
            );
            let added = append_to(&alternate, records, source_name, true)?;
            Ok(AppendOutcome {
                destination: alternate,
                diverted: true,
                records_added: added,
            })
        }
        Err(e) => Err(e),
    }
}

pub fn stats(dest: &Path) -> Result<LedgerStats, LedgerError> {
    let conn = open(dest, false)?;
    let invoices: usize = conn
        .query_row("SELECT COUNT(*) FROM invoices", [], |r| r.get(0))
        .map_err(classify)?;
    let runs: usize = conn
        .query_row("SELECT COUNT(*) FROM history", [], |r| r.get(0))
        .map_err(classify)?;
    Ok(LedgerStats { invoices, runs })
}

fn open(path: &Path, create: bool) -> Result<Connection, LedgerError> {
    let flags = if create {
        OpenFlags::default()
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
    };
    let conn = Connection::open_with_flags(path, flags).map_err(|e| match classify(e) {
        // Without the CREATE flag, a missing file surfaces as CannotOpen.
        LedgerError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            LedgerError::Missing(path.to_path_buf())
        }
        other => other,
    })?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(classify)?;
    Ok(conn)
}

fn append_to(
    path: &Path,
    records: &[Record],
    source_name: &str,
    create: bool,
) -> Result<usize, LedgerError> {
    let conn = open(path, create)?;
    init_schema(&conn)?;

    let tx = conn.unchecked_transaction().map_err(classify)?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO invoices
                 (property_name, vendor_name, service_type, invoice_number, invoice_date, invoice_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(classify)?;
        for r in records {
            // Unresolved fields go in as empty, never as a sentinel string.
            stmt.execute(rusqlite::params![
                r.property_name,
                r.vendor_name.as_deref().unwrap_or(""),
                r.service_type.as_deref().unwrap_or(""),
                r.invoice_number.as_deref().unwrap_or(""),
                r.invoice_date.as_deref().unwrap_or(""),
                r.invoice_amount.as_deref().unwrap_or(""),
            ])
            .map_err(classify)?;
        }

        let now = Local::now();
        tx.execute(
            "INSERT INTO history (run_date, run_time, description, records_added)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                now.format("%m/%d/%Y").to_string(),
                now.format("%I:%M %p").to_string(),
                format!("Processed {}", source_name),
                records.len(),
            ],
        )
        .map_err(classify)?;
    }
    tx.commit().map_err(classify)?;
    Ok(records.len())
}

fn init_schema(conn: &Connection) -> Result<(), LedgerError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS invoices (
            id             INTEGER PRIMARY KEY,
            property_name  TEXT NOT NULL,
            vendor_name    TEXT NOT NULL DEFAULT '',
            service_type   TEXT NOT NULL DEFAULT '',
            invoice_number TEXT NOT NULL DEFAULT '',
            invoice_date   TEXT NOT NULL DEFAULT '',
            invoice_amount TEXT NOT NULL DEFAULT '',
            added_at       TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS history (
            id            INTEGER PRIMARY KEY,
            run_date      TEXT NOT NULL,
            run_time      TEXT NOT NULL,
            description   TEXT NOT NULL,
            records_added INTEGER NOT NULL
        );
        ",
    )
    .map_err(classify)?;
    Ok(())
}

/// `ledger.sqlite` → `ledger_backup_20250301_141502.sqlite`, alongside the
/// original.
fn alternate_path(dest: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let stem = dest
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ledger");
    let name = match dest.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_backup_{stamp}.{ext}"),
        None => format!("{stem}_backup_{stamp}"),
    };
    dest.with_file_name(name)
}

fn classify(e: rusqlite::Error) -> LedgerError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            LedgerError::Locked
        }
        _ => LedgerError::Sqlite(e),
    }
}

// ── Tests ──
