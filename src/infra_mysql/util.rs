use super::repo_tx_mysql::MySqlTx;
use crate::domain_port::*;
use sqlx::mysql::MySqlDatabaseError;

const ER_DUP_ENTRY: u16 = 1062;
const ER_ROW_IS_REFERENCED_2: u16 = 1451;

/// The MySQL transaction behind `tx`. Fails when a transaction from another
/// backend is passed in.
pub fn downcast(tx: &mut dyn StorageTx) -> Result<&mut MySqlTx, StoreError> {
    tx.as_any_mut()
        .downcast_mut::<MySqlTx>()
        .ok_or_else(|| StoreError::Backend("transaction is not a MySQL transaction".to_string()))
}

fn mysql_error_number(err: &sqlx::Error) -> Option<u16> {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return Some(mysql_err.number());
        }
    }
    None
}

/// Maps a driver error onto [`StoreError`], annotated with `op`.
pub fn map_sqlx(op: &str, err: sqlx::Error) -> StoreError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return StoreError::NotFound;
    }
    match mysql_error_number(&err) {
        Some(ER_DUP_ENTRY) => StoreError::Duplicate(format!("{op}: {err}")),
        Some(ER_ROW_IS_REFERENCED_2) => StoreError::Referenced(format!("{op}: {err}")),
        _ => StoreError::backend(op, err),
    }
}
