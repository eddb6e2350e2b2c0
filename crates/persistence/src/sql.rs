//! Statement helpers shared by transactions and queries.
//!
//! All SQL text in this crate binds caller values exclusively through `?`
//! placeholders; nothing here interpolates values into SQL strings. The
//! helpers below only assemble placeholder lists and portable fragments.

use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::Any;

use crate::error::{Result, StorageError};
use crate::transactions::AnyTx;

/// Rows bound per batched INSERT statement.
///
/// Also serves as the fetch-size hint for paged scans: large reads page
/// through results in chunks of this many rows.
pub const BATCH_SIZE: usize = 500;

/// A value bound to one placeholder. Covers exactly the column types of the
/// fixed schema (UUIDs are strings, timestamps are i64, flags are 0/1).
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    I64(i64),
    F64(f64),
    Str(String),
    Null,
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::I64(v)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::F64(v)
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Str(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Str(v.to_string())
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::I64(v as i64)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

fn bind<'q>(
    query: Query<'q, Any, AnyArguments<'q>>,
    param: &Param,
) -> Query<'q, Any, AnyArguments<'q>> {
    match param {
        Param::I64(v) => query.bind(*v),
        Param::F64(v) => query.bind(*v),
        Param::Str(v) => query.bind(v.clone()),
        Param::Null => query.bind(Option::<i64>::None),
    }
}

/// `(?, ?, ..)` group with `width` placeholders.
fn placeholder_group(width: usize) -> String {
    let marks = vec!["?"; width].join(", ");
    format!("({marks})")
}

/// Inserts `rows` into `table` in chunks of [`BATCH_SIZE`] multi-row
/// statements inside the caller's transaction, so the whole batch commits or
/// rolls back with it. Every row must have one value per column.
pub async fn execute_batch(
    tx: &mut AnyTx<'_>,
    operation: &'static str,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Param>],
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    debug_assert!(rows.iter().all(|r| r.len() == columns.len()));

    for chunk in rows.chunks(BATCH_SIZE) {
        let groups = vec![placeholder_group(columns.len()); chunk.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            table,
            columns.join(", "),
            groups
        );

        let mut query = sqlx::query(&sql);
        for row in chunk {
            for param in row {
                query = bind(query, param);
            }
        }
        query
            .execute(&mut **tx)
            .await
            .map_err(|e| StorageError::operation(operation, format!("table {table}"), e))?;
    }
    Ok(())
}

/// Portable per-session playtime clamp for a `[from, to)` window:
/// `min(end, to) - max(start, from)` written with CASE because
/// LEAST/GREATEST do not exist in SQLite.
///
/// Binds four parameters in order: `to`, `to`, `from`, `from`.
pub fn overlap_clamp(start_col: &str, end_col: &str) -> String {
    format!(
        "(CASE WHEN {end_col} < ? THEN {end_col} ELSE ? END \
         - CASE WHEN {start_col} > ? THEN {start_col} ELSE ? END)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_groups() {
        assert_eq!(placeholder_group(1), "(?)");
        assert_eq!(placeholder_group(3), "(?, ?, ?)");
    }

    #[test]
    fn overlap_clamp_fragment() {
        let sql = overlap_clamp("s.session_start", "s.session_end");
        assert_eq!(
            sql,
            "(CASE WHEN s.session_end < ? THEN s.session_end ELSE ? END \
             - CASE WHEN s.session_start > ? THEN s.session_start ELSE ? END)"
        );
    }

    #[test]
    fn params_from_common_types() {
        assert_eq!(Param::from(true), Param::I64(1));
        assert_eq!(Param::from(Option::<i64>::None), Param::Null);
        assert_eq!(Param::from("x"), Param::Str("x".to_string()));
    }
}
