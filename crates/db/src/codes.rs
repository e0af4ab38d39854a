//! Allocation of unique human-readable codes.

use bokyak_core::codes::{generate_code, MAX_CODE_ATTEMPTS};
use sqlx::PgConnection;

/// Generate a code of `length` characters not yet present in `table.column`.
///
/// Gives up after [`MAX_CODE_ATTEMPTS`] collisions.
pub(crate) async fn unique_code(
    conn: &mut PgConnection,
    table: &'static str,
    column: &'static str,
    length: usize,
) -> Result<String, sqlx::Error> {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1)");
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code(length);
        let (taken,): (bool,) = sqlx::query_as(&query)
            .bind(&code)
            .fetch_one(&mut *conn)
            .await?;
        if !taken {
            return Ok(code);
        }
        tracing::debug!(table, column, "Code collision, regenerating");
    }
    Err(sqlx::Error::Protocol(format!(
        "could not allocate a unique {table}.{column} after {MAX_CODE_ATTEMPTS} attempts"
    )))
}
