//! Connection profile CRUD operations.

use sqlx::PgPool;

use crate::models::{ConnectionRow, ConnectionUpdate, NewConnection};
use crate::DbError;

/// Insert a new connection profile and return its database-assigned
/// integer id.
///
/// Constraint violations and connectivity failures propagate unchanged.
pub async fn create_connection(pool: &PgPool, new: NewConnection) -> Result<i64, DbError> {
    let (connection_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tgapp.connections
            (project_code, sql_flavor, project_host, project_port, project_user,
             project_db, connection_name, connection_description,
             project_pw_encrypted, max_threads, max_query_chars, url,
             connect_by_url, connect_by_key, private_key,
             private_key_passphrase, http_path)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17)
        RETURNING connection_id
        "#,
    )
    .bind(new.project_code)
    .bind(new.sql_flavor)
    .bind(new.project_host)
    .bind(new.project_port)
    .bind(new.project_user)
    .bind(new.project_db)
    .bind(new.connection_name)
    .bind(new.connection_description)
    .bind(new.project_pw_encrypted)
    .bind(new.max_threads)
    .bind(new.max_query_chars)
    .bind(new.url)
    .bind(new.connect_by_url)
    .bind(new.connect_by_key)
    .bind(new.private_key)
    .bind(new.private_key_passphrase)
    .bind(new.http_path)
    .fetch_one(pool)
    .await?;

    Ok(connection_id)
}

/// Return every connection profile.  No ORDER BY: callers must not rely on
/// row order.
pub async fn get_all_connections(pool: &PgPool) -> Result<Vec<ConnectionRow>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM tgapp.connections")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a single connection profile, or `None` if the id does not exist.
pub async fn get_connection(
    pool: &PgPool,
    connection_id: i64,
) -> Result<Option<ConnectionRow>, DbError> {
    let row = sqlx::query_as("SELECT * FROM tgapp.connections WHERE connection_id = $1")
        .bind(connection_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Apply a partial update to a connection profile.
///
/// Returns `false` if the id does not exist.  An update that carries no
/// fields (e.g. a mapping that only held unknown keys) still returns `true`
/// for an existing row.
///
/// Each column keeps its stored value unless the update supplies one
/// (COALESCE), so this can never set a nullable column back to NULL.
pub async fn update_connection(
    pool: &PgPool,
    connection_id: i64,
    update: ConnectionUpdate,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE tgapp.connections SET
            project_code = COALESCE($2, project_code),
            sql_flavor = COALESCE($3, sql_flavor),
            project_host = COALESCE($4, project_host),
            project_port = COALESCE($5, project_port),
            project_user = COALESCE($6, project_user),
            project_db = COALESCE($7, project_db),
            connection_name = COALESCE($8, connection_name),
            connection_description = COALESCE($9, connection_description),
            project_pw_encrypted = COALESCE($10, project_pw_encrypted),
            max_threads = COALESCE($11, max_threads),
            max_query_chars = COALESCE($12, max_query_chars),
            url = COALESCE($13, url),
            connect_by_url = COALESCE($14, connect_by_url),
            connect_by_key = COALESCE($15, connect_by_key),
            private_key = COALESCE($16, private_key),
            private_key_passphrase = COALESCE($17, private_key_passphrase),
            http_path = COALESCE($18, http_path)
        WHERE connection_id = $1
        "#,
    )
    .bind(connection_id)
    .bind(update.project_code)
    .bind(update.sql_flavor)
    .bind(update.project_host)
    .bind(update.project_port)
    .bind(update.project_user)
    .bind(update.project_db)
    .bind(update.connection_name)
    .bind(update.connection_description)
    .bind(update.project_pw_encrypted)
    .bind(update.max_threads)
    .bind(update.max_query_chars)
    .bind(update.url)
    .bind(update.connect_by_url)
    .bind(update.connect_by_key)
    .bind(update.private_key)
    .bind(update.private_key_passphrase)
    .bind(update.http_path)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Permanently delete a connection profile.
///
/// Returns `false` if the id does not exist.  Deleting a connection that
/// still has table groups fails with a foreign-key violation, surfaced as
/// `DbError::Sqlx`.
pub async fn delete_connection(pool: &PgPool, connection_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM tgapp.connections WHERE connection_id = $1")
        .bind(connection_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
