//! Table group CRUD operations.
//!
//! Table groups are the units of profiling work scoped to a schema (or an
//! explicit table list) in a connection's target database.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewTableGroup, TableGroupRow, TableGroupUpdate};
use crate::DbError;

/// Insert a new table group and return its database-assigned UUID.
pub async fn create_table_group(pool: &PgPool, new: NewTableGroup) -> Result<Uuid, DbError> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO tgapp.table_groups
            (project_code, connection_id, table_groups_name, table_group_schema,
             profiling_table_set, profiling_include_mask, profiling_exclude_mask,
             profile_id_column_mask, profile_sk_column_mask, profile_use_sampling,
             profile_sample_percent, profile_sample_min_count, profiling_delay_days,
             profile_flag_cdes, profile_do_pair_rules, profile_pair_rule_pct,
             description, data_source, source_system, source_process,
             data_location, business_domain, stakeholder_group, transform_level,
             data_product)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
        RETURNING id
        "#,
    )
    .bind(new.project_code)
    .bind(new.connection_id)
    .bind(new.table_groups_name)
    .bind(new.table_group_schema)
    .bind(new.profiling_table_set)
    .bind(new.profiling_include_mask)
    .bind(new.profiling_exclude_mask)
    .bind(new.profile_id_column_mask)
    .bind(new.profile_sk_column_mask)
    .bind(new.profile_use_sampling)
    .bind(new.profile_sample_percent)
    .bind(new.profile_sample_min_count)
    .bind(new.profiling_delay_days)
    .bind(new.profile_flag_cdes)
    .bind(new.profile_do_pair_rules)
    .bind(new.profile_pair_rule_pct)
    .bind(new.description)
    .bind(new.data_source)
    .bind(new.source_system)
    .bind(new.source_process)
    .bind(new.data_location)
    .bind(new.business_domain)
    .bind(new.stakeholder_group)
    .bind(new.transform_level)
    .bind(new.data_product)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Return every table group.  No ORDER BY: callers must not rely on row
/// order.
pub async fn get_all_table_groups(pool: &PgPool) -> Result<Vec<TableGroupRow>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM tgapp.table_groups")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Return the table groups attached to one connection profile.
pub async fn get_table_groups_for_connection(
    pool: &PgPool,
    connection_id: i64,
) -> Result<Vec<TableGroupRow>, DbError> {
    let rows = sqlx::query_as("SELECT * FROM tgapp.table_groups WHERE connection_id = $1")
        .bind(connection_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetch a single table group, or `None` if the id does not exist.
pub async fn get_table_group(pool: &PgPool, id: Uuid) -> Result<Option<TableGroupRow>, DbError> {
    let row = sqlx::query_as("SELECT * FROM tgapp.table_groups WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Apply a partial update to a table group.
///
/// Returns `false` if the id does not exist.  Same contract as
/// [`crate::repository::connections::update_connection`], including the
/// COALESCE semantics: a column cannot be set back to NULL through this
/// path.
pub async fn update_table_group(
    pool: &PgPool,
    id: Uuid,
    update: TableGroupUpdate,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE tgapp.table_groups SET
            project_code = COALESCE($2, project_code),
            connection_id = COALESCE($3, connection_id),
            table_groups_name = COALESCE($4, table_groups_name),
            table_group_schema = COALESCE($5, table_group_schema),
            profiling_table_set = COALESCE($6, profiling_table_set),
            profiling_include_mask = COALESCE($7, profiling_include_mask),
            profiling_exclude_mask = COALESCE($8, profiling_exclude_mask),
            profile_id_column_mask = COALESCE($9, profile_id_column_mask),
            profile_sk_column_mask = COALESCE($10, profile_sk_column_mask),
            profile_use_sampling = COALESCE($11, profile_use_sampling),
            profile_sample_percent = COALESCE($12, profile_sample_percent),
            profile_sample_min_count = COALESCE($13, profile_sample_min_count),
            profiling_delay_days = COALESCE($14, profiling_delay_days),
            profile_flag_cdes = COALESCE($15, profile_flag_cdes),
            profile_do_pair_rules = COALESCE($16, profile_do_pair_rules),
            profile_pair_rule_pct = COALESCE($17, profile_pair_rule_pct),
            description = COALESCE($18, description),
            data_source = COALESCE($19, data_source),
            source_system = COALESCE($20, source_system),
            source_process = COALESCE($21, source_process),
            data_location = COALESCE($22, data_location),
            business_domain = COALESCE($23, business_domain),
            stakeholder_group = COALESCE($24, stakeholder_group),
            transform_level = COALESCE($25, transform_level),
            data_product = COALESCE($26, data_product),
            last_complete_profile_run_id = COALESCE($27, last_complete_profile_run_id),
            dq_score_profiling = COALESCE($28, dq_score_profiling),
            dq_score_testing = COALESCE($29, dq_score_testing)
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(update.project_code)
    .bind(update.connection_id)
    .bind(update.table_groups_name)
    .bind(update.table_group_schema)
    .bind(update.profiling_table_set)
    .bind(update.profiling_include_mask)
    .bind(update.profiling_exclude_mask)
    .bind(update.profile_id_column_mask)
    .bind(update.profile_sk_column_mask)
    .bind(update.profile_use_sampling)
    .bind(update.profile_sample_percent)
    .bind(update.profile_sample_min_count)
    .bind(update.profiling_delay_days)
    .bind(update.profile_flag_cdes)
    .bind(update.profile_do_pair_rules)
    .bind(update.profile_pair_rule_pct)
    .bind(update.description)
    .bind(update.data_source)
    .bind(update.source_system)
    .bind(update.source_process)
    .bind(update.data_location)
    .bind(update.business_domain)
    .bind(update.stakeholder_group)
    .bind(update.transform_level)
    .bind(update.data_product)
    .bind(update.last_complete_profile_run_id)
    .bind(update.dq_score_profiling)
    .bind(update.dq_score_testing)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Permanently delete a table group.  Returns `false` if the id does not
/// exist.
pub async fn delete_table_group(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM tgapp.table_groups WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
