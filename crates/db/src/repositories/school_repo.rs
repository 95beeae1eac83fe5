//! Repository for the `schools` table.

use attenda_core::types::DbId;
use sqlx::PgPool;

use crate::models::school::{CreateSchool, School, UpdateSchool};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, code, address, contact_email, contact_phone, \
                       timezone, is_active, created_at, updated_at";

/// Provides CRUD operations for schools.
pub struct SchoolRepo;

impl SchoolRepo {
    /// Insert a new school, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSchool) -> Result<School, sqlx::Error> {
        let query = format!(
            "INSERT INTO schools (name, code, address, contact_email, contact_phone, timezone)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'UTC'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, School>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.address)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.timezone)
            .fetch_one(pool)
            .await
    }

    /// Find a school by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<School>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schools WHERE id = $1");
        sqlx::query_as::<_, School>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a school by its unique code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<School>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schools WHERE code = $1");
        sqlx::query_as::<_, School>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List schools ordered by name. Inactive schools are included only
    /// when `include_inactive` is set.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<School>, sqlx::Error> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = true"
        };
        let query = format!("SELECT {COLUMNS} FROM schools {filter} ORDER BY name ASC");
        sqlx::query_as::<_, School>(&query).fetch_all(pool).await
    }

    /// Update a school. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSchool,
    ) -> Result<Option<School>, sqlx::Error> {
        let query = format!(
            "UPDATE schools SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                contact_email = COALESCE($4, contact_email),
                contact_phone = COALESCE($5, contact_phone),
                timezone = COALESCE($6, timezone),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, School>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.timezone)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Count rows in other tables that still reference this school.
    ///
    /// Deletion is refused while this is non-zero.
    pub async fn dependent_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM users WHERE school_id = $1)
                  + (SELECT COUNT(*) FROM courses WHERE school_id = $1)
                  + (SELECT COUNT(*) FROM ble_beacons WHERE school_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Hard-delete a school. Returns `true` if a row was removed.
    ///
    /// Callers must check [`Self::dependent_count`] first; the RESTRICT
    /// foreign keys are the backstop.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
