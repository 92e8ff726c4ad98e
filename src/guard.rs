//! Referential-integrity checks run before every create, update and delete.
//!
//! Each check is a single read. They are not atomic with the write that
//! follows, so two concurrent creates can both pass `ensure_unique`; the
//! UNIQUE constraints in the schema reject the loser, and `AppError`'s
//! `From<sqlx::Error>` turns that rejection into the same `Conflict`.
//!
//! Table and column names below come only from these closed enums and are
//! never taken from request data.

use sqlx::SqlitePool;

use crate::error::AppError;

/// Tables that can be the target of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Roles,
    Users,
    Mahasiswa,
    Dosen,
    Kelas,
    Projects,
    Tasks,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Roles => "roles",
            Table::Users => "users",
            Table::Mahasiswa => "mahasiswa",
            Table::Dosen => "dosen",
            Table::Kelas => "kelas",
            Table::Projects => "projects",
            Table::Tasks => "tasks",
        }
    }

    /// Used in `NotFound` messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::Roles => "Role",
            Table::Users => "User",
            Table::Mahasiswa => "Student profile",
            Table::Dosen => "Lecturer profile",
            Table::Kelas => "Class",
            Table::Projects => "Project",
            Table::Tasks => "Task",
        }
    }

    /// The `NotFound` error for a missing row of this table.
    pub fn not_found(self) -> AppError {
        AppError::NotFound(format!("{} not found", self.label()))
    }
}

/// Every column that must hold globally unique values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    RoleName,
    UserEmail,
    MahasiswaNim,
    MahasiswaOwner,
    DosenNip,
    DosenOwner,
    KelasName,
}

impl UniqueKey {
    fn table(self) -> Table {
        match self {
            UniqueKey::RoleName => Table::Roles,
            UniqueKey::UserEmail => Table::Users,
            UniqueKey::MahasiswaNim | UniqueKey::MahasiswaOwner => Table::Mahasiswa,
            UniqueKey::DosenNip | UniqueKey::DosenOwner => Table::Dosen,
            UniqueKey::KelasName => Table::Kelas,
        }
    }

    fn column(self) -> &'static str {
        match self {
            UniqueKey::RoleName | UniqueKey::KelasName => "name",
            UniqueKey::UserEmail => "email",
            UniqueKey::MahasiswaNim => "nim",
            UniqueKey::DosenNip => "nip",
            UniqueKey::MahasiswaOwner | UniqueKey::DosenOwner => "user_id",
        }
    }

    fn conflict_message(self) -> &'static str {
        match self {
            UniqueKey::RoleName => "Role already exists",
            UniqueKey::UserEmail => "Email already registered",
            UniqueKey::MahasiswaNim => "NIM already exists",
            UniqueKey::MahasiswaOwner => "User already has a student profile",
            UniqueKey::DosenNip => "NIP already exists",
            UniqueKey::DosenOwner => "User already has a lecturer profile",
            UniqueKey::KelasName => "Class name already exists",
        }
    }
}

/// Parent-to-children relationships that block deleting the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    UsersOfRole,
    TasksOfKelas,
    TasksOfProject,
}

impl Dependency {
    fn child(self) -> (Table, &'static str) {
        match self {
            Dependency::UsersOfRole => (Table::Users, "role_id"),
            Dependency::TasksOfKelas => (Table::Tasks, "kelas_id"),
            Dependency::TasksOfProject => (Table::Tasks, "project_id"),
        }
    }

    fn conflict_message(self) -> &'static str {
        match self {
            Dependency::UsersOfRole => "Cannot delete role that is still in use",
            Dependency::TasksOfKelas => {
                "Cannot delete class with existing tasks. Please delete the tasks first"
            }
            Dependency::TasksOfProject => {
                "Cannot delete project with existing tasks. Please delete the tasks first"
            }
        }
    }
}

/// Fails with `NotFound` unless `table` has a row with `id`.
pub async fn ensure_exists(pool: &SqlitePool, table: Table, id: i64) -> Result<(), AppError> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table.name());
    let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    if count == 0 {
        return Err(table.not_found());
    }
    Ok(())
}

/// A value checked against a unique column.
#[derive(Debug, Clone, Copy)]
pub enum KeyValue<'a> {
    Text(&'a str),
    Id(i64),
}

impl<'a> From<&'a str> for KeyValue<'a> {
    fn from(value: &'a str) -> Self {
        KeyValue::Text(value)
    }
}

impl From<i64> for KeyValue<'_> {
    fn from(value: i64) -> Self {
        KeyValue::Id(value)
    }
}

/// Fails with `Conflict` if another row already holds `value` under `key`.
///
/// `exclude_id` is the row being updated, which may keep its own value.
pub async fn ensure_unique<'a>(
    pool: &SqlitePool,
    key: UniqueKey,
    value: impl Into<KeyValue<'a>>,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?1 AND (?2 IS NULL OR id != ?2)",
        key.table().name(),
        key.column()
    );
    let query = sqlx::query_scalar::<_, i64>(&sql);
    let query = match value.into() {
        KeyValue::Text(text) => query.bind(text.to_owned()),
        KeyValue::Id(id) => query.bind(id),
    };
    let count = query.bind(exclude_id).fetch_one(pool).await?;
    if count > 0 {
        return Err(AppError::Conflict(key.conflict_message().into()));
    }
    Ok(())
}

/// Fails with `Conflict` while any child row still references `parent_id`.
pub async fn ensure_no_dependents(
    pool: &SqlitePool,
    dependency: Dependency,
    parent_id: i64,
) -> Result<(), AppError> {
    let (child, column) = dependency.child();
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", child.name(), column);
    let count: i64 = sqlx::query_scalar(&sql).bind(parent_id).fetch_one(pool).await?;
    if count > 0 {
        log::info!(
            "Delete blocked: {} {} still has {} dependent row(s) in {}",
            dependency_parent_label(dependency),
            parent_id,
            count,
            child.name()
        );
        return Err(AppError::Conflict(dependency.conflict_message().into()));
    }
    Ok(())
}

fn dependency_parent_label(dependency: Dependency) -> &'static str {
    match dependency {
        Dependency::UsersOfRole => Table::Roles.label(),
        Dependency::TasksOfKelas => Table::Kelas.label(),
        Dependency::TasksOfProject => Table::Projects.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn pool_with_kelas() -> SqlitePool {
        let pool = db::setup("sqlite::memory:", 1).await.unwrap();
        sqlx::query("INSERT INTO kelas (name) VALUES ('TI-1A'), ('TI-1B')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[test]
    fn test_not_found_messages() {
        let cases = [
            (Table::Mahasiswa, "Student profile not found"),
            (Table::Dosen, "Lecturer profile not found"),
            (Table::Tasks, "Task not found"),
            (Table::Roles, "Role not found"),
        ];
        for (table, expected) in cases {
            match table.not_found() {
                AppError::NotFound(msg) => assert_eq!(msg, expected),
                other => panic!("Expected NotFound, got {:?}", other),
            }
        }
    }

    #[actix_rt::test]
    async fn test_ensure_exists() {
        let pool = pool_with_kelas().await;
        assert!(ensure_exists(&pool, Table::Kelas, 1).await.is_ok());
        match ensure_exists(&pool, Table::Kelas, 99).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Class not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_ensure_unique_excludes_self() {
        let pool = pool_with_kelas().await;

        assert!(ensure_unique(&pool, UniqueKey::KelasName, "TI-2A", None).await.is_ok());
        assert!(matches!(
            ensure_unique(&pool, UniqueKey::KelasName, "TI-1A", None).await,
            Err(AppError::Conflict(_))
        ));
        // renaming row 1 to its own name is fine, to row 2's name is not
        assert!(ensure_unique(&pool, UniqueKey::KelasName, "TI-1A", Some(1)).await.is_ok());
        assert!(matches!(
            ensure_unique(&pool, UniqueKey::KelasName, "TI-1B", Some(1)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_ensure_no_dependents() {
        let pool = pool_with_kelas().await;
        sqlx::query(
            "INSERT INTO projects (name, start_date, end_date, status) VALUES ('P', '2024-01-01', '2024-02-01', 'Planned')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO tasks (project_id, kelas_id, title, due_date) VALUES (1, 1, 'Essay', '2024-01-15')",
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(
            ensure_no_dependents(&pool, Dependency::TasksOfKelas, 1).await,
            Err(AppError::Conflict(_))
        ));
        assert!(ensure_no_dependents(&pool, Dependency::TasksOfKelas, 2).await.is_ok());
        assert!(matches!(
            ensure_no_dependents(&pool, Dependency::TasksOfProject, 1).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_unique(&pool, UniqueKey::KelasName, "TI-1B", None).await,
            Err(AppError::Conflict(msg)) if msg == "Class name already exists"
        ));
        // seeded roles have no users yet
        assert!(ensure_no_dependents(&pool, Dependency::UsersOfRole, 1).await.is_ok());
    }
}
