//! Mahasiswa (student) and Dosen (lecturer) profiles.
//!
//! Both are 1:1 extensions of a user carrying one unique identifier: the NIM
//! for students, the NIP for lecturers. They share one row shape and one set
//! of handlers; `ProfileKind` supplies the table, the identifier field name
//! and the messages.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use validator::Validate;

use crate::guard::{Table, UniqueKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Mahasiswa,
    Dosen,
}

impl ProfileKind {
    pub fn table(self) -> Table {
        match self {
            ProfileKind::Mahasiswa => Table::Mahasiswa,
            ProfileKind::Dosen => Table::Dosen,
        }
    }

    /// Name of the identifier column and JSON field.
    pub fn ident_field(self) -> &'static str {
        match self {
            ProfileKind::Mahasiswa => "nim",
            ProfileKind::Dosen => "nip",
        }
    }

    pub fn ident_key(self) -> UniqueKey {
        match self {
            ProfileKind::Mahasiswa => UniqueKey::MahasiswaNim,
            ProfileKind::Dosen => UniqueKey::DosenNip,
        }
    }

    pub fn owner_key(self) -> UniqueKey {
        match self {
            ProfileKind::Mahasiswa => UniqueKey::MahasiswaOwner,
            ProfileKind::Dosen => UniqueKey::DosenOwner,
        }
    }

    pub fn noun(self) -> &'static str {
        self.table().label()
    }

    pub(crate) fn select_sql(self) -> String {
        format!(
            "SELECT p.id, p.user_id, p.{ident} AS ident, u.name AS user_name, u.email AS user_email \
             FROM {table} p JOIN users u ON u.id = p.user_id",
            ident = self.ident_field(),
            table = self.table().name()
        )
    }
}

/// A profile joined with the owning user's public fields.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub ident: String,
    pub user_name: String,
    pub user_email: String,
}

impl Profile {
    /// `{id, nim|nip, user: {id, name, email}}`
    pub fn to_json(&self, kind: ProfileKind) -> Value {
        let mut body = json!({
            "id": self.id,
            "user": {
                "id": self.user_id,
                "name": self.user_name,
                "email": self.user_email,
            }
        });
        body[kind.ident_field()] = Value::String(self.ident.clone());
        body
    }
}

/// Kind-independent create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub user_id: i64,
    pub ident: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct MahasiswaInput {
    pub user_id: i64,
    #[validate(length(min = 1, max = 20, message = "NIM is required"))]
    pub nim: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct DosenInput {
    pub user_id: i64,
    #[validate(length(min = 1, max = 20, message = "NIP is required"))]
    pub nip: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MahasiswaPatch {
    #[validate(length(min = 1, max = 20))]
    pub nim: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DosenPatch {
    #[validate(length(min = 1, max = 20))]
    pub nip: Option<String>,
}

impl From<MahasiswaInput> for NewProfile {
    fn from(input: MahasiswaInput) -> Self {
        NewProfile {
            user_id: input.user_id,
            ident: input.nim,
        }
    }
}

impl From<DosenInput> for NewProfile {
    fn from(input: DosenInput) -> Self {
        NewProfile {
            user_id: input.user_id,
            ident: input.nip,
        }
    }
}
