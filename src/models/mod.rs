pub mod kelas;
pub mod profile;
pub mod project;
pub mod role;
pub mod task;
pub mod user;

pub use kelas::{Kelas, KelasInput, KelasPatch, KelasSummary};
pub use profile::{DosenInput, DosenPatch, MahasiswaInput, MahasiswaPatch, NewProfile, Profile, ProfileKind};
pub use project::{Project, ProjectFields, ProjectInput, ProjectPatch, ProjectStatus};
pub use role::{Role, RoleInput, RolePatch};
pub use task::{Task, TaskFields, TaskInput, TaskPatch, TaskQuery, TaskStatusUpdate, TaskWithProject};
pub use user::{UserCredentials, UserPatch, UserView};

use serde::{Deserialize, Deserializer};

/// For patch fields on nullable columns: absent is `None` (keep), `null` is
/// `Some(None)` (clear), a value is `Some(Some(v))`. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
