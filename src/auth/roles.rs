use std::fmt;

/// The closed set of roles that authorization gates understand.
///
/// Role rows are admin-managed, so the `roles` table may hold names outside this
/// set. Such roles still authenticate but never satisfy a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Admin,
    Dosen,
    Mahasiswa,
}

impl RoleKind {
    /// Seed order; also the insertion order of the initial role rows.
    pub const ALL: [RoleKind; 3] = [RoleKind::Admin, RoleKind::Dosen, RoleKind::Mahasiswa];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::Admin => "Admin",
            RoleKind::Dosen => "Dosen",
            RoleKind::Mahasiswa => "Mahasiswa",
        }
    }

    /// Exact, case-sensitive match against a role name.
    pub fn from_name(name: &str) -> Option<RoleKind> {
        match name {
            "Admin" => Some(RoleKind::Admin),
            "Dosen" => Some(RoleKind::Dosen),
            "Mahasiswa" => Some(RoleKind::Mahasiswa),
            _ => None,
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
