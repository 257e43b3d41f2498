use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identity kinds a session can carry at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    Student,
    /// Half-session between signup (or an unverified sign-in) and code
    /// confirmation.
    PendingStudent,
    Admin,
    Recruiter,
}

impl PrincipalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrincipalKind::Student => "student",
            PrincipalKind::PendingStudent => "pending_student",
            PrincipalKind::Admin => "admin",
            PrincipalKind::Recruiter => "recruiter",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "student" => Some(PrincipalKind::Student),
            "pending_student" => Some(PrincipalKind::PendingStudent),
            "admin" => Some(PrincipalKind::Admin),
            "recruiter" => Some(PrincipalKind::Recruiter),
            _ => None,
        }
    }

    /// Claims that cannot coexist with this one. A student is either fully
    /// signed in or waiting on a code, never both.
    pub fn displaces(self) -> &'static [PrincipalKind] {
        match self {
            PrincipalKind::Student => &[PrincipalKind::PendingStudent],
            PrincipalKind::PendingStudent => &[PrincipalKind::Student],
            PrincipalKind::Admin | PrincipalKind::Recruiter => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrincipalClaims(BTreeMap<PrincipalKind, Uuid>);

impl PrincipalClaims {
    pub fn get(&self, kind: PrincipalKind) -> Option<Uuid> {
        self.0.get(&kind).copied()
    }

    pub fn insert(&mut self, kind: PrincipalKind, principal_id: Uuid) {
        for displaced in kind.displaces() {
            self.0.remove(displaced);
        }
        self.0.insert(kind, principal_id);
    }

    pub fn remove(&mut self, kind: PrincipalKind) -> Option<Uuid> {
        self.0.remove(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = PrincipalKind> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(PrincipalKind, Uuid)> for PrincipalClaims {
    fn from_iter<I: IntoIterator<Item = (PrincipalKind, Uuid)>>(iter: I) -> Self {
        let mut claims = PrincipalClaims::default();
        for (kind, id) in iter {
            claims.insert(kind, id);
        }
        claims
    }
}

/// Server-side session, addressed by the digest of the client's token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub claims: PrincipalClaims,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_roundtrip_through_storage_names() {
        for kind in [
            PrincipalKind::Student,
            PrincipalKind::PendingStudent,
            PrincipalKind::Admin,
            PrincipalKind::Recruiter,
        ] {
            assert_eq!(PrincipalKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PrincipalKind::parse("root"), None);
    }

    #[test]
    fn independent_principals_coexist() {
        let mut claims = PrincipalClaims::default();
        let (s, a, r) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        claims.insert(PrincipalKind::Student, s);
        claims.insert(PrincipalKind::Admin, a);
        claims.insert(PrincipalKind::Recruiter, r);
        assert_eq!(claims.get(PrincipalKind::Student), Some(s));
        assert_eq!(claims.get(PrincipalKind::Admin), Some(a));
        assert_eq!(claims.get(PrincipalKind::Recruiter), Some(r));
    }

    #[test]
    fn full_sign_in_replaces_pending_claim() {
        let mut claims = PrincipalClaims::default();
        let id = Uuid::new_v4();
        claims.insert(PrincipalKind::PendingStudent, id);
        claims.insert(PrincipalKind::Student, id);
        assert_eq!(claims.get(PrincipalKind::PendingStudent), None);
        assert_eq!(claims.get(PrincipalKind::Student), Some(id));

        claims.insert(PrincipalKind::PendingStudent, Uuid::new_v4());
        assert_eq!(claims.get(PrincipalKind::Student), None);
    }

    #[test]
    fn removing_last_claim_leaves_empty_set() {
        let mut claims: PrincipalClaims =
            [(PrincipalKind::Admin, Uuid::new_v4())].into_iter().collect();
        assert!(claims.remove(PrincipalKind::Admin).is_some());
        assert!(claims.is_empty());
    }
}
