//! Permission bitmask and the role catalogue.
//!
//! Roles are rows in the `roles` table; each carries a permission bitmask.
//! The catalogue here is the source of truth: [`init_roles`] seeds or
//! re-syncs the table on startup, so permission changes ship with the binary
//! and take effect without manual SQL.

use crate::orm::roles;
use bitflags::bitflags;
use sea_orm::entity::*;
use sea_orm::{ConnectionTrait, DbErr, QueryFilter};

bitflags! {
    pub struct Permission: i32 {
        const FOLLOW = 1 << 0;
        const COLLECT = 1 << 1;
        const COMMENT = 1 << 2;
        const UPLOAD = 1 << 3;
        const MODERATE = 1 << 4;
        const ADMINISTER = 1 << 5;
    }
}

impl Permission {
    /// Decode a bitmask stored in the database. Unknown bits are dropped.
    pub fn from_db(bits: i32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

/// The four built-in roles, from most restricted to least.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleName {
    Locked,
    User,
    Moderator,
    Admin,
}

impl RoleName {
    pub const ALL: [RoleName; 4] = [
        RoleName::Locked,
        RoleName::User,
        RoleName::Moderator,
        RoleName::Admin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleName::Locked => "Locked",
            RoleName::User => "User",
            RoleName::Moderator => "Moderator",
            RoleName::Admin => "Admin",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Locked" => Some(RoleName::Locked),
            "User" => Some(RoleName::User),
            "Moderator" => Some(RoleName::Moderator),
            "Admin" => Some(RoleName::Admin),
            _ => None,
        }
    }

    /// New registrations land in the default role.
    pub fn is_default(self) -> bool {
        matches!(self, RoleName::User)
    }

    pub fn permissions(self) -> Permission {
        match self {
            RoleName::Locked => Permission::FOLLOW | Permission::COLLECT,
            RoleName::User => {
                RoleName::Locked.permissions() | Permission::COMMENT | Permission::UPLOAD
            }
            RoleName::Moderator => RoleName::User.permissions() | Permission::MODERATE,
            RoleName::Admin => RoleName::Moderator.permissions() | Permission::ADMINISTER,
        }
    }
}

/// Seed the roles table from the catalogue. Existing rows are updated in
/// place when their bitmask or default flag drifted, so the call is
/// idempotent and safe on every startup.
pub async fn init_roles<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    for role in RoleName::ALL {
        let existing = roles::Entity::find()
            .filter(roles::Column::Name.eq(role.as_str()))
            .one(db)
            .await?;

        match existing {
            Some(row) => {
                if row.permissions != role.permissions().bits() || row.is_default != role.is_default()
                {
                    let mut row: roles::ActiveModel = row.into();
                    row.permissions = Set(role.permissions().bits());
                    row.is_default = Set(role.is_default());
                    row.update(db).await?;
                }
            }
            None => {
                roles::ActiveModel {
                    name: Set(role.as_str().to_owned()),
                    is_default: Set(role.is_default()),
                    permissions: Set(role.permissions().bits()),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }
    }
    Ok(())
}

/// Look up a catalogue role's database row.
pub async fn get_role<C: ConnectionTrait>(db: &C, role: RoleName) -> Result<roles::Model, DbErr> {
    roles::Entity::find()
        .filter(roles::Column::Name.eq(role.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("role {} is not seeded", role.as_str())))
}

/// Resolve the permission bitmask a user holds through their role.
/// A user without a role (or with a dangling role id) holds nothing.
pub async fn user_permissions<C: ConnectionTrait>(
    db: &C,
    user: &crate::orm::users::Model,
) -> Result<Permission, DbErr> {
    let role_id = match user.role_id {
        Some(id) => id,
        None => return Ok(Permission::empty()),
    };
    Ok(roles::Entity::find_by_id(role_id)
        .one(db)
        .await?
        .map(|role| Permission::from_db(role.permissions))
        .unwrap_or_else(Permission::empty))
}

/// Look up the role assigned to new registrations.
pub async fn get_default_role<C: ConnectionTrait>(db: &C) -> Result<roles::Model, DbErr> {
    roles::Entity::find()
        .filter(roles::Column::IsDefault.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound("no default role is seeded".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmask_values_are_stable() {
        // Stored in the database, so these must never change.
        assert_eq!(Permission::FOLLOW.bits(), 1);
        assert_eq!(Permission::COLLECT.bits(), 2);
        assert_eq!(Permission::COMMENT.bits(), 4);
        assert_eq!(Permission::UPLOAD.bits(), 8);
        assert_eq!(Permission::MODERATE.bits(), 16);
        assert_eq!(Permission::ADMINISTER.bits(), 32);
    }

    #[test]
    fn roles_are_strictly_widening() {
        let mut prev = Permission::empty();
        for role in RoleName::ALL {
            let perms = role.permissions();
            assert!(perms.contains(prev), "{:?} lost permissions", role);
            assert!(perms != prev, "{:?} added nothing", role);
            prev = perms;
        }
    }

    #[test]
    fn only_user_is_default() {
        let defaults: Vec<_> = RoleName::ALL.iter().filter(|r| r.is_default()).collect();
        assert_eq!(defaults, vec![&RoleName::User]);
    }

    #[test]
    fn locked_role_cannot_post() {
        let locked = RoleName::Locked.permissions();
        assert!(locked.contains(Permission::FOLLOW));
        assert!(locked.contains(Permission::COLLECT));
        assert!(!locked.contains(Permission::COMMENT));
        assert!(!locked.contains(Permission::UPLOAD));
    }

    #[test]
    fn unknown_bits_are_dropped() {
        let decoded = Permission::from_db(0b1111_1111);
        assert_eq!(decoded, Permission::all());
    }
}
