//! Single-owner access control for user-scoped resources.

use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Allow iff the resource's owner is the authenticated caller.
pub fn authorize(owner_id: Uuid, user_id: Uuid) -> Access {
    if owner_id == user_id {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// [`authorize`] as a `Result`: `Deny` becomes a 403, distinct from 404.
pub fn ensure_owner(owner_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
    match authorize(owner_id, user_id) {
        Access::Allow => Ok(()),
        Access::Deny => {
            warn!(%owner_id, %user_id, "ownership check denied");
            Err(AppError::Forbidden("Access denied"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed() {
        let id = Uuid::new_v4();
        assert_eq!(authorize(id, id), Access::Allow);
        assert!(ensure_owner(id, id).is_ok());
    }

    #[test]
    fn anyone_else_is_denied() {
        let owner = Uuid::new_v4();
        for _ in 0..16 {
            let other = Uuid::new_v4();
            assert_eq!(authorize(owner, other), Access::Deny);
            assert!(matches!(
                ensure_owner(owner, other),
                Err(AppError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn nil_ids_are_not_special() {
        assert_eq!(authorize(Uuid::nil(), Uuid::new_v4()), Access::Deny);
        assert_eq!(authorize(Uuid::new_v4(), Uuid::nil()), Access::Deny);
    }
}
