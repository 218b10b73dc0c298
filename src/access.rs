//! Access Policy
//!
//! The single place that decides who may do what. Every service operation
//! calls [`authorize`] (through [`require`]) before touching the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_types::UserId;
use crate::error::RemitError;

/// Role as reported by the identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read a rate or request a quote
    ReadRate,
    /// Create a transaction owned by `owner`
    CreateTransaction { owner: UserId },
    /// Read transactions owned by `owner`
    ReadOwn { owner: UserId },
    ReadAll,
    UpdateRate,
    SetState,
    ViewStats,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ReadRate => "read_rate",
            Operation::CreateTransaction { .. } => "create_transaction",
            Operation::ReadOwn { .. } => "read_own",
            Operation::ReadAll => "read_all",
            Operation::UpdateRate => "update_rate",
            Operation::SetState => "set_state",
            Operation::ViewStats => "view_stats",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthorized,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Decide whether `caller` may perform `op`
///
/// | operation                                   | allowed for           |
/// |---------------------------------------------|-----------------------|
/// | ReadRate                                    | any authenticated     |
/// | CreateTransaction { owner }                 | the caller as owner   |
/// | ReadOwn { owner }                           | the owner, or admin   |
/// | ReadAll / UpdateRate / SetState / ViewStats | admin                 |
///
/// No caller: `Unauthorized` for everything.
pub fn authorize(caller: Option<&Caller>, op: Operation) -> Decision {
    let Some(caller) = caller else {
        return Decision::Deny(DenyReason::Unauthorized);
    };

    let allowed = match op {
        Operation::ReadRate => true,
        Operation::CreateTransaction { owner } => caller.user_id == owner,
        Operation::ReadOwn { owner } => caller.user_id == owner || caller.is_admin(),
        Operation::ReadAll | Operation::UpdateRate | Operation::SetState | Operation::ViewStats => {
            caller.is_admin()
        }
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// [`authorize`] as a `Result`, returning the caller on success
pub fn require(caller: Option<&Caller>, op: Operation) -> Result<Caller, RemitError> {
    match (authorize(caller, op), caller) {
        (Decision::Allow, Some(caller)) => Ok(*caller),
        (Decision::Deny(DenyReason::Forbidden), Some(caller)) => {
            tracing::warn!(
                user_id = %caller.user_id,
                role = %caller.role,
                op = op.as_str(),
                "Operation forbidden"
            );
            Err(RemitError::Forbidden)
        }
        _ => Err(RemitError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        uuid::Uuid::new_v4()
    }

    #[test]
    fn test_unauthenticated_denied_everything() {
        let owner = uid();
        for op in [
            Operation::ReadRate,
            Operation::CreateTransaction { owner },
            Operation::ReadOwn { owner },
            Operation::ReadAll,
            Operation::UpdateRate,
            Operation::SetState,
            Operation::ViewStats,
        ] {
            assert_eq!(
                authorize(None, op),
                Decision::Deny(DenyReason::Unauthorized)
            );
            assert_eq!(require(None, op), Err(RemitError::Unauthorized));
        }
    }

    #[test]
    fn test_user_admin_only_operations_forbidden() {
        let user = Caller::user(uid());
        for op in [
            Operation::ReadAll,
            Operation::UpdateRate,
            Operation::SetState,
            Operation::ViewStats,
        ] {
            assert_eq!(require(Some(&user), op), Err(RemitError::Forbidden));
        }
    }

    #[test]
    fn test_admin_allowed_admin_operations() {
        let admin = Caller::admin(uid());
        for op in [
            Operation::ReadAll,
            Operation::UpdateRate,
            Operation::SetState,
            Operation::ViewStats,
            Operation::ReadRate,
        ] {
            assert_eq!(authorize(Some(&admin), op), Decision::Allow);
        }
    }

    #[test]
    fn test_create_only_for_self() {
        let user = Caller::user(uid());
        assert_eq!(
            authorize(
                Some(&user),
                Operation::CreateTransaction {
                    owner: user.user_id
                }
            ),
            Decision::Allow
        );
        assert_eq!(
            authorize(Some(&user), Operation::CreateTransaction { owner: uid() }),
            Decision::Deny(DenyReason::Forbidden)
        );
        // Admins do not create on behalf of others either
        let admin = Caller::admin(uid());
        assert_eq!(
            authorize(Some(&admin), Operation::CreateTransaction { owner: uid() }),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn test_read_own() {
        let owner = Caller::user(uid());
        let other = Caller::user(uid());
        let admin = Caller::admin(uid());
        let op = Operation::ReadOwn {
            owner: owner.user_id,
        };
        assert_eq!(authorize(Some(&owner), op), Decision::Allow);
        assert_eq!(
            authorize(Some(&other), op),
            Decision::Deny(DenyReason::Forbidden)
        );
        assert_eq!(authorize(Some(&admin), op), Decision::Allow);
    }
}
