//! Operator roles
//!
//! The permission table for the people using the stand. It is data only:
//! no engine command consults it, and the correction-mode flag is likewise
//! a presentation concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub can_create_users: bool,
    pub can_edit_users: bool,
    pub can_delete_users: bool,
    pub can_view_all_data: bool,
    pub can_edit_all_data: bool,
    pub can_delete_data: bool,
    pub can_export_reports: bool,
    pub can_manage_roles: bool,
    pub can_access_admin_panel: bool,
}

impl Role {
    pub fn permissions(&self) -> RolePermissions {
        match self {
            Role::Admin => RolePermissions {
                can_create_users: true,
                can_edit_users: true,
                can_delete_users: true,
                can_view_all_data: true,
                can_edit_all_data: true,
                can_delete_data: true,
                can_export_reports: true,
                can_manage_roles: true,
                can_access_admin_panel: true,
            },
            Role::Supervisor => RolePermissions {
                can_view_all_data: true,
                can_export_reports: true,
                ..RolePermissions::none()
            },
            Role::Operator => RolePermissions::none(),
        }
    }
}

impl RolePermissions {
    pub const fn none() -> Self {
        Self {
            can_create_users: false,
            can_edit_users: false,
            can_delete_users: false,
            can_view_all_data: false,
            can_edit_all_data: false,
            can_delete_data: false,
            can_export_reports: false,
            can_manage_roles: false,
            can_access_admin_panel: false,
        }
    }
}

/// Whether `role` may perform the named action; unknown actions are denied
///
/// # Example
/// ```
/// use taxi_stand_core_rs::roles::{can_perform_action, Role};
///
/// assert!(can_perform_action(Role::Supervisor, "export_reports"));
/// assert!(!can_perform_action(Role::Supervisor, "delete_data"));
/// assert!(!can_perform_action(Role::Admin, "launch_rockets"));
/// ```
pub fn can_perform_action(role: Role, action: &str) -> bool {
    let p = role.permissions();
    match action {
        "create_user" => p.can_create_users,
        "edit_user" => p.can_edit_users,
        "delete_user" => p.can_delete_users,
        "view_all_data" => p.can_view_all_data,
        "edit_all_data" => p.can_edit_all_data,
        "delete_data" => p.can_delete_data,
        "export_reports" => p.can_export_reports,
        "manage_roles" => p.can_manage_roles,
        "access_admin" => p.can_access_admin_panel,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_has_nothing() {
        assert_eq!(Role::Operator.permissions(), RolePermissions::none());
    }

    #[test]
    fn test_admin_has_everything() {
        for action in ["create_user", "delete_data", "manage_roles", "access_admin"] {
            assert!(can_perform_action(Role::Admin, action));
        }
    }
}
