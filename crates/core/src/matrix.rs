//! Permission matrix projection.
//!
//! Cross-tabulates every known screen against every user. Each cell is keyed
//! by `<screen>_<operation>` (see [`screen_key`]) and reports whether that
//! user holds an allowed grant for it. Missing grants project to `false`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::permissions::{EntityType, OperationType, StoredGrant};
use crate::screens::{screen_key, ScreenDefinition};
use crate::types::DbId;

/// User columns shown in the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// Screens x users x operations.
///
/// `permissions` is keyed by user id rendered as a string so the JSON shape
/// is a plain object.
#[derive(Debug, Clone, Serialize)]
pub struct PermissionMatrix {
    pub screens: Vec<ScreenDefinition>,
    pub users: Vec<MatrixUser>,
    pub permissions: BTreeMap<String, BTreeMap<String, bool>>,
}

impl PermissionMatrix {
    /// Cell lookup; absent cells read as `false`.
    pub fn is_allowed(&self, user_id: DbId, key: &str) -> bool {
        self.permissions
            .get(&user_id.to_string())
            .and_then(|row| row.get(key))
            .copied()
            .unwrap_or(false)
    }
}

/// Build the matrix from the screen table, the users, and every stored grant.
///
/// A cell is `true` only for an allowed grant whose entity type, screen, and
/// operation all match the screen's definition, the same key `authorize`
/// checks. Grants for users not in `users`, for screen/operation pairs the
/// screen table does not list, or under another entity type are ignored.
pub fn build_matrix(
    screens: &[ScreenDefinition],
    users: &[MatrixUser],
    grants: &[StoredGrant],
) -> PermissionMatrix {
    let index: HashMap<(DbId, EntityType, &str, OperationType), bool> = grants
        .iter()
        .map(|g| {
            (
                (g.user_id, g.entity_type, g.screen_name.as_str(), g.operation_type),
                g.is_allowed,
            )
        })
        .collect();

    let permissions: BTreeMap<String, BTreeMap<String, bool>> = users
        .iter()
        .map(|user| {
            let row: BTreeMap<String, bool> = screens
                .iter()
                .flat_map(|screen| {
                    let index = &index;
                    screen.operations.iter().map(move |&op| {
                        let allowed = index
                            .get(&(user.id, screen.entity_type, screen.name, op))
                            .copied()
                            .unwrap_or(false);
                        (screen_key(screen.name, op), allowed)
                    })
                })
                .collect();
            (user.id.to_string(), row)
        })
        .collect();

    PermissionMatrix {
        screens: screens.to_vec(),
        users: users.to_vec(),
        permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::{ORDER_CANCELLATION, ORDER_INQUIRY, SCREENS};

    fn user(id: DbId, name: &str, role: &str) -> MatrixUser {
        MatrixUser {
            id,
            username: name.to_string(),
            email: format!("{name}@example.com"),
            role: role.to_string(),
        }
    }

    fn grant(user_id: DbId, op: OperationType, screen: &str, allowed: bool) -> StoredGrant {
        StoredGrant {
            user_id,
            entity_type: EntityType::Orders,
            operation_type: op,
            screen_name: screen.to_string(),
            is_allowed: allowed,
        }
    }

    #[test]
    fn missing_grants_project_to_false() {
        let users = vec![user(1, "alice", "user")];
        let matrix = build_matrix(SCREENS, &users, &[]);
        let row = &matrix.permissions["1"];
        let expected_cells: usize = SCREENS.iter().map(|s| s.operations.len()).sum();
        assert_eq!(row.len(), expected_cells);
        assert!(row.values().all(|allowed| !allowed));
    }

    #[test]
    fn allowed_grant_sets_cell() {
        let users = vec![user(1, "alice", "user"), user(2, "bob", "user")];
        let grants = vec![grant(1, OperationType::Read, ORDER_INQUIRY, true)];
        let matrix = build_matrix(SCREENS, &users, &grants);
        assert!(matrix.is_allowed(1, "order-inquiry_read"));
        assert!(!matrix.is_allowed(2, "order-inquiry_read"));
    }

    #[test]
    fn denied_grant_stays_false() {
        let users = vec![user(1, "alice", "user")];
        let grants = vec![grant(1, OperationType::Delete, ORDER_CANCELLATION, false)];
        let matrix = build_matrix(SCREENS, &users, &grants);
        assert!(!matrix.is_allowed(1, "order-cancellation_delete"));
    }

    #[test]
    fn grants_outside_the_screen_table_are_ignored() {
        let users = vec![user(1, "alice", "user")];
        let grants = vec![
            grant(1, OperationType::Read, "legacy-report", true),
            // order-inquiry exposes read only.
            grant(1, OperationType::Delete, ORDER_INQUIRY, true),
            grant(99, OperationType::Read, ORDER_INQUIRY, true),
        ];
        let matrix = build_matrix(SCREENS, &users, &grants);
        assert!(!matrix.permissions["1"].contains_key("legacy-report_read"));
        assert!(!matrix.permissions["1"].contains_key("order-inquiry_delete"));
        assert!(!matrix.permissions.contains_key("99"));
    }

    #[test]
    fn grant_under_another_entity_type_does_not_set_cell() {
        let users = vec![user(1, "alice", "user")];
        let grants = vec![StoredGrant {
            entity_type: EntityType::Customers,
            ..grant(1, OperationType::Read, ORDER_INQUIRY, true)
        }];
        let matrix = build_matrix(SCREENS, &users, &grants);
        assert!(!matrix.is_allowed(1, "order-inquiry_read"));
    }

    #[test]
    fn matching_grant_wins_over_mismatched_one() {
        let users = vec![user(1, "alice", "user")];
        let grants = vec![
            StoredGrant {
                entity_type: EntityType::Products,
                ..grant(1, OperationType::Read, ORDER_INQUIRY, false)
            },
            grant(1, OperationType::Read, ORDER_INQUIRY, true),
        ];
        let matrix = build_matrix(SCREENS, &users, &grants);
        assert!(matrix.is_allowed(1, "order-inquiry_read"));
    }

    #[test]
    fn matrix_serializes_as_nested_objects() {
        let users = vec![user(5, "carol", "admin")];
        let matrix = build_matrix(SCREENS, &users, &[]);
        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["users"][0]["username"], "carol");
        assert_eq!(json["screens"][0]["name"], "customer-register");
        assert_eq!(json["permissions"]["5"]["customer-register_create"], false);
    }
}
