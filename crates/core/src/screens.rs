//! Screen definitions.
//!
//! A screen is a named UI-level capability. It belongs to one entity type and
//! may require several operation types (a delete screen also needs read).
//! Route guards and the default role grants reference these constants; the
//! permission matrix is projected over [`SCREENS`].

use serde::Serialize;

use crate::permissions::{EntityType, OperationType};

// ---------------------------------------------------------------------------
// Screen name constants
// ---------------------------------------------------------------------------

pub const CUSTOMER_REGISTER: &str = "customer-register";
pub const CUSTOMER_SEARCH: &str = "customer-search";
pub const CUSTOMER_DELETE: &str = "customer-delete";
pub const CUSTOMER_REGISTER_FORM: &str = "customer-register-form";
pub const CUSTOMER_EDIT: &str = "customer-edit";

pub const PRODUCT_SEARCH: &str = "product-search";
pub const PRODUCT_REGISTER: &str = "product-register";
pub const PRODUCT_UPDATE: &str = "product-update";
pub const PRODUCT_DELETE: &str = "product-delete";

pub const ORDER_ENTRY: &str = "order-entry";
pub const ORDER_INQUIRY: &str = "order-inquiry";
pub const ORDER_CORRECTION: &str = "order-correction";
pub const ORDER_CANCELLATION: &str = "order-cancellation";

// ---------------------------------------------------------------------------
// Screen table
// ---------------------------------------------------------------------------

/// A screen and the operations it exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenDefinition {
    pub name: &'static str,
    pub entity_type: EntityType,
    pub operations: &'static [OperationType],
}

impl ScreenDefinition {
    /// Matrix column keys for this screen, one per operation.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.operations.iter().map(|op| screen_key(self.name, *op))
    }
}

use EntityType::{Customers, Orders, Products};
use OperationType::{Create, Delete, Read, Update};

/// Every screen known to the system, in display order.
pub const SCREENS: &[ScreenDefinition] = &[
    ScreenDefinition { name: CUSTOMER_REGISTER, entity_type: Customers, operations: &[Create] },
    ScreenDefinition { name: CUSTOMER_SEARCH, entity_type: Customers, operations: &[Read] },
    ScreenDefinition { name: CUSTOMER_DELETE, entity_type: Customers, operations: &[Read, Delete] },
    ScreenDefinition { name: CUSTOMER_REGISTER_FORM, entity_type: Customers, operations: &[Read, Create] },
    ScreenDefinition { name: CUSTOMER_EDIT, entity_type: Customers, operations: &[Read, Update] },
    ScreenDefinition { name: PRODUCT_SEARCH, entity_type: Products, operations: &[Read] },
    ScreenDefinition { name: PRODUCT_REGISTER, entity_type: Products, operations: &[Create] },
    ScreenDefinition { name: PRODUCT_UPDATE, entity_type: Products, operations: &[Read, Update] },
    ScreenDefinition { name: PRODUCT_DELETE, entity_type: Products, operations: &[Read, Delete] },
    ScreenDefinition { name: ORDER_ENTRY, entity_type: Orders, operations: &[Read, Create] },
    ScreenDefinition { name: ORDER_INQUIRY, entity_type: Orders, operations: &[Read] },
    ScreenDefinition { name: ORDER_CORRECTION, entity_type: Orders, operations: &[Read, Update] },
    ScreenDefinition { name: ORDER_CANCELLATION, entity_type: Orders, operations: &[Read, Delete] },
];

/// Matrix column key: `<screen>_<operation>`.
pub fn screen_key(screen_name: &str, operation: OperationType) -> String {
    format!("{screen_name}_{}", operation.as_str())
}

/// Look up a screen by name.
pub fn find_screen(name: &str) -> Option<&'static ScreenDefinition> {
    SCREENS.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_names_are_unique() {
        let mut names: Vec<_> = SCREENS.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SCREENS.len());
    }

    #[test]
    fn every_screen_has_at_least_one_operation() {
        assert!(SCREENS.iter().all(|s| !s.operations.is_empty()));
    }

    #[test]
    fn screen_key_joins_name_and_operation() {
        assert_eq!(screen_key(ORDER_CORRECTION, Update), "order-correction_update");
    }

    #[test]
    fn delete_screens_also_require_read() {
        let screen = find_screen(CUSTOMER_DELETE).unwrap();
        let keys: Vec<_> = screen.keys().collect();
        assert_eq!(keys, vec!["customer-delete_read", "customer-delete_delete"]);
    }

    #[test]
    fn find_screen_returns_none_for_unknown() {
        assert!(find_screen("invoice-entry").is_none());
    }
}
