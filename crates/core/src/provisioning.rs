//! Role grant table: the default grants a new user receives for their role.
//!
//! The table is plain data. The built-in table covers `admin` and `user`; a
//! deployment can replace it at startup with a JSON document of the form
//!
//! ```json
//! {
//!   "user": [
//!     { "entity_type": "orders", "operation_type": "read", "screen_name": "order-inquiry" }
//!   ]
//! }
//! ```
//!
//! Adding a role means adding an entry, never new code.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::permissions::{validate_grants, EntityType, GrantSpec, OperationType};
use crate::roles::{ROLE_ADMIN, ROLE_USER};
use crate::screens::{
    CUSTOMER_DELETE, CUSTOMER_EDIT, CUSTOMER_REGISTER, CUSTOMER_REGISTER_FORM, CUSTOMER_SEARCH,
    ORDER_CANCELLATION, ORDER_CORRECTION, ORDER_ENTRY, ORDER_INQUIRY, PRODUCT_SEARCH,
};

/// Role-keyed default grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantTable {
    roles: BTreeMap<String, Vec<GrantSpec>>,
}

impl RoleGrantTable {
    /// The built-in table.
    ///
    /// - `admin`: full create/read/update/delete across customer and order screens.
    /// - `user`: read-only grants on search/inquiry screens.
    pub fn builtin() -> Self {
        use EntityType::{Customers, Orders, Products};
        use OperationType::{Create, Delete, Read, Update};

        let admin = vec![
            GrantSpec::allow(Customers, Create, CUSTOMER_REGISTER),
            GrantSpec::allow(Customers, Read, CUSTOMER_SEARCH),
            GrantSpec::allow(Customers, Read, CUSTOMER_DELETE),
            GrantSpec::allow(Customers, Delete, CUSTOMER_DELETE),
            GrantSpec::allow(Customers, Read, CUSTOMER_REGISTER_FORM),
            GrantSpec::allow(Customers, Create, CUSTOMER_REGISTER_FORM),
            GrantSpec::allow(Customers, Read, CUSTOMER_EDIT),
            GrantSpec::allow(Customers, Update, CUSTOMER_EDIT),
            GrantSpec::allow(Orders, Read, ORDER_ENTRY),
            GrantSpec::allow(Orders, Create, ORDER_ENTRY),
            GrantSpec::allow(Orders, Read, ORDER_INQUIRY),
            GrantSpec::allow(Orders, Read, ORDER_CORRECTION),
            GrantSpec::allow(Orders, Update, ORDER_CORRECTION),
            GrantSpec::allow(Orders, Read, ORDER_CANCELLATION),
            GrantSpec::allow(Orders, Delete, ORDER_CANCELLATION),
        ];

        let user = vec![
            GrantSpec::allow(Customers, Read, CUSTOMER_SEARCH),
            GrantSpec::allow(Customers, Read, CUSTOMER_REGISTER_FORM),
            GrantSpec::allow(Products, Read, PRODUCT_SEARCH),
            GrantSpec::allow(Orders, Read, ORDER_INQUIRY),
            GrantSpec::allow(Orders, Read, ORDER_CORRECTION),
            GrantSpec::allow(Orders, Read, ORDER_CANCELLATION),
        ];

        let mut roles = BTreeMap::new();
        roles.insert(ROLE_ADMIN.to_string(), admin);
        roles.insert(ROLE_USER.to_string(), user);
        Self { roles }
    }

    /// Parse a table from JSON and validate every grant in it.
    ///
    /// The `admin` role is always known: if the document omits it, it is
    /// added with no default grants (admins are allowed by override anyway).
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut roles: BTreeMap<String, Vec<GrantSpec>> = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid role grant table: {e}")))?;

        for (role, grants) in &roles {
            if role.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Role grant table contains an empty role name".to_string(),
                ));
            }
            validate_grants(grants)?;
        }

        roles.entry(ROLE_ADMIN.to_string()).or_default();
        Ok(Self { roles })
    }

    /// Default grants for `role`, or `None` if the role is unknown.
    pub fn grants_for(&self, role: &str) -> Option<&[GrantSpec]> {
        self.roles.get(role).map(Vec::as_slice)
    }

    pub fn knows_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Known role names in sorted order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Reject role names the table does not know.
    pub fn ensure_known_role(&self, role: &str) -> Result<(), CoreError> {
        if self.knows_role(role) {
            Ok(())
        } else {
            let known: Vec<&str> = self.roles().collect();
            Err(CoreError::Validation(format!(
                "Unknown role '{role}'. Must be one of: {known:?}"
            )))
        }
    }
}

impl Default for RoleGrantTable {
    fn default() -> Self {
        Self::builtin()
    }
}
