//! Screen-scoped permission extractor.
//!
//! Every guarded route names its `(entity, operation, screen)` triple as a
//! marker type implementing [`ScreenGuard`]. The triple is fixed at compile
//! time; nothing from the request feeds into it.
//!
//! ```ignore
//! async fn delete_order(
//!     RequirePermission(user, _): RequirePermission<OrderCancellationDelete>,
//!     Path(id): Path<DbId>,
//! ) -> AppResult<StatusCode> { ... }
//! ```

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bizdesk_core::authz::authorize;
use bizdesk_core::error::CoreError;
use bizdesk_core::permissions::{EntityType, OperationType, PermissionKey};
use bizdesk_core::screens;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A compile-time permission requirement.
pub trait ScreenGuard {
    const ENTITY: EntityType;
    const OPERATION: OperationType;
    const SCREEN: &'static str;

    fn key() -> PermissionKey {
        PermissionKey::new(Self::ENTITY, Self::OPERATION, Self::SCREEN)
    }
}

/// Authenticated user who holds the grant described by `G`.
///
/// Admins pass without a lookup. Everyone else needs an allowed grant row;
/// a missing row is a 403.
pub struct RequirePermission<G>(pub AuthUser, pub PhantomData<fn() -> G>);

impl<G: ScreenGuard> FromRequestParts<AppState> for RequirePermission<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let key = G::key();

        let decision = authorize(&state.grant_store(), &user.principal(), &key).await?;
        if !decision.is_allowed() {
            tracing::warn!(
                user_id = user.user_id,
                role = %user.role,
                permission = %key,
                "Permission denied"
            );
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Missing permission {key}"
            ))));
        }

        Ok(RequirePermission(user, PhantomData))
    }
}

macro_rules! screen_guard {
    ($(#[$meta:meta])* $name:ident => $entity:ident, $op:ident, $screen:path) => {
        $(#[$meta])*
        pub struct $name;

        impl ScreenGuard for $name {
            const ENTITY: EntityType = EntityType::$entity;
            const OPERATION: OperationType = OperationType::$op;
            const SCREEN: &'static str = $screen;
        }
    };
}

screen_guard!(CustomerSearchRead => Customers, Read, screens::CUSTOMER_SEARCH);
screen_guard!(CustomerRegisterCreate => Customers, Create, screens::CUSTOMER_REGISTER);
screen_guard!(CustomerEditUpdate => Customers, Update, screens::CUSTOMER_EDIT);
screen_guard!(CustomerDeleteDelete => Customers, Delete, screens::CUSTOMER_DELETE);

screen_guard!(ProductSearchRead => Products, Read, screens::PRODUCT_SEARCH);
screen_guard!(ProductRegisterCreate => Products, Create, screens::PRODUCT_REGISTER);
screen_guard!(ProductUpdateUpdate => Products, Update, screens::PRODUCT_UPDATE);
screen_guard!(ProductDeleteDelete => Products, Delete, screens::PRODUCT_DELETE);

screen_guard!(OrderInquiryRead => Orders, Read, screens::ORDER_INQUIRY);
screen_guard!(OrderEntryCreate => Orders, Create, screens::ORDER_ENTRY);
screen_guard!(OrderCorrectionUpdate => Orders, Update, screens::ORDER_CORRECTION);
screen_guard!(
    /// Cancelling removes the order; it needs the cancellation screen's delete grant.
    OrderCancellationDelete => Orders, Delete, screens::ORDER_CANCELLATION
);
