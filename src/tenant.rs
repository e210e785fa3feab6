//! Tenant (organization) resolution for incoming requests.
//!
//! The upstream auth layer authenticates the user and forwards their id
//! and selected organization as headers. Organization ids sent by clients
//! are never trusted: membership is re-checked against the store on
//! every request.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::booking::store::BookingContext;
use crate::error::AppError;
use crate::AppState;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const USER_HEADER: &str = "x-user-id";

/// Verified organization and user of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    pub organization_id: Uuid,
    pub user_id: Uuid,
}

impl TenantContext {
    /// Booking context for this tenant over the given state's store
    pub fn booking_context<'a>(&self, state: &'a AppState) -> BookingContext<'a> {
        BookingContext::new(self.organization_id, state.store.as_ref())
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Option<Uuid> {
    parts
        .headers
        .get(name)?
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}

#[async_trait]
impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = header_uuid(parts, USER_HEADER).ok_or(AppError::Unauthorized)?;
        let organization_id =
            header_uuid(parts, ORGANIZATION_HEADER).ok_or(AppError::Unauthorized)?;

        if !state.store.is_org_member(organization_id, user_id).await? {
            warn!(
                "User {} denied access to organization {}",
                user_id, organization_id
            );
            return Err(AppError::Forbidden);
        }

        Ok(Self {
            organization_id,
            user_id,
        })
    }
}
