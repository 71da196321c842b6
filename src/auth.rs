// ABOUTME: Caller identity extraction from headers set by the fronting session layer
// ABOUTME: Resolves the trusted user id and subscription tier for every chat request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Request identity
//!
//! Authentication happens upstream. The session layer forwards the user id
//! and subscription tier as headers, and this module trusts both as given.

use std::str::FromStr;

use http::HeaderMap;

use crate::errors::AppError;
use crate::models::SubscriptionTier;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the user's current subscription tier
pub const SUBSCRIPTION_TIER_HEADER: &str = "x-subscription-tier";

/// Identity resolved for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Opaque user id
    pub user_id: String,
    /// Tier used for quota decisions on this request
    pub tier: SubscriptionTier,
}

/// Resolve the caller from request headers
///
/// A missing tier header means the free tier.
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when no user id is present, `AUTH_INVALID` when a
/// header is not valid text, and `INVALID_INPUT` for an unknown tier
pub fn authenticate(headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let user_id = match headers.get(USER_ID_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| AppError::auth_invalid("User id header is not valid text"))?
            .trim()
            .to_owned(),
        None => return Err(AppError::auth_required()),
    };
    if user_id.is_empty() {
        return Err(AppError::auth_required());
    }

    let tier = match headers.get(SUBSCRIPTION_TIER_HEADER) {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| AppError::auth_invalid("Subscription tier header is not valid text"))?;
            SubscriptionTier::from_str(raw).map_err(|e| e.with_user_id(user_id.clone()))?
        }
        None => SubscriptionTier::default(),
    };

    Ok(AuthenticatedUser { user_id, tier })
}
