use axum::http::HeaderMap;

use crate::models::UserCredentials;
use crate::state::AppState;

/// Resolve the acting user from the `X-User-Id` header against the current
/// users collection. The id is handed out by the login endpoint; there is no
/// session token because the sheet model has no notion of one.
pub fn get_current_user(headers: &HeaderMap, state: &AppState) -> Option<UserCredentials> {
    let user_id = headers.get("x-user-id")?.to_str().ok()?;
    let data = state.data.lock().unwrap();
    data.users.iter().find(|u| u.id == user_id).cloned()
}

/// Admin-only routes additionally require the ADMIN code.
pub fn require_admin(headers: &HeaderMap, state: &AppState) -> Option<UserCredentials> {
    get_current_user(headers, state).filter(|u| u.is_admin())
}
