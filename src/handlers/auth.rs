use axum::{extract::State, http::StatusCode, Json};
use log::info;
use serde::Deserialize;

use crate::models::UserCredentials;
use crate::state::AppState;
use crate::sync;

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Check credentials against the users collection. The sheet stores
/// passwords in cleartext, so this is a straight comparison. A successful
/// login kicks off a silent sync so the actor starts from the freshest
/// snapshot.
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<UserCredentials>, StatusCode> {
    let user = {
        let data = state.data.lock().unwrap();
        data.users
            .iter()
            .find(|u| u.username == form.username && u.password == form.password)
            .cloned()
    };

    match user {
        Some(user) => {
            info!("login: {} ({})", user.username, user.code);
            let state = state.clone();
            tokio::spawn(async move { sync::fetch_and_merge(&state).await });
            Ok(Json(user))
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
