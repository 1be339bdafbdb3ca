use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::{Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::{
    clear_session_cookie, hash_password_argon2, issue_session_token, session_cookie,
    verify_password_argon2, ROLE_READER,
};
use crate::data_formats::{LoginRequest, MessageResponse, RegisterRequest, SessionResponse};
use crate::db_helpers::{get_login_user_by_email, insert_user_in_db};
use crate::errors::RequestError;

type SessionResult = Result<(HeaderMap, Json<SessionResponse>), RequestError>;

fn set_cookie_headers(cookie: String) -> Result<HeaderMap, RequestError> {
    let mut headers = HeaderMap::new();
    let value = cookie.parse().map_err(|_| RequestError::ServerError)?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

pub async fn register(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<RegisterRequest>,
) -> SessionResult {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.trim().is_empty()
    {
        return Err(RequestError::Validation("All fields are required."));
    }

    let role = crate::db_helpers::get_role_by_name(&*pool, ROLE_READER)
        .await?
        .ok_or(RequestError::Configuration("Default role is not configured."))?;

    let password_hash = hash_password_argon2(request.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    let user = insert_user_in_db(
        &pool,
        request.username.trim(),
        request.email.trim(),
        &password_hash,
        role.id,
    )
    .await?;

    let (token, csrf) = issue_session_token(user.id, &user.username, &role.name)
        .map_err(|_| RequestError::ServerError)?;
    Ok((
        set_cookie_headers(session_cookie(&token))?,
        Json(SessionResponse {
            id: user.id,
            username: user.username,
            role: role.name,
            csrf_token: csrf,
        }),
    ))
}

pub async fn login(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> SessionResult {
    if request.email.trim().is_empty() || request.password.trim().is_empty() {
        return Err(RequestError::Validation("Email and password are required."));
    }

    // Same message whichever part was wrong.
    let user = get_login_user_by_email(&pool, request.email.trim())
        .await?
        .ok_or(RequestError::NotAuthorized("Invalid credentials."))?;
    let password_matches = verify_password_argon2(request.password, user.password.clone())
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !password_matches {
        return Err(RequestError::NotAuthorized("Invalid credentials."));
    }

    let (token, csrf) = issue_session_token(user.id, &user.username, &user.role_name)
        .map_err(|_| RequestError::ServerError)?;
    Ok((
        set_cookie_headers(session_cookie(&token))?,
        Json(SessionResponse {
            id: user.id,
            username: user.username,
            role: user.role_name,
            csrf_token: csrf,
        }),
    ))
}

pub async fn logout() -> Result<(HeaderMap, Json<MessageResponse>), RequestError> {
    Ok((
        set_cookie_headers(clear_session_cookie())?,
        Json(MessageResponse::new("Signed out.")),
    ))
}
