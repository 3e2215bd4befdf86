//! Authentication handlers.
//!
//! Login is two-step: a password check emails a one-time code, and
//! `verifCode` exchanges the code for a JWT pair. Password reset carries its
//! code inside a short-lived signed token instead of server-side state.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::envelope::{require, Envelope};
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::verification::generate_reset_code;
use crate::services::AuthService;

/// Create auth routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/verifCode", post(verify_login_code))
        .route("/resendCode", post(resend_code))
        .route("/forgotPassword", post(forgot_password))
        .route("/verifyResetCode", post(verify_reset_code))
        .route("/resetPassword", post(reset_password))
        .route("/resendPassCode", post(resend_pass_code))
        .route("/refreshToken", post(refresh_token))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyResetCodeRequest {
    pub token: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

async fn fetch_user_by_email(conn: &mut sqlx::PgConnection, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await
        .map_err(AppError::from)
}

/// Check credentials and send a login verification code
#[utoipa::path(
    post,
    path = "/login",
    context_path = "/api/auth",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Verification code sent"),
        (status = 401, description = "Invalid credentials or inactive account"),
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Envelope>> {
    let email = require(payload.email, "email")?;
    let password = require(payload.password, "password")?;

    let mut conn = state.db.acquire().await?;

    let user = fetch_user_by_email(&mut conn, &email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account is inactive".into()));
    }

    if !AuthService::verify_password(&password, &user.password)? {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let code = state.verification.issue(&email).await;
    state.mailer.send_verification_code(&email, &code).await?;

    tracing::info!(user = user.id, "login verification code sent");

    Ok(Json(Envelope::ok("Verification code sent to your email")))
}

/// Exchange a login verification code for a token pair
#[utoipa::path(
    post,
    path = "/verifCode",
    context_path = "/api/auth",
    tag = "auth",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 400, description = "Invalid or expired verification code"),
    )
)]
pub async fn verify_login_code(
    State(state): State<SharedState>,
    Json(payload): Json<VerifyCodeRequest>,
) -> Result<Json<Envelope>> {
    let email = require(payload.email, "email")?;
    let code = require(payload.code, "code")?;

    state
        .verification
        .verify(&email, &code)
        .await
        .map_err(|_| AppError::Validation("Invalid or expired verification code".into()))?;

    let mut conn = state.db.acquire().await?;

    let user = fetch_user_by_email(&mut conn, &email)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".into()))?;

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&mut *conn)
        .await?;

    let tokens = state.auth.generate_tokens(&user)?;

    Ok(Json(
        Envelope::success()
            .with("access_token", tokens)
            .with(
                "userinfo",
                json!({
                    "id": user.id,
                    "username": user.username,
                    "email": user.email,
                    "isActive": user.is_active,
                    "birthday": user.birthday,
                    "city": user.city,
                    "prof_img": user.prof_img,
                }),
            ),
    ))
}

/// Resend the pending verification code
#[utoipa::path(
    post,
    path = "/resendCode",
    context_path = "/api/auth",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Verification code resent"),
        (status = 400, description = "No verification pending for this email"),
    )
)]
pub async fn resend_code(
    State(state): State<SharedState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<Envelope>> {
    let email = payload
        .email
        .ok_or_else(|| AppError::Validation("Email is required".into()))?;

    if !state.verification.is_pending(&email).await {
        return Err(AppError::Validation(
            "Email is not pending verification".into(),
        ));
    }

    let code = state.verification.issue(&email).await;
    state.mailer.send_verification_code(&email, &code).await?;

    Ok(Json(Envelope::ok("Verification code resent successfully")))
}

/// Start a password reset
#[utoipa::path(
    post,
    path = "/forgotPassword",
    context_path = "/api/auth",
    tag = "auth",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset code sent"),
        (status = 404, description = "No account with that email"),
    )
)]
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<Envelope>> {
    let email = payload
        .email
        .ok_or_else(|| AppError::Validation("Email is required".into()))?;

    let mut conn = state.db.acquire().await?;

    let user = fetch_user_by_email(&mut conn, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("No account with that email found".into()))?;

    let code = generate_reset_code();
    let token = state.auth.issue_reset_token(user.id, &code)?;
    state.mailer.send_reset_code(&user.email, &code).await?;

    Ok(Json(
        Envelope::ok("Verification code sent to your email").with("token", token),
    ))
}

/// Check a password-reset code against its token
#[utoipa::path(
    post,
    path = "/verifyResetCode",
    context_path = "/api/auth",
    tag = "auth",
    request_body = VerifyResetCodeRequest,
    responses(
        (status = 200, description = "Code verified"),
        (status = 400, description = "Invalid code or token"),
    )
)]
pub async fn verify_reset_code(
    State(state): State<SharedState>,
    Json(payload): Json<VerifyResetCodeRequest>,
) -> Result<Json<Envelope>> {
    let token = require(payload.token, "token")?;
    let code = require(payload.code, "code")?;

    let claims = state.auth.validate_reset_token(&token)?;

    if claims.code != code {
        return Err(AppError::Validation("Invalid verification code".into()));
    }

    Ok(Json(Envelope::ok("Code verified successfully")))
}

/// Set a new password using a reset token
#[utoipa::path(
    post,
    path = "/resetPassword",
    context_path = "/api/auth",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid or expired token"),
    )
)]
pub async fn reset_password(
    State(state): State<SharedState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Envelope>> {
    let token = require(payload.token, "token")?;
    let new_password = require(payload.new_password, "newPassword")?;

    let claims = state.auth.validate_reset_token(&token)?;

    let mut conn = state.db.acquire().await?;

    let user: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(claims.id)
        .fetch_optional(&mut *conn)
        .await?;
    if user.is_none() {
        return Err(AppError::Validation("Invalid token".into()));
    }

    let hashed = AuthService::hash_password(&new_password)?;
    sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(&hashed)
        .bind(claims.id)
        .execute(&mut *conn)
        .await?;

    Ok(Json(Envelope::ok("Password reset successful")))
}

/// Issue a fresh password-reset code and token
#[utoipa::path(
    post,
    path = "/resendPassCode",
    context_path = "/api/auth",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "New reset code sent"),
        (status = 404, description = "No account for this token"),
    )
)]
pub async fn resend_pass_code(
    State(state): State<SharedState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<Envelope>> {
    let token = payload
        .token
        .ok_or_else(|| AppError::Validation("Token is required".into()))?;

    let claims = state.auth.validate_reset_token(&token)?;

    let mut conn = state.db.acquire().await?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(claims.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("No account with that token found".into()))?;

    let code = generate_reset_code();
    let new_token = state.auth.issue_reset_token(user.id, &code)?;
    state.mailer.send_reset_code(&user.email, &code).await?;

    Ok(Json(
        Envelope::ok("New verification code sent to your email").with("token", new_token),
    ))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/refreshToken",
    context_path = "/api/auth",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair"),
        (status = 401, description = "Refresh token required"),
        (status = 403, description = "Invalid refresh token"),
    )
)]
pub async fn refresh_token(
    State(state): State<SharedState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<Envelope>> {
    let token = payload
        .refresh_token
        .ok_or_else(|| AppError::Unauthorized("Refresh token required.".into()))?;

    let pair = state.auth.refresh_tokens(&token)?;

    Ok(Json(
        Envelope::success()
            .with("accessToken", pair.access_token)
            .with("refreshToken", pair.refresh_token),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserialize() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@x.com"));
        assert_eq!(req.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_reset_password_request_uses_camel_case() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"token":"t","newPassword":"pw2"}"#).unwrap();
        assert_eq!(req.new_password.as_deref(), Some("pw2"));
    }

    #[test]
    fn test_refresh_token_request_uses_camel_case() {
        let req: RefreshTokenRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.refresh_token.as_deref(), Some("abc"));
    }
}
