use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    error::AppError,
    hashing::hash_secret,
    state::AppState,
    users::{
        dto::{
            MessageResponse, PublicUser, RegisterRequest, RegisterResponse, ResendOtpRequest,
            UpdateUserRequest, UserResponse, VerifyOtpRequest,
        },
        repo_types::NewUser,
        services, validate,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/get-all-users", get(list_users))
        // `key` is a user id for GET and a phone number for PATCH/DELETE
        .route(
            "/:key",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let full_name = validate::name(&payload.name)?;
    let phone = validate::phone(&payload.phone)?;
    let email = payload.email.as_deref().map(validate::email).transpose()?;
    let password_hash = match payload.password.as_deref() {
        Some(raw) => {
            let plain = validate::password(raw)?.to_owned();
            Some(
                services::run_blocking(move || {
                    hash_secret(&plain).map_err(|e| {
                        error!(error = %e, "hash_secret failed");
                        AppError::Internal(e.to_string())
                    })
                })
                .await?,
            )
        }
        None => None,
    };

    let user = services::register(
        &state,
        NewUser {
            full_name,
            phone,
            email,
            password_hash,
            job_category: payload.job_category,
            job_type: payload.job_type,
        },
    )
    .await?;

    Ok(Json(RegisterResponse {
        message: "User registered successfully. OTP sent.".into(),
        user_id: user.id,
    }))
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let phone = validate::phone(&payload.phone)?;
    let code = validate::otp(&payload.otp)?;
    let user = services::verify_otp(&state, &phone, &code).await?;
    Ok(Json(UserResponse {
        message: "Phone number verified successfully".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(payload): Json<ResendOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let phone = validate::phone(&payload.phone)?;
    services::resend_otp(&state, &phone).await?;
    Ok(Json(MessageResponse::new("OTP resent successfully")))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = services::list_users(&state).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let id = Uuid::parse_str(&key).map_err(|_| AppError::Validation("Invalid user id".into()))?;
    let user = services::get_user(&state, id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let phone = validate::phone(&key)?;
    let full_name = validate::name(&payload.name)?;
    let user = services::update_user(&state, &phone, &full_name).await?;
    Ok(Json(UserResponse {
        message: "User updated successfully".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let phone = validate::phone(&key)?;
    services::delete_user(&state, &phone).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
