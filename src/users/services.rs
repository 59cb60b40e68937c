use time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    notify::messages,
    state::AppState,
    users::repo_types::{NewUser, User},
};

/// Create the user for `new_user.phone`, or bring a soft-deleted one back,
/// then send a verification code.
///
/// A delivery failure is returned to the caller but the user record stays.
pub async fn register(st: &AppState, new_user: NewUser) -> Result<User, AppError> {
    let user = match st.users.find_by_phone(&new_user.phone).await? {
        None => st.users.insert(&new_user).await?,
        Some(existing) if !existing.is_deleted => {
            warn!(phone = %new_user.phone, "phone already registered");
            return Err(AppError::AlreadyExists);
        }
        Some(existing) => {
            // lost a race with another re-registration when this is None
            let user = st
                .users
                .reactivate(existing.id, &new_user.full_name)
                .await?
                .ok_or(AppError::AlreadyExists)?;
            info!(user_id = %user.id, phone = %user.phone, "user reactivated");
            user
        }
    };

    send_code(st, &user.phone, messages::registration_code).await?;
    info!(user_id = %user.id, phone = %user.phone, "user registered");
    Ok(user)
}

/// Redeem `code` and mark the phone verified.
///
/// If the store fails after the code was redeemed, the code goes back into
/// the ledger so the user can retry with it.
pub async fn verify_otp(st: &AppState, phone: &str, code: &str) -> Result<User, AppError> {
    let otp = st.otp.clone();
    let (p, c) = (phone.to_owned(), code.to_owned());
    let redeemed = run_blocking(move || Ok(otp.verify(&p, &c)?)).await?;

    let user = match st.users.mark_verified(phone).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::user_not_found()),
        Err(e) => {
            if st.otp.restore(redeemed) {
                warn!(phone = %phone, "store failed after redeeming otp, code restored");
            }
            return Err(e.into());
        }
    };
    info!(user_id = %user.id, phone = %phone, "phone verified");

    if let Err(e) = st
        .notifier
        .send(phone, &messages::welcome(&user.full_name))
        .await
    {
        warn!(error = %e, phone = %phone, "welcome message not delivered");
    }
    Ok(user)
}

pub async fn resend_otp(st: &AppState, phone: &str) -> Result<(), AppError> {
    let user = st
        .users
        .find_by_phone(phone)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(AppError::user_not_found)?;
    if user.is_phone_verified {
        warn!(user_id = %user.id, "resend requested for verified phone");
        return Err(AppError::AlreadyVerified);
    }

    send_code(st, phone, messages::resend_code).await?;
    info!(user_id = %user.id, phone = %phone, "otp resent");
    Ok(())
}

async fn send_code(
    st: &AppState,
    phone: &str,
    template: fn(&str, Duration) -> String,
) -> Result<(), AppError> {
    let otp = st.otp.clone();
    let p = phone.to_owned();
    let code = run_blocking(move || Ok(otp.issue(&p)?)).await?;
    let body = template(&code, st.otp.ttl());
    st.notifier.send(phone, &body).await?;
    Ok(())
}

/// Run argon2 work off the async worker threads.
pub async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
}

pub async fn list_users(st: &AppState) -> Result<Vec<User>, AppError> {
    Ok(st.users.list_verified().await?)
}

pub async fn get_user(st: &AppState, id: Uuid) -> Result<User, AppError> {
    st.users
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::user_not_found)
}

pub async fn update_user(st: &AppState, phone: &str, full_name: &str) -> Result<User, AppError> {
    let user = st
        .users
        .update_name(phone, full_name)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

pub async fn delete_user(st: &AppState, phone: &str) -> Result<User, AppError> {
    let user = st
        .users
        .soft_delete(phone)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    info!(user_id = %user.id, phone = %phone, "user soft-deleted");
    Ok(user)
}
