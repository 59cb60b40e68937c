use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
#[cfg(test)]
mod memory;
mod repo;
mod repo_types;
pub mod services;
mod validate;

#[cfg(test)]
pub use memory::MemoryUserStore;
pub use repo::{PgUserStore, StoreError, UserStore};

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
