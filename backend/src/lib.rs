pub mod accounts;
pub mod catchers;
pub mod config;
pub mod error;
pub mod forms;
pub mod marker;
pub mod pages;
pub mod routes;
pub mod service;
pub mod session;
pub mod store;
pub use shared::{models::*, validation::*};
pub use shared::error::{PollError, Resource};

use rocket::{catchers, fairing::AdHoc, figment::Figment, routes, Build, Rocket};
use tracing::{error, info};

use crate::{
    catchers::{bad_request, internal_error, not_found, unprocessable},
    config::AppConfig,
    routes::{
        create_poll, get_poll, index, list_polls, login, login_page, logout, new_poll_page,
        show_poll, signup, signup_page, static_files, vote, AppState,
    },
    session::{login_redirect, login_redirect_post},
};

/// Assembles the server from a Rocket figment. Storage is loaded while
/// igniting; a broken data directory aborts launch.
pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(AdHoc::try_on_ignite("Flat-file storage", |rocket| async move {
            let config = match rocket.figment().extract::<AppConfig>() {
                Ok(config) => config,
                Err(e) => {
                    error!("Invalid application configuration: {}", e);
                    return Err(rocket);
                }
            };

            match AppState::load(&config) {
                Ok(state) => {
                    info!("📁 Storage ready in {}", config.data_dir.display());
                    Ok(rocket.manage(state))
                }
                Err(e) => {
                    error!("Failed to load storage from {}: {}", config.data_dir.display(), e);
                    Err(rocket)
                }
            }
        }))
        .mount(
            "/",
            routes![
                index,
                new_poll_page,
                create_poll,
                show_poll,
                vote,
                signup_page,
                signup,
                login_page,
                login,
                logout,
                static_files,
                list_polls,
                get_poll,
                login_redirect,
                login_redirect_post
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unprocessable,
                internal_error,
                not_found
            ],
        )
}

#[cfg(test)]
mod tests;
