use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use registrar_db::Database;
use registrar_types::forms::{LoginForm, RegisterForm};
use registrar_types::session::Role;

use crate::AppState;
use crate::error::RegistrationError;
use crate::flash::{self, Flash};
use crate::session;

// -- Password hashing --

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hash failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Seed the default admin row on startup if it does not exist yet.
pub fn ensure_default_admin(db: &Database) -> anyhow::Result<()> {
    if db.get_admin_by_username("admin")?.is_some() {
        return Ok(());
    }

    let hash = hash_password("password")?;
    db.create_admin("admin", &hash)?;
    info!("Default admin user created: username='admin', password='password'");
    Ok(())
}

// -- Login / logout --

pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    let page = state.pages.render("login", &serde_json::json!({ "flash": flash }));
    (jar, page).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, StatusCode> {
    match Role::from_form(&form.role) {
        Role::Admin => {
            let admin = state
                .db
                .get_admin_by_username(&form.username)
                .map_err(internal_error)?;

            match admin {
                Some(admin) if verify_password(&form.password, &admin.password_hash) => {
                    let token =
                        session::issue(&state.jwt_secret, admin.id, &admin.username, Role::Admin)
                            .map_err(internal_error)?;
                    let jar = jar.add(session::cookie_for(token));
                    let jar = flash::set(jar, &Flash::success("Admin logged in successfully!"));
                    Ok((jar, Redirect::to("/admin_dashboard")).into_response())
                }
                // Unknown username and bad password collapse to one notice.
                _ => {
                    let jar = flash::set(jar, &Flash::danger("Invalid admin credentials."));
                    Ok((jar, Redirect::to("/login")).into_response())
                }
            }
        }
        Role::Student => {
            let user = state
                .db
                .get_user_by_username(&form.username)
                .map_err(internal_error)?;

            match user {
                Some(user) if verify_password(&form.password, &user.password_hash) => {
                    let token =
                        session::issue(&state.jwt_secret, user.id, &user.username, Role::Student)
                            .map_err(internal_error)?;
                    let jar = jar.add(session::cookie_for(token));
                    let jar = flash::set(jar, &Flash::success("Logged in successfully!"));
                    Ok((jar, Redirect::to("/dashboard")).into_response())
                }
                _ => {
                    let jar = flash::set(jar, &Flash::danger("Invalid student credentials."));
                    Ok((jar, Redirect::to("/login")).into_response())
                }
            }
        }
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(session::clear_cookie());
    let jar = flash::set(jar, &Flash::info("You have been logged out."));
    (jar, Redirect::to("/login")).into_response()
}

pub async fn admin_logout(jar: CookieJar) -> Response {
    let jar = jar.remove(session::clear_cookie());
    let jar = flash::set(jar, &Flash::info("Admin logged out successfully."));
    (jar, Redirect::to("/login")).into_response()
}

// -- Registration --

/// Run the registration checks in their fixed order and report the first
/// violation. `Ok(None)` means the form is acceptable.
pub fn check_registration(
    db: &Database,
    form: &RegisterForm,
) -> anyhow::Result<Option<RegistrationError>> {
    if form.password != form.confirm_password {
        return Ok(Some(RegistrationError::PasswordMismatch));
    }
    if db.get_user_by_username(&form.username)?.is_some() {
        return Ok(Some(RegistrationError::UsernameTaken));
    }
    if db.get_student_by_reg_no(&form.reg_no)?.is_some() {
        return Ok(Some(RegistrationError::RegNoTaken));
    }
    Ok(None)
}

pub async fn register_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, flash) = flash::take(jar);
    let page = state
        .pages
        .render("register", &serde_json::json!({ "flash": flash }));
    (jar, page).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, StatusCode> {
    if let Some(rejection) = check_registration(&state.db, &form).map_err(internal_error)? {
        let jar = flash::set(jar, &Flash::danger(rejection.to_string()));
        return Ok((jar, Redirect::to("/register")).into_response());
    }

    let hash = hash_password(&form.password).map_err(internal_error)?;

    // Paired User + Student insert; the db layer commits both or neither.
    match state
        .db
        .register_student(&form.username, &hash, &form.reg_no, &form.stream, &form.sub_stream)
    {
        Ok(_) => {
            let jar = flash::set(jar, &Flash::success("Registration successful! Please log in."));
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e) => {
            error!("registration failed for '{}': {}", form.username, e);
            let jar = flash::set(jar, &Flash::danger("An error occurred during registration."));
            Ok((jar, Redirect::to("/register")).into_response())
        }
    }
}

pub(crate) fn internal_error<E: std::fmt::Display>(e: E) -> StatusCode {
    error!("internal error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
