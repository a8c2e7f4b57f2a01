use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use registrar_types::session::Role;

use crate::AppState;
use crate::auth::internal_error;
use crate::flash::{self, Flash};
use crate::session::{self, AuthRedirect};

/// Render the chat page for one student's room. This is the only place the
/// student↔admin pairing is enforced; the realtime events trust the room
/// key handed out here (DESIGN.md decision 4).
pub async fn chat_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(student_id): Path<i64>,
) -> Result<Response, StatusCode> {
    let Some(caller) = session::from_jar(&jar, &state.jwt_secret) else {
        return Ok(AuthRedirect.into_response());
    };

    match caller.role {
        Role::Admin => {
            let Some(partner) = state.db.get_student(student_id).map_err(internal_error)? else {
                let jar = flash::set(jar, &Flash::danger("Student not found."));
                return Ok((jar, Redirect::to("/admin_dashboard")).into_response());
            };

            let (jar, flash) = flash::take(jar);
            let data = json!({
                "flash": flash,
                "room": partner.id.to_string(),
                "user_role": "Admin",
                "user_name": "Admin",
                "partner_name": partner.name,
            });
            Ok((jar, state.pages.render("chat", &data)).into_response())
        }
        Role::Student => {
            let own = state
                .db
                .get_student_by_name(&caller.username)
                .map_err(internal_error)?;

            // A student's only counterpart is the admin, in their own room.
            match own {
                Some(own) if own.id == student_id => {
                    let (jar, flash) = flash::take(jar);
                    let data = json!({
                        "flash": flash,
                        "room": own.id.to_string(),
                        "user_role": "Student",
                        "user_name": caller.username,
                        "partner_name": "Admin",
                    });
                    Ok((jar, state.pages.render("chat", &data)).into_response())
                }
                _ => {
                    let jar = flash::set(jar, &Flash::danger("You can only chat with the admin."));
                    Ok((jar, Redirect::to("/dashboard")).into_response())
                }
            }
        }
    }
}
