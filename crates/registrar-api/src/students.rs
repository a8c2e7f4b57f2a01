use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::warn;

use registrar_db::models::StudentRow;
use registrar_types::forms::EditStudentForm;
use registrar_types::models::SubjectMark;
use registrar_types::session::Role;

use crate::AppState;
use crate::auth::internal_error;
use crate::flash::{self, Flash};
use crate::session;

/// Parse the stored marks JSON. A malformed column reads as no marks.
pub fn parse_marks(raw: &str) -> Vec<SubjectMark> {
    match serde_json::from_str(raw) {
        Ok(marks) => marks,
        Err(e) => {
            warn!("Corrupt marks column: {} -- raw: {}", e, raw);
            Vec::new()
        }
    }
}

fn student_json(student: &StudentRow) -> serde_json::Value {
    json!({
        "id": student.id,
        "reg_no": student.reg_no,
        "name": student.name,
        "stream": student.stream,
        "sub_stream": student.sub_stream,
        "attendance": student.attendance,
        "marks": parse_marks(&student.marks),
        "cgpa": student.cgpa,
        "profile_pic_url": format!("/static/profile_pics/{}", student.profile_pic),
    })
}

// -- Student dashboard --

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let caller = session::from_jar(&jar, &state.jwt_secret);
    let caller = match session::require(caller.as_ref(), Role::Student) {
        Ok(session) => session.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let student = state
        .db
        .get_student_by_name(&caller.username)
        .map_err(internal_error)?;

    let (jar, flash) = flash::take(jar);
    let data = json!({
        "flash": flash,
        "student": student.as_ref().map(student_json),
    });
    Ok((jar, state.pages.render("dashboard", &data)).into_response())
}

// -- Admin record editor --

pub async fn admin_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let caller = session::from_jar(&jar, &state.jwt_secret);
    if let Err(redirect) = session::require(caller.as_ref(), Role::Admin) {
        return Ok(redirect.into_response());
    }

    let students = state.db.list_students().map_err(internal_error)?;
    let students: Vec<serde_json::Value> = students.iter().map(student_json).collect();

    let (jar, flash) = flash::take(jar);
    let data = json!({ "flash": flash, "students": students });
    Ok((jar, state.pages.render("admin_dashboard", &data)).into_response())
}

/// The fixed 6-row marks form, prefilled from the stored sequence.
fn marks_rows(student: &StudentRow) -> Vec<serde_json::Value> {
    let existing = parse_marks(&student.marks);
    (0..6)
        .map(|i| {
            let mark = existing.get(i);
            json!({
                "position": i + 1,
                "code": mark.map(|m| m.code.as_str()).unwrap_or(""),
                "score": mark.map(|m| m.score.as_str()).unwrap_or(""),
            })
        })
        .collect()
}

pub async fn edit_student_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(student_id): Path<i64>,
) -> Result<Response, StatusCode> {
    let caller = session::from_jar(&jar, &state.jwt_secret);
    if let Err(redirect) = session::require(caller.as_ref(), Role::Admin) {
        return Ok(redirect.into_response());
    }

    let student = state
        .db
        .get_student(student_id)
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let (jar, flash) = flash::take(jar);
    let data = json!({
        "flash": flash,
        "student": student_json(&student),
        "rows": marks_rows(&student),
    });
    Ok((jar, state.pages.render("edit_student", &data)).into_response())
}

pub async fn update_student(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(student_id): Path<i64>,
    Form(form): Form<EditStudentForm>,
) -> Result<Response, StatusCode> {
    let caller = session::from_jar(&jar, &state.jwt_secret);
    if let Err(redirect) = session::require(caller.as_ref(), Role::Admin) {
        return Ok(redirect.into_response());
    }

    if state
        .db
        .get_student(student_id)
        .map_err(internal_error)?
        .is_none()
    {
        return Err(StatusCode::NOT_FOUND);
    }

    // Attendance and cgpa are validated numerically; see DESIGN.md
    // decision 3.
    let attendance = form.attendance.trim().parse::<i64>();
    let cgpa = form.cgpa.trim().parse::<f64>();
    let (attendance, cgpa) = match (attendance, cgpa) {
        (Ok(attendance), Ok(cgpa)) => (attendance, cgpa),
        _ => {
            let jar = flash::set(jar, &Flash::danger("Attendance and CGPA must be numeric."));
            let target = format!("/edit_student/{}", student_id);
            return Ok((jar, Redirect::to(&target)).into_response());
        }
    };

    let marks_json = serde_json::to_string(&form.marks()).map_err(internal_error)?;
    state
        .db
        .update_student_record(student_id, attendance, cgpa, &marks_json)
        .map_err(internal_error)?;

    let jar = flash::set(jar, &Flash::success("Student details updated successfully!"));
    Ok((jar, Redirect::to("/admin_dashboard")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_marks_tolerates_garbage() {
        assert_eq!(parse_marks("[]"), Vec::<SubjectMark>::new());
        assert_eq!(parse_marks("not json"), Vec::<SubjectMark>::new());

        let marks = parse_marks(r#"[{"code":"CS101","score":"80"}]"#);
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].code, "CS101");
    }
}
