use std::path::{Path, PathBuf};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use registrar_types::session::Role;

use crate::AppState;
use crate::auth::internal_error;
use crate::error::UploadError;
use crate::flash::{self, Flash};
use crate::session;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Extension check, case-insensitive, on the submitted filename.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Strip any path components and map unsafe characters to `_`, so the
/// stored name can never traverse out of the upload directory.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Validate the submitted filename and produce the stored name:
/// `{reg_no}_{original}`, sanitized.
pub fn derived_filename(reg_no: &str, original: Option<&str>) -> Result<String, UploadError> {
    let original = original.ok_or(UploadError::MissingFile)?;
    if original.is_empty() {
        return Err(UploadError::EmptyFilename);
    }
    if !allowed_file(original) {
        return Err(UploadError::DisallowedExtension);
    }
    Ok(sanitize_filename(&format!("{}_{}", reg_no, original)))
}

/// Write the picture to disk, overwriting any previous file of the same
/// name. A prior picture stored under a different name is left behind.
pub async fn store(dir: &Path, filename: &str, data: &[u8]) -> anyhow::Result<PathBuf> {
    let path = dir.join(filename);
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

pub async fn upload_profile_pic(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Response, StatusCode> {
    let caller = session::from_jar(&jar, &state.jwt_secret);
    let caller = match session::require(caller.as_ref(), Role::Student) {
        Ok(session) => session.clone(),
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let Some(student) = state
        .db
        .get_student_by_name(&caller.username)
        .map_err(internal_error)?
    else {
        return Err(StatusCode::NOT_FOUND);
    };

    // Locate the profile_pic part of the form.
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("profile_pic") {
            let filename = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        let jar = flash::set(jar, &Flash::danger(UploadError::MissingFile.to_string()));
        return Ok((jar, Redirect::to("/dashboard")).into_response());
    };

    let stored_name = match derived_filename(&student.reg_no, filename.as_deref()) {
        Ok(name) => name,
        Err(rejection) => {
            let jar = flash::set(jar, &Flash::danger(rejection.to_string()));
            return Ok((jar, Redirect::to("/dashboard")).into_response());
        }
    };

    store(&state.upload_dir, &stored_name, &data)
        .await
        .map_err(internal_error)?;
    state
        .db
        .set_profile_pic(student.id, &stored_name)
        .map_err(internal_error)?;

    info!("{} uploaded profile picture {}", caller.username, stored_name);
    let jar = flash::set(jar, &Flash::success("Profile picture uploaded successfully!"));
    Ok((jar, Redirect::to("/dashboard")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(allowed_file("photo.png"));
        assert!(allowed_file("photo.JPG"));
        assert!(allowed_file("photo.jpeg"));
        assert!(allowed_file("animation.Gif"));
        assert!(!allowed_file("photo.exe"));
        assert!(!allowed_file("photo"));
        assert!(!allowed_file("archive.tar.xz"));
    }

    #[test]
    fn sanitization_strips_traversal_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("plain.png"), "plain.png");
    }

    #[test]
    fn derived_name_prefixes_reg_no() {
        assert_eq!(
            derived_filename("2021CS001", Some("photo.png")).unwrap(),
            "2021CS001_photo.png"
        );
        assert_eq!(
            derived_filename("2021CS001", Some("photo.exe")),
            Err(UploadError::DisallowedExtension)
        );
        assert_eq!(
            derived_filename("2021CS001", Some("")),
            Err(UploadError::EmptyFilename)
        );
        assert_eq!(
            derived_filename("2021CS001", None),
            Err(UploadError::MissingFile)
        );
    }

    #[tokio::test]
    async fn store_writes_and_overwrites() {
        let dir = std::env::temp_dir().join(format!("registrar-test-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let path = store(&dir, "2021CS001_photo.png", b"first").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"first");

        store(&dir, "2021CS001_photo.png", b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
