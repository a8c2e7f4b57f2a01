use thiserror::Error;

/// Registration form rejections, checked in a fixed order; the message is
/// flashed back at the form verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Passwords do not match!")]
    PasswordMismatch,
    #[error("Username already exists. Please choose a different one.")]
    UsernameTaken,
    #[error("Registration number already exists.")]
    RegNoTaken,
}

/// Profile picture rejections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No file part")]
    MissingFile,
    #[error("No selected file")]
    EmptyFilename,
    #[error("Invalid file type. Allowed types: png, jpg, jpeg, gif")]
    DisallowedExtension,
}
