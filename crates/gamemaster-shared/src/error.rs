use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Malformed identity token")]
    MalformedToken,

    #[error("Identity token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Identity token claims are invalid: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("Identity token has no subject")]
    MissingSubject,

    #[error("Identity token audience does not match")]
    AudienceMismatch,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("User cancelled sign-in")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
