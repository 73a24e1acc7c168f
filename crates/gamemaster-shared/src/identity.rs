//! Federated sign-in: the provider seam and an ID token decoder.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Profile handed back by an identity provider after a successful sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FederatedProfile {
    /// Provider-side subject id (`sub` claim).
    pub subject: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// Something that can run a sign-in flow and produce a profile.
pub trait IdentityProvider {
    fn sign_in(&self) -> Result<FederatedProfile, IdentityError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::One(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|a| a == expected),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    aud: Option<Audience>,
}

/// Provider backed by an already-issued ID token.
///
/// The signature is NOT verified. Only the payload is decoded.
#[derive(Debug, Clone)]
pub struct IdTokenProvider {
    token: String,
    audience: Option<String>,
}

impl IdTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            audience: None,
        }
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }
}

impl IdentityProvider for IdTokenProvider {
    fn sign_in(&self) -> Result<FederatedProfile, IdentityError> {
        decode_id_token(&self.token, self.audience.as_deref())
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
pub fn decode_id_token(
    token: &str,
    expected_audience: Option<&str>,
) -> Result<FederatedProfile, IdentityError> {
    let mut parts = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::MalformedToken);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)?;

    if let Some(expected) = expected_audience {
        match &claims.aud {
            Some(aud) if aud.contains(expected) => {}
            _ => return Err(IdentityError::AudienceMismatch),
        }
    }

    let subject = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(IdentityError::MissingSubject)?;

    let email = claims.email.filter(|e| !e.is_empty());
    let name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            email
                .as_deref()
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Player".to_string());

    Ok(FederatedProfile {
        subject,
        name,
        email,
        picture: claims.picture.filter(|p| !p.is_empty()),
    })
}
