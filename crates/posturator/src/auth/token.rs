//! Claims carried by the bearer token issued by the account backend.
//!
//! The client never verifies the signature: the backend is the trust anchor and
//! checks every token it receives. Decoding here only reads the claims so the
//! client can route by role and drop tokens that have already expired.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl DecodedToken {
    /// A token without an expiry claim is treated as expired.
    pub fn is_active_at(&self, now_epoch_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp > now_epoch_secs)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(chrono::Utc::now().timestamp())
    }
}

/// Read the claims of `token` without checking its signature or expiry.
pub fn decode_claims(token: &str) -> Result<DecodedToken, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<DecodedToken>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
}

/// Account role as issued by the backend. Unknown values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    #[default]
    Unknown,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "USER" => Role::User,
            "ADMIN" => Role::Admin,
            "" => Role::Unknown,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("USER"),
            Role::Admin => f.write_str("ADMIN"),
            Role::Unknown => Ok(()),
            Role::Other(value) => f.write_str(value),
        }
    }
}

/// Where a client lands after its credential has been inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Questionnaire,
    Admin,
    Login,
}

impl Destination {
    pub fn for_role(role: &Role) -> Self {
        match role {
            Role::User => Destination::Questionnaire,
            Role::Admin => Destination::Admin,
            Role::Unknown | Role::Other(_) => Destination::Login,
        }
    }

    pub fn for_claims(claims: Option<&DecodedToken>) -> Self {
        claims.map_or(Destination::Login, |claims| Self::for_role(&claims.role))
    }
}
