use std::fmt;

use anyhow::anyhow;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use toilet_types::api::Claims;

use crate::error::ServiceError;

/// Lifetime of an issued bearer token.
pub const TOKEN_TTL_HOURS: i64 = 72;

/// User id recovered from a validated bearer token. Only the authenticator
/// mints these, so holding one means the token checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(i64);

impl Identity {
    pub(crate) fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    pub fn user_id(self) -> i64 {
        self.0
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing and bearer-token signing. Built once at startup and shared
/// read-only by every request; the signing secret never leaves this struct.
pub struct Authenticator {
    argon2: Argon2<'static>,
    cost: HashCost,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(secret: &str, cost: HashCost) -> anyhow::Result<Self> {
        if secret.is_empty() {
            return Err(anyhow!("token signing secret must not be empty"));
        }

        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| anyhow!("invalid password hash cost: {}", e))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        // Zero leeway: an expired token is rejected the moment it expires.
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let mut auth = Self {
            argon2,
            cost,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            dummy_hash: String::new(),
        };
        auth.dummy_hash = auth.hash_password("not-a-real-password")?;
        Ok(auth)
    }

    pub fn hash_password(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    /// Malformed hashes verify as false instead of erroring.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            debug!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burns the same verification work as a real login, for unknown users.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify_password(plain, &self.dummy_hash);
    }

    pub fn issue_token(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_token_at(user_id, Utc::now())
    }

    /// Issues a token as if it had been minted at `issued_at`.
    pub fn issue_token_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> anyhow::Result<String> {
        let claims = Claims {
            user_id,
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<Identity, ServiceError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("rejected bearer token: {}", e);
            ServiceError::Unauthorized
        })?;

        if data.claims.user_id <= 0 {
            return Err(ServiceError::Unauthorized);
        }
        Ok(Identity::new(data.claims.user_id))
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("cost", &self.cost)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_authenticator() -> Authenticator {
    let cheap = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    Authenticator::new("test-secret", cheap).unwrap()
}
