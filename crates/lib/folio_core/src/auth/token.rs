//! Access-token codec: HS256 JWT encode/decode of [`TokenPayload`].

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};

use super::AuthError;
use crate::models::auth::TokenPayload;

/// The only accepted signing algorithm.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies access tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Serialize and sign a payload.
    pub fn issue(&self, payload: &TokenPayload) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), payload, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token and return its payload if it has not expired.
    pub fn parse(&self, token: &str) -> Result<TokenPayload, AuthError> {
        let payload = self.decode_allow_expired(token)?;
        payload.validate(Utc::now())?;
        Ok(payload)
    }

    /// Verify algorithm and signature without applying the expiry rule.
    pub fn decode_allow_expired(&self, token: &str) -> Result<TokenPayload, AuthError> {
        // Unknown algorithms (including "none") fail header parsing outright.
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::InvalidToken);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;

        decode::<TokenPayload>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn payload(ttl_secs: u64) -> TokenPayload {
        TokenPayload::new("alice", 42, Duration::from_secs(ttl_secs)).unwrap()
    }

    fn expired_payload() -> TokenPayload {
        let mut p = payload(60);
        p.issued_at -= chrono::Duration::minutes(10);
        p.expires_at = p.issued_at + chrono::Duration::minutes(5);
        p
    }

    #[test]
    fn parse_roundtrips_payload() {
        let codec = TokenCodec::new(SECRET);
        let original = payload(60);
        let token = codec.issue(&original).unwrap();
        assert_eq!(codec.parse(&token).unwrap(), original);
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = TokenCodec::new(b"other-secret").issue(&payload(60)).unwrap();
        let err = TokenCodec::new(SECRET).parse(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_expired_not_invalid() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&expired_payload()).unwrap();
        assert!(matches!(codec.parse(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn decode_allow_expired_accepts_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let original = expired_payload();
        let token = codec.issue(&original).unwrap();
        assert_eq!(codec.decode_allow_expired(&token).unwrap(), original);
    }

    #[test]
    fn decode_allow_expired_still_checks_signature() {
        let token = TokenCodec::new(b"other-secret").issue(&expired_payload()).unwrap();
        let err = TokenCodec::new(SECRET).decode_allow_expired(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn tampered_claims_are_invalid() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.issue(&payload(60)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut forged = payload(60);
        forged.user_id = 1;
        let forged_claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert!(matches!(codec.parse(&tampered), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn other_hmac_algorithm_is_rejected() {
        let token = encode(
            &Header::new(Algorithm::HS512),
            &payload(60),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let err = TokenCodec::new(SECRET).parse(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload(60)).unwrap());
        let token = format!("{header}.{claims}.");
        let err = TokenCodec::new(SECRET).parse(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn asymmetric_algorithms_are_rejected() {
        let codec = TokenCodec::new(SECRET);
        let claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload(60)).unwrap());
        let signature = URL_SAFE_NO_PAD.encode([7u8; 256]);
        for alg in ["RS256", "ES256"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{alg}","typ":"JWT"}}"#));
            let token = format!("{header}.{claims}.{signature}");
            assert!(matches!(codec.parse(&token), Err(AuthError::InvalidToken)), "{alg}");
            assert!(
                matches!(codec.decode_allow_expired(&token), Err(AuthError::InvalidToken)),
                "{alg}"
            );
        }
    }

    #[test]
    fn subsecond_ttl_roundtrips() {
        let codec = TokenCodec::new(SECRET);
        let original = TokenPayload::new("alice", 42, Duration::from_millis(1500)).unwrap();
        let token = codec.issue(&original).unwrap();
        assert_eq!(codec.parse(&token).unwrap(), original);
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = TokenCodec::new(SECRET);
        assert!(matches!(codec.parse(""), Err(AuthError::InvalidToken)));
        assert!(matches!(codec.parse("not.a.jwt"), Err(AuthError::InvalidToken)));
    }
}
