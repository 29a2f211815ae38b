use aes_gcm::aead::{Aead, AeadCore, OsRng};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte length of the AES-GCM nonce prepended to every token.
const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Token is not valid hex")]
    InvalidToken,
    #[error("Token too short to carry a nonce")]
    TruncatedToken,
    #[error("Decryption failed")]
    DecryptFailed,
    #[error("Encryption failed")]
    EncryptFailed,
}

/// Reversible transform applied to monetary amounts and free-text fields
/// before they reach the store, and inverted on read. The ledger logic only
/// ever sees `encode`/`decode`; decode failures are error values so read
/// paths can degrade per row instead of aborting.
pub trait ValueCodec: Send + Sync {
    fn encode(&self, plaintext: &str) -> Result<String, CodecError>;
    fn decode(&self, token: &str) -> Result<String, CodecError>;
}

/// AES-256-GCM codec. The key is the SHA-256 digest of the configured
/// secret; every encode draws a fresh 96-bit nonce which is stored in front
/// of the ciphertext, so two tokens for the same plaintext differ while
/// `decode(encode(s)) == s` always holds.
pub struct AeadCodec {
    cipher: Aes256Gcm,
}

impl AeadCodec {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);
        AeadCodec {
            cipher: Aes256Gcm::new(key),
        }
    }
}

impl ValueCodec for AeadCodec {
    fn encode(&self, plaintext: &str) -> Result<String, CodecError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CodecError::EncryptFailed)?;
        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(hex::encode(token))
    }

    fn decode(&self, token: &str) -> Result<String, CodecError> {
        let bytes = hex::decode(token).map_err(|_| CodecError::InvalidToken)?;
        if bytes.len() < NONCE_LEN {
            return Err(CodecError::TruncatedToken);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CodecError::DecryptFailed)?;
        String::from_utf8(plaintext).map_err(|_| CodecError::DecryptFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> AeadCodec {
        AeadCodec::new("test-encryption-secret")
    }

    #[test]
    fn round_trips_arbitrary_strings() {
        let codec = codec();
        for input in ["", "42", "1234.56", "-17.5", "Dinner with Sam", "émoji ✨"] {
            let token = codec.encode(input).unwrap();
            assert_eq!(codec.decode(&token).unwrap(), input);
        }
    }

    #[test]
    fn tokens_are_not_deterministic() {
        let codec = codec();
        let a = codec.encode("100").unwrap();
        let b = codec.encode("100").unwrap();
        assert_ne!(a, b);
        assert_eq!(codec.decode(&a).unwrap(), codec.decode(&b).unwrap());
    }

    #[test]
    fn rejects_garbage_tokens() {
        let codec = codec();
        assert!(matches!(codec.decode("not hex"), Err(CodecError::InvalidToken)));
        assert!(matches!(codec.decode("abcd"), Err(CodecError::TruncatedToken)));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let codec = codec();
        let token = codec.encode("250.00").unwrap();
        let mut bytes = hex::decode(&token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            codec.decode(&hex::encode(bytes)),
            Err(CodecError::DecryptFailed)
        ));
    }

    #[test]
    fn rejects_tokens_from_another_key() {
        let other = AeadCodec::new("a-different-secret");
        let token = other.encode("99").unwrap();
        assert!(codec().decode(&token).is_err());
    }
}
