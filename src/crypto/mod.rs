// src/crypto/mod.rs
use aes_gcm::{Aes256Gcm, Nonce, aead::{Aead, KeyInit}};
use sha2::{Sha256, Digest};
use rand::RngCore;
use crate::errors::CrowdRunError;

const NONCE_LEN: usize = 12;

pub fn encrypt_data(data: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CrowdRunError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CrowdRunError::CryptoError(format!("Failed to init cipher: {:?}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let encrypted = cipher.encrypt(nonce, data)
        .map_err(|e| CrowdRunError::CryptoError(format!("Encryption failed: {}", e)))?;

    let mut result = Vec::with_capacity(NONCE_LEN + encrypted.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&encrypted);

    Ok(result)
}

pub fn decrypt_data(data: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CrowdRunError> {
    if data.len() < NONCE_LEN {
        return Err(CrowdRunError::CryptoError("Invalid encrypted data: too short".to_string()));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CrowdRunError::CryptoError(format!("Failed to init cipher: {:?}", e)))?;

    let nonce = Nonce::from_slice(&data[..NONCE_LEN]);
    let encrypted_data = &data[NONCE_LEN..];

    let decrypted = cipher.decrypt(nonce, encrypted_data)
        .map_err(|e| CrowdRunError::CryptoError(format!("Decryption failed: {}", e)))?;

    Ok(decrypted)
}

pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

pub fn derive_encryption_key(secret_key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret_key.as_bytes());
    hasher.update(b"crowdrun_salt");
    let hash = hasher.finalize();
    let mut key = [0u8; 32];
    key.copy_from_slice(&hash[..]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypts_what_it_encrypted() {
        let key = derive_encryption_key("secret");
        let sealed = encrypt_data(b"Level_1_Done", &key).unwrap();
        assert_ne!(&sealed[NONCE_LEN..], b"Level_1_Done");
        assert_eq!(decrypt_data(&sealed, &key).unwrap(), b"Level_1_Done");
    }

    #[test]
    fn wrong_key_or_short_input_fails() {
        let sealed = encrypt_data(b"payload", &derive_encryption_key("a")).unwrap();
        assert!(decrypt_data(&sealed, &derive_encryption_key("b")).is_err());
        assert!(decrypt_data(&[1, 2, 3], &derive_encryption_key("a")).is_err());
    }

    #[test]
    fn hash_is_hex_sha256() {
        assert_eq!(
            hash_data(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
