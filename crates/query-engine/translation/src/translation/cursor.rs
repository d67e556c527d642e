//! Cursors: opaque tokens carrying the parameters of a request and the offset of a page.
//!
//! The plain text of a cursor is the form encoded parameter list in a fixed order:
//! the sort, the filters as given, the page size and finally the offset. It is
//! base64url encoded, after being encrypted when a key is configured.
//!
//! Encryption is AES-256-GCM-SIV with a nonce derived from the key and the plain text.
//! The same page of the same query always yields the same token, and any change to a
//! token is detected.

use std::fmt;

use aes_gcm_siv::aead::{Aead, KeyInit};
use aes_gcm_siv::{Aes256GcmSiv, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use restql_configuration::RequestSettings;

use super::error::Error;
use super::parameters::QueryParameters;

const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

#[derive(Clone)]
struct Cipher {
    aead: Aes256GcmSiv,
    key: [u8; 32],
}

impl Cipher {
    fn new(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0; 32];
        key.copy_from_slice(&digest);
        Cipher {
            aead: Aes256GcmSiv::new(&digest),
            key,
        }
    }

    fn nonce(&self, plaintext: &[u8]) -> [u8; NONCE_LENGTH] {
        let digest = Sha256::new()
            .chain_update(self.key)
            .chain_update(plaintext)
            .finalize();
        let mut nonce = [0; NONCE_LENGTH];
        nonce.copy_from_slice(&digest[..NONCE_LENGTH]);
        nonce
    }
}

/// Encodes and decodes the cursors of one deployment.
#[derive(Clone)]
pub struct CursorCodec {
    cipher: Option<Cipher>,
    cursor_name: String,
    offset_name: String,
    sort_name: String,
    page_size_name: String,
}

impl fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorCodec")
            .field("encrypted", &self.cipher.is_some())
            .field("cursor_name", &self.cursor_name)
            .field("offset_name", &self.offset_name)
            .finish_non_exhaustive()
    }
}

impl CursorCodec {
    pub fn new(settings: &RequestSettings) -> Self {
        CursorCodec {
            cipher: settings.cursor_key.as_deref().map(Cipher::new),
            cursor_name: settings.pagination.cursor_name.clone(),
            offset_name: settings.pagination.index_cursor_name.clone(),
            sort_name: settings.sort.parameter_name.clone(),
            page_size_name: settings.pagination.page_size_name.clone(),
        }
    }

    pub fn cursor_name(&self) -> &str {
        &self.cursor_name
    }

    /// The parameters in cursor order: the sort, then the filters, then the page size.
    pub fn canonical(&self, parameters: &QueryParameters) -> QueryParameters {
        let sort = parameters
            .pairs()
            .filter(|(key, _)| *key == self.sort_name);
        let filters = parameters.pairs().filter(|(key, _)| {
            *key != self.sort_name
                && *key != self.page_size_name
                && *key != self.offset_name
                && *key != self.cursor_name
        });
        let page_size = parameters
            .pairs()
            .filter(|(key, _)| *key == self.page_size_name);
        sort.chain(filters).chain(page_size).collect()
    }

    /// The token of the page at `offset` of the query given by `parameters`.
    pub fn encode_page(&self, parameters: &QueryParameters, offset: u64) -> Result<String, Error> {
        let mut cursor = self.canonical(parameters);
        cursor.push(self.offset_name.as_str(), offset.to_string());
        self.encode(&cursor)
    }

    /// Encode parameters as they are.
    pub fn encode(&self, parameters: &QueryParameters) -> Result<String, Error> {
        let plaintext = parameters.to_query_string();
        let Some(cipher) = &self.cipher else {
            return Ok(URL_SAFE_NO_PAD.encode(plaintext));
        };

        let nonce = cipher.nonce(plaintext.as_bytes());
        let ciphertext = cipher
            .aead
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| Error::EncryptionFailure {
                parameter: self.cursor_name.clone(),
                reason: "the cursor could not be encrypted".to_string(),
            })?;

        let mut token = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Only tokens in the form `encode` produces are accepted, so padded tokens are rejected.
    pub fn decode(&self, token: &str) -> Result<QueryParameters, Error> {
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| Error::InvalidCursor {
            parameter: self.cursor_name.clone(),
            reason: "the cursor is not valid base64".to_string(),
        })?;

        let plaintext = match &self.cipher {
            None => bytes,
            Some(cipher) => {
                let tampered = || Error::EncryptionFailure {
                    parameter: self.cursor_name.clone(),
                    reason: "the cursor was changed or was not made by this server".to_string(),
                };
                if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
                    return Err(tampered());
                }
                let (nonce, ciphertext) = bytes.split_at(NONCE_LENGTH);
                cipher
                    .aead
                    .decrypt(Nonce::from_slice(nonce), ciphertext)
                    .map_err(|_| tampered())?
            }
        };

        let plaintext = String::from_utf8(plaintext).map_err(|_| Error::InvalidCursor {
            parameter: self.cursor_name.clone(),
            reason: "the cursor is not valid UTF-8".to_string(),
        })?;
        Ok(QueryParameters::from_query_string(&plaintext))
    }
}
