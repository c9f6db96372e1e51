//! Mock sign-in: the presence of a `user` record means "signed in".

use crate::backend::KeyValueBackend;
use crate::codec::{CollectionCodec, JsonCodec};
use crate::store::StoreError;

use super::models::User;

/// Reads and writes the single `user` record.
pub struct UserSession<B, C = JsonCodec> {
    backend: B,
    codec: C,
}

impl<B: KeyValueBackend> UserSession<B, JsonCodec> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            codec: JsonCodec,
        }
    }
}

impl<B: KeyValueBackend, C: CollectionCodec> UserSession<B, C> {
    pub fn with_codec(backend: B, codec: C) -> Self {
        Self { backend, codec }
    }

    pub fn sign_in(&self, user: &User) -> Result<(), StoreError> {
        let blob = self.codec.encode_value(user).map_err(StoreError::Encode)?;
        self.backend.set(User::KEY, &blob)?;
        tracing::debug!(email = %user.email, provider = %user.provider, "user signed in");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.backend.remove(User::KEY)?;
        Ok(())
    }

    /// The signed-in user. An unreadable record is reported, not treated as
    /// signed out.
    pub fn current_user(&self) -> Result<Option<User>, StoreError> {
        match self.backend.get(User::KEY)? {
            None => Ok(None),
            Some(blob) => self
                .codec
                .decode_value(&blob)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    collection: User::KEY.to_string(),
                    source,
                }),
        }
    }

    pub fn is_signed_in(&self) -> Result<bool, StoreError> {
        Ok(self.backend.get(User::KEY)?.is_some())
    }
}
