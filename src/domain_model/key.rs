use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Marker written into bytes 0..6 of every key minted by [`StorageKey::from_public_id`].
const MARKER: [u8; 6] = *b"sfront";

/// Public ids stay below 2^53 so JSON clients can hold them in an IEEE-754 double.
const PUBLIC_ID_MASK: u64 = (1 << 53) - 1;

/// Key type of the storage layer.
///
/// Two kinds of keys exist:
///
/// * round-trippable keys, produced by [`StorageKey::from_public_id`]. They are
///   RFC 9562 version 8 UUIDs whose custom bits hold a fixed marker and the
///   big-endian bytes of the integer (byte 7 and bytes 9..16).
///   [`StorageKey::public_id`] recovers the integer exactly.
/// * display-only keys, anything else (e.g. random v4 UUIDs inserted by other
///   tools). They have no public id; [`StorageKey::display_digest`] gives a
///   stable but lossy integer for them, with a birthday-bound collision
///   probability over a 53-bit space.
#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct StorageKey(pub Uuid);

impl StorageKey {
    pub fn from_public_id(id: u64) -> Self {
        let id = id.to_be_bytes();
        let mut raw = [0u8; 16];
        raw[..6].copy_from_slice(&MARKER);
        raw[7] = id[0];
        raw[9..].copy_from_slice(&id[1..]);
        // new_v8 owns byte 6 (version) and the top bits of byte 8 (variant).
        StorageKey(Uuid::new_v8(raw))
    }

    /// Exact inverse of [`StorageKey::from_public_id`]. `None` for display-only keys.
    pub fn public_id(&self) -> Option<u64> {
        let raw = self.0.as_bytes();
        if raw[..6] != MARKER || raw[6] != 0x80 || raw[8] != 0x80 {
            return None;
        }
        let mut id = [0u8; 8];
        id[0] = raw[7];
        id[1..].copy_from_slice(&raw[9..]);
        Some(u64::from_be_bytes(id))
    }

    pub fn is_round_trippable(&self) -> bool {
        self.public_id().is_some()
    }

    /// Lossy digest for showing display-only keys at the API boundary.
    /// Never feed it back into [`StorageKey::from_public_id`].
    pub fn display_digest(&self) -> u64 {
        let digest = Sha256::digest(self.0.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(head) & PUBLIC_ID_MASK
    }

    /// Mints a key for a new row together with its public id.
    pub fn mint() -> (u64, StorageKey) {
        let id = mint_public_id();
        (id, StorageKey::from_public_id(id))
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fresh non-zero 53-bit id drawn from the random bits of a v4 UUID.
pub fn mint_public_id() -> u64 {
    loop {
        let (hi, _) = Uuid::new_v4().as_u64_pair();
        let id = hi & PUBLIC_ID_MASK;
        if id != 0 {
            return id;
        }
    }
}

/// Integer shown for `key` in responses: the exact id when the key carries
/// one, the display digest otherwise.
pub fn shown_id(key: &StorageKey) -> u64 {
    match key.public_id() {
        Some(id) => id,
        None => key.display_digest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_round_trips() {
        for id in [0, 1, 42, 255, 256, 1 << 40, PUBLIC_ID_MASK, u64::MAX - 1, u64::MAX] {
            let key = StorageKey::from_public_id(id);
            assert_eq!(key.public_id(), Some(id), "round trip of {id}");
        }
    }

    #[test]
    fn translation_is_deterministic_and_injective() {
        assert_eq!(StorageKey::from_public_id(7), StorageKey::from_public_id(7));
        assert_ne!(StorageKey::from_public_id(7), StorageKey::from_public_id(8));
        assert_ne!(
            StorageKey::from_public_id(1),
            StorageKey::from_public_id(1 << 56)
        );
    }

    #[test]
    fn translated_keys_are_version_8_rfc_variant() {
        let key = StorageKey::from_public_id(u64::MAX);
        assert_eq!(key.0.get_version_num(), 8);
        assert_eq!(key.0.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn random_keys_are_display_only() {
        let key = StorageKey(Uuid::new_v4());
        assert_eq!(key.public_id(), None);
        assert!(!key.is_round_trippable());
        assert_eq!(key.display_digest(), key.display_digest());
        assert!(key.display_digest() <= PUBLIC_ID_MASK);
        assert_eq!(shown_id(&key), key.display_digest());
    }

    #[test]
    fn minted_ids_round_trip_and_fit_json() {
        for _ in 0..64 {
            let (id, key) = StorageKey::mint();
            assert!(id != 0 && id <= PUBLIC_ID_MASK);
            assert_eq!(key.public_id(), Some(id));
            assert_eq!(shown_id(&key), id);
        }
    }
}
