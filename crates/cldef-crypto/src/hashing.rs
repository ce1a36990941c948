/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hex-encoded BLAKE3 digest, used as a stable identifier for public
/// key material.
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(hash(data))
}
