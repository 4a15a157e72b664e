const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
const FNV_PRIME: u64 = 1_099_511_628_211;

/// 64-bit FNV-1 hash (multiply, then xor) of `bytes`.
///
/// Registries key resources by the hash of their path, so the same path
/// always resolves to the same handle.
pub fn fnv1_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        hash.wrapping_mul(FNV_PRIME) ^ u64::from(b)
    })
}

/// Content key of a path, hashed over its UTF-8 (lossy) spelling.
pub fn path_key(path: &std::path::Path) -> u64 {
    fnv1_64(path.to_string_lossy().as_bytes())
}
