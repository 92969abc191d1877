//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key from a resource name and parameters.
///
/// The key is a SHA-256 hash of the resource and its sorted parameters, so
/// logically identical requests map to one key regardless of parameter order.
pub fn cache_key<K, V>(resource: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut hasher = Sha256::new();

    update_field(&mut hasher, resource);

    // Sort by name, then value, so repeated names stay deterministic too
    let mut sorted_params: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_ref()))
        .collect();
    sorted_params.sort();

    for (k, v) in sorted_params {
        update_field(&mut hasher, k);
        update_field(&mut hasher, v);
    }

    format!("{:x}", hasher.finalize())
}

/// Length-prefixed so separators inside values cannot shift field boundaries
fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
