//! Build-ID finalization : the last fragment whose content depends on
//! the rest of the finished image. Hashing splits the image into 1 MiB chunks,
//! hashes each in parallel, then rehashes the concatenation of chunk digests —
//! the self-consistency property only holds because the id region itself
//! is zeroed for the duration of the hash.

use std::hash::Hasher;

use rayon::prelude::*;
use sha1::Digest as _;

use crate::config::BuildIdMode;
use crate::diag::Diag;
use crate::model::fragment::BuildIdKind;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Digest byte length for each non-hex-string mode.
pub fn digest_len(kind: BuildIdKind) -> usize {
    match kind {
        BuildIdKind::Fast => 8,
        BuildIdKind::Md5 => 16,
        BuildIdKind::Sha1 => 20,
        BuildIdKind::Uuid => 16,
        BuildIdKind::HexString => 0, // caller supplies the length from the literal
    }
}

fn hash_chunk_fast(chunk: &[u8]) -> [u8; 8] {
    let mut hasher = twox_hash::XxHash64::with_seed(0);
    hasher.write(chunk);
    hasher.finish().to_le_bytes()
}

fn hash_chunk_md5(chunk: &[u8]) -> [u8; 16] {
    md5::compute(chunk).0
}

fn hash_chunk_sha1(chunk: &[u8]) -> [u8; 20] {
    let mut hasher = sha1::Sha1::new();
    hasher.update(chunk);
    let result = hasher.finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(&result);
    out
}

/// Hash `image` in 1 MiB chunks (in parallel) then rehash the concatenation of
/// chunk digests. Each algorithm's own chunk digest function is reused for the
/// final rehash, so "fast" always reduces to one more XXH64 call over however
/// many 8-byte chunk digests were produced, etc.
fn chunked_digest<const N: usize>(image: &[u8], hash_chunk: impl Fn(&[u8]) -> [u8; N] + Sync) -> [u8; N] {
    let chunk_digests: Vec<u8> = image
        .par_chunks(CHUNK_SIZE)
        .map(|chunk| hash_chunk(chunk).to_vec())
        .flatten_iter()
        .collect();
    hash_chunk(&chunk_digests)
}

/// Compute the digest bytes for `image` under `kind`. Returns an empty vector for
/// [`BuildIdKind::Uuid`] since a uuid build-id is drawn from an entropy source
/// rather than the image; use [`random_uuid_digest`] for that mode instead.
pub fn compute_digest(image: &[u8], kind: BuildIdKind) -> Vec<u8> {
    match kind {
        BuildIdKind::Fast => chunked_digest(image, hash_chunk_fast).to_vec(),
        BuildIdKind::Md5 => chunked_digest(image, hash_chunk_md5).to_vec(),
        BuildIdKind::Sha1 => chunked_digest(image, hash_chunk_sha1).to_vec(),
        BuildIdKind::Uuid | BuildIdKind::HexString => Vec::new(),
    }
}

/// A fresh random 16-byte build-id, for `--build-id=uuid`: drawn from a random
/// source rather than derived from the image.
pub fn random_uuid_digest() -> [u8; 16] {
    *uuid::Uuid::new_v4().as_bytes()
}

/// Parse a `--build-id=0xHEX` literal (with or without the `0x` prefix stripped by
/// the caller) into raw bytes, validating `[0-9a-fA-F]+`.
pub fn parse_hex_string(literal: &str) -> Result<Vec<u8>, Diag> {
    let digits = literal.strip_prefix("0x").unwrap_or(literal);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Diag::InvalidBuildIdHexString { literal: literal.to_string() });
    }
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let mut bytes = Vec::with_capacity(padded.len() / 2);
    for pair in padded.as_bytes().chunks(2) {
        let hi = (pair[0] as char).to_digit(16).expect("validated hex digit");
        let lo = (pair[1] as char).to_digit(16).expect("validated hex digit");
        bytes.push(((hi << 4) | lo) as u8);
    }
    Ok(bytes)
}

/// Resolve a [`BuildIdMode`] into the fragment kind it produces plus, for
/// hex-string mode, the literal bytes to embed verbatim (no hashing involved).
pub fn resolve_mode(mode: &BuildIdMode) -> Result<Option<(BuildIdKind, Vec<u8>)>, Diag> {
    match mode {
        BuildIdMode::None => Ok(None),
        BuildIdMode::Fast => Ok(Some((BuildIdKind::Fast, Vec::new()))),
        BuildIdMode::Md5 => Ok(Some((BuildIdKind::Md5, Vec::new()))),
        BuildIdMode::Sha1 => Ok(Some((BuildIdKind::Sha1, Vec::new()))),
        BuildIdMode::Uuid => Ok(Some((BuildIdKind::Uuid, random_uuid_digest().to_vec()))),
        BuildIdMode::HexString(literal) => {
            let bytes = parse_hex_string(literal)?;
            Ok(Some((BuildIdKind::HexString, bytes)))
        }
    }
}

/// Finalize a build-id note in place: zero the `note_offset..note_offset+id_len`
/// region of `image`, hash the whole buffer, write the digest back into that
/// region, and return it. For [`BuildIdKind::Uuid`]/[`BuildIdKind::HexString`],
/// the digest is already fixed and this only writes it — it never reads `image`,
/// preserving the same self-consistency property trivially (the "hash" is
/// constant with respect to the image).
pub fn finalize_in_place(image: &mut [u8], note_offset: usize, kind: BuildIdKind, fixed: &[u8]) -> Vec<u8> {
    let id_len = if fixed.is_empty() { digest_len(kind) } else { fixed.len() };
    match kind {
        BuildIdKind::Uuid | BuildIdKind::HexString => {
            image[note_offset..note_offset + id_len].copy_from_slice(fixed);
            fixed.to_vec()
        }
        _ => {
            for byte in &mut image[note_offset..note_offset + id_len] {
                *byte = 0;
            }
            let digest = compute_digest(image, kind);
            image[note_offset..note_offset + id_len].copy_from_slice(&digest);
            digest
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;

    #[test]
    fn fast_digest_is_eight_bytes() {
        let digest = compute_digest(b"hello world", BuildIdKind::Fast);
        assert_eq!(digest.len(), 8);
    }

    #[test]
    fn md5_digest_is_sixteen_bytes() {
        let digest = compute_digest(b"hello world", BuildIdKind::Md5);
        assert_eq!(digest.len(), 16);
    }

    #[test]
    fn sha1_digest_is_twenty_bytes() {
        let digest = compute_digest(b"hello world", BuildIdKind::Sha1);
        assert_eq!(digest.len(), 20);
    }

    #[test]
    fn digest_is_deterministic() {
        let a = compute_digest(b"some image bytes", BuildIdKind::Fast);
        let b = compute_digest(b"some image bytes", BuildIdKind::Fast);
        assert_eq!(a, b);
    }

    #[test]
    fn chunk_boundary_does_not_panic() {
        let image = vec![0x42u8; CHUNK_SIZE * 2 + 7];
        let digest = compute_digest(&image, BuildIdKind::Sha1);
        assert_eq!(digest.len(), 20);
    }

    #[test]
    fn hex_string_parses_valid_literal() {
        let bytes = parse_hex_string("0xdeadbeef").unwrap();
        assert_eq!(bytes, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn hex_string_rejects_invalid_literal() {
        assert!(matches!(
                parse_hex_string("0xzzzz"),
                Err(Diag::InvalidBuildIdHexString {.. })
        ));
    }

    #[test]
    fn finalize_in_place_is_self_consistent() {
        let mut image = vec![0u8; 64];
        for (i, byte) in image.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let note_offset = 20;
        let id_len = digest_len(BuildIdKind::Fast);
        let digest = finalize_in_place(&mut image, note_offset, BuildIdKind::Fast, &[]);
        assert_eq!(&image[note_offset..note_offset + id_len], digest.as_slice());

        let mut verify_image = image.clone();
        for byte in &mut verify_image[note_offset..note_offset + id_len] {
            *byte = 0;
        }
        let recomputed = compute_digest(&verify_image, BuildIdKind::Fast);
        assert_eq!(recomputed, digest);
    }

    #[test]
    fn uuid_mode_does_not_depend_on_image() {
        let mut image_a = vec![1u8; 32];
        let mut image_b = vec![2u8; 32];
        let fixed = random_uuid_digest().to_vec();
        let a = finalize_in_place(&mut image_a, 4, BuildIdKind::Uuid, &fixed);
        let b = finalize_in_place(&mut image_b, 4, BuildIdKind::Uuid, &fixed);
        assert_eq!(a, b);
    }
}
