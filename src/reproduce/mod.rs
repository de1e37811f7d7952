//! Reproduce tarball capture : persists the
//! inputs a link actually read plus enough metadata to replay it, so a failure
//! can be handed back to the core later without the original environment. The
//! packaging *format* beyond a tar stream plus a JSON mapping file is out of
//! scope ; this module only captures and replays that much.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::config::ReproduceMode;

/// Errors capturing or replaying a reproduce tarball can raise. Kept distinct from
/// [`crate::diag::Diag`] the same way [`crate::error::Error`] is: this is an I/O/
/// serialization-boundary error, not a diagnosable link-time condition.
#[derive(thiserror::Error, Debug)]
pub enum ReproduceError {
    /// An I/O error occurred while writing or reading the tar stream
    #[error("an I/O error occurred: {kind}")]
    Io {
        /// The kind of I/O error
        kind: std::io::ErrorKind,
    },
    /// The mapping or response-file manifest failed to serialize/deserialize
    #[error("reproduce manifest (de)serialization failed: {message}")]
    Manifest {
        /// The underlying `serde_json` error message
        message: String,
    },
    /// A captured tarball did not contain the expected manifest entry
    #[error("reproduce tarball is missing {entry:?}")]
    MissingEntry {
        /// The entry name that was expected
        entry: String,
    },
}

impl From<std::io::Error> for ReproduceError {
    fn from(err: std::io::Error) -> Self {
        ReproduceError::Io { kind: err.kind() }
    }
}

impl From<serde_json::Error> for ReproduceError {
    fn from(err: serde_json::Error) -> Self {
        ReproduceError::Manifest { message: err.to_string() }
    }
}

/// One input's recorded identity: its original path and a content hash, so a
/// replay can verify it extracted the same bytes the original link saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    /// The path as given on the original command line
    pub original_path: String,
    /// Hex-encoded sha1 of the input's bytes at capture time
    pub content_hash: String,
}

/// The full persisted state of one link: the response-file-equivalent argument
/// list and every input's path/hash record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayManifest {
    /// Flattened command-line arguments, in order, as they would appear in a
    /// `@response-file` the replay can be driven from
    pub response_file: Vec<String>,
    /// One record per input read during the link
    pub inputs: Vec<InputRecord>,
}

const MANIFEST_ENTRY: &str = "manifest.json";
const INPUT_PREFIX: &str = "inputs/";

fn hex_sha1(bytes: &[u8]) -> String {
    use sha1::Digest as _;
    let mut hasher = sha1::Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether a link that finished with `link_failed` should have its reproduce
/// tarball written, given `mode`.
pub fn should_capture(mode: &ReproduceMode, link_failed: bool) -> bool {
    match mode {
        ReproduceMode::Off => false,
        ReproduceMode::Always => true,
        ReproduceMode::OnFail => link_failed,
    }
}

/// Write a reproduce tarball to `writer`: `manifest.json` (the [`ReplayManifest`])
/// plus one `inputs/<index>-<basename>` entry per input's bytes, named by arrival
/// order so the manifest's path list and the tar entries line up unambiguously
/// even when two inputs share a basename.
pub fn capture(
    response_file: &[String],
    inputs: &[(String, Vec<u8>)],
    writer: impl Write,
) -> Result<(), ReproduceError> {
    let mut builder = tar::Builder::new(writer);

    let records: Vec<InputRecord> = inputs
        .iter()
        .map(|(path, bytes)| InputRecord {
            original_path: path.clone(),
            content_hash: hex_sha1(bytes),
    })
        .collect();
    let manifest = ReplayManifest {
        response_file: response_file.to_vec(),
        inputs: records,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
    append_entry(&mut builder, MANIFEST_ENTRY, &manifest_bytes)?;

    for (index, (path, bytes)) in inputs.iter().enumerate() {
        let basename = path.rsplit('/').next().unwrap_or(path);
        let entry_name = format!("{INPUT_PREFIX}{index}-{basename}");
        append_entry(&mut builder, &entry_name, bytes)?;
    }

    builder.finish()?;
    Ok(())
}

fn append_entry<W: Write>(builder: &mut tar::Builder<W>, name: &str, bytes: &[u8]) -> Result<(), ReproduceError> {
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, bytes)?;
    Ok(())
}

/// Read back a tarball [`capture`] produced: the [`ReplayManifest`] plus every
/// input's raw bytes, keyed by the same `inputs/<index>-<basename>` entry name
/// the manifest's ordering implies.
pub fn replay(reader: impl Read) -> Result<(ReplayManifest, Vec<Vec<u8>>), ReproduceError> {
    let mut archive = tar::Archive::new(reader);
    let mut manifest: Option<ReplayManifest> = None;
    let mut input_bytes: Vec<(usize, Vec<u8>)> = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_string_lossy().into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        if path == MANIFEST_ENTRY {
            manifest = Some(serde_json::from_slice(&bytes)?);
        } else if let Some(rest) = path.strip_prefix(INPUT_PREFIX) {
            let index: usize = rest
                .split('-')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(input_bytes.len());
            input_bytes.push((index, bytes));
        }
    }

    let manifest = manifest.ok_or_else(|| ReproduceError::MissingEntry { entry: MANIFEST_ENTRY.to_string() })?;
    input_bytes.sort_by_key(|(index, _)| *index);
    let ordered = input_bytes.into_iter().map(|(_, bytes)| bytes).collect();
    Ok((manifest, ordered))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn should_capture_matches_mode_semantics() {
        assert!(!should_capture(&ReproduceMode::Off, true));
        assert!(should_capture(&ReproduceMode::Always, false));
        assert!(!should_capture(&ReproduceMode::OnFail, false));
        assert!(should_capture(&ReproduceMode::OnFail, true));
    }

    #[test]
    fn capture_then_replay_roundtrips_inputs_and_manifest() {
        let response_file = vec!["-o".to_string(), "out".to_string(), "a.o".to_string()];
        let inputs = vec![
            ("/src/a.o".to_string(), vec![1u8, 2, 3]),
            ("/src/b.o".to_string(), vec![4u8, 5, 6, 7]),
        ];
        let mut buffer = Vec::new();
        capture(&response_file, &inputs, &mut buffer).unwrap();

        let (manifest, bytes) = replay(Cursor::new(buffer)).unwrap();
        assert_eq!(manifest.response_file, response_file);
        assert_eq!(manifest.inputs.len(), 2);
        assert_eq!(manifest.inputs[0].original_path, "/src/a.o");
        assert_eq!(bytes, vec![vec![1u8, 2, 3], vec![4u8, 5, 6, 7]]);
    }

    #[test]
    fn replay_without_manifest_fails() {
        let mut buffer = Vec::new();
        {
            let mut builder = tar::Builder::new(&mut buffer);
            append_entry(&mut builder, "inputs/0-a.o", &[1, 2, 3]).unwrap();
            builder.finish().unwrap();
        }
        let result = replay(Cursor::new(buffer));
        assert!(matches!(result, Err(ReproduceError::MissingEntry {.. })));
    }

    #[test]
    fn content_hash_is_stable_sha1() {
        let hash = hex_sha1(b"hello world");
        assert_eq!(hash, "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
    }
}
