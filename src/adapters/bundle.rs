//! Model bundle loader: reads the classifier and feature manifest from disk.
//!
//! A model directory contains:
//!
//! - `model.json`: random forest export (see `adapters::forest`)
//! - `feature_names.json`: ordered feature identifiers
//! - `bundle_manifest.json` + `bundle.sig` (optional): SHA-256 digests of the
//!   two files above, signed with Ed25519
//!
//! # Security
//!
//! - When a bundle is signed, the signature must verify against the
//!   configured key and both files must be bound by the manifest.
//! - Each file is read once; the bytes that are hashed are the bytes that
//!   are parsed.
//! - Unsigned bundles load only when the loader explicitly allows it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::forest::RandomForestClassifier;
use crate::domain::FeatureManifest;

pub const MODEL_FILE: &str = "model.json";
pub const FEATURES_FILE: &str = "feature_names.json";
pub const BUNDLE_MANIFEST_FILE: &str = "bundle_manifest.json";
pub const SIGNATURE_FILE: &str = "bundle.sig";

/// Errors raised while loading or verifying a model bundle.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Required file not found: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model format: {0}")]
    Format(String),

    #[error("Model bundle is not signed and unsigned bundles are not allowed")]
    Unsigned,

    #[error("Invalid bundle signature")]
    BadSignature,

    #[error("Integrity check failed for {0}")]
    DigestMismatch(String),

    #[error("Invalid verifying key: {0}")]
    Key(String),
}

/// Signed description of the files in a model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub version: u32,
    /// Unix timestamp (seconds) when the bundle was signed.
    pub created_at: i64,
    /// File name → lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

/// Classifier and manifest as read from disk.
#[derive(Debug)]
pub struct ModelBundle {
    pub classifier: RandomForestClassifier,
    pub manifest: FeatureManifest,
    /// Whether the bundle's signature was verified.
    pub verified: bool,
}

/// Loads model bundles under a fixed verification policy.
#[derive(Debug, Clone, Default)]
pub struct BundleLoader {
    verifying_key: Option<VerifyingKey>,
    allow_unsigned: bool,
}

impl BundleLoader {
    #[must_use]
    pub fn new(verifying_key: Option<VerifyingKey>, allow_unsigned: bool) -> Self {
        Self {
            verifying_key,
            allow_unsigned,
        }
    }

    /// Load and verify the bundle in `dir`.
    ///
    /// # Errors
    /// Returns `CardiorenalError::Artifact` for missing, unreadable, unsigned
    /// or tampered files, and `CardiorenalError::ManifestMismatch` if the
    /// feature manifest is not a permutation of the nine form features.
    pub fn load(&self, dir: &Path) -> crate::Result<ModelBundle> {
        let model_bytes = read_required(&dir.join(MODEL_FILE))?;
        let features_bytes = read_required(&dir.join(FEATURES_FILE))?;

        let verified = self.verify(
            dir,
            &[
                (MODEL_FILE, model_bytes.as_slice()),
                (FEATURES_FILE, features_bytes.as_slice()),
            ],
        )?;

        let classifier = RandomForestClassifier::from_json_slice(&model_bytes)?;
        let names: Vec<String> = serde_json::from_slice(&features_bytes).map_err(|e| {
            ArtifactError::Format(format!("{FEATURES_FILE} must be a JSON array of strings: {e}"))
        })?;
        let manifest = FeatureManifest::from_names(&names)?;

        tracing::info!(
            "Loaded model bundle from {:?} (verified={}, n_trees={})",
            dir,
            verified,
            classifier.n_trees()
        );

        Ok(ModelBundle {
            classifier,
            manifest,
            verified,
        })
    }

    /// Returns whether a signature was checked. Fails closed on anything
    /// other than a valid signature or an explicitly allowed unsigned bundle.
    fn verify(&self, dir: &Path, files: &[(&str, &[u8])]) -> Result<bool, ArtifactError> {
        let sig_path = dir.join(SIGNATURE_FILE);
        let manifest_path = dir.join(BUNDLE_MANIFEST_FILE);

        if !sig_path.exists() || !manifest_path.exists() {
            if self.allow_unsigned {
                tracing::warn!("Loading UNSIGNED model bundle from {:?}", dir);
                return Ok(false);
            }
            tracing::error!("Model bundle signature not found at {:?}", sig_path);
            return Err(ArtifactError::Unsigned);
        }

        let key = self
            .verifying_key
            .ok_or_else(|| ArtifactError::Key("bundle is signed but no verifying key is configured".into()))?;

        let sig_bytes = read_required(&sig_path)?;
        let sig_array: [u8; 64] = sig_bytes
            .as_slice()
            .try_into()
            .map_err(|_| ArtifactError::Format("Invalid signature length (expected 64 bytes)".into()))?;
        let signature = Signature::from_bytes(&sig_array);

        let manifest_bytes = read_required(&manifest_path)?;
        key.verify(&manifest_bytes, &signature)
            .map_err(|_| ArtifactError::BadSignature)?;

        let manifest: BundleManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| ArtifactError::Format(format!("invalid {BUNDLE_MANIFEST_FILE}: {e}")))?;
        if manifest.version != 1 {
            return Err(ArtifactError::Format(format!(
                "Unsupported bundle manifest version: {}",
                manifest.version
            )));
        }

        for (name, bytes) in files {
            let expected = manifest
                .files
                .get(*name)
                .ok_or_else(|| ArtifactError::DigestMismatch(format!("{name} (not bound by manifest)")))?;
            if !constant_time_eq_str(&sha256_hex(bytes), expected) {
                return Err(ArtifactError::DigestMismatch((*name).to_string()));
            }
        }

        tracing::info!("Model bundle signature and digests verified");
        Ok(true)
    }
}

/// Sign the bundle in `dir`: hash `model.json` and `feature_names.json`,
/// write `bundle_manifest.json` (pretty-printed) and its signature.
///
/// # Errors
/// Returns `ArtifactError` if a bundle file is missing or a write fails.
pub fn sign_bundle(
    dir: &Path,
    key: &SigningKey,
    created_at: i64,
) -> Result<BundleManifest, ArtifactError> {
    let mut files = BTreeMap::new();
    for name in [MODEL_FILE, FEATURES_FILE] {
        let bytes = read_required(&dir.join(name))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }

    let manifest = BundleManifest {
        version: 1,
        created_at,
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| ArtifactError::Format(format!("cannot serialize {BUNDLE_MANIFEST_FILE}: {e}")))?;
    write_file(&dir.join(BUNDLE_MANIFEST_FILE), &manifest_bytes)?;

    let sig: Signature = key.sign(&manifest_bytes);
    write_file(&dir.join(SIGNATURE_FILE), &sig.to_bytes())?;

    Ok(manifest)
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ArtifactError::Key` for bad base64, wrong length or an invalid point.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::Key("invalid base64".into()))?;
    let array: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ArtifactError::Key("expected 32 bytes".into()))?;
    VerifyingKey::from_bytes(&array).map_err(|_| ArtifactError::Key("not a valid Ed25519 key".into()))
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

fn read_required(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    fs::write(path, bytes).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// Constant-time compare for ASCII digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::adapters::forest::tests::sample_export;
    use crate::domain::FeatureId;
    use crate::CardiorenalError;
    use rand::rngs::OsRng;
    use tempfile::tempdir;

    /// Write an unsigned bundle with the sample forest and form-order manifest.
    pub(crate) fn write_unsigned_bundle(dir: &Path) {
        let model = serde_json::to_vec(&sample_export()).expect("serialize model");
        fs::write(dir.join(MODEL_FILE), model).expect("write model");
        let names: Vec<&str> = FeatureId::ALL.iter().map(|id| id.as_str()).collect();
        fs::write(dir.join(FEATURES_FILE), serde_json::to_vec(&names).expect("names"))
            .expect("write names");
    }

    /// Sign a manifest that binds only `bound`.
    fn sign_partial(dir: &Path, key: &SigningKey, bound: &[&str]) {
        let mut files = BTreeMap::new();
        for name in bound {
            let bytes = fs::read(dir.join(name)).expect("read bound file");
            files.insert((*name).to_string(), sha256_hex(&bytes));
        }
        let manifest = BundleManifest {
            version: 1,
            created_at: 1_700_000_000,
            files,
        };
        let bytes = serde_json::to_vec(&manifest).expect("serialize manifest");
        fs::write(dir.join(BUNDLE_MANIFEST_FILE), &bytes).expect("write manifest");
        let sig: Signature = key.sign(&bytes);
        fs::write(dir.join(SIGNATURE_FILE), sig.to_bytes()).expect("write sig");
    }

    #[test]
    fn test_signed_bundle_loads() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        let key = SigningKey::generate(&mut OsRng);
        sign_bundle(temp.path(), &key, 1_700_000_000).expect("sign");

        let loader = BundleLoader::new(Some(key.verifying_key()), false);
        let bundle = loader.load(temp.path()).expect("load signed bundle");
        assert!(bundle.verified);
        assert_eq!(bundle.manifest.len(), 9);
    }

    #[test]
    fn test_signer_output_is_what_loader_verifies() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        let key = SigningKey::generate(&mut OsRng);
        let manifest = sign_bundle(temp.path(), &key, 1_700_000_000).expect("sign");

        assert_eq!(manifest.files.len(), 2);
        let on_disk = fs::read(temp.path().join(BUNDLE_MANIFEST_FILE)).expect("read manifest");
        assert_eq!(on_disk, serde_json::to_vec_pretty(&manifest).expect("json"));
        assert_eq!(
            manifest.files[MODEL_FILE],
            sha256_hex(&fs::read(temp.path().join(MODEL_FILE)).expect("read model"))
        );

        let loader = BundleLoader::new(Some(key.verifying_key()), false);
        assert!(loader.load(temp.path()).expect("load").verified);
    }

    #[test]
    fn test_signing_requires_bundle_files() {
        let temp = tempdir().expect("tempdir");
        let key = SigningKey::generate(&mut OsRng);
        assert!(matches!(
            sign_bundle(temp.path(), &key, 0),
            Err(ArtifactError::Missing(_))
        ));
    }

    #[test]
    fn test_unsigned_bundle_requires_opt_in() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());

        let strict = BundleLoader::new(None, false);
        assert!(matches!(
            strict.load(temp.path()),
            Err(CardiorenalError::Artifact(ArtifactError::Unsigned))
        ));

        let lenient = BundleLoader::new(None, true);
        let bundle = lenient.load(temp.path()).expect("load unsigned bundle");
        assert!(!bundle.verified);
    }

    #[test]
    fn test_tampered_model_is_rejected() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        let key = SigningKey::generate(&mut OsRng);
        sign_bundle(temp.path(), &key, 1_700_000_000).expect("sign");

        let mut export = sample_export();
        export.trees.truncate(1);
        fs::write(
            temp.path().join(MODEL_FILE),
            serde_json::to_vec(&export).expect("serialize"),
        )
        .expect("overwrite model");

        let loader = BundleLoader::new(Some(key.verifying_key()), false);
        let err = loader.load(temp.path()).expect_err("must fail");
        assert!(err.to_string().contains(MODEL_FILE));
    }

    #[test]
    fn test_manifest_must_bind_feature_names() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        let key = SigningKey::generate(&mut OsRng);
        sign_partial(temp.path(), &key, &[MODEL_FILE]);

        let loader = BundleLoader::new(Some(key.verifying_key()), true);
        let err = loader.load(temp.path()).expect_err("must fail");
        assert!(matches!(
            err,
            CardiorenalError::Artifact(ArtifactError::DigestMismatch(ref f)) if f.contains(FEATURES_FILE)
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        let key = SigningKey::generate(&mut OsRng);
        sign_bundle(temp.path(), &key, 1_700_000_000).expect("sign");

        let other = SigningKey::generate(&mut OsRng);
        let loader = BundleLoader::new(Some(other.verifying_key()), false);
        assert!(matches!(
            loader.load(temp.path()),
            Err(CardiorenalError::Artifact(ArtifactError::BadSignature))
        ));
    }

    #[test]
    fn test_bad_feature_manifest_is_manifest_mismatch() {
        let temp = tempdir().expect("tempdir");
        write_unsigned_bundle(temp.path());
        fs::write(temp.path().join(FEATURES_FILE), br#"["hibpe","dyslipe"]"#).expect("write");

        let loader = BundleLoader::new(None, true);
        assert!(matches!(
            loader.load(temp.path()),
            Err(CardiorenalError::ManifestMismatch(_))
        ));
    }

    #[test]
    fn test_missing_model_file() {
        let temp = tempdir().expect("tempdir");
        let loader = BundleLoader::new(None, true);
        assert!(matches!(
            loader.load(temp.path()),
            Err(CardiorenalError::Artifact(ArtifactError::Missing(_)))
        ));
    }

    #[test]
    fn test_verifying_key_from_b64() {
        let key = SigningKey::generate(&mut OsRng);
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.verifying_key().to_bytes());
        assert_eq!(
            verifying_key_from_b64(&b64).expect("decode"),
            key.verifying_key()
        );
        assert!(verifying_key_from_b64("AAAA").is_err());
    }
}
