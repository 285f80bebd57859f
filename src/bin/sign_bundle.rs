//! Model bundle signing utility.
//!
//! Two subcommands:
//!
//! - `keygen` writes a fresh Ed25519 seed (base64, 0600) and optionally the
//!   base64 public key that `CARDIORENAL_MODEL_PUBKEY_B64` expects.
//! - `sign` runs `adapters::bundle::sign_bundle` on a model directory,
//!   writing `bundle_manifest.json` and `bundle.sig`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_bundle -- keygen --out-seed <path> [--out-pub <path>] [--force]
//! cargo run --bin sign_bundle -- sign <model_dir>
//! ```
//!
//! # Security
//!
//! - Seeds come from OS entropy and are zeroized after use
//! - The signing seed is read from a file or Docker secret; the plain env var
//!   is accepted in debug builds only

use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cardiorenal::adapters::bundle::{sign_bundle, BUNDLE_MANIFEST_FILE, SIGNATURE_FILE};

const USAGE: &str = "Usage:\n  sign_bundle keygen --out-seed <path> [--out-pub <path>] [--force]\n  sign_bundle sign <model_dir>";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn read_signing_seed_b64() -> Result<Zeroizing<String>, String> {
    const KEY_FILE_ENV: &str = "CARDIORENAL_BUNDLE_SIGNING_KEY_B64_FILE";
    const DOCKER_SECRET_PATH: &str = "/run/secrets/cardiorenal_bundle_signing_key_b64";

    let from_file = |path: &str| -> Result<Zeroizing<String>, String> {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim())
                .map_err(|e| format!("Failed reading signing key file: {e}"))?,
        );
        let secret = content.trim_end_matches(['\n', '\r']).to_string();
        if secret.is_empty() {
            return Err("Empty signing key".to_string());
        }
        Ok(Zeroizing::new(secret))
    };

    if let Ok(path) = env::var(KEY_FILE_ENV) {
        return from_file(&path);
    }

    if Path::new(DOCKER_SECRET_PATH).exists() {
        return from_file(DOCKER_SECRET_PATH);
    }

    // Dev-only fallback for convenience.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var("CARDIORENAL_BUNDLE_SIGNING_KEY_B64") {
            let secret = v.trim_end_matches(['\n', '\r']).to_string();
            if secret.is_empty() {
                return Err("Empty signing key".to_string());
            }
            return Ok(Zeroizing::new(secret));
        }
    }

    Err(format!(
        "Missing signing key. Provide {KEY_FILE_ENV} or {DOCKER_SECRET_PATH} (env var fallback only in debug builds)."
    ))
}

fn read_signing_seed() -> Result<Seed, String> {
    let v = read_signing_seed_b64()?;

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(v.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );

    if raw.len() != 32 {
        return Err(format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        ));
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn write_secret_file(path: &Path, contents: &str, mode: u32, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "Refusing to overwrite existing file {path:?}. Use --force."
        ));
    }
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| format!("Failed to write {path:?}: {e}"))
}

fn keygen(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    let mut out_seed: Option<PathBuf> = None;
    let mut out_pub: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-seed" => out_seed = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "--out-pub" => out_pub = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "--force" => force = true,
            _ => return Err(format!("Unknown arg: {arg}\n{USAGE}")),
        }
    }
    let out_seed = out_seed.ok_or(USAGE)?;

    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);

    let signing_key = SigningKey::from_bytes(&seed.0);
    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));

    write_secret_file(&out_seed, &seed_b64, 0o600, force)?;
    println!("Wrote signing seed (base64) to {out_seed:?}");

    if let Some(pub_path) = &out_pub {
        // Public key is non-secret; allow read access.
        write_secret_file(pub_path, &pub_b64, 0o644, force)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }

    // Print only non-secret material.
    println!("CARDIORENAL_MODEL_PUBKEY_B64={pub_b64}");
    Ok(())
}

fn sign(mut args: impl Iterator<Item = String>) -> Result<(), String> {
    let model_dir = PathBuf::from(args.next().ok_or(USAGE)?);
    if args.next().is_some() {
        return Err(USAGE.to_string());
    }

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);

    let manifest = sign_bundle(&model_dir, &signing_key, chrono::Utc::now().timestamp())
        .map_err(|e| e.to_string())?;

    println!(
        "Signed manifest: {:?} ({} files)",
        model_dir.join(BUNDLE_MANIFEST_FILE),
        manifest.files.len()
    );
    println!("Wrote signature: {:?}", model_dir.join(SIGNATURE_FILE));
    println!(
        "CARDIORENAL_MODEL_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn main() -> Result<(), String> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("keygen") => keygen(args),
        Some("sign") => sign(args),
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => Err(USAGE.to_string()),
    }
}
