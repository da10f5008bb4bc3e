//! Incremental build hashing
//!
//! A translation unit is current when the SHA-256 of its argument vector,
//! source bytes, and every existing header dependency matches the hash
//! stored in its sidecar file. Files are streamed through the hasher one
//! at a time; missing dependencies are skipped rather than failing.

use std::io::Read;
use std::path::Path;

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Length of the archive-name digest
const ARCHIVE_DIGEST_LEN: usize = 12;

/// Hash of one translation unit: `args ∥ sourceBytes ∥ headerDepBytes`
///
/// Dependencies that do not currently exist are skipped. Returns lowercase
/// hex.
pub fn unit_hash(
    args: &[String],
    source: &Path,
    deps: &[std::path::PathBuf],
) -> Result<String, FilesystemError> {
    let mut hasher = Sha256::new();
    hasher.update(args.join(" ").as_bytes());

    stream_file(&mut hasher, source).map_err(|e| FilesystemError::ReadFile {
        path: source.to_path_buf(),
        error: e.to_string(),
    })?;

    for dep in deps {
        match stream_file(&mut hasher, dep) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(FilesystemError::ReadFile {
                    path: dep.clone(),
                    error: e.to_string(),
                })
            }
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash of raw content bytes, lowercase hex
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Short path digest used for archive names
///
/// URL-safe base64 of the SHA-256 of the path string, truncated to 12
/// characters. Stable across runs for the same directory; per-module
/// object directories are unique, which keeps archive names distinct.
pub fn short_path_digest(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.display().to_string().as_bytes());
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize());
    encoded[..ARCHIVE_DIGEST_LEN].to_string()
}

/// Read a stored sidecar hash, if present
pub fn read_sidecar(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Write a sidecar hash
///
/// Callers write the object file first and the sidecar second, so an
/// interrupted build leaves the cache stale rather than falsely fresh.
pub fn write_sidecar(path: &Path, hash: &str) -> Result<(), FilesystemError> {
    filesystem::write_file(path, hash.as_bytes())
}

fn stream_file(hasher: &mut Sha256, path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::File::open(path)?;
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..read]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_unit_hash_deterministic() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = write_temp(&dir, "a.c", b"int main(void) { return 0; }");
        let header = write_temp(&dir, "a.h", b"#define A 1");
        let args = vec!["-I".to_string(), "inc".to_string()];

        let h1 = unit_hash(&args, &source, &[header.clone()]).unwrap();
        let h2 = unit_hash(&args, &source, &[header]).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_unit_hash_changes_with_each_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = write_temp(&dir, "a.c", b"int x;");
        let header = write_temp(&dir, "a.h", b"#define A 1");
        let args = vec!["-DX".to_string()];

        let base = unit_hash(&args, &source, &[header.clone()]).unwrap();

        // Argument change
        let h = unit_hash(&["-DY".to_string()], &source, &[header.clone()]).unwrap();
        assert_ne!(base, h);

        // Source change
        std::fs::write(&source, b"int y;").unwrap();
        let h = unit_hash(&args, &source, &[header.clone()]).unwrap();
        assert_ne!(base, h);
        std::fs::write(&source, b"int x;").unwrap();

        // Header change
        std::fs::write(&header, b"#define A 2").unwrap();
        let h = unit_hash(&args, &source, &[header]).unwrap();
        assert_ne!(base, h);
    }

    #[test]
    fn test_unit_hash_skips_missing_dependencies() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = write_temp(&dir, "a.c", b"int x;");
        let missing = dir.path().join("gone.h");

        let with_missing = unit_hash(&[], &source, &[missing]).unwrap();
        let without = unit_hash(&[], &source, &[]).unwrap();
        assert_eq!(with_missing, without);
    }

    #[test]
    fn test_short_path_digest_stable_and_distinct() {
        let a = short_path_digest(Path::new("/proj/.yaje/x/obj/@yaje/fs"));
        let b = short_path_digest(Path::new("/proj/.yaje/x/obj/@yaje/fs"));
        let c = short_path_digest(Path::new("/proj/.yaje/x/obj/@yaje/net"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(!a.contains('/'));
        assert!(!a.contains('+'));
    }

    #[test]
    fn test_sidecar_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let sidecar = dir.path().join("cache/mod/a.hash");

        assert!(read_sidecar(&sidecar).is_none());
        write_sidecar(&sidecar, "abc123").unwrap();
        assert_eq!(read_sidecar(&sidecar).as_deref(), Some("abc123"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(crate::config::defaults::MIN_PROPTEST_ITERATIONS))]

        /// Any single-byte flip of the source changes the hash
        #[test]
        fn prop_source_byte_flip_changes_hash(
            content in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<proptest::sample::Index>(),
        ) {
            let dir = tempfile::TempDir::new().unwrap();
            let source = dir.path().join("unit.c");
            std::fs::write(&source, &content).unwrap();
            let before = unit_hash(&[], &source, &[]).unwrap();

            let mut mutated = content.clone();
            let i = index.index(mutated.len());
            mutated[i] = mutated[i].wrapping_add(1);
            std::fs::write(&source, &mutated).unwrap();
            let after = unit_hash(&[], &source, &[]).unwrap();

            prop_assert_ne!(before, after);
        }
    }
}
