use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use super::SaveTarget;
use super::artifact::SaveAction;
use crate::error::RetrievalError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReceipt {
    pub path: PathBuf,
    pub bytes: u64,
    pub mime: String,
    /// BLAKE3 of the saved bytes, hex.
    pub blake3: String,
}

/// Saves artifacts under a download directory as `<hash>.<ext>`.
#[derive(Clone, Debug)]
pub struct DirSaveTarget {
    dir: PathBuf,
}

impl DirSaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Each call stages into its own temp file next to the destination and
/// renames it into place. The temp file is removed on every failure path
/// when it drops.
fn write_scoped(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut slot = NamedTempFile::new_in(dir)?;
    slot.write_all(bytes)?;
    slot.as_file().sync_all()?;
    let dest = dir.join(file_name);
    slot.persist(&dest).map_err(|e| e.error)?;
    Ok(dest)
}

#[async_trait]
impl SaveTarget for DirSaveTarget {
    async fn save(&self, action: &SaveAction) -> Result<SaveReceipt, RetrievalError> {
        let mime = action.mime()?.to_string();
        let bytes = action.payload()?;
        let dir = self.dir.clone();
        let file_name = action.file_name.clone();
        let digest = blake3::hash(&bytes);
        let len = bytes.len() as u64;

        let path = tokio::task::spawn_blocking(move || write_scoped(&dir, &file_name, &bytes))
            .await
            .map_err(|e| std::io::Error::other(format!("save task: {e}")))??;

        Ok(SaveReceipt {
            path,
            bytes: len,
            mime,
            blake3: hex::encode(digest.as_bytes()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentHash;
    use crate::retrieve::Artifact;

    fn pdf(hash: &str) -> SaveAction {
        Artifact::identify(ContentHash::parse(hash).unwrap(), b"%PDF-1.4\n".to_vec())
            .unwrap()
            .save_action()
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn writes_named_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirSaveTarget::new(dir.path());
        let r = target.save(&pdf("QmA")).await.unwrap();

        assert_eq!(r.path, dir.path().join("QmA.pdf"));
        assert_eq!(r.mime, "application/pdf");
        assert_eq!(r.bytes, 9);
        assert_eq!(r.blake3, blake3::hash(b"%PDF-1.4\n").to_hex().to_string());
        assert_eq!(std::fs::read(&r.path).unwrap(), b"%PDF-1.4\n");
        assert_eq!(leftovers(dir.path()), vec!["QmA.pdf".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_saves_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirSaveTarget::new(dir.path());
        let (qa, qb) = (pdf("QmA"), pdf("QmB"));
        let (a, b) = tokio::join!(target.save(&qa), target.save(&qb));
        assert_eq!(a.unwrap().path, dir.path().join("QmA.pdf"));
        assert_eq!(b.unwrap().path, dir.path().join("QmB.pdf"));
        let mut names = leftovers(dir.path());
        names.sort();
        assert_eq!(names, vec!["QmA.pdf".to_string(), "QmB.pdf".to_string()]);
    }
}
