// Flat directory holding every backup artifact for every dashboard
use crate::domain::backup::{BackupArtifact, BackupEncoding};
use crate::domain::dashboard_id::DashboardId;
use crate::domain::error::BackupError;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct BackupDirectory {
    root: PathBuf,
}

impl BackupDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn path_of(&self, artifact: &BackupArtifact) -> PathBuf {
        self.root.join(artifact.file_name())
    }

    /// Artifacts for `dashboard_id`, newest first; raw before derived on equal timestamps
    pub async fn list(&self, dashboard_id: &DashboardId) -> std::io::Result<Vec<BackupArtifact>> {
        self.ensure().await?;
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut artifacts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(artifact) = BackupArtifact::parse(&name, dashboard_id) {
                artifacts.push(artifact);
            }
        }
        artifacts.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| encoding_rank(a.encoding).cmp(&encoding_rank(b.encoding)))
        });
        Ok(artifacts)
    }

    /// Write a new artifact. Fails with `AlreadyExists` rather than overwriting.
    pub async fn create(&self, artifact: &BackupArtifact, contents: &[u8]) -> std::io::Result<PathBuf> {
        self.ensure().await?;
        let path = self.path_of(artifact);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(path)
    }

    pub async fn remove(&self, artifact: &BackupArtifact) -> std::io::Result<()> {
        tokio::fs::remove_file(self.path_of(artifact)).await
    }

    /// Resolve a caller-supplied artifact name to an existing file in this directory
    pub async fn resolve_named(&self, file_name: &str) -> Result<(PathBuf, BackupEncoding), BackupError> {
        let mut components = Path::new(file_name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain {
            return Err(BackupError::InputInvalid(format!(
                "backup file '{}' must be a plain file name",
                file_name
            )));
        }

        let encoding = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(BackupEncoding::from_extension)
            .ok_or_else(|| {
                BackupError::InputInvalid(format!(
                    "backup file '{}' is neither .json nor .yaml",
                    file_name
                ))
            })?;

        let path = self.root.join(file_name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(BackupError::BackupNotFound(file_name.to_string()));
        }
        Ok((path, encoding))
    }
}

fn encoding_rank(encoding: BackupEncoding) -> u8 {
    match encoding {
        BackupEncoding::Raw => 0,
        BackupEncoding::Derived => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_file;
    use chrono::NaiveDate;

    fn id(raw: &str) -> DashboardId {
        DashboardId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "dashboard_home_20240101_000000.yaml",
            "dashboard_home_20240102_000000.json",
            "dashboard_home_20240102_000000.yaml",
            "dashboard_home_office_20240105_000000.json",
            "dashboard_home_notes.txt",
            "dashboard_home_20240103_000000.json.bak",
        ] {
            write_file(dir.path(), name, b"{}");
        }
        let backups = BackupDirectory::new(dir.path());

        let names: Vec<String> = backups
            .list(&id("home"))
            .await
            .unwrap()
            .iter()
            .map(BackupArtifact::file_name)
            .collect();
        assert_eq!(
            names,
            [
                "dashboard_home_20240102_000000.json",
                "dashboard_home_20240102_000000.yaml",
                "dashboard_home_20240101_000000.yaml",
            ]
        );
    }

    #[tokio::test]
    async fn test_list_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backups = BackupDirectory::new(dir.path().join("dashboard_backups"));
        assert!(backups.list(&id("lovelace")).await.unwrap().is_empty());
        assert!(backups.root().is_dir());
    }

    #[tokio::test]
    async fn test_create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let backups = BackupDirectory::new(dir.path());
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let artifact = BackupArtifact::new(id("lovelace"), timestamp, BackupEncoding::Raw);

        backups.create(&artifact, b"first").await.unwrap();
        let err = backups.create(&artifact, b"second").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(backups.path_of(&artifact)).unwrap(), b"first".to_vec());
    }

    #[tokio::test]
    async fn test_resolve_named() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "dashboard_lovelace_20240101_000000.yaml", b"views: []");
        let backups = BackupDirectory::new(dir.path());

        let (path, encoding) = backups
            .resolve_named("dashboard_lovelace_20240101_000000.yaml")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("dashboard_lovelace_20240101_000000.yaml"));
        assert_eq!(encoding, BackupEncoding::Derived);

        assert!(matches!(
            backups.resolve_named("dashboard_lovelace_20240102_000000.json").await,
            Err(BackupError::BackupNotFound(_))
        ));
        assert!(matches!(
            backups.resolve_named("../.storage/lovelace.json").await,
            Err(BackupError::InputInvalid(_))
        ));
        assert!(matches!(
            backups.resolve_named("notes.txt").await,
            Err(BackupError::InputInvalid(_))
        ));
    }
}
