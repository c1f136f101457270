use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ArtifactPath;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{} is not a writable folder", .0.display())]
    NotADirectory(PathBuf),
    #[error("copying plot to {}", .dest.display())]
    Copy {
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copy a generated plot into `dest_dir`, keeping its file name. An existing
/// file of the same name is overwritten.
pub fn export_artifact(artifact: &ArtifactPath, dest_dir: &Path) -> Result<PathBuf, ExportError> {
    if !dest_dir.is_dir() {
        return Err(ExportError::NotADirectory(dest_dir.to_path_buf()));
    }
    let file_name = artifact
        .as_path()
        .file_name()
        .ok_or_else(|| ExportError::NotADirectory(dest_dir.to_path_buf()))?;
    let dest = dest_dir.join(file_name);

    std::fs::copy(artifact.as_path(), &dest).map_err(|source| ExportError::Copy {
        dest: dest.clone(),
        source,
    })?;
    log::info!("Exported {} to {}", artifact.as_path().display(), dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisType;

    #[test]
    fn copies_into_destination_folder() {
        let out = tempfile::tempdir().unwrap();
        let desk = tempfile::tempdir().unwrap();
        let artifact = ArtifactPath::for_analysis(out.path(), AnalysisType::FastestLap, "png");
        std::fs::write(artifact.as_path(), b"png bytes").unwrap();

        let dest = export_artifact(&artifact, desk.path()).unwrap();
        assert_eq!(dest, desk.path().join("Fastest Lap.png"));
        assert_eq!(std::fs::read(dest).unwrap(), b"png bytes");
    }

    #[test]
    fn missing_destination_fails() {
        let out = tempfile::tempdir().unwrap();
        let artifact = ArtifactPath::for_analysis(out.path(), AnalysisType::LapTime, "png");
        std::fs::write(artifact.as_path(), b"x").unwrap();

        let err = export_artifact(&artifact, &out.path().join("missing")).unwrap_err();
        assert!(matches!(err, ExportError::NotADirectory(_)));
    }

    #[test]
    fn missing_artifact_fails() {
        let out = tempfile::tempdir().unwrap();
        let artifact = ArtifactPath::for_analysis(out.path(), AnalysisType::LapTime, "png");
        let err = export_artifact(&artifact, out.path()).unwrap_err();
        assert!(matches!(err, ExportError::Copy { .. }));
    }
}
