use std::path::{Path, PathBuf};

/// One exam version on disk: `<field>/<year>/<version>/` with the subject
/// and rubric PDFs inside.
#[derive(Debug, Clone)]
pub struct VersionUnit {
    pub year: String,
    pub version: String,
    pub path: PathBuf,
}

impl VersionUnit {
    pub fn subiect_path(&self) -> PathBuf {
        self.path.join("subiect.pdf")
    }

    pub fn barem_path(&self) -> PathBuf {
        self.path.join("barem.pdf")
    }

    /// Per-unit cache of the parsed exam, next to the PDFs. Its existence
    /// short-circuits re-parsing on later runs.
    pub fn cache_path(&self) -> PathBuf {
        self.path.join("result.json")
    }
}

/// The discovered layout of one field directory.
#[derive(Debug, Default)]
pub struct FieldTree {
    /// Every year directory, including years whose units all fail later;
    /// the aggregate keeps the year key either way.
    pub years: Vec<String>,
    pub units: Vec<VersionUnit>,
}

fn sorted_subdirs(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(path)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Walk `<field>/<year>/<version>` two levels deep. Directory names sort
/// lexicographically, which fixes both discovery order and the key order of
/// the consolidated output.
pub fn discover(field_path: &Path) -> std::io::Result<FieldTree> {
    let mut tree = FieldTree::default();

    for year_path in sorted_subdirs(field_path)? {
        let year = year_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tree.years.push(year.clone());

        for version_path in sorted_subdirs(&year_path)? {
            let version = version_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tree.units.push(VersionUnit {
                year: year.clone(),
                version,
                path: version_path,
            });
        }
    }

    Ok(tree)
}
