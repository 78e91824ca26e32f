use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use icu_collator::{
    Collator, CollatorBorrowed,
    options::{CollatorOptions, Strength},
};

use crate::{
    config::ShowConfig,
    foundation::error::{ShowError, ShowResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Ordered, immutable list of playable files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetList {
    kind: MediaKind,
    items: Vec<PathBuf>,
}

impl AssetList {
    pub fn new(kind: MediaKind, items: Vec<PathBuf>) -> Self {
        Self { kind, items }
    }

    pub fn empty(kind: MediaKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.items.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(PathBuf::as_path)
    }
}

/// List files in `dir` whose extension matches one of `extensions` (case-insensitive), sorted by
/// file name with base-letter collation (case and accents ignored).
///
/// An unreadable folder is an error; a readable folder with no matches is an empty list.
#[tracing::instrument(skip(extensions))]
pub fn scan_folder(kind: MediaKind, dir: &Path, extensions: &[String]) -> ShowResult<AssetList> {
    let read_err = |source| ShowError::CatalogRead {
        kind,
        dir: dir.to_path_buf(),
        source,
    };

    let mut named = Vec::<(String, PathBuf)>::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, extensions) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        named.push((name, path));
    }

    let collator = name_collator()?;
    named.sort_by(|(a, _), (b, _)| compare_names(&collator, a, b));
    tracing::debug!(count = named.len(), "scanned {kind} folder");
    Ok(AssetList::new(
        kind,
        named.into_iter().map(|(_, p)| p).collect(),
    ))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Root collation at primary strength: `a`, `A` and `á` weigh the same.
fn name_collator() -> ShowResult<CollatorBorrowed<'static>> {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Primary);
    let collator = Collator::try_new(Default::default(), options)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("load file name collator")?;
    Ok(collator)
}

// Names equal under collation fall back to code points so the order is total.
fn compare_names(collator: &CollatorBorrowed<'_>, a: &str, b: &str) -> Ordering {
    collator.compare(a, b).then_with(|| a.cmp(b))
}

/// Image and audio playlists for one run.
#[derive(Clone, Debug)]
pub struct Catalogs {
    pub images: AssetList,
    pub audio: AssetList,
}

impl Catalogs {
    /// Scan both folders. Image failures are fatal; audio failures only disable audio.
    pub fn scan(config: &ShowConfig) -> ShowResult<Self> {
        let images = scan_folder(MediaKind::Image, &config.image_dir, &config.image_extensions)?;
        if images.is_empty() {
            tracing::error!(dir = %config.image_dir.display(), "no image files found");
            return Err(ShowError::CatalogEmpty {
                kind: MediaKind::Image,
                dir: config.image_dir.clone(),
            });
        }

        let audio = match &config.audio_dir {
            None => AssetList::empty(MediaKind::Audio),
            Some(dir) => match scan_folder(MediaKind::Audio, dir, &config.audio_extensions) {
                Ok(list) if list.is_empty() => {
                    tracing::warn!(
                        dir = %dir.display(),
                        "no audio files found; proceeding without audio"
                    );
                    list
                }
                Ok(list) => list,
                Err(err) => {
                    tracing::warn!("{err}; proceeding without audio");
                    AssetList::empty(MediaKind::Audio)
                }
            },
        };

        tracing::info!(
            images = images.len(),
            audio = audio.len(),
            "catalogs ready"
        );
        Ok(Self { images, audio })
    }
}
