//! Training data assembly.
//!
//! Every enrolled person is stored as one `.npy` file holding a `(n, D)` array of `u8` samples
//! (see [`crate::sample::FaceSample::pixels`]). [`Gallery::load`] reads all of them and turns them
//! into one labeled [`TrainingMatrix`] plus the [`Names`] of the persons it contains.

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use ndarray::{concatenate, s, Array2, ArrayView1, Axis};

use crate::{Error, Result};

/// Index of a person in a [`Gallery`], assigned in discovery order starting at 0.
pub type PersonId = u32;

/// File extension of per-person sample files.
pub const SAMPLE_FILE_EXTENSION: &str = "npy";

/// Labeled training rows.
///
/// Stored as an `(N, D + 1)` matrix: every row holds a flattened sample followed by the
/// [`PersonId`] it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingMatrix {
    data: Array2<f32>,
}

impl TrainingMatrix {
    /// Wraps an `(N, D + 1)` matrix whose last column holds the labels.
    ///
    /// # Panics
    ///
    /// Panics if `data` has no columns.
    pub fn from_matrix(data: Array2<f32>) -> Self {
        assert!(data.ncols() > 0, "training matrix needs a label column");
        Self { data }
    }

    /// Builds a matrix from unlabeled features and one label per row.
    ///
    /// # Panics
    ///
    /// Panics if `labels` does not have one entry per row of `features`.
    pub fn from_parts(features: Array2<f32>, labels: &[PersonId]) -> Self {
        assert_eq!(features.nrows(), labels.len(), "one label per row required");
        let labels = labels
            .iter()
            .map(|&id| id as f32)
            .collect::<ndarray::Array1<f32>>()
            .insert_axis(Axis(1));
        let data = concatenate(Axis(1), &[features.view(), labels.view()])
            .expect("row counts were checked");
        Self { data }
    }

    /// Returns the `(N, D + 1)` shape.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Returns the number of training rows `N`.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    /// Returns the feature dimension `D` (all columns except the label).
    pub fn feature_dim(&self) -> usize {
        self.data.ncols() - 1
    }

    /// Returns the feature prefix of row `row`.
    pub fn features(&self, row: usize) -> ArrayView1<'_, f32> {
        self.data.slice(s![row, ..-1])
    }

    pub fn label(&self, row: usize) -> PersonId {
        self.data[[row, self.feature_dim()]] as PersonId
    }

    /// Iterates over `(features, label)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrayView1<'_, f32>, PersonId)> + '_ {
        (0..self.rows()).map(|row| (self.features(row), self.label(row)))
    }
}

/// The display names of the persons in a [`Gallery`], indexed by [`PersonId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Names(Vec<String>);

impl Names {
    pub fn get(&self, id: PersonId) -> Option<&str> {
        self.0.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(id, name)` pairs in ascending [`PersonId`] order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, &str)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(id, name)| (id as PersonId, name.as_str()))
    }
}

/// Concatenates per-person sample sets into a [`TrainingMatrix`].
///
/// [`PersonId`]s are assigned in iteration order, so callers that need a stable mapping must pass
/// the sets in a deterministic order ([`load_sample_sets`] sorts by file name).
///
/// Every set must have `expected_dim` values per sample. Without an expected dimension, the first
/// non-empty set determines it. Empty sets and sets of a different dimension are skipped with a
/// warning. Fails with [`Error::NoTrainingData`] if no set is left.
pub fn assemble<I, S>(sets: I, expected_dim: Option<usize>) -> Result<(TrainingMatrix, Names)>
where
    I: IntoIterator<Item = (S, Array2<u8>)>,
    S: Into<String>,
{
    let mut names = Vec::new();
    let mut parts = Vec::new();
    let mut dim = expected_dim;

    for (name, samples) in sets {
        let name = name.into();
        if samples.is_empty() {
            log::warn!("skipping '{name}': no samples");
            continue;
        }

        let expected = *dim.get_or_insert(samples.ncols());
        if samples.ncols() != expected {
            log::warn!(
                "skipping '{name}': samples have {} values, expected {expected}",
                samples.ncols(),
            );
            continue;
        }

        let id = names.len() as PersonId;
        log::debug!("person {id} = '{name}' ({} samples)", samples.nrows());

        let mut labeled = Array2::<f32>::from_elem((samples.nrows(), expected + 1), id as f32);
        labeled
            .slice_mut(s![.., ..expected])
            .assign(&samples.mapv(f32::from));
        parts.push(labeled);
        names.push(name);
    }

    if parts.is_empty() {
        return Err(Error::NoTrainingData);
    }

    let views = parts.iter().map(|part| part.view()).collect::<Vec<_>>();
    let data = concatenate(Axis(0), &views).expect("all parts share the same column count");
    Ok((TrainingMatrix { data }, Names(names)))
}

/// Reads every per-person sample file in `dir`.
///
/// Files are returned sorted by file name; the person name is the file stem. Files that fail to
/// load are skipped with a warning.
pub fn load_sample_sets(dir: &Path) -> Result<Vec<(String, Array2<u8>)>> {
    if !dir.is_dir() {
        return Err(Error::DatasetDirMissing(dir.to_path_buf()));
    }

    let paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|path| {
            path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(SAMPLE_FILE_EXTENSION)
        })
        .sorted_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut sets = Vec::new();
    for path in paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            log::warn!("skipping '{}': file name is not valid UTF-8", path.display());
            continue;
        };

        match ndarray_npy::read_npy::<_, Array2<u8>>(&path) {
            Ok(samples) => {
                log::info!("loaded '{}': {} samples", path.display(), samples.nrows());
                sets.push((name.to_string(), samples));
            }
            Err(e) => log::warn!("failed to load '{}': {}", path.display(), e),
        }
    }

    Ok(sets)
}

/// Writes the samples of one person to `<dir>/<name>.npy`, returning the path written.
pub fn save_sample_set(dir: &Path, name: &str, samples: &Array2<u8>) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{SAMPLE_FILE_EXTENSION}"));
    ndarray_npy::write_npy(&path, samples)?;
    Ok(path)
}

/// The training data of one recognition session.
///
/// Built once, then only read.
#[derive(Debug, Clone)]
pub struct Gallery {
    matrix: TrainingMatrix,
    names: Names,
}

impl Gallery {
    /// Loads and assembles all sample files in `dir`.
    ///
    /// Files whose samples are not `expected_dim` values wide are skipped (see [`assemble`]).
    pub fn load(dir: &Path, expected_dim: Option<usize>) -> Result<Self> {
        Self::from_sets(load_sample_sets(dir)?, expected_dim)
    }

    pub fn from_sets<I, S>(sets: I, expected_dim: Option<usize>) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Array2<u8>)>,
        S: Into<String>,
    {
        let (matrix, names) = assemble(sets, expected_dim)?;
        Ok(Self { matrix, names })
    }

    pub fn matrix(&self) -> &TrainingMatrix {
        &self.matrix
    }

    pub fn names(&self) -> &Names {
        &self.names
    }
}
