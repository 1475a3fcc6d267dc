use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{Model, ModelBuilder, SolverOptions};
use crate::error::BuildError;
use crate::record::InitialConditions;

/// File name of the archived model for `window`.
pub fn instance_file_name(model_name: &str, window: usize) -> String {
    format!("{model_name}_{window}.mps")
}

/// Directory name used when exporting window models of a run.
pub fn instance_dir_name(model_name: &str, window_hours: usize) -> String {
    format!("{model_name}_{window_hours}_instances")
}

/// A window model stored as an MPS file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFile {
    pub window: usize,
    pub path: PathBuf,
}

impl Model for InstanceFile {
    fn write_mps(&self, path: &Path) -> io::Result<()> {
        fs::copy(&self.path, path).map(|_| ())
    }
}

/// Builder that loads pre-generated window instances from a directory.
///
/// Archived instances already encode their boundary state, so the initial
/// conditions handed in are only checked for presence and logged.
#[derive(Debug, Clone)]
pub struct InstanceLibrary {
    dir: PathBuf,
    model_name: String,
}

impl InstanceLibrary {
    pub fn new(dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            model_name: model_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self, window: usize) -> Result<InstanceFile, BuildError> {
        let path = self.dir.join(instance_file_name(&self.model_name, window));
        if !path.is_file() {
            return Err(BuildError::MissingInstance { path });
        }
        Ok(InstanceFile { window, path })
    }
}

impl ModelBuilder for InstanceLibrary {
    type Model = InstanceFile;

    fn build(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        options: &SolverOptions,
    ) -> Result<InstanceFile, BuildError> {
        let instance = self.load(window)?;
        info!(window, path = %instance.path.display(), ?options, "loaded instance");
        if !initial.is_empty() {
            debug!(window, units = initial.min_on.len(), "initial conditions supplied");
        }
        Ok(instance)
    }

    fn update(
        &mut self,
        window: usize,
        initial: &InitialConditions,
        _options: &SolverOptions,
    ) -> Result<InstanceFile, BuildError> {
        let instance = self.load(window)?;
        debug!(
            window,
            path = %instance.path.display(),
            carried_units = initial.min_on.len(),
            "advanced to next instance"
        );
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_existing_instance() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("demo_1.mps"), "NAME demo\nENDATA\n").expect("write");
        let mut lib = InstanceLibrary::new(dir.path(), "demo");

        let model = lib
            .update(1, &InitialConditions::default(), &SolverOptions::default())
            .expect("instance");
        assert_eq!(model.window, 1);

        let copy = dir.path().join("copy.mps");
        model.write_mps(&copy).expect("copy");
        assert_eq!(fs::read_to_string(copy).ok().as_deref(), Some("NAME demo\nENDATA\n"));
    }

    #[test]
    fn missing_instance_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut lib = InstanceLibrary::new(dir.path(), "demo");
        let err = lib.build(0, &InitialConditions::default(), &SolverOptions::default());
        assert!(matches!(err, Err(BuildError::MissingInstance { .. })));
    }

    #[test]
    fn naming_matches_archive_layout() {
        assert_eq!(instance_dir_name("cambodia", 24), "cambodia_24_instances");
        assert_eq!(instance_file_name("cambodia", 7), "cambodia_7.mps");
    }
}
