//! Build system registry and classifier

use super::{BuildSystem, BuildSystemId};
use crate::detection::FileRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of classifying one file set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub build_system: BuildSystemId,
    /// Every marker file seen, in walk order
    pub build_files: Vec<String>,
}

/// Registry of build systems
#[derive(Clone)]
pub struct BuildSystemRegistry {
    systems: Vec<Arc<dyn BuildSystem>>,
    marker_index: HashMap<String, Vec<(usize, u8)>>,
}

impl BuildSystemRegistry {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            marker_index: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::CargoBuildSystem));
        registry.register(Arc::new(super::GoModulesBuildSystem));
        registry.register(Arc::new(super::MesonBuildSystem));
        registry.register(Arc::new(super::CMakeBuildSystem));
        registry.register(Arc::new(super::AutotoolsBuildSystem));
        registry.register(Arc::new(super::NpmBuildSystem));
        registry.register(Arc::new(super::YarnBuildSystem));
        registry.register(Arc::new(super::PyprojectBuildSystem));
        registry.register(Arc::new(super::PipBuildSystem));
        registry.register(Arc::new(super::GradleBuildSystem));
        registry.register(Arc::new(super::MavenBuildSystem));
        registry.register(Arc::new(super::MakeBuildSystem));
        registry
    }

    pub fn register(&mut self, system: Arc<dyn BuildSystem>) {
        let idx = self.systems.len();

        for pattern in system.markers() {
            self.marker_index
                .entry(pattern.filename.to_string())
                .or_default()
                .push((idx, pattern.priority));
        }

        self.systems.push(system);
    }

    /// Build system and priority for a marker file name
    pub fn marker(&self, filename: &str) -> Option<(BuildSystemId, u8)> {
        self.marker_index
            .get(filename)?
            .iter()
            .max_by_key(|(_, priority)| *priority)
            .map(|&(idx, priority)| (self.systems[idx].id(), priority))
    }

    pub fn get(&self, id: BuildSystemId) -> Option<&dyn BuildSystem> {
        self.systems
            .iter()
            .find(|s| s.id() == id)
            .map(|s| s.as_ref())
    }

    pub fn is_marker(&self, filename: &str) -> bool {
        self.marker_index.contains_key(filename)
    }

    /// Picks exactly one build system for `files`.
    ///
    /// Files are visited in the order given (the collector's lexicographic
    /// path order). A marker replaces the current choice only when its
    /// priority is strictly greater, so ties keep the first marker seen.
    pub fn classify(&self, files: &[FileRecord]) -> Classification {
        let mut best: Option<(BuildSystemId, u8)> = None;
        let mut build_files = Vec::new();

        for record in files.iter().filter(|r| !r.is_dir) {
            let Some(name) = record.file_name() else {
                continue;
            };
            let Some((id, priority)) = self.marker(name) else {
                continue;
            };

            build_files.push(record.relative_str());

            if best.map_or(true, |(_, current)| priority > current) {
                best = Some((id, priority));
            }
        }

        Classification {
            build_system: best.map(|(id, _)| id).unwrap_or(BuildSystemId::Unknown),
            build_files,
        }
    }
}

impl Default for BuildSystemRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for BuildSystemRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSystemRegistry")
            .field(
                "systems",
                &self.systems.iter().map(|s| s.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
