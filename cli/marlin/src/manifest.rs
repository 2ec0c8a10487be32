//! `marlin.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use marlin_pipeline::ProjectLayout;
use marlin_toolchain::Toolchain;
use serde::{Deserialize, Serialize};

/// The top-level manifest structure for a marlin project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarlinManifest {
    /// Project metadata (required).
    pub project: ProjectConfig,
    /// Artifact layout overrides.
    #[serde(default)]
    pub layout: Option<LayoutConfig>,
    /// Final-compile configuration.
    #[serde(default)]
    pub extension: Option<ExtensionConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Extension name; becomes the artifact stem (required).
    pub name: String,
    /// Project version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Author list.
    #[serde(default)]
    pub authors: Vec<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Layout overrides; anything omitted keeps its default location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Extension C sources and grammars (default `src`).
    #[serde(default)]
    pub source_dir: Option<String>,
    /// Probe source file (default `probe/probe.c`).
    #[serde(default)]
    pub probe_source: Option<String>,
    /// Configuration header written by the probe (default `hostconf.h`).
    #[serde(default)]
    pub config_header: Option<String>,
    /// The generator's nested build tree (default `pgen`).
    #[serde(default)]
    pub generator_dir: Option<String>,
    /// Objects and artifact output (default `out`).
    #[serde(default)]
    pub out_dir: Option<String>,
}

/// Final-compile configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionConfig {
    /// Preprocessor defines identifying the embedding mode.
    #[serde(default)]
    pub defines: Vec<String>,
    /// Extra include search paths, relative to the project directory.
    #[serde(default)]
    pub include_dirs: Vec<String>,
}

impl MarlinManifest {
    /// Search upward from `start_dir` for a `marlin.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("marlin.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: MarlinManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing marlin.toml")
    }

    /// Fallback manifest for a project directory without `marlin.toml`:
    /// defaults everywhere, extension named after the directory.
    pub fn default_for(project_dir: &Path) -> Self {
        let name = project_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("extension")
            .to_string();
        MarlinManifest {
            project: ProjectConfig {
                name,
                version: default_version(),
                description: None,
                authors: Vec::new(),
            },
            layout: None,
            extension: None,
        }
    }

    /// Resolve the artifact layout for `project_dir`, applying any
    /// manifest overrides on top of the defaults.
    pub fn project_layout(&self, project_dir: &Path, tc: &Toolchain) -> ProjectLayout {
        let mut layout = ProjectLayout::new(project_dir, &self.project.name, tc);
        if let Some(cfg) = &self.layout {
            if let Some(dir) = &cfg.source_dir {
                layout.source_dir = project_dir.join(dir);
            }
            if let Some(path) = &cfg.probe_source {
                layout.probe_source = project_dir.join(path);
            }
            if let Some(path) = &cfg.config_header {
                layout.config_header = project_dir.join(path);
            }
            if let Some(dir) = &cfg.generator_dir {
                layout.generator_dir = project_dir.join(dir);
                layout.generator_exe = layout.generator_dir.join(tc.executable_filename("pgen"));
            }
            if let Some(dir) = &cfg.out_dir {
                layout.out_dir = project_dir.join(dir);
                layout.artifact = layout
                    .out_dir
                    .join(tc.shared_library_filename(&self.project.name));
            }
        }
        layout
    }

    /// Preprocessor defines for the final compile.
    pub fn defines(&self) -> Vec<String> {
        self.extension
            .as_ref()
            .map(|e| e.defines.clone())
            .unwrap_or_default()
    }

    /// Extra include directories, resolved against `project_dir`.
    pub fn include_dirs(&self, project_dir: &Path) -> Vec<PathBuf> {
        self.extension
            .as_ref()
            .map(|e| e.include_dirs.iter().map(|d| project_dir.join(d)).collect())
            .unwrap_or_default()
    }
}
