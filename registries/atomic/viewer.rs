/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Renderer registry: content type → ordered renderer candidates.
//!
//! Pure lookup. Candidates for a content type are ordered by the preference
//! each renderer declares for that type; ties keep declaration order. An
//! explicit implementation name that is compatible with the content type is
//! moved to the front.

use std::path::{Path, PathBuf};

use crate::registries::atomic::viewer_provider::RendererProviders;

/// Whether an implementation is hosted inside a pane or is an external application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    #[default]
    Embedded,
    HostApplication,
}

/// One content type a renderer declares, with its preference for that type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContentTypeBinding {
    pub content_type: String,
    #[serde(default)]
    pub preference: u32,
}

impl ContentTypeBinding {
    pub fn new(content_type: &str, preference: u32) -> Self {
        Self {
            content_type: content_type.to_ascii_lowercase(),
            preference,
        }
    }

    /// Exact match, or a `major/*` binding matching any `major/minor`.
    pub fn matches(&self, content_type: &str) -> bool {
        if self.content_type.eq_ignore_ascii_case(content_type) {
            return true;
        }
        match self.content_type.strip_suffix("/*") {
            Some(major) => content_type
                .split_once('/')
                .is_some_and(|(requested_major, _)| requested_major.eq_ignore_ascii_case(major)),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RendererDescriptor {
    /// Implementation name, e.g. `"viewer:iconview"`.
    pub name: String,
    #[serde(default)]
    pub kind: RendererKind,
    pub content_types: Vec<ContentTypeBinding>,
}

impl RendererDescriptor {
    pub fn embedded(name: &str, bindings: &[(&str, u32)]) -> Self {
        Self::with_kind(name, RendererKind::Embedded, bindings)
    }

    pub fn host_application(name: &str, bindings: &[(&str, u32)]) -> Self {
        Self::with_kind(name, RendererKind::HostApplication, bindings)
    }

    fn with_kind(name: &str, kind: RendererKind, bindings: &[(&str, u32)]) -> Self {
        Self {
            name: name.to_string(),
            kind,
            content_types: bindings
                .iter()
                .map(|(content_type, preference)| ContentTypeBinding::new(content_type, *preference))
                .collect(),
        }
    }

    pub fn supports(&self, content_type: &str) -> bool {
        self.preference_for(content_type).is_some()
    }

    /// Highest preference among the bindings matching `content_type`.
    pub fn preference_for(&self, content_type: &str) -> Option<u32> {
        self.content_types
            .iter()
            .filter(|binding| binding.matches(content_type))
            .map(|binding| binding.preference)
            .max()
    }
}

/// Result of a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RendererResolution {
    pub content_type: String,
    /// Embedded implementations in the order they should be tried.
    pub candidates: Vec<RendererDescriptor>,
    /// Preferred external application for the content type, if any.
    pub host_application: Option<RendererDescriptor>,
}

impl RendererResolution {
    /// True when nothing can display the content type inside a pane.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidate_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.name.as_str()).collect()
    }
}

#[derive(Debug)]
pub enum RegistryConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for RegistryConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryConfigError::Io(e) => write!(f, "IO error: {e}"),
            RegistryConfigError::Parse(e) => write!(f, "Parse error: {e}"),
            RegistryConfigError::Invalid(e) => write!(f, "Invalid renderer table: {e}"),
        }
    }
}

impl std::error::Error for RegistryConfigError {}

#[derive(Debug, serde::Deserialize)]
struct RendererTable {
    #[serde(default, rename = "renderer")]
    renderers: Vec<RendererDescriptor>,
}

#[derive(Debug, Clone)]
pub struct RendererRegistry {
    descriptors: Vec<RendererDescriptor>,
}

impl RendererRegistry {
    /// Empty table. `Default` gives the built-in seed instead.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Start from an empty table and apply every provider in order.
    pub fn with_providers(providers: &RendererProviders) -> Self {
        let mut registry = Self::new();
        providers.apply_all(&mut registry);
        registry
    }

    /// Declare an implementation. Re-registering a name replaces the old
    /// descriptor but keeps its declaration position.
    pub fn register(&mut self, descriptor: RendererDescriptor) {
        if let Some(existing) = self
            .descriptors
            .iter_mut()
            .find(|d| d.name == descriptor.name)
        {
            log::debug!("registry: replacing renderer descriptor {}", descriptor.name);
            *existing = descriptor;
            return;
        }
        self.descriptors.push(descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&RendererDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn descriptors(&self) -> &[RendererDescriptor] {
        &self.descriptors
    }

    pub fn resolve(
        &self,
        content_type: &str,
        explicit_implementation: Option<&str>,
    ) -> RendererResolution {
        let mut candidates = ranked(&self.descriptors, content_type, RendererKind::Embedded);
        if let Some(name) = explicit_implementation
            && let Some(position) = candidates.iter().position(|c| c.name == name)
        {
            let explicit = candidates.remove(position);
            candidates.insert(0, explicit);
        }
        let host_application = ranked(&self.descriptors, content_type, RendererKind::HostApplication)
            .into_iter()
            .next();

        if candidates.is_empty() {
            log::debug!("registry: no embedded renderer declares {content_type}");
        }

        RendererResolution {
            content_type: content_type.to_string(),
            candidates,
            host_application,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, RegistryConfigError> {
        let table: RendererTable =
            toml::from_str(source).map_err(|e| RegistryConfigError::Parse(e.to_string()))?;
        let mut registry = Self::new();
        for descriptor in table.renderers {
            if descriptor.name.trim().is_empty() {
                return Err(RegistryConfigError::Invalid(
                    "renderer with empty name".to_string(),
                ));
            }
            if descriptor.content_types.is_empty() {
                return Err(RegistryConfigError::Invalid(format!(
                    "{} declares no content types",
                    descriptor.name
                )));
            }
            registry.register(RendererDescriptor {
                content_types: descriptor
                    .content_types
                    .iter()
                    .map(|b| ContentTypeBinding::new(&b.content_type, b.preference))
                    .collect(),
                ..descriptor
            });
        }
        Ok(registry)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, RegistryConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| RegistryConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Configured table if one exists at the default location, else the built-in seed.
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        match Self::load_from_path(&path) {
            Ok(registry) => registry,
            Err(e) => {
                log::warn!("registry: ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Minimal table: plain text and a generic metadata fallback.
    pub fn core_seed() -> Self {
        let mut registry = Self::new();
        registry.register(RendererDescriptor::embedded(
            "viewer:plaintext",
            &[("text/plain", 10)],
        ));
        registry.register(RendererDescriptor::embedded(
            "viewer:metadata",
            &[("application/octet-stream", 1)],
        ));
        registry
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(RendererDescriptor::embedded(
            "viewer:iconview",
            &[("inode/directory", 20)],
        ));
        registry.register(RendererDescriptor::embedded(
            "viewer:listview",
            &[("inode/directory", 10)],
        ));
        registry.register(RendererDescriptor::embedded(
            "viewer:html",
            &[("text/html", 20), ("text/*", 1)],
        ));
        registry.register(RendererDescriptor::embedded(
            "viewer:plaintext",
            &[("text/*", 10)],
        ));
        registry.register(RendererDescriptor::embedded(
            "viewer:image",
            &[("image/*", 10)],
        ));
        registry.register(RendererDescriptor::host_application(
            "app:image-editor",
            &[("image/*", 5)],
        ));
        registry.register(RendererDescriptor::host_application(
            "app:text-editor",
            &[("text/*", 5)],
        ));
        registry
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut dir = dirs::config_dir()?;
    dir.push("viewhost");
    dir.push("renderers.toml");
    Some(dir)
}

fn ranked(
    descriptors: &[RendererDescriptor],
    content_type: &str,
    kind: RendererKind,
) -> Vec<RendererDescriptor> {
    let mut matching: Vec<(u32, &RendererDescriptor)> = descriptors
        .iter()
        .filter(|d| d.kind == kind)
        .filter_map(|d| d.preference_for(content_type).map(|p| (p, d)))
        .collect();
    // Stable sort keeps declaration order among equal preferences.
    matching.sort_by(|a, b| b.0.cmp(&a.0));
    matching.into_iter().map(|(_, d)| d.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("inode/directory", None, vec!["viewer:iconview", "viewer:listview"])]
    #[case("inode/directory", Some("viewer:listview"), vec!["viewer:listview", "viewer:iconview"])]
    #[case("text/html", None, vec!["viewer:html", "viewer:plaintext"])]
    #[case("text/plain", None, vec!["viewer:plaintext", "viewer:html"])]
    #[case("text/plain", Some("viewer:iconview"), vec!["viewer:plaintext", "viewer:html"])]
    #[case("image/png", None, vec!["viewer:image"])]
    fn default_registry_orders_candidates(
        #[case] content_type: &str,
        #[case] hint: Option<&str>,
        #[case] expected: Vec<&str>,
    ) {
        let registry = RendererRegistry::default();
        let resolution = registry.resolve(content_type, hint);
        assert_eq!(resolution.candidate_names(), expected);
    }

    #[test]
    fn new_registry_is_empty_and_default_is_seeded() {
        assert!(RendererRegistry::new().descriptors().is_empty());
        assert!(!RendererRegistry::default().descriptors().is_empty());
        assert!(RendererRegistry::with_providers(&RendererProviders::new()).descriptors().is_empty());
    }

    #[test]
    fn equal_preferences_keep_declaration_order() {
        let mut registry = RendererRegistry::new();
        registry.register(RendererDescriptor::embedded("viewer:b", &[("text/plain", 5)]));
        registry.register(RendererDescriptor::embedded("viewer:a", &[("text/plain", 5)]));
        registry.register(RendererDescriptor::embedded("viewer:c", &[("text/plain", 5)]));

        let resolution = registry.resolve("text/plain", None);
        assert_eq!(resolution.candidate_names(), vec!["viewer:b", "viewer:a", "viewer:c"]);
    }

    #[test]
    fn unknown_content_type_resolves_empty() {
        let registry = RendererRegistry::default();
        let resolution = registry.resolve("application/x-unknown", Some("viewer:html"));
        assert!(resolution.is_empty());
        assert!(resolution.host_application.is_none());
    }

    #[test]
    fn host_application_is_reported_separately() {
        let registry = RendererRegistry::default();
        let resolution = registry.resolve("image/jpeg", None);
        assert_eq!(resolution.candidate_names(), vec!["viewer:image"]);
        assert_eq!(
            resolution.host_application.map(|d| d.name),
            Some("app:image-editor".to_string())
        );
    }

    #[test]
    fn reregistering_keeps_declaration_position() {
        let mut registry = RendererRegistry::new();
        registry.register(RendererDescriptor::embedded("viewer:a", &[("text/plain", 1)]));
        registry.register(RendererDescriptor::embedded("viewer:b", &[("text/plain", 1)]));
        registry.register(RendererDescriptor::embedded("viewer:a", &[("text/plain", 1), ("text/csv", 3)]));

        assert_eq!(registry.descriptors()[0].name, "viewer:a");
        assert!(registry.descriptors()[0].supports("text/csv"));
        assert_eq!(registry.descriptors().len(), 2);
    }

    #[test]
    fn core_seed_uses_plaintext_and_metadata() {
        let registry = RendererRegistry::core_seed();
        assert_eq!(
            registry.resolve("text/plain", None).candidate_names(),
            vec!["viewer:plaintext"]
        );
        assert_eq!(
            registry.resolve("application/octet-stream", None).candidate_names(),
            vec!["viewer:metadata"]
        );
    }

    #[test]
    fn toml_table_loads_with_kinds_and_wildcards() {
        let source = r#"
            [[renderer]]
            name = "viewer:tree"
            content_types = [{ content_type = "inode/directory", preference = 3 }]

            [[renderer]]
            name = "viewer:icons"
            content_types = [{ content_type = "Inode/Directory", preference = 7 }]

            [[renderer]]
            name = "app:viewer"
            kind = "host-application"
            content_types = [{ content_type = "image/*" }]
        "#;
        let registry = RendererRegistry::from_toml_str(source).unwrap();

        assert_eq!(
            registry.resolve("inode/directory", None).candidate_names(),
            vec!["viewer:icons", "viewer:tree"]
        );
        let images = registry.resolve("image/gif", None);
        assert!(images.is_empty());
        assert_eq!(images.host_application.unwrap().name, "app:viewer");
    }

    #[test]
    fn toml_table_rejects_renderer_without_content_types() {
        let source = r#"
            [[renderer]]
            name = "viewer:empty"
            content_types = []
        "#;
        assert!(matches!(
            RendererRegistry::from_toml_str(source),
            Err(RegistryConfigError::Invalid(_))
        ));
        assert!(matches!(
            RendererRegistry::from_toml_str("[[renderer]]\nname = 3"),
            Err(RegistryConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_path_reads_table_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("renderers.toml");
        std::fs::write(
            &path,
            "[[renderer]]\nname = \"viewer:pdf\"\ncontent_types = [{ content_type = \"application/pdf\", preference = 1 }]\n",
        )
        .unwrap();

        let registry = RendererRegistry::load_from_path(&path).unwrap();
        assert_eq!(
            registry.resolve("application/pdf", None).candidate_names(),
            vec!["viewer:pdf"]
        );
        assert!(matches!(
            RendererRegistry::load_from_path(&dir.path().join("missing.toml")),
            Err(RegistryConfigError::Io(_))
        ));
    }
}
