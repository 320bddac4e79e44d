//! Builders for build-graph fixtures.
//!
//! Defaults describe an iOS arm64 static library built for `Debug`, so a
//! test only spells out what it is actually about.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::{
    BuildMode, BuildTarget, FilePath, Os, Platform, PlatformVariant, ProductType, Project,
    SchemeAutogenerationMode, TargetId, TargetInputs, TargetNameMode, TargetOutputs,
};

/// Builder for one BuildTarget.
#[derive(Debug, Clone)]
pub struct TargetBuilder {
    id: TargetId,
    name: String,
    label: Option<String>,
    product_type: ProductType,
    os: Os,
    variant: PlatformVariant,
    arch: String,
    configuration: String,
    srcs: Vec<FilePath>,
    product: Option<FilePath>,
    swift_module: bool,
    dependencies: BTreeSet<TargetId>,
    hosts: Vec<TargetId>,
    extension_point_identifier: Option<String>,
    infrastructure_independent: bool,
    build_settings: BTreeMap<String, String>,
}

impl TargetBuilder {
    pub fn new(id: &str, name: &str) -> Self {
        TargetBuilder {
            id: TargetId::new(id),
            name: name.to_string(),
            label: None,
            product_type: ProductType::StaticLibrary,
            os: Os::Ios,
            variant: PlatformVariant::Simulator,
            arch: "arm64".to_string(),
            configuration: "Debug".to_string(),
            srcs: Vec::new(),
            product: None,
            swift_module: false,
            dependencies: BTreeSet::new(),
            hosts: Vec::new(),
            extension_point_identifier: None,
            infrastructure_independent: false,
            build_settings: BTreeMap::new(),
        }
    }

    pub fn configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = configuration.into();
        self
    }

    pub fn depends_on(mut self, id: impl Into<TargetId>) -> Self {
        self.dependencies.insert(id.into());
        self
    }

    pub fn hosted_by(mut self, id: impl Into<TargetId>) -> Self {
        self.hosts.push(id.into());
        self
    }

    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    pub fn app(self) -> Self {
        self.product_type(ProductType::App)
    }

    pub fn app_extension(self) -> Self {
        self.product_type(ProductType::AppExtension)
    }

    pub fn unit_test(self) -> Self {
        self.product_type(ProductType::UnitTest)
    }

    pub fn bundle(self) -> Self {
        self.product_type(ProductType::Bundle)
    }

    pub fn os(mut self, os: Os) -> Self {
        self.os = os;
        self
    }

    pub fn variant(mut self, variant: PlatformVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn src(mut self, path: FilePath) -> Self {
        self.srcs.push(path);
        self
    }

    /// Override the default `bin/<id>/<product>` output.
    pub fn product(mut self, path: FilePath) -> Self {
        self.product = Some(path);
        self
    }

    /// Also emit `bin/<id>/<name>.swiftmodule`.
    pub fn swift_module(mut self) -> Self {
        self.swift_module = true;
        self
    }

    pub fn extension_point(mut self, identifier: &str) -> Self {
        self.extension_point_identifier = Some(identifier.to_string());
        self
    }

    pub fn infrastructure_independent(mut self) -> Self {
        self.infrastructure_independent = true;
        self
    }

    pub fn setting(mut self, key: &str, value: &str) -> Self {
        self.build_settings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> BuildTarget {
        let product = self.product.unwrap_or_else(|| {
            FilePath::generated(format!(
                "bin/{}/{}",
                self.id,
                self.product_type.product_file_name(&self.name)
            ))
        });
        let swift_module = self
            .swift_module
            .then(|| FilePath::generated(format!("bin/{}/{}.swiftmodule", self.id, self.name)));

        BuildTarget {
            label: self
                .label
                .unwrap_or_else(|| format!("//{}:{}", self.name, self.name)),
            id: self.id,
            name: self.name,
            product_type: self.product_type,
            product_name: None,
            platform: Platform {
                os: self.os,
                variant: self.variant,
                arch: self.arch,
                minimum_os_version: Version::new(15, 0, 0),
            },
            configuration: self.configuration,
            inputs: TargetInputs {
                srcs: self.srcs,
                ..TargetInputs::default()
            },
            outputs: TargetOutputs {
                product: Some(product),
                swift_module,
            },
            dependencies: self.dependencies,
            hosts: self.hosts,
            extension_point_identifier: self.extension_point_identifier,
            infrastructure_independent: self.infrastructure_independent,
            build_settings: self.build_settings,
        }
    }
}

/// Builder for a Project with `Debug` and `Release` configurations.
#[derive(Debug, Clone)]
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(name: &str) -> Self {
        ProjectBuilder {
            project: Project {
                name: name.to_string(),
                build_mode: BuildMode::Xcode,
                minimum_xcode_version: Version::new(15, 0, 0),
                configurations: vec!["Debug".to_string(), "Release".to_string()],
                default_configuration: "Debug".to_string(),
                target_name_mode: TargetNameMode::Auto,
                scheme_autogeneration_mode: SchemeAutogenerationMode::Auto,
                targets: Vec::new(),
                custom_schemes: Vec::new(),
                args: BTreeMap::new(),
                envs: BTreeMap::new(),
                pre_build_script: None,
                post_build_script: None,
                extra_files: Vec::new(),
                development_region: "en".to_string(),
            },
        }
    }

    /// Replace the configuration list; the first becomes the default.
    pub fn configurations(mut self, names: &[&str]) -> Self {
        self.project.configurations = names.iter().map(|n| n.to_string()).collect();
        if let Some(first) = names.first() {
            self.project.default_configuration = first.to_string();
        }
        self
    }

    pub fn target(mut self, target: BuildTarget) -> Self {
        self.project.targets.push(target);
        self
    }

    pub fn extra_file(mut self, path: FilePath) -> Self {
        self.project.extra_files.push(path);
        self
    }

    pub fn build(self) -> Project {
        self.project
    }

    /// Write the project description as `<dir>/project.json`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join("project.json");
        let json = serde_json::to_string_pretty(&self.project)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}
