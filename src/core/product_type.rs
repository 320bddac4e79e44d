//! Product types a BuildTarget can produce.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of product a target builds.
///
/// Variants are declared in the order used when sorting consolidated
/// targets, so libraries come before the things that link them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    #[serde(alias = "staticlib")]
    StaticLibrary,
    #[serde(alias = "dylib")]
    DynamicLibrary,
    StaticFramework,
    Framework,
    Bundle,
    #[serde(alias = "application")]
    App,
    AppExtension,
    CommandLineTool,
    UnitTest,
    UiTest,
}

impl ProductType {
    /// File extension of the built product (empty for bare executables).
    pub fn extension(&self) -> &'static str {
        match self {
            ProductType::StaticLibrary => "a",
            ProductType::DynamicLibrary => "dylib",
            ProductType::StaticFramework | ProductType::Framework => "framework",
            ProductType::Bundle => "bundle",
            ProductType::App => "app",
            ProductType::AppExtension => "appex",
            ProductType::CommandLineTool => "",
            ProductType::UnitTest | ProductType::UiTest => "xctest",
        }
    }

    /// Suffix appended to a target name when the product type is needed to
    /// tell two targets apart. Static libraries keep the bare name.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            ProductType::StaticLibrary => "",
            ProductType::DynamicLibrary => "Dynamic Library",
            ProductType::StaticFramework => "Static Framework",
            ProductType::Framework => "Framework",
            ProductType::Bundle => "Bundle",
            ProductType::App => "App",
            ProductType::AppExtension => "Extension",
            ProductType::CommandLineTool => "Tool",
            ProductType::UnitTest => "Tests",
            ProductType::UiTest => "UI Tests",
        }
    }

    /// Xcode's product type identifier.
    pub fn identifier(&self) -> &'static str {
        match self {
            ProductType::StaticLibrary => "com.apple.product-type.library.static",
            ProductType::DynamicLibrary => "com.apple.product-type.library.dynamic",
            ProductType::StaticFramework => "com.apple.product-type.framework.static",
            ProductType::Framework => "com.apple.product-type.framework",
            ProductType::Bundle => "com.apple.product-type.bundle",
            ProductType::App => "com.apple.product-type.application",
            ProductType::AppExtension => "com.apple.product-type.app-extension",
            ProductType::CommandLineTool => "com.apple.product-type.tool",
            ProductType::UnitTest => "com.apple.product-type.bundle.unit-test",
            ProductType::UiTest => "com.apple.product-type.bundle.ui-testing",
        }
    }

    /// Whether a scheme can launch this product directly.
    pub fn is_launchable(&self) -> bool {
        matches!(self, ProductType::App | ProductType::CommandLineTool)
    }

    /// Whether this product is a test bundle.
    pub fn is_test(&self) -> bool {
        matches!(self, ProductType::UnitTest | ProductType::UiTest)
    }

    /// Whether this product is hosted by another product at runtime.
    pub fn is_extension(&self) -> bool {
        matches!(self, ProductType::AppExtension)
    }

    /// File name of a product called `name`.
    pub fn product_file_name(&self, name: &str) -> String {
        match self.extension() {
            "" => name.to_string(),
            "a" | "dylib" => format!("lib{}.{}", name, self.extension()),
            ext => format!("{}.{}", name, ext),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProductType::StaticLibrary => "static-library",
            ProductType::DynamicLibrary => "dynamic-library",
            ProductType::StaticFramework => "static-framework",
            ProductType::Framework => "framework",
            ProductType::Bundle => "bundle",
            ProductType::App => "app",
            ProductType::AppExtension => "app-extension",
            ProductType::CommandLineTool => "command-line-tool",
            ProductType::UnitTest => "unit-test",
            ProductType::UiTest => "ui-test",
        };
        f.write_str(s)
    }
}
