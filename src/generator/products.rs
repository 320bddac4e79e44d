//! Product references, one per ConsolidatedTarget.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{FilePath, ProductType, Targets};
use crate::generator::consolidate::{ConsolidatedTargetKey, ConsolidatedTargets};
use crate::generator::files::FileElement;
use crate::util::hash::Fingerprint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// File name, e.g. `libCore.a`.
    pub name: String,
    pub object_id: String,
    pub product_type: ProductType,
    /// Declared output of the default member.
    pub path: Option<FilePath>,
}

#[derive(Debug, Clone, Default)]
pub struct Products {
    by_key: BTreeMap<ConsolidatedTargetKey, Product>,
}

impl Products {
    pub fn get(&self, key: &ConsolidatedTargetKey) -> Option<&Product> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// The `Products` group, sorted by file name.
    pub fn group(&self) -> FileElement {
        let mut products: Vec<&Product> = self.by_key.values().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.object_id.cmp(&b.object_id)));

        FileElement::Group {
            name: "Products".to_string(),
            object_id: {
                let mut fp = Fingerprint::new();
                fp.update_str("group").update_str("products");
                fp.finish_object_id()
            },
            children: products
                .into_iter()
                .map(|p| FileElement::File {
                    name: p.name.clone(),
                    path: p.name.clone(),
                    object_id: p.object_id.clone(),
                })
                .collect(),
        }
    }
}

/// Create a product reference for every ConsolidatedTarget.
pub fn create_products(targets: &Targets, consolidated: &ConsolidatedTargets) -> Products {
    let by_key = consolidated
        .iter()
        .map(|target| {
            let first = &targets[target.key.first()];
            let mut fp = Fingerprint::new();
            fp.update_str("product")
                .update_strs(target.key.targets().iter().map(|id| id.as_str()));

            let product = Product {
                name: first.product_type.product_file_name(first.product_name()),
                object_id: fp.finish_object_id(),
                product_type: first.product_type,
                path: first.outputs.product.clone(),
            };
            (target.key.clone(), product)
        })
        .collect::<BTreeMap<_, _>>();

    tracing::debug!("Created {} product reference(s)", by_key.len());

    Products { by_key }
}
