use std::sync::Mutex;

use serde::Serialize;

/// A product row, serialized to JSON in the shape the schema's property
/// resolvers read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub package: String,
    pub name: String,
    pub old_field: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductVariation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub email: String,
    pub total_products_created: u32,
}

fn product(id: &str, sku: &str, package: &str, name: &str) -> Product {
    Product {
        id: id.to_string(),
        sku: sku.to_string(),
        package: package.to_string(),
        name: name.to_string(),
        old_field: "deprecated".to_string(),
    }
}

/// The in-memory product catalog. Renames persist for the lifetime of the
/// process, nothing more.
pub struct ProductStore {
    products: Mutex<Vec<Product>>,
}

impl Default for ProductStore {
    fn default() -> Self {
        ProductStore {
            products: Mutex::new(vec![
                product("converse-1", "converse-1", "converse", "Converse Chuck Taylor"),
                product("vans-1", "vans-1", "vans", "Vans Classic Sneaker"),
            ]),
        }
    }
}

impl ProductStore {
    pub fn all(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    pub fn by_id(&self, id: &str) -> Option<Product> {
        self.products.lock().unwrap().iter().find(|product| product.id == id).cloned()
    }

    pub fn by_sku_and_package(&self, sku: &str, package: &str) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|product| product.sku == sku && product.package == package)
            .cloned()
    }

    /// Renames a product, returning the new name, or `None` for an
    /// unknown id.
    pub fn rename(&self, id: &str, name: &str) -> Option<String> {
        self.products.lock().unwrap().iter_mut().find(|product| product.id == id).map(|product| {
            product.name = name.to_string();
            product.name.clone()
        })
    }
}

pub fn variation_of(product_id: &str) -> Option<ProductVariation> {
    let (id, name) = match product_id {
        "converse-1" => ("converse-classic", "Converse Chuck Taylor"),
        "vans-1" => ("vans-classic", "Vans Classic Sneaker"),
        _ => return None,
    };
    Some(ProductVariation {
        id: id.to_string(),
        name: name.to_string(),
    })
}

/// The stand-in variation for products without one of their own.
pub fn default_variation() -> ProductVariation {
    ProductVariation {
        id: "defaultVariation".to_string(),
        name: "default variation".to_string(),
    }
}

pub fn creator_of(product_id: &str) -> Option<Creator> {
    let email = match product_id {
        "converse-1" => "info@converse.com",
        "vans-1" => "info@vans.com",
        _ => return None,
    };
    Some(Creator {
        email: email.to_string(),
        total_products_created: 1099,
    })
}

pub fn secret_notes(product_id: &str) -> Option<&'static str> {
    match product_id {
        "converse-1" => Some("margin on this one is paper thin"),
        "vans-1" => Some("restock planned for next quarter"),
        _ => None,
    }
}
