use serde::Deserialize;
use serde_json::from_str;

use crate::assets::asset_str;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
}

#[derive(Deserialize)]
struct ProductFile {
    products: Vec<Product>,
}

/// Read-only product catalog. The sales flow never mutates it; prices and
/// names for cart rows are always resolved through here.
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// The catalog embedded in the binary.
    pub fn builtin() -> Self {
        let file: ProductFile =
            from_str(asset_str("products.json")).expect("unable to deserialize product catalog");
        Self {
            products: file.products,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Price lookup with 0 for unknown ids, mirroring an unbound cart row.
    pub fn price(&self, id: u32) -> f64 {
        self.get(id).map(|p| p.price).unwrap_or(0.0)
    }

    /// Index of a product within the catalog ordering (UI cycling).
    pub fn position(&self, id: u32) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 10);
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = Catalog::builtin();
        let rice = catalog.get(1).unwrap();
        assert_eq!(rice.name, "Rice (1kg)");
        assert_eq!(rice.price, 800.0);
        assert_eq!(catalog.price(9), 1200.0);
    }

    #[test]
    fn test_unknown_product() {
        let catalog = Catalog::builtin();
        assert!(catalog.get(99).is_none());
        assert_eq!(catalog.price(99), 0.0);
        assert_eq!(catalog.position(99), None);
    }
}
