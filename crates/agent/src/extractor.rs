use shopdesk_core::{Product, RawItem};

/// Maps recommend-tool items onto product cards, one card per item, in order.
pub fn extract(items: &[RawItem]) -> Vec<Product> {
    items.iter().map(to_product).collect()
}

fn to_product(item: &RawItem) -> Product {
    Product {
        name: item.name.clone(),
        price: item.price.clone(),
        image: item.image_url.clone(),
        sku: item.sku.clone(),
    }
}
