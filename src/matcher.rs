use crate::data_models::Product;

/// Products whose title contains any of the keywords, case-insensitively, in input order.
pub fn matching_products(products: &[Product], keywords: &[String]) -> Vec<Product> {
    if keywords.is_empty() {
        return vec![];
    }
    let keywords: Vec<String> = keywords.iter().map(|kw| kw.to_lowercase()).collect();
    products
        .iter()
        .filter(|product| {
            let title = product.title.to_lowercase();
            keywords.iter().any(|kw| title.contains(kw.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|kw| kw.to_string()).collect()
    }

    #[test]
    fn substring_match_works() {
        let products = vec![Product::dummy("Super Widget Pro")];
        let result = matching_products(&products, &keywords(&["widget"]));
        assert_eq!(result, products);
    }

    #[test]
    fn no_match_works() {
        let products = vec![Product::dummy("Gadget")];
        assert!(matching_products(&products, &keywords(&["widget"])).is_empty());
    }

    #[test]
    fn match_ignores_case() {
        let products = vec![Product::dummy("WIDGET")];
        assert_eq!(matching_products(&products, &keywords(&["widget"])), products);
        let products = vec![Product::dummy("widget")];
        assert_eq!(matching_products(&products, &keywords(&["WiDgEt"])), products);
    }

    #[test]
    fn empty_keywords_match_nothing() {
        let products = vec![Product::dummy("Widget")];
        assert!(matching_products(&products, &[]).is_empty());
    }

    #[test]
    fn order_is_preserved_and_products_not_duplicated() {
        let products = vec![
            Product::dummy("Gaming Laptop X1"),
            Product::dummy("Desk Chair"),
            Product::dummy("Laptop Stand"),
        ];
        let result = matching_products(&products, &keywords(&["laptop", "gaming", "stand"]));
        assert_eq!(
            result,
            vec![Product::dummy("Gaming Laptop X1"), Product::dummy("Laptop Stand")]
        );
    }

    #[test]
    fn multi_word_keyword_works() {
        let products = vec![
            Product::dummy("Apple iPhone 15 Pro"),
            Product::dummy("Apple Watch"),
        ];
        let result = matching_products(&products, &keywords(&["iphone 15"]));
        assert_eq!(result, vec![Product::dummy("Apple iPhone 15 Pro")]);
    }
}
