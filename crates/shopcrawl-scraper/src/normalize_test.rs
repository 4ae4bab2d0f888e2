use serde_json::json;

use super::*;

fn product(value: serde_json::Value) -> ShopifyProduct {
    serde_json::from_value(value).expect("fixture should decode")
}

fn two_default_title_variants() -> ShopifyProduct {
    product(json!({
        "id": 1,
        "title": "vitamin c serum",
        "body_html": "<p>Bright.</p><a href=\"/collections/all\">Shop</a>",
        "product_type": "skincare",
        "images": [{"id": 10, "src": "https://cdn.example.com/a.jpg", "variant_ids": []}],
        "variants": [
            {"id": 101, "option1": "Default Title", "option2": null, "option3": null, "price": "12.50"},
            {"id": 102, "option1": "Default Title", "option2": null, "option3": null, "price": "14.00"}
        ]
    }))
}

// -----------------------------------------------------------------------
// flatten_product
// -----------------------------------------------------------------------

#[test]
fn default_title_variants_yield_distinct_skus_and_bare_names() {
    let records = flatten_product(&two_default_title_variants(), "保健/美容/卫生/护理");
    assert_eq!(records.len(), 2);

    let first = &records[0].raw;
    let second = &records[1].raw;
    assert_ne!(first.sku, second.sku);
    assert_eq!(first.name.as_deref(), Some("Vitamin C Serum"));
    assert_eq!(second.name.as_deref(), Some("Vitamin C Serum"));
    assert!(first.sku.as_deref().unwrap().starts_with("CARE-"));
    assert_eq!(records[0].identity, "101");
    assert_eq!(records[1].identity, "102");
}

#[test]
fn description_is_stripped_of_links() {
    let records = flatten_product(&two_default_title_variants(), "");
    assert_eq!(records[0].raw.description.as_deref(), Some("<p>Bright.</p>"));
}

#[test]
fn category_is_title_cased_product_type() {
    let records = flatten_product(&two_default_title_variants(), "");
    assert_eq!(records[0].raw.category.as_deref(), Some("Skincare"));
}

#[test]
fn empty_product_type_leaves_category_unset() {
    let p = product(json!({
        "id": 2, "title": "Mug", "product_type": "  ",
        "variants": [{"id": 201, "price": "5.00"}]
    }));
    assert_eq!(flatten_product(&p, "").first().unwrap().raw.category, None);
}

#[test]
fn unparsable_price_leaves_price_unset() {
    let p = product(json!({
        "id": 3, "title": "Mug",
        "variants": [{"id": 301, "price": "call us"}]
    }));
    assert_eq!(flatten_product(&p, "").first().unwrap().raw.price, None);
}

#[test]
fn descriptor_is_part_of_sku_and_name() {
    let p = product(json!({
        "id": 4, "title": "Linen Shirt",
        "variants": [{"id": 401, "option1": "Blue", "option2": "XL", "option3": "None", "price": 40}]
    }));
    let raw = &flatten_product(&p, "服饰与配饰")[0].raw;
    assert_eq!(raw.name.as_deref(), Some("Linen Shirt Blue_Xl"));
    assert!(raw.sku.as_deref().unwrap().ends_with("-Blue_XL"));
    assert!(raw.sku.as_deref().unwrap().starts_with("APP-"));
}

#[test]
fn product_without_variants_yields_nothing() {
    let p = product(json!({"id": 5, "title": "Ghost"}));
    assert!(flatten_product(&p, "").is_empty());
}

// -----------------------------------------------------------------------
// variant_descriptor / variant_name
// -----------------------------------------------------------------------

#[test]
fn descriptor_drops_placeholders() {
    let v: ShopifyVariant = serde_json::from_value(json!({
        "id": 1, "option1": "Default Title", "option2": "", "option3": "None"
    }))
    .unwrap();
    assert_eq!(variant_descriptor(&v), None);
}

#[test]
fn name_never_keeps_default_title_or_padding() {
    assert_eq!(variant_name("  Tote Bag ", None), "Tote Bag");
    assert_eq!(variant_name("Tote Bag Default Title", None), "Tote Bag");
    assert_eq!(variant_name("tote", Some("large canvas")), "Tote Large_Canvas");
}

#[test]
fn name_descriptor_is_normalized_like_a_sku() {
    assert_eq!(variant_name("Shirt", Some("Red / Large")), "Shirt Red__Large");
    assert_eq!(variant_name("Mug", Some("  / ")), "Mug");
}

// -----------------------------------------------------------------------
// variant_image
// -----------------------------------------------------------------------

fn image_fixture() -> ShopifyProduct {
    product(json!({
        "id": 6,
        "title": "Lamp",
        "images": [
            {"id": 60, "src": "https://cdn.example.com/first.jpg", "variant_ids": []},
            {"id": 61, "src": "https://cdn.example.com/listed.jpg", "variant_ids": [602]},
            {"id": 62, "src": "https://cdn.example.com/by-id.jpg", "variant_ids": []}
        ],
        "variants": [
            {"id": 601, "featured_image": {"id": 99, "src": "https://cdn.example.com/featured.jpg"}},
            {"id": 602},
            {"id": 603, "image_id": 62},
            {"id": 604}
        ]
    }))
}

#[test]
fn image_prefers_featured_then_listing_then_id_then_first() {
    let p = image_fixture();
    let images: Vec<Option<String>> = p.variants.iter().map(|v| variant_image(&p, v)).collect();
    assert_eq!(
        images,
        vec![
            Some("https://cdn.example.com/featured.jpg".to_owned()),
            Some("https://cdn.example.com/listed.jpg".to_owned()),
            Some("https://cdn.example.com/by-id.jpg".to_owned()),
            Some("https://cdn.example.com/first.jpg".to_owned()),
        ]
    );
}

#[test]
fn image_absent_without_gallery() {
    let p = product(json!({"id": 7, "title": "Bare", "variants": [{"id": 701}]}));
    assert_eq!(variant_image(&p, &p.variants[0]), None);
}

// -----------------------------------------------------------------------
// title_case
// -----------------------------------------------------------------------

#[test]
fn title_case_matches_word_boundaries() {
    assert_eq!(title_case("VITAMIN c-serum 30ml"), "Vitamin C-Serum 30Ml");
    assert_eq!(title_case(""), "");
    assert_eq!(title_case("ça va"), "Ça Va");
}
