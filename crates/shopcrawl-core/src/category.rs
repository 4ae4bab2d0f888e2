//! Custom category label → SKU prefix.
//!
//! The curated categories are the top level of the Google product taxonomy.
//! Operators label sites with the Chinese name; the English taxonomy name is
//! accepted as well.

/// Prefix for labels outside the curated set.
pub const GENERIC_PREFIX: &str = "GEN";

/// `(prefix, chinese label, english label)`.
const CATEGORY_PREFIXES: [(&str, &str, &str); 21] = [
    ("HARD", "五金/硬件", "Hardware"),
    ("VEH", "交通工具/汽车/飞机/船舶", "Vehicles & Parts"),
    ("SPORT", "体育用品", "Sporting Goods"),
    ("CARE", "保健/美容/卫生/护理", "Health & Beauty"),
    ("OFFC", "办公用品", "Office Supplies"),
    ("PET", "动物/宠物用品", "Animals & Pet Supplies"),
    ("IND", "商业/工业", "Business & Industrial"),
    ("BABY", "婴幼儿用品", "Baby & Toddler"),
    ("MEDIA", "媒体", "Media"),
    ("RITE", "宗教/仪式", "Religious & Ceremonial"),
    ("FURN", "家具", "Furniture"),
    ("HOME", "家居与园艺", "Home & Garden"),
    ("ADULT", "成人", "Mature"),
    ("APP", "服饰与配饰", "Apparel & Accessories"),
    ("TOY", "玩具/游戏", "Toys & Games"),
    ("ELEC", "电子产品", "Electronics"),
    ("OPT", "相机与光学器件", "Cameras & Optics"),
    ("BAG", "箱包", "Luggage & Bags"),
    ("ART", "艺术与娱乐", "Arts & Entertainment"),
    ("SOFT", "软件", "Software"),
    ("FOOD", "饮食/烟酒", "Food, Beverages & Tobacco"),
];

/// Returns the SKU prefix for a custom category label, or [`GENERIC_PREFIX`].
///
/// Matching trims the label; English names match case-insensitively.
#[must_use]
pub fn prefix_for(label: &str) -> &'static str {
    let label = label.trim();
    CATEGORY_PREFIXES
        .iter()
        .find(|(_, zh, en)| *zh == label || en.eq_ignore_ascii_case(label))
        .map_or(GENERIC_PREFIX, |(prefix, _, _)| prefix)
}
