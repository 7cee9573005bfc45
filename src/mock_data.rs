use crate::models::{Category, Creator, Skin, TeslaModel};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::OnceLock;

pub const ALL_MODELS: [TeslaModel; 5] = [
    TeslaModel::Model3,
    TeslaModel::ModelY,
    TeslaModel::ModelS,
    TeslaModel::ModelX,
    TeslaModel::Cybertruck,
];

static SKINS: OnceLock<Vec<Skin>> = OnceLock::new();
static CATEGORIES: OnceLock<Vec<Category>> = OnceLock::new();

pub fn skins() -> &'static [Skin] {
    SKINS.get_or_init(init_skins)
}

pub fn categories() -> &'static [Category] {
    CATEGORIES.get_or_init(init_categories)
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn unsplash(photo: &str, width: u32) -> String {
    format!(
        "https://images.unsplash.com/photo-{}?w={}&auto=format&fit=crop",
        photo, width
    )
}

fn creator(id: &str, name: &str, seed: &str) -> Creator {
    Creator {
        id: id.to_string(),
        name: name.to_string(),
        avatar: Some(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            seed
        )),
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn category(id: &str, name: &str, description: &str, icon: &str, count: u32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        count,
    }
}

fn init_categories() -> Vec<Category> {
    vec![
        category("matte", "Matte", "Sleek matte finish wraps for a modern look", "✨", 156),
        category("chrome", "Chrome", "High-gloss chrome finishes that stand out", "⚡", 89),
        category("carbon-fiber", "Carbon Fiber", "Realistic carbon fiber textures", "🔗", 112),
        category("gradient", "Gradient", "Smooth color transitions and fades", "🌈", 78),
        category("color", "Solid Colors", "Classic solid color wraps", "🎨", 234),
        category("custom", "Custom Themes", "Unique artistic designs and themes", "🎭", 67),
    ]
}

fn init_skins() -> Vec<Skin> {
    vec![
        Skin {
            id: "1".to_string(),
            name: "Midnight Black Matte".to_string(),
            description: "Deep matte black finish for a stealthy look".to_string(),
            image_url: unsplash("1620385018749-3c2c02d1b8fc", 800),
            thumbnail_url: unsplash("1620385018749-3c2c02d1b8fc", 400),
            model: TeslaModel::Model3,
            category: "matte".to_string(),
            style: "Matte Black".to_string(),
            creator: creator("user1", "WrapMaster Pro", "WrapMaster"),
            download_count: 1245,
            likes: 289,
            created_at: date(2024, 1, 15),
            tags: tags(&["matte", "black", "modern", "stealth"]),
            price: Some(24.99),
            is_free: false,
            file_size: "85 MB".to_string(),
            file_format: "PSD + PNG".to_string(),
        },
        Skin {
            id: "2".to_string(),
            name: "Cyber Chrome Silver".to_string(),
            description: "Futuristic chrome silver with cyberpunk vibes".to_string(),
            image_url: unsplash("1603732551681-2e91159b9dc2", 800),
            thumbnail_url: unsplash("1603732551681-2e91159b9dc2", 400),
            model: TeslaModel::Cybertruck,
            category: "chrome".to_string(),
            style: "Chrome Silver".to_string(),
            creator: creator("user2", "CyberDesigns", "CyberDesigns"),
            download_count: 2890,
            likes: 567,
            created_at: date(2024, 2, 20),
            tags: tags(&["chrome", "futuristic", "silver", "cyberpunk"]),
            price: None,
            is_free: true,
            file_size: "120 MB".to_string(),
            file_format: "AI + PNG".to_string(),
        },
        Skin {
            id: "3".to_string(),
            name: "Carbon Fiber Racing".to_string(),
            description: "Authentic carbon fiber texture with racing stripes".to_string(),
            image_url: unsplash("1621330396173-12c8e5a9348a", 800),
            thumbnail_url: unsplash("1621330396173-12c8e5a9348a", 400),
            model: TeslaModel::ModelY,
            category: "carbon-fiber".to_string(),
            style: "Carbon Fiber".to_string(),
            creator: creator("user3", "RaceWrap Co", "RaceWrap"),
            download_count: 1876,
            likes: 432,
            created_at: date(2024, 3, 10),
            tags: tags(&["carbon", "racing", "performance", "texture"]),
            price: Some(29.99),
            is_free: false,
            file_size: "95 MB".to_string(),
            file_format: "PSD + SVG".to_string(),
        },
        Skin {
            id: "4".to_string(),
            name: "Ocean Blue Gradient".to_string(),
            description: "Deep ocean blue to turquoise gradient".to_string(),
            image_url: unsplash("1586184484493-46fdc5c0f4c8", 800),
            thumbnail_url: unsplash("1586184484493-46fdc5c0f4c8", 400),
            model: TeslaModel::ModelS,
            category: "gradient".to_string(),
            style: "Blue Gradient".to_string(),
            creator: creator("user4", "ColorFlow Studio", "ColorFlow"),
            download_count: 932,
            likes: 198,
            created_at: date(2024, 1, 28),
            tags: tags(&["gradient", "blue", "ocean", "water"]),
            price: None,
            is_free: true,
            file_size: "110 MB".to_string(),
            file_format: "PNG + JPG".to_string(),
        },
        Skin {
            id: "5".to_string(),
            name: "Neon Cyberpunk".to_string(),
            description: "Vibrant neon colors with cyberpunk aesthetics".to_string(),
            image_url: unsplash("1593941707882-a5bba5338fe2", 800),
            thumbnail_url: unsplash("1593941707882-a5bba5338fe2", 400),
            model: TeslaModel::Model3,
            category: "custom".to_string(),
            style: "Neon Theme".to_string(),
            creator: creator("user5", "NeonWraps", "NeonWraps"),
            download_count: 3210,
            likes: 745,
            created_at: date(2024, 2, 5),
            tags: tags(&["neon", "cyberpunk", "vibrant", "night"]),
            price: Some(34.99),
            is_free: false,
            file_size: "150 MB".to_string(),
            file_format: "PSD + AI + PNG".to_string(),
        },
        Skin {
            id: "6".to_string(),
            name: "Classic Pearl White".to_string(),
            description: "Elegant pearl white finish".to_string(),
            image_url: unsplash("1560958089-b8a1929cea89", 800),
            thumbnail_url: unsplash("1560958089-b8a1929cea89", 400),
            model: TeslaModel::ModelX,
            category: "color".to_string(),
            style: "Pearl White".to_string(),
            creator: creator("user6", "ClassicWraps", "ClassicWraps"),
            download_count: 1543,
            likes: 321,
            created_at: date(2024, 3, 1),
            tags: tags(&["white", "pearl", "classic", "elegant"]),
            price: None,
            is_free: true,
            file_size: "75 MB".to_string(),
            file_format: "PNG".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mock_catalog_is_consistent() {
        assert_eq!(skins().len(), 6);
        assert_eq!(categories().len(), 6);

        let category_ids: HashSet<&str> = categories().iter().map(|c| c.id.as_str()).collect();
        for skin in skins() {
            assert!(category_ids.contains(skin.category.as_str()), "{}", skin.id);
            assert_eq!(skin.is_free, skin.price.is_none(), "{}", skin.id);
        }
    }

    #[test]
    fn dates_are_not_the_fallback_epoch() {
        assert!(skins().iter().all(|s| s.created_at > DateTime::<Utc>::default()));
    }
}
