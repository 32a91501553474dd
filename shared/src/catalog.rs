//! Form vocabularies for single-record predictions
//!
//! The form shows French plant names; the plant encoder only knows the
//! English codes, so the display name is mapped before encoding.

use serde::Serialize;

/// French display name -> plant code (22 entries)
pub const PLANTS: [(&str, &str); 22] = [
    ("Riz", "rice"),
    ("Pois chiche", "chickpea"),
    ("Lentille", "lentil"),
    ("Grenade", "pomegranate"),
    ("Banane", "banana"),
    ("Pomme", "apple"),
    ("Orange", "orange"),
    ("Papaye", "papaya"),
    ("Café", "coffee"),
    ("Maïs", "maize"),
    ("Haricot rouge", "kidneybeans"),
    ("Pois d'Angole", "pigeonpeas"),
    ("Haricot Moth", "mothbeans"),
    ("Haricot mungo", "mungbean"),
    ("Urd (haricot noir)", "blackgram"),
    ("Mangue", "mango"),
    ("Pastèque", "watermelon"),
    ("Melon", "muskmelon"),
    ("Coco", "coconut"),
    ("Coton", "cotton"),
    ("Jute", "jute"),
    ("Raisin", "grapes"),
];

pub const SOIL_TYPES: [&str; 9] = [
    "limoneux",
    "sablo-limoneux",
    "argilo-limoneux",
    "sablé",
    "volcanique",
    "argileux",
    "calcaire",
    "sablo-argileux",
    "alluvial",
];

pub const SEASONS: [&str; 4] = ["Hiver", "Printemps", "Été", "Automne"];

/// Plant code for a French display name
pub fn plant_code(display_name: &str) -> Option<&'static str> {
    PLANTS
        .iter()
        .find(|(name, _)| *name == display_name)
        .map(|(_, code)| *code)
}

/// French display name for a plant code
pub fn plant_display_name(code: &str) -> Option<&'static str> {
    PLANTS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Accept either a French display name or a plant code.
///
/// Unknown input is returned unchanged so the encoder reports it.
pub fn resolve_plant(input: &str) -> &str {
    plant_code(input).unwrap_or(input)
}

#[derive(Debug, Clone, Serialize)]
pub struct PlantOption {
    pub label_fr: &'static str,
    pub code: &'static str,
}

/// Everything the prediction form offers
#[derive(Debug, Clone, Serialize)]
pub struct FormCatalog {
    pub plants: Vec<PlantOption>,
    pub soil_types: Vec<&'static str>,
    pub seasons: Vec<&'static str>,
    pub feature_order: Vec<&'static str>,
}

pub fn form_catalog() -> FormCatalog {
    FormCatalog {
        plants: PLANTS
            .iter()
            .map(|&(label_fr, code)| PlantOption { label_fr, code })
            .collect(),
        soil_types: SOIL_TYPES.to_vec(),
        seasons: SEASONS.to_vec(),
        feature_order: crate::models::FEATURE_ORDER.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_code_lookup() {
        assert_eq!(plant_code("Riz"), Some("rice"));
        assert_eq!(plant_code("Urd (haricot noir)"), Some("blackgram"));
        assert_eq!(plant_code("Durian"), None);
    }

    #[test]
    fn test_resolve_plant_accepts_codes() {
        assert_eq!(resolve_plant("Maïs"), "maize");
        assert_eq!(resolve_plant("maize"), "maize");
        assert_eq!(resolve_plant("durian"), "durian");
    }

    #[test]
    fn test_display_name_round_trip() {
        for (name, code) in PLANTS {
            assert_eq!(plant_display_name(code), Some(name));
            assert_eq!(plant_code(name), Some(code));
        }
    }

    #[test]
    fn test_catalog_sizes() {
        let catalog = form_catalog();
        assert_eq!(catalog.plants.len(), 22);
        assert_eq!(catalog.soil_types.len(), 9);
        assert_eq!(catalog.seasons.len(), 4);
        assert_eq!(catalog.feature_order.len(), 15);
    }
}
