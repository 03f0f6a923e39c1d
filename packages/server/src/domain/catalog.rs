//! Track id to display name translation.

use std::collections::HashMap;

use super::entity::AddonRecord;

/// Tracks shipped with the game. Checked before the addon mirror.
const BUILTIN_TRACKS: &[(&str, &str)] = &[
    ("abyss", "Abyss"),
    ("alien_signal", "Alien Signal"),
    ("ancient_colosseum_labrynth", "Ancient Colosseum Labrynth"),
    ("arena_candela_city", "Candela City"),
    ("battleisland", "Battle Island"),
    ("black_forest", "Black Forest"),
    ("candela_city", "Candela City"),
    ("cave", "Cave X"),
    ("cocoa_temple", "Cocoa Temple"),
    ("cornfield_crossing", "Cornfield Crossing"),
    ("endcutscene", "What the fuck?"),
    ("featunlock", "lina is the best!!"),
    ("fortmagma", "Fort Magma"),
    ("gplose", "You lost? Too bad."),
    ("gpwin", "Huh?"),
    ("gran_paradiso_island", "Gran Paradiso Island"),
    ("hacienda", "Hacienda"),
    ("hole_drop", "Hole Drop"),
    ("icy_soccer_field", "Icy Soccer Field"),
    ("introcutscene", "Intro Cutscene"),
    ("introcutscene2", "Intro Cutscene (Part 2)"),
    ("lasdunasarena", "Las Dunas Arena"),
    ("lighthouse", "Around the Lighthouse"),
    ("mines", "Old Mine"),
    ("minigolf", "Minigolf"),
    ("oasis", "Oasis"),
    ("olivermath", "Oliver's Math Class"),
    ("overworld", "Overworld"),
    ("pumpkin_park", "Pumpkin Park"),
    ("ravenbridge_mansion", "Ravenbridge Mansion"),
    ("sandtrack", "Shifting Sands"),
    ("scotland", "Nessie's Pond"),
    ("snowmountain", "Northern Resort"),
    ("snowtuxpeak", "Snow Peak"),
    ("soccer_field", "Soccer Field"),
    ("stadium", "The Stadium"),
    ("stk_enterprise", "STK Enterprise"),
    ("temple", "Temple"),
    ("tutorial", "Tutorial"),
    ("volcano_island", "Volcan Island"),
    ("xr591", "XR591"),
    ("zengarden", "Zen Garden"),
];

const ADDON_PREFIX: &str = "addon_";

/// In-memory view of the addon catalog
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    addons: HashMap<String, String>,
}

impl TrackCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the addon names with `records`
    pub fn refresh(&mut self, records: &[AddonRecord]) {
        self.addons = records
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect();
    }

    pub fn addon_count(&self) -> usize {
        self.addons.len()
    }

    /// Human-readable name for a track id as reported by a server.
    ///
    /// An empty id means the server has no track loaded.
    pub fn display_name(&self, track_id: &str) -> String {
        let id = track_id.strip_prefix(ADDON_PREFIX).unwrap_or(track_id);

        if let Some((_, name)) = BUILTIN_TRACKS.iter().find(|(key, _)| *key == id) {
            return (*name).to_string();
        }
        if let Some(name) = self.addons.get(id) {
            return name.clone();
        }
        if id.is_empty() {
            "None".to_string()
        } else {
            format!("Unknown track (ID: `{id}`)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addon(id: &str, name: &str) -> AddonRecord {
        AddonRecord {
            id: id.to_string(),
            name: name.to_string(),
            file: format!("https://example.invalid/{id}.zip"),
            date: 1_700_000_000,
            uploader: "uploader".to_string(),
            designer: "designer".to_string(),
            description: String::new(),
            image: String::new(),
            format: 7,
            revision: 1,
            status: 0,
            size: 1024,
            rating: 2.5,
        }
    }

    #[test]
    fn test_builtin_track_names() {
        // テスト項目: 組み込みトラックは addon_ 接頭辞の有無に関わらず名前が引ける
        let catalog = TrackCatalog::new();

        assert_eq!(catalog.display_name("abyss"), "Abyss");
        assert_eq!(catalog.display_name("addon_zengarden"), "Zen Garden");
        assert_eq!(catalog.display_name("scotland"), "Nessie's Pond");
    }

    #[test]
    fn test_addon_track_names() {
        // テスト項目: アドオンのトラック名はカタログ更新後に引ける
        // given (前提条件):
        let mut catalog = TrackCatalog::new();
        assert_eq!(
            catalog.display_name("addon_frosty_peak"),
            "Unknown track (ID: `frosty_peak`)"
        );

        // when (操作):
        catalog.refresh(&[addon("frosty_peak", "Frosty Peak")]);

        // then (期待する結果):
        assert_eq!(catalog.addon_count(), 1);
        assert_eq!(catalog.display_name("addon_frosty_peak"), "Frosty Peak");
    }

    #[test]
    fn test_builtin_takes_priority_over_addon() {
        // テスト項目: 同じ ID なら組み込みトラックの名前が優先される
        let mut catalog = TrackCatalog::new();
        catalog.refresh(&[addon("hacienda", "Someone's Hacienda")]);

        assert_eq!(catalog.display_name("hacienda"), "Hacienda");
    }

    #[test]
    fn test_empty_track_id() {
        // テスト項目: トラック未選択は "None" と表示される
        assert_eq!(TrackCatalog::new().display_name(""), "None");
    }
}
