//! Application control properties (`control.nacp`).

use romid_core::util::read_utf8;

/// Language keys in slot order.
const LANGUAGES: [&str; 17] = [
    "ja", "en_US", "fr", "de", "it", "es", "zh_CN", "ko", "nl", "pt", "ru", "zh_TW", "en_GB",
    "fr_CA", "es_419", "zh_Hans", "zh_Hant",
];

/// Title slots stored in the file.
const SLOT_COUNT: usize = 16;
const SLOT_SIZE: usize = 0x300;
const NAME_SIZE: usize = 0x200;

const DISPLAY_VERSION: std::ops::Range<usize> = 0x3060..0x3070;

/// Bytes worth reading from a NACP entry.
pub(crate) const NACP_SIZE: usize = 0x4000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nacp {
    /// Non-empty titles by language key.
    pub titles: Vec<(&'static str, String)>,
    /// First non-empty publisher across the slots.
    pub publisher: String,
    pub version: String,
}

impl Nacp {
    pub fn parse(data: &[u8]) -> Self {
        let mut nacp = Self::default();
        for (slot, lang) in LANGUAGES.iter().take(SLOT_COUNT).enumerate() {
            let offset = slot * SLOT_SIZE;
            let Some(raw) = data.get(offset..offset + SLOT_SIZE) else {
                break;
            };
            let name = read_utf8(&raw[..NAME_SIZE]);
            let publisher = read_utf8(&raw[NAME_SIZE..]);
            if !name.is_empty() {
                nacp.titles.push((lang, name));
            }
            if nacp.publisher.is_empty() && !publisher.is_empty() {
                nacp.publisher = publisher;
            }
        }
        if let Some(raw) = data.get(DISPLAY_VERSION) {
            nacp.version = read_utf8(raw);
        }
        nacp
    }

    pub fn title(&self, lang: &str) -> Option<&str> {
        self.titles
            .iter()
            .find(|(key, _)| *key == lang)
            .map(|(_, name)| name.as_str())
    }
}
