use serde::{Deserialize, Serialize};

/// Regions recognized in No-Intro style filename tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Japan,
    Usa,
    Europe,
    World,
    Korea,
    China,
    Taiwan,
    Asia,
    Australia,
    Brazil,
    Canada,
    France,
    Germany,
    Italy,
    Spain,
    Sweden,
    Netherlands,
}

const ALL_REGIONS: &[Region] = &[
    Region::Japan,
    Region::Usa,
    Region::Europe,
    Region::World,
    Region::Korea,
    Region::China,
    Region::Taiwan,
    Region::Asia,
    Region::Australia,
    Region::Brazil,
    Region::Canada,
    Region::France,
    Region::Germany,
    Region::Italy,
    Region::Spain,
    Region::Sweden,
    Region::Netherlands,
];

impl Region {
    /// Returns the full name of this region, as stored in `RomInfo::region`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Japan => "Japan",
            Self::Usa => "USA",
            Self::Europe => "Europe",
            Self::World => "World",
            Self::Korea => "Korea",
            Self::China => "China",
            Self::Taiwan => "Taiwan",
            Self::Asia => "Asia",
            Self::Australia => "Australia",
            Self::Brazil => "Brazil",
            Self::Canada => "Canada",
            Self::France => "France",
            Self::Germany => "Germany",
            Self::Italy => "Italy",
            Self::Spain => "Spain",
            Self::Sweden => "Sweden",
            Self::Netherlands => "Netherlands",
        }
    }

    /// Short tags accepted in addition to the full name.
    fn abbreviations(&self) -> &'static [&'static str] {
        match self {
            Self::Japan => &["JP", "JPN", "J"],
            Self::Usa => &["US", "U"],
            Self::Europe => &["EU", "EUR", "E"],
            Self::World => &["W"],
            Self::Korea => &["KR", "KOR"],
            Self::China => &["CN", "CHN"],
            Self::Taiwan => &["TW"],
            Self::Asia => &[],
            Self::Australia => &["AU", "AUS"],
            Self::Brazil => &["BR", "BRA"],
            Self::Canada => &["CA", "CAN"],
            Self::France => &["FR", "FRA"],
            Self::Germany => &["DE", "GER"],
            Self::Italy => &["IT", "ITA"],
            Self::Spain => &["ES", "SPA"],
            Self::Sweden => &["SE", "SWE"],
            Self::Netherlands => &["NL", "NED"],
        }
    }

    /// Match a full region name exactly (e.g. `"Japan"`, `"USA"`).
    pub fn from_full_name(tag: &str) -> Option<Self> {
        ALL_REGIONS.iter().copied().find(|r| r.name() == tag)
    }

    /// Match a full region name or a known abbreviation (e.g. `"JPN"`, `"U"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::from_full_name(tag)
            .or_else(|| ALL_REGIONS.iter().copied().find(|r| r.abbreviations().contains(&tag)))
    }

    pub fn all() -> &'static [Region] {
        ALL_REGIONS
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
