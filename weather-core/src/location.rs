//! Location name resolution.
//!
//! Maps client-supplied names (casual `台` spellings, short names, English
//! slugs) onto the 22 county/city names used by the CWA dataset.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::WeatherError;

/// Canonical county/city names, in display order.
pub const CANONICAL_LOCATIONS: [&str; 22] = [
    "基隆市", "臺北市", "新北市", "桃園市", "新竹市", "新竹縣", "苗栗縣", "臺中市",
    "彰化縣", "南投縣", "雲林縣", "嘉義市", "嘉義縣", "臺南市", "高雄市", "屏東縣",
    "宜蘭縣", "花蓮縣", "臺東縣", "澎湖縣", "金門縣", "連江縣",
];

/// Location used when a request does not name one.
pub const DEFAULT_LOCATION: &str = "高雄市";

const CASUAL_PREFIX: char = '台';
const FORMAL_PREFIX: char = '臺';

const ALIASES: &[(&str, &str)] = &[
    // casual script
    ("台北市", "臺北市"),
    ("台中市", "臺中市"),
    ("台南市", "臺南市"),
    ("台東縣", "臺東縣"),
    // short names
    ("基隆", "基隆市"),
    ("台北", "臺北市"),
    ("臺北", "臺北市"),
    ("新北", "新北市"),
    ("桃園", "桃園市"),
    ("苗栗", "苗栗縣"),
    ("台中", "臺中市"),
    ("臺中", "臺中市"),
    ("彰化", "彰化縣"),
    ("南投", "南投縣"),
    ("雲林", "雲林縣"),
    ("台南", "臺南市"),
    ("臺南", "臺南市"),
    ("高雄", "高雄市"),
    ("屏東", "屏東縣"),
    ("宜蘭", "宜蘭縣"),
    ("花蓮", "花蓮縣"),
    ("台東", "臺東縣"),
    ("臺東", "臺東縣"),
    ("澎湖", "澎湖縣"),
    ("金門", "金門縣"),
    ("馬祖", "連江縣"),
    ("連江", "連江縣"),
    // English slugs
    ("keelung", "基隆市"),
    ("taipei", "臺北市"),
    ("new-taipei", "新北市"),
    ("newtaipei", "新北市"),
    ("taoyuan", "桃園市"),
    ("hsinchu", "新竹市"),
    ("hsinchu-city", "新竹市"),
    ("hsinchu-county", "新竹縣"),
    ("miaoli", "苗栗縣"),
    ("taichung", "臺中市"),
    ("changhua", "彰化縣"),
    ("nantou", "南投縣"),
    ("yunlin", "雲林縣"),
    ("chiayi", "嘉義市"),
    ("chiayi-city", "嘉義市"),
    ("chiayi-county", "嘉義縣"),
    ("tainan", "臺南市"),
    ("kaohsiung", "高雄市"),
    ("pingtung", "屏東縣"),
    ("yilan", "宜蘭縣"),
    ("hualien", "花蓮縣"),
    ("taitung", "臺東縣"),
    ("penghu", "澎湖縣"),
    ("kinmen", "金門縣"),
    ("lienchiang", "連江縣"),
    ("matsu", "連江縣"),
];

static CANONICAL_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| CANONICAL_LOCATIONS.iter().copied().collect());

static ALIAS_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| ALIASES.iter().copied().collect());

/// Normalize a client-supplied location name.
///
/// Never fails: a name that cannot be mapped is returned trimmed (and with a
/// leading `台` rewritten to `臺`) so that [`is_valid`] can reject it.
pub fn normalize(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(canonical) = ALIAS_TABLE.get(trimmed) {
        return (*canonical).to_string();
    }

    let substituted = match trimmed.strip_prefix(CASUAL_PREFIX) {
        Some(rest) => format!("{FORMAL_PREFIX}{rest}"),
        None => trimmed.to_string(),
    };

    match ALIAS_TABLE.get(substituted.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => substituted,
    }
}

/// Whether `name` is one of the canonical locations.
pub fn is_valid(name: &str) -> bool {
    CANONICAL_SET.contains(name)
}

/// Normalize and validate in one step, returning the interned canonical name.
pub fn resolve(input: &str) -> Result<&'static str, WeatherError> {
    let normalized = normalize(input);
    if normalized.is_empty() {
        return Err(WeatherError::EmptyLocation);
    }

    CANONICAL_SET
        .get(normalized.as_str())
        .copied()
        .ok_or_else(|| WeatherError::UnsupportedLocation {
            input: input.to_string(),
            resolved: normalized,
        })
}
