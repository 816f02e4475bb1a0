//! Read-only reference tables, loaded once per run from a data directory.
//!
//! | file          | contents                                              |
//! |---------------|-------------------------------------------------------|
//! | `cjksrc.json` | IRG source attestation per codepoint                  |
//! | `naming.json` | named groups of allowed / prohibited glyph names      |
//! | `jv.json`     | part substitutions for `-jv` glyphs                   |
//! | `mj.json`     | MJ character table rows linking numbering schemes     |
//! | `groups.json` | glyph groups maintained on the wiki                   |
//!
//! A missing file loads as an empty table (with a warning) so that rules
//! depending on it simply find nothing; a malformed file is an error.

use std::path::Path;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const CJK_SOURCES_FILE: &str = "cjksrc.json";
pub const NAMING_FILE: &str = "naming.json";
pub const JV_FILE: &str = "jv.json";
pub const MJ_FILE: &str = "mj.json";
pub const GROUPS_FILE: &str = "groups.json";

/// All reference tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub cjk_sources: Arc<CjkSources>,
    pub naming: Arc<NamingData>,
    pub jv: Arc<JvTable>,
    pub mj: Arc<MjTable>,
    pub groups: Arc<GlyphGroups>,
}

impl ReferenceData {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let data = Self {
            cjk_sources: Arc::new(CjkSources::from_raw(load_table(dir, CJK_SOURCES_FILE)?)),
            naming: Arc::new(NamingData::from_raw(load_table(dir, NAMING_FILE)?)?),
            jv: Arc::new(JvTable::from_raw(load_table(dir, JV_FILE)?)),
            mj: Arc::new(MjTable::from_rows(load_table(dir, MJ_FILE)?)),
            groups: Arc::new(GlyphGroups::from_raw(load_table(dir, GROUPS_FILE)?)),
        };
        debug!(
            dir = %dir.display(),
            sources = data.cjk_sources.len(),
            mj_rows = data.mj.len(),
            "loaded reference data"
        );
        Ok(data)
    }
}

fn load_table<T: DeserializeOwned + Default>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(name);
    if !path.exists() {
        warn!(path = %path.display(), "reference table not found, using an empty table");
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    parse_table(name, &content)
}

/// Parse one table from JSON text.
pub fn parse_table<T: DeserializeOwned>(name: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|source| Error::Table {
        name: name.to_string(),
        source,
    })
}

// ===== cjksrc.json =====

/// Columns of a source attestation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceColumn {
    G = 0,
    T,
    J,
    K,
    KP,
    V,
    H,
    M,
    U,
    S,
    UK,
    CompatibilityVariant,
}

impl SourceColumn {
    /// Column for a region code of a glyph name (`g`, `t`, `kp`, ...).
    pub fn for_region(region: &str) -> Option<Self> {
        Some(match region {
            "g" => SourceColumn::G,
            "t" => SourceColumn::T,
            "j" => SourceColumn::J,
            "k" => SourceColumn::K,
            "kp" => SourceColumn::KP,
            "v" => SourceColumn::V,
            "h" => SourceColumn::H,
            "m" => SourceColumn::M,
            "u" => SourceColumn::U,
            "s" => SourceColumn::S,
            "uk" => SourceColumn::UK,
            _ => return None,
        })
    }
}

type SourceRow = [Option<String>; 12];

#[derive(Debug, Clone, Default)]
pub struct CjkSources {
    rows: AHashMap<String, SourceRow>,
}

impl CjkSources {
    fn from_raw(rows: AHashMap<String, SourceRow>) -> Self {
        Self { rows }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::from_raw(parse_table(CJK_SOURCES_FILE, content)?))
    }

    /// Source of `name` (`uXXXX` or an extension name) in `column`.
    pub fn get(&self, name: &str, column: SourceColumn) -> Option<&str> {
        self.rows.get(name)?[column as usize].as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ===== naming.json =====

#[derive(Debug, Default, Deserialize)]
struct RawNamingGroup {
    #[serde(default)]
    string: Vec<String>,
    #[serde(default)]
    regex: Vec<String>,
}

/// One group of naming rules: literal names plus full-match patterns.
#[derive(Debug, Clone, Default)]
pub struct NamingRules {
    strings: AHashSet<String>,
    regex: Option<Regex>,
}

impl NamingRules {
    pub fn matches(&self, name: &str) -> bool {
        self.strings.contains(name) || self.regex.as_ref().is_some_and(|re| re.is_match(name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamingData {
    groups: AHashMap<String, NamingRules>,
}

impl NamingData {
    fn from_raw(raw: AHashMap<String, RawNamingGroup>) -> Result<Self> {
        let mut groups = AHashMap::with_capacity(raw.len());
        for (group, rules) in raw {
            let regex = if rules.regex.is_empty() {
                None
            } else {
                let pattern = format!("^(?:{})$", rules.regex.join("|"));
                Some(Regex::new(&pattern).map_err(|source| Error::Pattern {
                    group: group.clone(),
                    source,
                })?)
            };
            let strings = rules.string.into_iter().collect();
            groups.insert(group, NamingRules { strings, regex });
        }
        Ok(Self { groups })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_raw(parse_table(NAMING_FILE, content)?)
    }

    /// `true` if `name` matches the group. Unknown groups match nothing.
    pub fn matches(&self, group: &str, name: &str) -> bool {
        self.groups.get(group).is_some_and(|rules| rules.matches(name))
    }

    pub fn group(&self, group: &str) -> Option<&NamingRules> {
        self.groups.get(group)
    }
}

// ===== jv.json =====

#[derive(Debug, Default, Deserialize)]
struct RawJv {
    #[serde(rename = "no-use-part", default)]
    no_use_part: AHashMap<String, Vec<String>>,
    #[serde(rename = "no-apply-jv", default)]
    no_apply_jv: Vec<String>,
}

/// Part substitutions expected in `-jv` (Japanese virtual) glyphs.
#[derive(Debug, Clone, Default)]
pub struct JvTable {
    replacements: AHashMap<String, String>,
    no_apply: AHashSet<String>,
}

impl JvTable {
    fn from_raw(raw: RawJv) -> Self {
        let replacements = raw
            .no_use_part
            .into_iter()
            .flat_map(|(replacement, parts)| {
                parts.into_iter().map(move |part| (part, replacement.clone()))
            })
            .collect();
        Self {
            replacements,
            no_apply: raw.no_apply_jv.into_iter().collect(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::from_raw(parse_table(JV_FILE, content)?))
    }

    /// Part to use instead of `part` in a `-jv` glyph.
    pub fn replacement(&self, part: &str) -> Option<&str> {
        self.replacements.get(part).map(String::as_str)
    }

    /// `true` for glyphs and parts the jv substitutions do not apply to.
    pub fn is_exempt(&self, name: &str) -> bool {
        self.no_apply.contains(name)
    }
}

// ===== mj.json =====

/// A cell of the MJ table: absent, one key or several.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MjCell {
    One(String),
    Many(Vec<String>),
}

impl MjCell {
    fn keys(&self) -> Vec<&str> {
        match self {
            MjCell::One(key) => vec![key.as_str()],
            MjCell::Many(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

/// Columns of an MJ table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MjField {
    Jmj = 0,
    Koseki,
    Juki,
    Nyukan,
    X0213,
    X0212,
    Ucs,
    Ivs,
    Svs,
    Toki,
    Dkw,
    Heisei,
}

const MJ_FIELDS: usize = 12;

/// 平成明朝 prefixes and the GlyphWiki GL-code schemes they correspond to.
const HEISEI_SCHEMES: [(&str, &str); 4] =
    [("JA", "j90"), ("JB", "jsp"), ("JC", "jx1-2000"), ("JD", "jx2")];

/// 区点 to the hex GL code used in glyph names.
pub fn kuten_to_gl(ku: u32, ten: u32) -> String {
    format!("{:02x}{:02x}", ku + 32, ten + 32)
}

/// Hex GL code to 区点.
pub fn gl_to_kuten(gl: &str) -> Option<(u32, u32)> {
    let code = u32::from_str_radix(gl, 16).ok()?;
    Some(((code >> 8).checked_sub(32)?, (code & 0xff).checked_sub(32)?))
}

static MJ_NAME_PATTERNS: Lazy<Vec<(MjField, Regex)>> = Lazy::new(|| {
    [
        (MjField::Ivs, r"^(u[0-9a-f]{4,6}-ue01[0-9a-f]{2})$"),
        (MjField::Svs, r"^(u[0-9a-f]{4,6}-ufe0[0-9a-f])$"),
        (MjField::Ucs, r"^u([0-9a-f]{4,6})(?:-|$)"),
        (MjField::Koseki, r"^koseki-(\d{6})$"),
        (MjField::Jmj, r"^jmj-(\d{6})$"),
        (MjField::Juki, r"^juki-([0-9a-f]{4})$"),
        (MjField::Nyukan, r"^nyukan-([0-9a-f]{4})$"),
        (MjField::Toki, r"^toki-(\d{8})$"),
        (MjField::Dkw, r"^dkw-(\d{5}d{0,2}|h\d{4})$"),
        (MjField::X0213, r"^jx1-200[04]-([0-9a-f]{4})$"),
        (MjField::X0213, r"^jx2-([0-9a-f]{4})$"),
        (MjField::X0212, r"^jsp-([0-9a-f]{4})$"),
        (MjField::Heisei, r"^(j90|jsp|jx1-2000|jx2)-([0-9a-f]{4})$"),
        (MjField::Heisei, r"^heisei-([a-z0-9]+)$"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).unwrap()))
    .collect()
});

static IDS_HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:u2ff[\da-f]|u31ef)-").unwrap());
static HEISEI_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^J[ABCD]\d{4}").unwrap());

#[derive(Debug, Clone, Default)]
pub struct MjTable {
    rows: Vec<Vec<Option<MjCell>>>,
    index: Vec<AHashMap<String, Vec<usize>>>,
}

impl MjTable {
    pub fn from_rows(rows: Vec<Vec<Option<MjCell>>>) -> Self {
        let mut index = vec![AHashMap::<String, Vec<usize>>::new(); MJ_FIELDS];
        for (row_idx, row) in rows.iter().enumerate() {
            for (column, cell) in row.iter().enumerate().take(MJ_FIELDS) {
                let Some(cell) = cell else { continue };
                for key in cell.keys() {
                    index[column]
                        .entry(key.to_lowercase())
                        .or_default()
                        .push(row_idx);
                }
            }
        }
        Self { rows, index }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::from_rows(parse_table(MJ_FILE, content)?))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `field` contains `key`.
    pub fn search(&self, field: MjField, key: &str) -> &[usize] {
        self.index
            .get(field as usize)
            .and_then(|index| index.get(&key.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Glyph names recorded in `field` of row `row`.
    pub fn glyph_names(&self, row: usize, field: MjField) -> Vec<String> {
        self.rows
            .get(row)
            .and_then(|r| r.get(field as usize))
            .and_then(Option::as_ref)
            .map(|cell| {
                cell.keys()
                    .into_iter()
                    .map(|key| key_to_glyph_name(field, key))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// GlyphWiki name of an MJ table key.
pub fn key_to_glyph_name(field: MjField, key: &str) -> String {
    match field {
        MjField::Ucs => format!("u{}", key.to_lowercase()),
        MjField::Ivs | MjField::Svs => key.to_string(),
        MjField::Koseki => format!("koseki-{key}"),
        MjField::Jmj => format!("jmj-{key}"),
        MjField::Juki => format!("juki-{key}"),
        MjField::Nyukan => format!("nyukan-{key}"),
        MjField::X0213 => {
            let rest = key.get(2..).unwrap_or_default();
            if key.starts_with('1') {
                format!("jx1-2004-{rest}")
            } else {
                format!("jx2-{rest}")
            }
        }
        MjField::X0212 => format!("jsp-{key}"),
        MjField::Toki => format!("toki-{key}"),
        MjField::Dkw => format!("dkw-{key}"),
        MjField::Heisei => {
            if HEISEI_KEY_RE.is_match(key) {
                let scheme = HEISEI_SCHEMES
                    .iter()
                    .find(|(prefix, _)| key.starts_with(prefix))
                    .map(|(_, scheme)| *scheme)
                    .unwrap_or_default();
                let ku = key[2..4].parse().unwrap_or(0);
                let ten = key[4..6].parse().unwrap_or(0);
                format!("{scheme}-{}", kuten_to_gl(ku, ten))
            } else {
                format!("heisei-{}", key.to_lowercase())
            }
        }
    }
}

/// MJ table field and key for a glyph name, if the name uses a scheme the
/// table covers.
pub fn glyph_name_to_key(name: &str) -> Option<(MjField, String)> {
    for (field, re) in MJ_NAME_PATTERNS.iter() {
        let Some(caps) = re.captures(name) else {
            continue;
        };
        let key = match field {
            MjField::Ucs if IDS_HEAD_RE.is_match(name) => continue,
            MjField::X0213 => {
                let plane = if name.starts_with("jx1") { "1" } else { "2" };
                format!("{plane}-{}", &caps[1])
            }
            MjField::Heisei if caps.get(2).is_some() => {
                let prefix = HEISEI_SCHEMES
                    .iter()
                    .find(|(_, scheme)| *scheme == &caps[1])
                    .map(|(prefix, _)| *prefix)?;
                let (ku, ten) = gl_to_kuten(&caps[2])?;
                format!("{prefix}{ku:02}{ten:02}")
            }
            _ => caps[1].to_string(),
        };
        return Some((*field, key));
    }
    None
}

// ===== groups.json =====

pub const HALFWIDTH_GLYPHS: &str = "HalfwidthGlyphs";
pub const NON_SPACING_HALFWIDTH: &str = "NonSpacingGlyphs-Halfwidth";
pub const SOURCE_SEPARATION: &str = "SourceSeparation";
pub const UCS_ENCODED_CDP: &str = "UcsEncodedCdp";

/// Named glyph lists.
#[derive(Debug, Clone, Default)]
pub struct GlyphGroups {
    lists: AHashMap<String, Vec<String>>,
    sets: AHashMap<String, AHashSet<String>>,
}

impl GlyphGroups {
    fn from_raw(lists: AHashMap<String, Vec<String>>) -> Self {
        let sets = lists
            .iter()
            .map(|(group, names)| (group.clone(), names.iter().cloned().collect()))
            .collect();
        Self { lists, sets }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::from_raw(parse_table(GROUPS_FILE, content)?))
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.sets.get(group).is_some_and(|set| set.contains(name))
    }

    pub fn members(&self, group: &str) -> &[String] {
        self.lists.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A group stored as alternating key, value entries.
    pub fn pairs(&self, group: &str) -> AHashMap<String, String> {
        self.members(group)
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_sources_lookup() {
        let sources = CjkSources::from_json(
            r#"{"u4e00": ["G0-523B", "T1-4421", "J0-306C", "K0-6C69", null, null, null, null, null, null, null, null],
                "uf900": [null, null, null, "K0-6B69", null, null, null, null, null, null, null, "U+8C48"]}"#,
        )
        .unwrap();
        assert_eq!(sources.get("u4e00", SourceColumn::J), Some("J0-306C"));
        assert_eq!(sources.get("u4e00", SourceColumn::M), None);
        assert_eq!(sources.get("uf900", SourceColumn::CompatibilityVariant), Some("U+8C48"));
        assert_eq!(sources.get("u0020", SourceColumn::J), None);
    }

    #[test]
    fn naming_groups_fullmatch() {
        let naming = NamingData::from_json(
            r#"{"rule": {"string": ["sandbox"], "regex": ["u[\\da-f]{4,6}", "aj1-\\d{5}"]}}"#,
        )
        .unwrap();
        assert!(naming.matches("rule", "sandbox"));
        assert!(naming.matches("rule", "u4e00"));
        assert!(!naming.matches("rule", "u4e00-j"));
        assert!(!naming.matches("dont-create", "u4e00"));
    }

    #[test]
    fn naming_rejects_bad_pattern() {
        let err = NamingData::from_json(r#"{"rule": {"regex": ["("]}}"#).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref group, .. } if group == "rule"));
    }

    #[test]
    fn jv_replacements() {
        let jv = JvTable::from_json(
            r#"{"no-use-part": {"u4ee4-jv": ["u4ee4", "u4ee4-g"]}, "no-apply-jv": ["u5165"]}"#,
        )
        .unwrap();
        assert_eq!(jv.replacement("u4ee4-g"), Some("u4ee4-jv"));
        assert_eq!(jv.replacement("u4ee5"), None);
        assert!(jv.is_exempt("u5165"));
    }

    #[test]
    fn mj_lookup() {
        let mj = MjTable::from_json(
            r#"[["010000", "000010", null, null, null, null, "4E00", null, null, null, "00001", "JA3021"],
                ["010001", null, null, null, null, null, ["4E01", "4E02"], null, null, "00000002", null, null]]"#,
        )
        .unwrap();
        assert_eq!(mj.search(MjField::Ucs, "4e00"), &[0]);
        assert_eq!(mj.search(MjField::Ucs, "4e02"), &[1]);
        assert_eq!(mj.glyph_names(1, MjField::Ucs), vec!["u4e01", "u4e02"]);
        assert_eq!(mj.glyph_names(0, MjField::Heisei), vec!["j90-3e35"]);
        assert!(mj.glyph_names(0, MjField::Toki).is_empty());
    }

    #[test]
    fn glyph_names_to_mj_keys() {
        assert_eq!(glyph_name_to_key("u4e00-j"), Some((MjField::Ucs, "4e00".into())));
        assert_eq!(
            glyph_name_to_key("u4e00-ue0100"),
            Some((MjField::Ivs, "u4e00-ue0100".into()))
        );
        assert_eq!(glyph_name_to_key("u2ff0-u4e00-u4e01"), None);
        assert_eq!(glyph_name_to_key("koseki-000010"), Some((MjField::Koseki, "000010".into())));
        assert_eq!(glyph_name_to_key("jx2-2121"), Some((MjField::X0213, "2-2121".into())));
        assert_eq!(glyph_name_to_key("j90-3021"), Some((MjField::Heisei, "JA1601".into())));
        assert_eq!(glyph_name_to_key("aj1-10000"), None);
    }

    #[test]
    fn groups_pairs() {
        let groups = GlyphGroups::from_json(
            r#"{"UcsEncodedCdp": ["cdp-8c40", "u20000", "cdp-8c41", "u20001"], "HalfwidthGlyphs": ["u0041"]}"#,
        )
        .unwrap();
        assert!(groups.contains(HALFWIDTH_GLYPHS, "u0041"));
        assert!(!groups.contains(SOURCE_SEPARATION, "u0041"));
        let pairs = groups.pairs(UCS_ENCODED_CDP);
        assert_eq!(pairs.get("cdp-8c41").map(String::as_str), Some("u20001"));
    }

    #[test]
    fn missing_directory_loads_empty() {
        let dir = std::env::temp_dir().join(format!("gwv-refdata-missing-{}", std::process::id()));
        let data = ReferenceData::load(&dir).unwrap();
        assert!(data.cjk_sources.is_empty());
        assert!(data.mj.is_empty());
        assert!(!data.naming.matches("rule", "u4e00"));
    }
}
