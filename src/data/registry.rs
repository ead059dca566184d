use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::rules::{BandCriteria, LabelField, Rule, TokenSpan};
use crate::error::{HitranError, Result};

static BUILTIN: OnceLock<Registry> = OnceLock::new();

/// Band name → rule, in insertion order.
pub type BandRules = IndexMap<String, Rule>;

/// Molecule → band → extraction rule.
///
/// Order only matters for listing; lookups are by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    molecules: IndexMap<String, BandRules>,
}

impl Registry {
    /// Empty registry, to be filled with [`Registry::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in HITRAN selections, built on first use.
    pub fn builtin() -> &'static Registry {
        BUILTIN.get_or_init(Self::builtin_table)
    }

    fn builtin_table() -> Self {
        let mut molecules: IndexMap<String, BandRules> = IndexMap::new();
        let mut add = |molecule: &str, band: &str, rule: Rule| {
            molecules
                .entry(molecule.to_string())
                .or_default()
                .insert(band.to_string(), rule);
        };

        // Hydrogen cyanide: 8 band tokens, label is two concatenated tokens.
        let hcn = |criteria: &str| {
            Rule::hitran(
                TokenSpan::new(5, 13),
                criteria,
                LabelField::concat(TokenSpan::new(13, 15)),
            )
        };
        add("HCN", "v2_0_1", hcn("0 1 1 0 0 0 0 0"));
        add("HCN", "v2_0_2", hcn("0 2 0 0 0 0 0 0"));
        add("H13CN", "v2_0_1", hcn("0 1 1 0 0 0 0 0"));

        // Acetylene: 12 band tokens, except where the l-doubling field is fused.
        let c2h2 = |criteria: &str| {
            Rule::hitran(
                TokenSpan::new(5, 17),
                criteria,
                LabelField::concat(TokenSpan::new(17, 19)),
            )
        };
        add("C2H2", "v5", c2h2("000 0 1 0 1 u 000 0 0 0 0+ g"));
        add("C2H2", "2v5^0_v5^1", c2h2("000 0 2 0 0+ g 000 0 1 0 1 u"));
        add("C2H2", "2v5^1_v5^1", c2h2("000 0 2 0 2 g 000 0 1 0 1 u"));
        add("C2H2", "v4^1+v5^1_v4^1", c2h2("000 1 1 1 1 u 000 1 0 1 0 g"));
        add(
            "C2H2",
            "v4^1+v5^-1_v4^1",
            Rule::hitran(
                TokenSpan::new(5, 16),
                "000 1 1 1-1+ u 000 1 0 1 0 g",
                LabelField::concat(TokenSpan::new(16, 18)),
            ),
        );
        add("13CCH2", "v5", c2h2("000 0 1 0 1 u 000 0 0 0 0+ g"));

        // Methane: 10 band tokens, comma-joined rotational label.
        let ch4 = |criteria: BandCriteria| {
            Rule::hitran(
                TokenSpan::new(5, 15),
                criteria,
                LabelField::comma(TokenSpan::new(15, 19)),
            )
        };
        add("CH4", "v4_0", ch4("0 0 0 1 1F2 0 0 0 0 1A1".into()));
        add("CH4", "2v4_v4", ch4("0 0 0 2 1F2 0 0 0 1 1F2".into()));
        add(
            "CH4",
            "2v4_v2",
            ch4([
                "0 0 0 2 1A1 0 1 0 0 1E",
                "0 0 0 2 1F2 0 1 0 0 1E",
                "0 0 0 2 1E 0 1 0 0 1E",
            ]
            .into()),
        );

        // Ammonia: label runs up to the 8 trailing tokens.
        add(
            "NH3",
            "v2_0",
            Rule::hitran(
                TokenSpan::new(5, 13),
                [
                    "0100 00 0 A2\" 0000 00 0 A1'",
                    "0100 00 0 A1' 0000 00 0 A1'",
                    "0100 00 0 A2\" 0000 00 0 A2\"",
                    "0100 00 0 A1' 0000 00 0 A2\"",
                ],
                LabelField::comma(TokenSpan::until_end(13, 8)),
            ),
        );

        // Carbon monosulfide.
        add(
            "CS",
            "v_0",
            Rule::hitran(
                TokenSpan::new(5, 7),
                "1 0",
                LabelField::concat(TokenSpan::new(7, 9)),
            ),
        );

        Registry { molecules }
    }

    /// Parse a registry from JSON and validate every rule.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let registry: Registry = serde_json::from_str(text)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Read a JSON rules file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| HitranError::io(path, e))?;
        let registry = Self::from_json_str(&text)?;
        log::debug!(
            "loaded {} molecule(s) from rules file {}",
            registry.molecules.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Pretty JSON form of the whole registry.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace a rule after validating it.
    pub fn insert(&mut self, molecule: &str, band: &str, rule: Rule) -> Result<()> {
        rule.validate()
            .map_err(|reason| invalid_rule(molecule, band, reason))?;
        self.molecules
            .entry(molecule.to_string())
            .or_default()
            .insert(band.to_string(), rule);
        Ok(())
    }

    /// Look up the rule for a molecule/band selection.
    pub fn get_rule(&self, molecule: &str, band: &str) -> Result<&Rule> {
        let bands = self
            .molecules
            .get(molecule)
            .ok_or_else(|| HitranError::UnknownMolecule(molecule.to_string()))?;
        bands.get(band).ok_or_else(|| HitranError::UnknownBand {
            molecule: molecule.to_string(),
            band: band.to_string(),
        })
    }

    /// Every molecule with its band names, in registration order.
    pub fn list_selections(&self) -> Vec<(&str, Vec<&str>)> {
        self.molecules
            .iter()
            .map(|(molecule, bands)| {
                (
                    molecule.as_str(),
                    bands.keys().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        for (molecule, bands) in &self.molecules {
            for (band, rule) in bands {
                rule.validate()
                    .map_err(|reason| invalid_rule(molecule, band, reason))?;
            }
        }
        Ok(())
    }
}

fn invalid_rule(molecule: &str, band: &str, reason: String) -> HitranError {
    HitranError::InvalidRule {
        molecule: molecule.to_string(),
        band: band.to_string(),
        reason,
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Available HITRAN Selections ===")?;
        for (molecule, bands) in self.list_selections() {
            writeln!(f)?;
            writeln!(f, "Molecule: {molecule}")?;
            writeln!(f, "  Available Bands:")?;
            for band in bands {
                writeln!(f, "   - {band}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::rules::TokenIndex;

    #[test]
    fn builtin_lists_all_selections_in_order() {
        let registry = Registry::builtin();
        let selections = registry.list_selections();
        let molecules: Vec<&str> = selections.iter().map(|(m, _)| *m).collect();
        assert_eq!(
            molecules,
            ["HCN", "H13CN", "C2H2", "13CCH2", "CH4", "NH3", "CS"]
        );
        assert_eq!(selections[2].1.len(), 5);
        assert_eq!(selections[4].1, ["v4_0", "2v4_v4", "2v4_v2"]);
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(Registry::builtin(), Registry::builtin()));
    }

    #[test]
    fn builtin_rules_are_valid() {
        let registry = Registry::builtin();
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn cs_rule_shape() {
        let registry = Registry::builtin();
        let rule = registry.get_rule("CS", "v_0").unwrap();
        assert_eq!(rule.band_span, TokenSpan::new(5, 7));
        assert_eq!(rule.band_criteria, BandCriteria::Single("1 0".to_string()));
        assert_eq!(rule.gu.index(), TokenIndex::FromEnd(2));
        assert_eq!(rule.gl.index(), TokenIndex::FromEnd(1));
    }

    #[test]
    fn nh3_uses_any_of() {
        let registry = Registry::builtin();
        let rule = registry.get_rule("NH3", "v2_0").unwrap();
        match &rule.band_criteria {
            BandCriteria::AnyOf(values) => assert_eq!(values.len(), 4),
            other => panic!("expected AnyOf, got {other:?}"),
        }
    }

    #[test]
    fn unknown_lookups() {
        let registry = Registry::builtin();
        assert!(matches!(
            registry.get_rule("XYZ", "v_0"),
            Err(HitranError::UnknownMolecule(m)) if m == "XYZ"
        ));
        assert!(matches!(
            registry.get_rule("CS", "v_9"),
            Err(HitranError::UnknownBand { molecule, band }) if molecule == "CS" && band == "v_9"
        ));
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let registry = Registry::builtin();
        let json = registry.to_json_string().unwrap();
        let back = Registry::from_json_str(&json).unwrap();
        assert_eq!(back, *registry);
        assert_eq!(back.list_selections(), registry.list_selections());
    }

    #[test]
    fn json_with_invalid_rule_is_rejected() {
        let mut json: serde_json::Value =
            serde_json::from_str(&Registry::builtin().to_json_string().unwrap()).unwrap();
        json["CS"]["v_0"]["band_span"]["end"] = serde_json::json!(3);
        let err = Registry::from_json_str(&json.to_string()).unwrap_err();
        assert!(matches!(err, HitranError::InvalidRule { .. }));
    }

    #[test]
    fn insert_extends_registry() {
        let mut registry = Registry::new();
        let rule = Rule::hitran(
            TokenSpan::new(5, 7),
            "2 1",
            LabelField::concat(TokenSpan::new(7, 9)),
        );
        registry.insert("CS", "v_1", rule).unwrap();
        assert!(registry.get_rule("CS", "v_1").is_ok());
        assert!(matches!(
            registry.get_rule("CS", "v_0"),
            Err(HitranError::UnknownBand { .. })
        ));
    }

    #[test]
    fn display_lists_bands() {
        let text = Registry::builtin().to_string();
        assert!(text.starts_with("=== Available HITRAN Selections ==="));
        assert!(text.contains("Molecule: NH3\n  Available Bands:\n   - v2_0\n"));
    }
}
