//! Property-based tests for the line extractor.
//!
//! Generated CS records vary in wavenumber, band and label; the properties
//! checked are the ones every extraction must satisfy:
//! 1. **Selection**: exactly the lines whose band matches produce rows
//! 2. **Order**: rows follow input order
//! 3. **Reciprocal law**: wavelength is always `1e4 / wavenumber`
//! 4. **No panics**: arbitrary text never crashes the extractor

use proptest::prelude::*;

use hitran_lines::{extract, Registry, Rule};

// =============================================================================
// Test Strategies
// =============================================================================

/// (wavenumber, v', v'', branch, J) of one CS record.
fn cs_record() -> impl Strategy<Value = (f64, u32, u32, char, u32)> {
    (
        1.0f64..5000.0,
        0u32..4,
        0u32..4,
        prop_oneof![Just('P'), Just('Q'), Just('R')],
        0u32..120,
    )
}

fn render((wavenumber, v_up, v_lo, branch, j): &(f64, u32, u32, char, u32)) -> String {
    format!(
        " 461 {wavenumber:.6} 1.234E-20 4.567E-01.1000.2000 123.4567.750-.001234 {v_up} {v_lo} {branch} {j} 465542 5 8 2 2 {}.0 {}.0",
        2 * j + 3,
        2 * j + 1
    )
}

fn cs_rule() -> Rule {
    Registry::builtin()
        .get_rule("CS", "v_0")
        .expect("CS/v_0 is built in")
        .clone()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn selects_exactly_matching_lines(records in prop::collection::vec(cs_record(), 0..60)) {
        let input: String = records.iter().map(|r| render(r) + "\n").collect();
        let table = extract(input.as_bytes(), &cs_rule()).unwrap();

        let expected: Vec<String> = records
            .iter()
            .filter(|(_, v_up, v_lo, _, _)| *v_up == 1 && *v_lo == 0)
            .map(|(_, _, _, branch, j)| format!("{branch}{j}"))
            .collect();
        let names: Vec<String> = table.iter().map(|r| r.line_name.clone()).collect();
        prop_assert_eq!(names, expected);
    }

    #[test]
    fn wavelength_is_reciprocal_of_wavenumber(records in prop::collection::vec(cs_record(), 0..40)) {
        let input: String = records.iter().map(|r| render(r) + "\n").collect();
        let table = extract(input.as_bytes(), &cs_rule()).unwrap();

        for row in &table {
            prop_assert_eq!(row.wavelength, 1e4 / row.wavenumber);
            prop_assert_eq!(row.band.as_str(), "1 0");
        }
    }

    #[test]
    fn arbitrary_text_never_panics(input in "[ -~\\n]{0,400}") {
        // Either a clean table or a clean error.
        let _ = extract(input.as_bytes(), &cs_rule());
    }

    #[test]
    fn every_builtin_rule_accepts_empty_input(blank in "[ \\t\\n]{0,20}") {
        let registry = Registry::builtin();
        for (molecule, bands) in registry.list_selections() {
            for band in bands {
                let rule = registry.get_rule(molecule, band).unwrap();
                let table = extract(blank.as_bytes(), rule).unwrap();
                prop_assert!(table.is_empty());
            }
        }
    }
}
