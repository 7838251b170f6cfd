//! Catalog classification and journal ordering of target identifiers.
//!
//! Identifiers are matched against an ordered rule table; the first rule
//! that matches wins, so "Mars" is a solar-system body even though it starts
//! with `M`. Within a category, catalog numbers sort numerically.

use std::cmp::Ordering;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use regex::Regex;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::cli::{AppContext, ClassifyArgs};

/// Catalog families, declared in journal display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    SolarSystem,
    MilkyWay,
    Messier,
    Ngc,
    Ic,
    Stock,
    Melotte,
    Collinder,
    PerekKohoutek,
    Barnard,
    Hickson,
    Abell,
    Ugc,
    Steph,
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::SolarSystem,
        Category::MilkyWay,
        Category::Messier,
        Category::Ngc,
        Category::Ic,
        Category::Stock,
        Category::Melotte,
        Category::Collinder,
        Category::PerekKohoutek,
        Category::Barnard,
        Category::Hickson,
        Category::Abell,
        Category::Ugc,
        Category::Steph,
        Category::Unclassified,
    ];

    /// Section title used in the by-target journal.
    pub fn title(self) -> &'static str {
        match self {
            Category::SolarSystem => "Solar System",
            Category::MilkyWay => "Milky Way",
            Category::Messier => "Messier Catalogue",
            Category::Ngc => "New General Catalogue (NGC)",
            Category::Ic => "Index Catalogue (IC)",
            Category::Stock => "Stock Catalogue",
            Category::Melotte => "Melotte Catalogue",
            Category::Collinder => "Collinder Catalogue",
            Category::PerekKohoutek => "Perek-Kohoutek Catalogue",
            Category::Barnard => "Barnard Catalogue",
            Category::Hickson => "Hickson Compact Group Catalogue",
            Category::Abell => "Abell Catalogue",
            Category::Ugc => "Uppsala General Catalogue",
            Category::Steph => "Steph Catalogue",
            Category::Unclassified => "Stars and unclassified targets",
        }
    }
}

/// Ordered (pattern, category) rules. Order is significant.
static RULES: LazyLock<Vec<(Regex, Category)>> = LazyLock::new(|| {
    [
        (
            r"(?i)^(sun|moon|mercury|venus|mars|asteroid|jupiter|saturn|uranus|neptune|pluto|comet)",
            Category::SolarSystem,
        ),
        (r"(?i)^milkyway", Category::MilkyWay),
        (r"^[mM][0-9]", Category::Messier),
        (r"^(ngc|NGC)[0-9]", Category::Ngc),
        (r"^(ic|IC)[0-9]", Category::Ic),
        (r"(?i)^stock[0-9]", Category::Stock),
        (r"(?i)^mel[0-9]", Category::Melotte),
        (r"(?i)^cr[0-9]", Category::Collinder),
        (r"^(pk|PK)[0-9]", Category::PerekKohoutek),
        (r"^(b|B|Barnard|BARNARD)[0-9]", Category::Barnard),
        (r"^(hcg|HCG|Hickson Compact Group)[0-9]", Category::Hickson),
        (r"^(Abell|ABELL)[0-9]", Category::Abell),
        (r"^(ugc|UGC)[0-9]", Category::Ugc),
        (r"^Steph[0-9]", Category::Steph),
    ]
    .into_iter()
    .map(|(pattern, category)| {
        // Patterns are literals checked by the tests below.
        let re = Regex::new(pattern).unwrap_or_else(|e| panic!("bad catalog rule {pattern}: {e}"));
        (re, category)
    })
    .collect()
});

/// Classify a target identifier (a unit key or a bare target name).
pub fn classify(identifier: &str) -> Category {
    RULES
        .iter()
        .find(|(re, _)| re.is_match(identifier))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Unclassified)
}

/// Catalog number embedded in an identifier: every digit concatenated.
/// No digits means 0; overlong numbers saturate.
pub fn catalog_number(identifier: &str) -> u64 {
    let digits: String = identifier.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Numeric order on the embedded catalog number, lexical on ties.
pub fn compare_within_category(a: &str, b: &str) -> Ordering {
    catalog_number(a)
        .cmp(&catalog_number(b))
        .then_with(|| a.cmp(b))
}

/// Fixed slots for the solar system; anything else is appended afterwards.
const SOLAR_SYSTEM_SLOTS: [&str; 10] = [
    "sun", "moon", "mercury", "venus", "mars", "asteroid", "jupiter", "saturn", "uranus", "neptune",
];

/// Sort identifiers into journal order: category-major, each category
/// ordered by its own rule. `identifiers` must be in encounter order, which
/// is preserved for the Milky Way and for non-slot solar-system entries.
pub fn sort_identifiers<I, S>(identifiers: I) -> Vec<(Category, String)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); Category::ALL.len()];
    let mut slots: [Option<String>; SOLAR_SYSTEM_SLOTS.len()] = Default::default();
    let mut extra_solar = Vec::new();

    for id in identifiers {
        let id: String = id.into();
        match classify(&id) {
            Category::SolarSystem => {
                let slot = SOLAR_SYSTEM_SLOTS
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(&id));
                match slot {
                    Some(i) if slots[i].is_none() => slots[i] = Some(id),
                    _ => extra_solar.push(id),
                }
            }
            category => buckets[category as usize].push(id),
        }
    }

    buckets[Category::SolarSystem as usize] = slots.into_iter().flatten().chain(extra_solar).collect();

    for category in Category::ALL {
        let bucket = &mut buckets[category as usize];
        match category {
            Category::SolarSystem | Category::MilkyWay => {}
            Category::Unclassified => bucket.sort(),
            _ => bucket.sort_by(|a, b| compare_within_category(a, b)),
        }
    }

    Category::ALL
        .into_iter()
        .zip(buckets)
        .flat_map(|(category, ids)| ids.into_iter().map(move |id| (category, id)))
        .collect()
}

#[derive(Serialize, Tabled)]
struct Classified {
    identifier: String,
    #[tabled(skip)]
    category: Category,
    #[serde(skip)]
    #[tabled(rename = "category")]
    title: &'static str,
    #[tabled(rename = "catalog no.")]
    number: u64,
}

pub fn run(args: ClassifyArgs, ctx: &AppContext) -> Result<()> {
    let pairs: Vec<(Category, String)> = if args.sort {
        sort_identifiers(args.identifiers)
    } else {
        args.identifiers
            .into_iter()
            .map(|id| (classify(&id), id))
            .collect()
    };

    let rows: Vec<Classified> = pairs
        .into_iter()
        .map(|(category, identifier)| Classified {
            number: catalog_number(&identifier),
            identifier,
            category,
            title: category.title(),
        })
        .collect();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialize classification")?
        );
        return Ok(());
    }

    if ctx.quiet {
        for row in &rows {
            println!("{}\t{}", row.identifier, row.title);
        }
        return Ok(());
    }

    let unclassified = rows
        .iter()
        .filter(|r| r.category == Category::Unclassified)
        .count();
    println!("{}", Table::new(&rows));
    if unclassified > 0 {
        let note = format!("{unclassified} identifier(s) matched no catalog");
        if ctx.no_color {
            println!("{note}");
        } else {
            println!("{}", note.yellow());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_rule_compiles() {
        assert_eq!(RULES.len(), Category::ALL.len() - 1);
    }

    #[test]
    fn classifies_each_catalog() {
        let cases = [
            ("Jupiter", Category::SolarSystem),
            ("moon", Category::SolarSystem),
            ("Comet", Category::SolarSystem),
            ("Venus-Jupiter", Category::SolarSystem),
            ("MilkyWay", Category::MilkyWay),
            ("M42_Ori", Category::Messier),
            ("m13_Her", Category::Messier),
            ("NGC7000_Cyg", Category::Ngc),
            ("IC434_Ori", Category::Ic),
            ("STOCK2_Cas", Category::Stock),
            ("Mel111_Com", Category::Melotte),
            ("Cr399_Vul", Category::Collinder),
            ("PK64+5.1_Cyg", Category::PerekKohoutek),
            ("B33_Ori", Category::Barnard),
            ("Barnard86_Sgr", Category::Barnard),
            ("HCG68_CVn", Category::Hickson),
            ("Abell426_Per", Category::Abell),
            ("UGC5470_Leo", Category::Ugc),
            ("Steph1_Lyr", Category::Steph),
            ("Ori_Betelgeuse", Category::Unclassified),
            ("Albireo_Cyg", Category::Unclassified),
        ];
        for (id, expected) in cases {
            assert_eq!(classify(id), expected, "{id}");
        }
    }

    #[test]
    fn first_match_wins() {
        // Solar system precedes Messier.
        assert_eq!(classify("Mars"), Category::SolarSystem);
        assert_eq!(classify("Mercury_M44"), Category::SolarSystem);
        // A catalog prefix needs a digit right after it.
        assert_eq!(classify("Mizar_UMa"), Category::Unclassified);
        assert_eq!(classify("NGC_Cyg"), Category::Unclassified);
        // Case variants the rules do not list.
        assert_eq!(classify("Ngc7000"), Category::Unclassified);
        assert_eq!(classify("steph1"), Category::Unclassified);
    }

    #[test]
    fn numeric_order_beats_lexical_order() {
        assert_eq!(compare_within_category("NGC7", "NGC70"), Ordering::Less);
        assert_eq!(compare_within_category("NGC70", "NGC700"), Ordering::Less);
        assert_eq!(compare_within_category("M9", "M10"), Ordering::Less);
        assert_eq!(compare_within_category("M31", "M31"), Ordering::Equal);
    }

    #[test]
    fn catalog_number_concatenates_digits() {
        assert_eq!(catalog_number("NGC7000_Cyg"), 7000);
        assert_eq!(catalog_number("PK64+5.1_Cyg"), 6451);
        assert_eq!(catalog_number("Albireo"), 0);
        assert_eq!(catalog_number("NGC99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn solar_system_uses_fixed_slots_then_encounter_order() {
        let sorted = sort_identifiers([
            "Venus-Jupiter",
            "Saturn",
            "Comet",
            "Moon",
            "Pluto",
            "Sun",
            "Asteroid",
        ]);
        let ids: Vec<_> = sorted.into_iter().map(|(_, id)| id).collect();
        assert_eq!(
            ids,
            vec!["Sun", "Moon", "Asteroid", "Saturn", "Venus-Jupiter", "Comet", "Pluto"]
        );
    }

    #[test]
    fn journal_order_is_category_major() {
        let sorted = sort_identifiers([
            "Ori_Rigel",
            "NGC70_And",
            "M42_Ori",
            "NGC7_Scl",
            "Jupiter",
            "Cyg_Albireo",
            "MilkyWay",
            "M8_Sgr",
        ]);
        assert_eq!(
            sorted,
            vec![
                (Category::SolarSystem, "Jupiter".to_string()),
                (Category::MilkyWay, "MilkyWay".to_string()),
                (Category::Messier, "M8_Sgr".to_string()),
                (Category::Messier, "M42_Ori".to_string()),
                (Category::Ngc, "NGC7_Scl".to_string()),
                (Category::Ngc, "NGC70_And".to_string()),
                (Category::Unclassified, "Cyg_Albireo".to_string()),
                (Category::Unclassified, "Ori_Rigel".to_string()),
            ]
        );
    }

    proptest! {
        #[test]
        fn classification_is_pure(id in "\\PC{0,24}") {
            prop_assert_eq!(classify(&id), classify(&id));
        }

        #[test]
        fn smaller_catalog_number_sorts_first(a in 0u32..100_000, b in 0u32..100_000) {
            prop_assume!(a < b);
            let (x, y) = (format!("NGC{a}"), format!("NGC{b}"));
            prop_assert_eq!(compare_within_category(&x, &y), Ordering::Less);
            prop_assert_eq!(classify(&x), classify(&y));
        }
    }
}
