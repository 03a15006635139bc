//! Typed registry of scenarios, dataset targets, and resolution sets.
//!
//! This module replaces stringly-typed scenario handling with proper Rust
//! enums that provide compile-time validation and exhaustive matching.
//! A scenario expands to an ordered list of concrete targets; each target
//! carries a command-line template and a reference to one resolution set.
//!
//! Resolution-set references are enum-typed, so a dangling reference cannot
//! be expressed. `validate_closure` still walks every table row eagerly so
//! callers can fail fast before launching anything expensive.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, SurfgenError};

/// Scenario selector understood by the jobscript generator.
///
/// The string forms are the exact names accepted on the command line and
/// embedded in namelist filenames. `Crop` and `CropGlobalFuture` are
/// aggregates that expand to several concrete targets; every other
/// scenario expands to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum Scenario {
    #[strum(serialize = "global-present")]
    GlobalPresent,
    #[strum(serialize = "global-present-low-res")]
    GlobalPresentLowRes,
    #[strum(serialize = "global-present-nldas")]
    GlobalPresentNldas,
    #[strum(serialize = "global-hist-4x5")]
    GlobalHist4x5,
    #[strum(serialize = "crop-tropics-present")]
    CropTropicsPresent,
    #[strum(serialize = "crop")]
    Crop,
    #[strum(serialize = "crop-global-present")]
    CropGlobalPresent,
    #[strum(serialize = "crop-global-present-low-res")]
    CropGlobalPresentLowRes,
    #[strum(serialize = "crop-global-present-ne16np4")]
    CropGlobalPresentNe16,
    #[strum(serialize = "crop-global-present-ne120np4")]
    CropGlobalPresentNe120,
    #[strum(serialize = "crop-global-present-0.125")]
    CropGlobalPresentEighth,
    #[strum(serialize = "crop-global-1850")]
    CropGlobal1850,
    #[strum(serialize = "crop-global-1850-low-res")]
    CropGlobal1850LowRes,
    #[strum(serialize = "crop-global-1850-ne16np4")]
    CropGlobal1850Ne16,
    #[strum(serialize = "crop-global-1850-ne120np4")]
    CropGlobal1850Ne120,
    #[strum(serialize = "crop-global-hist")]
    CropGlobalHist,
    #[strum(serialize = "crop-global-future")]
    CropGlobalFuture,
    #[strum(serialize = "crop-global-SSP1-1.9")]
    CropGlobalSsp1p19,
    #[strum(serialize = "crop-global-SSP1-2.6")]
    CropGlobalSsp1p26,
    #[strum(serialize = "crop-global-SSP2-4.5")]
    CropGlobalSsp2p45,
    #[strum(serialize = "crop-global-SSP2-4.5-low-res")]
    CropGlobalSsp2p45LowRes,
    #[strum(serialize = "crop-global-SSP2-4.5-hi-res")]
    CropGlobalSsp2p45HiRes,
    #[strum(serialize = "crop-global-SSP3-7.0")]
    CropGlobalSsp3p70,
    #[strum(serialize = "crop-global-SSP4-3.4")]
    CropGlobalSsp4p34,
    #[strum(serialize = "crop-global-SSP4-6.0")]
    CropGlobalSsp4p60,
    #[strum(serialize = "crop-global-SSP5-3.4")]
    CropGlobalSsp5p34,
    #[strum(serialize = "crop-global-SSP5-8.5")]
    CropGlobalSsp5p85,
    #[strum(serialize = "crop-global-SSP5-8.5-other")]
    CropGlobalSsp5p85Other,
}

impl Scenario {
    /// Expand this scenario into its ordered list of concrete targets.
    ///
    /// Order is load-bearing: it determines namelist generation order and
    /// the run-block order in the generated jobscript. Aggregates use a
    /// fixed lookup; everything else is a singleton of itself.
    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Self::Crop => vec![
                Self::CropGlobalPresent,
                Self::CropGlobal1850,
                Self::CropGlobalHist,
            ],
            Self::CropGlobalFuture => vec![
                Self::CropGlobalSsp1p26,
                Self::CropGlobalSsp3p70,
                Self::CropGlobalSsp5p34,
                Self::CropGlobalSsp2p45,
                Self::CropGlobalSsp1p19,
                Self::CropGlobalSsp4p34,
                Self::CropGlobalSsp4p60,
                Self::CropGlobalSsp5p85,
                Self::CropGlobalSsp5p85Other,
            ],
            other => vec![other],
        }
    }

    /// True if this scenario expands to more than one target.
    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::Crop | Self::CropGlobalFuture)
    }

    /// Parse a scenario name, mapping failure to a configuration error.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| {
            SurfgenError::config(format!("scenario {name} is NOT in valid scenarios"))
        })
    }
}

/// Named, ordered set of grid resolutions consumed by the external generator.
///
/// Token order is preserved exactly; iteration over a set is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
pub enum ResolutionSet {
    #[strum(serialize = "standard_res_no_crop")]
    StandardResNoCrop,
    #[strum(serialize = "low_res_no_crop")]
    LowResNoCrop,
    #[strum(serialize = "low_res_all")]
    LowResAll,
    #[strum(serialize = "hi_res_all")]
    HiResAll,
    #[strum(serialize = "standard_res")]
    StandardRes,
    #[strum(serialize = "low_res")]
    LowRes,
    #[strum(serialize = "4x5_res")]
    FourByFiveRes,
    #[strum(serialize = "nldas_res")]
    NldasRes,
    #[strum(serialize = "5x5_amazon_res")]
    AmazonRes,
    #[strum(serialize = "ne16np4_res")]
    Ne16Res,
    #[strum(serialize = "ne120np4_res")]
    Ne120Res,
}

impl ResolutionSet {
    /// The ordered resolution tokens of this set.
    pub fn resolutions(self) -> &'static [&'static str] {
        match self {
            Self::StandardResNoCrop => &["0.9x1.25", "1.9x2.5"],
            Self::LowResNoCrop => &["10x15"],
            Self::LowResAll => &["10x15", "ne3np4.pg3"],
            Self::HiResAll => &["ne120np4.pg3"],
            Self::StandardRes => &["0.9x1.25", "1.9x2.5", "C96", "ne30np4.pg3", "mpasa120"],
            Self::LowRes => &["10x15", "4x5", "ne3np4.pg3", "ne5np4.pg3", "C24", "mpasa480"],
            Self::FourByFiveRes => &["10x15", "4x5", "C24", "mpasa480"],
            Self::NldasRes => &["0.125nldas2"],
            Self::AmazonRes => &["5x5_amazon"],
            Self::Ne16Res => &["C48", "ne16np4"],
            Self::Ne120Res => &[
                "ne120np4.pg3",
                "ne0np4.ARCTICGRIS.ne30x8",
                "ne0np4.ARCTIC.ne30x4",
                "ne0np4CONUS.ne30x8",
            ],
        }
    }
}

/// One dataset-generation target: the argument template handed to the
/// namelist entry point, plus the resolution set it is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Template tokens, in argv order, without the trailing resolution.
    pub template: &'static [&'static str],
    /// Resolution set the template is instantiated over.
    pub resolution_set: ResolutionSet,
}

// Transient-pathway template: 1850-2100 transient with the given SSP-RCP.
// The flag layout is identical across pathways.
macro_rules! ssp_template {
    ($pathway:literal) => {
        &[
            "--start-year",
            "1850",
            "--end-year",
            "2100",
            "--nosurfdata",
            "--ssp-rcp",
            $pathway,
            "--res",
        ]
    };
}

/// Look up the dataset entry for a concrete target.
///
/// Aggregates (`crop`, `crop-global-future`) and `crop-global-SSP5-8.5-other`
/// have no entry; the latter is a gap carried over from the upstream table.
pub fn dataset_entry(target: Scenario) -> Option<DatasetEntry> {
    use ResolutionSet::*;
    use Scenario::*;

    const PRESENT_NOCROP: &[&str] = &[
        "--start-year", "2000", "--end-year", "2000", "--nocrop", "--vic", "--res",
    ];
    const PRESENT: &[&str] = &["--start-year", "2000", "--end-year", "2000", "--res"];
    const Y1850: &[&str] = &["--start-year", "1850", "--end-year", "1850", "--res"];

    let entry = |template, resolution_set| {
        Some(DatasetEntry {
            template,
            resolution_set,
        })
    };

    match target {
        GlobalPresent => entry(PRESENT_NOCROP, StandardResNoCrop),
        GlobalPresentLowRes => entry(PRESENT_NOCROP, LowResNoCrop),
        GlobalPresentNldas => entry(PRESENT_NOCROP, NldasRes),
        GlobalHist4x5 => entry(
            &["--start-year", "1850", "--end-year", "2015", "--nocrop", "--res"],
            FourByFiveRes,
        ),
        CropTropicsPresent => entry(PRESENT, AmazonRes),
        CropGlobalPresent => entry(PRESENT, StandardRes),
        CropGlobalPresentLowRes => entry(PRESENT, LowRes),
        CropGlobalPresentNe16 => entry(PRESENT, Ne16Res),
        CropGlobalPresentNe120 => entry(PRESENT, Ne120Res),
        CropGlobalPresentEighth => entry(
            &["--start-year", "2000", "--end-year", "2000", "--hirespft", "--res"],
            NldasRes,
        ),
        CropGlobal1850 => entry(Y1850, StandardRes),
        CropGlobal1850LowRes => entry(Y1850, LowRes),
        CropGlobal1850Ne16 => entry(Y1850, Ne16Res),
        CropGlobal1850Ne120 => entry(Y1850, Ne120Res),
        CropGlobalHist => entry(
            &["--start-year", "1850", "--end-year", "2015", "--nosurfdata", "--res"],
            StandardRes,
        ),
        CropGlobalSsp1p19 => entry(ssp_template!("SSP1-1.9"), StandardRes),
        CropGlobalSsp1p26 => entry(ssp_template!("SSP1-2.6"), StandardRes),
        CropGlobalSsp2p45 => entry(ssp_template!("SSP2-4.5"), StandardRes),
        CropGlobalSsp2p45LowRes => entry(ssp_template!("SSP2-4.5"), LowResAll),
        CropGlobalSsp2p45HiRes => entry(ssp_template!("SSP2-4.5"), HiResAll),
        CropGlobalSsp3p70 => entry(ssp_template!("SSP3-7.0"), StandardRes),
        CropGlobalSsp4p34 => entry(ssp_template!("SSP4-3.4"), StandardRes),
        CropGlobalSsp4p60 => entry(ssp_template!("SSP4-6.0"), StandardRes),
        CropGlobalSsp5p34 => entry(ssp_template!("SSP5-3.4"), StandardRes),
        CropGlobalSsp5p85 => entry(ssp_template!("SSP5-8.5"), StandardRes),
        Crop | CropGlobalFuture | CropGlobalSsp5p85Other => None,
    }
}

/// Eagerly confirm referential closure between the dataset table and the
/// resolution registry: every table row must reference a set that resolves
/// to a non-empty token list.
///
/// The enum typing already rules out dangling set names; this pass exists
/// so callers can fail fast before any subprocess is launched instead of
/// mid-way through a long batch.
pub fn validate_closure() -> Result<()> {
    for target in Scenario::iter() {
        if let Some(entry) = dataset_entry(target) {
            if entry.resolution_set.resolutions().is_empty() {
                return Err(SurfgenError::config(format!(
                    "resolution set {} for target {target} is not in the registry",
                    entry.resolution_set
                )));
            }
            if entry.template.is_empty() {
                return Err(SurfgenError::config(format!(
                    "target {target} has an empty argument template"
                )));
            }
        }
    }
    Ok(())
}

/// Expand a scenario and re-validate every member against the dataset table.
///
/// Defensive re-validation: expansion can only produce enum members, but a
/// member without a table row cannot be turned into commands, and that is
/// fatal here rather than mid-run.
pub fn expand_validated(scenario: Scenario) -> Result<Vec<(Scenario, DatasetEntry)>> {
    let targets = scenario.expand();
    debug_assert!(!targets.is_empty());

    let mut expanded = Vec::with_capacity(targets.len());
    for target in targets {
        let entry = dataset_entry(target).ok_or_else(|| {
            SurfgenError::config(format!(
                "target {target} expanded from {scenario} has no dataset entry"
            ))
        })?;
        expanded.push((target, entry));
    }
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_expands_non_empty_and_valid() {
        for scenario in Scenario::iter() {
            let targets = scenario.expand();
            assert!(!targets.is_empty(), "{scenario} expanded to nothing");
            for target in targets {
                // Round-trip through the string form: every expanded name is
                // itself a member of the valid set.
                assert_eq!(Scenario::parse(&target.to_string()).unwrap(), target);
            }
        }
    }

    #[test]
    fn test_crop_expands_to_three_fixed_targets() {
        assert_eq!(
            Scenario::Crop.expand(),
            vec![
                Scenario::CropGlobalPresent,
                Scenario::CropGlobal1850,
                Scenario::CropGlobalHist,
            ]
        );
    }

    #[test]
    fn test_future_expands_to_nine_starting_with_lowest_pathway() {
        let targets = Scenario::CropGlobalFuture.expand();
        assert_eq!(targets.len(), 9);
        assert_eq!(targets[0], Scenario::CropGlobalSsp1p26);
        assert_eq!(*targets.last().unwrap(), Scenario::CropGlobalSsp5p85Other);
    }

    #[test]
    fn test_non_aggregate_expands_to_itself() {
        assert_eq!(
            Scenario::GlobalPresent.expand(),
            vec![Scenario::GlobalPresent]
        );
        assert!(!Scenario::GlobalPresent.is_aggregate());
        assert!(Scenario::Crop.is_aggregate());
    }

    #[test]
    fn test_parse_rejects_unknown_scenario() {
        let err = Scenario::parse("global-bogus").unwrap_err();
        assert!(err.to_string().contains("NOT in valid scenarios"));
    }

    #[test]
    fn test_scenario_display_round_trip() {
        assert_eq!(Scenario::CropGlobalSsp1p26.to_string(), "crop-global-SSP1-2.6");
        assert_eq!(
            Scenario::parse("crop-global-SSP1-2.6").unwrap(),
            Scenario::CropGlobalSsp1p26
        );
        assert_eq!(
            Scenario::parse("crop-global-present-0.125").unwrap(),
            Scenario::CropGlobalPresentEighth
        );
    }

    #[test]
    fn test_resolution_sets_ordered_and_non_empty() {
        for set in ResolutionSet::iter() {
            assert!(!set.resolutions().is_empty(), "{set} has no tokens");
        }
        assert_eq!(
            ResolutionSet::StandardResNoCrop.resolutions(),
            &["0.9x1.25", "1.9x2.5"]
        );
        assert_eq!(
            ResolutionSet::StandardRes.resolutions(),
            &["0.9x1.25", "1.9x2.5", "C96", "ne30np4.pg3", "mpasa120"]
        );
    }

    #[test]
    fn test_closure_holds() {
        validate_closure().unwrap();
    }

    #[test]
    fn test_expand_validated_orders_pairs() {
        let expanded = expand_validated(Scenario::Crop).unwrap();
        let targets: Vec<Scenario> = expanded.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            targets,
            vec![
                Scenario::CropGlobalPresent,
                Scenario::CropGlobal1850,
                Scenario::CropGlobalHist,
            ]
        );
        // All three table rows reference the standard crop set.
        assert_eq!(expanded[0].1.resolution_set, ResolutionSet::StandardRes);
    }

    #[test]
    fn test_future_aggregate_carries_upstream_table_gap() {
        // crop-global-SSP5-8.5-other is a valid scenario with no dataset
        // row, so command building for the future aggregate is fatal there.
        let err = expand_validated(Scenario::CropGlobalFuture).unwrap_err();
        assert!(err.to_string().contains("crop-global-SSP5-8.5-other"));
    }

    #[test]
    fn test_template_tokens_for_present_day() {
        let entry = dataset_entry(Scenario::GlobalPresent).unwrap();
        assert_eq!(
            entry.template,
            &["--start-year", "2000", "--end-year", "2000", "--nocrop", "--vic", "--res"]
        );
        assert_eq!(entry.resolution_set, ResolutionSet::StandardResNoCrop);
    }

    #[test]
    fn test_ssp_templates_carry_pathway_flag() {
        let entry = dataset_entry(Scenario::CropGlobalSsp3p70).unwrap();
        assert!(entry.template.windows(2).any(|w| w == ["--ssp-rcp", "SSP3-7.0"]));
        assert!(entry.template.contains(&"--nosurfdata"));
    }
}
