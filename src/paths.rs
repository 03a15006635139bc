//! Path conventions of the surface-dataset toolchain.
//!
//! The external tool tree is laid out under the land component root:
//! `tools/mksurfdata_esmf` holds the build script, the namelist generator,
//! and (after a build) the `tool_bld` directory with the machine env script
//! and the `mksurfdata` executable.

use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

/// Machine-environment script expected inside the build directory.
pub const ENV_MACH_SPECIFIC: &str = ".env_mach_specific.sh";

/// Name of the parallel surface-data generator executable.
pub const MKSURFDATA: &str = "mksurfdata";

/// Build script for the generator, inside the tool directory.
pub const BUILD_SCRIPT: &str = "gen_mksurfdata_build.sh";

/// Namelist-generation entry point, inside the tool directory.
pub const NAMELIST_SCRIPT: &str = "gen_mksurfdata_namelist.py";

/// Tool directory under a land-component root.
pub fn tool_path(component_root: &Path) -> PathBuf {
    component_root.join("tools").join("mksurfdata_esmf")
}

/// Default build-output directory under a land-component root.
pub fn default_bld_path(component_root: &Path) -> PathBuf {
    tool_path(component_root).join("tool_bld")
}

/// Today's date as the `YYMMDD` stamp embedded in artifact names.
///
/// Falls back to UTC when the local offset cannot be determined (the stamp
/// only has to be stable within one invocation).
pub fn date_stamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year repr:last_two][month][day]");
    now.format(&format).unwrap_or_else(|_| "000000".to_string())
}

/// Path prefix of the generated surface dataset, trailing dot included.
///
/// The generator appends `namelist` for its input and `nc` for the dataset
/// itself, so callers join the extension directly onto this prefix.
pub fn fsurdat_prefix(caseroot: &Path, resolution: &str, model_year: &str, stamp: &str) -> PathBuf {
    caseroot.join(format!(
        "surfdata_{resolution}_hist_78pfts_CMIP6_{model_year}_c{stamp}."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_paths_derive_from_component_root() {
        let root = Path::new("/glade/work/ctsm");
        assert_eq!(
            tool_path(root),
            PathBuf::from("/glade/work/ctsm/tools/mksurfdata_esmf")
        );
        assert_eq!(
            default_bld_path(root),
            PathBuf::from("/glade/work/ctsm/tools/mksurfdata_esmf/tool_bld")
        );
    }

    #[test]
    fn test_date_stamp_shape() {
        let stamp = date_stamp();
        assert_eq!(stamp.len(), 6);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_fsurdat_prefix_format() {
        let prefix = fsurdat_prefix(Path::new("/case"), "10x15", "1850", "260825");
        assert_eq!(
            prefix,
            PathBuf::from("/case/surfdata_10x15_hist_78pfts_CMIP6_1850_c260825.")
        );
        // The two artifacts hang off the same prefix.
        let namelist = format!("{}namelist", prefix.display());
        let dataset = format!("{}nc", prefix.display());
        assert!(namelist.ends_with("c260825.namelist"));
        assert!(dataset.ends_with("c260825.nc"));
    }
}
