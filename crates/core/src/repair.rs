//! Validation/repair pass
//!
//! Runs after the codecs have built the graph. Each step needs the whole
//! mission, which a single record codec never sees. Every change is
//! reported as a diagnostic. Only running out of ids fails a load.

use crate::catalog::ModuleCatalog;
use sortie_domain::Mission;
use sortie_shared::{Category, Diagnostics, Result};

/// Run every repair step in order
pub fn repair(
    mission: &mut Mission,
    catalog: Option<&dyn ModuleCatalog>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    renumber_duplicates(mission, diagnostics)?;
    reassign_onboard_numbers(mission, diagnostics);
    if let Some(catalog) = catalog {
        collect_required_modules(mission, catalog);
    }
    report_dangling_zones(mission, diagnostics);
    Ok(())
}

fn renumber_duplicates(mission: &mut Mission, diagnostics: &mut Diagnostics) -> Result<()> {
    for change in mission.renumber_duplicate_ids()? {
        tracing::warn!(
            kind = %change.kind,
            old = change.old,
            new = change.new,
            path = %change.path,
            "Duplicate id renumbered"
        );
        diagnostics.warn(
            Category::DuplicateIdRenumbered,
            format!("Duplicate {} id {} renumbered to {}", change.kind, change.old, change.new),
            Some(change.path.as_str()),
        );
    }
    Ok(())
}

fn reassign_onboard_numbers(mission: &mut Mission, diagnostics: &mut Diagnostics) {
    for change in mission.reassign_onboard_numbers() {
        tracing::warn!(
            unit = %change.unit_name,
            old = %change.old,
            new = %change.new,
            "Onboard number reassigned"
        );
        let path = format!("{}.{}", change.country, change.unit_name);
        diagnostics.warn(
            Category::OnboardNumberReassigned,
            format!(
                "Unit '{}' shared onboard number {}; now {}",
                change.unit_name, change.old, change.new
            ),
            Some(path.as_str()),
        );
    }
}

/// Add the module of every unit type the catalog knows; modules already
/// listed by the file are kept.
fn collect_required_modules(mission: &mut Mission, catalog: &dyn ModuleCatalog) {
    let modules: Vec<String> = mission
        .unit_types()
        .into_iter()
        .filter_map(|unit_type| catalog.module_for(unit_type))
        .map(str::to_string)
        .collect();

    for module in modules {
        if !mission.required_modules.contains_key(&module) {
            tracing::debug!(module = %module, "Required module added");
            mission.required_modules.insert(module.clone(), module);
        }
    }
}

fn report_dangling_zones(mission: &Mission, diagnostics: &mut Diagnostics) {
    for (path, zone) in mission.dangling_zone_refs() {
        tracing::warn!(path = %path, zone = %zone.0, "Zone reference does not resolve");
        diagnostics.warn(
            Category::DanglingZoneReference,
            format!("Zone {} does not exist", zone.0),
            Some(path.as_str()),
        );
    }
}
