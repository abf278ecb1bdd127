/// Typical harvest (slurry) volumes in mL, matched by keyword against a
/// vessel name. Order matters: specific flask names before bare areas.
const HARVEST_VOLUME_HINTS: &[(&str, f64)] = &[
    ("t225", 15.0),
    ("t175", 10.0),
    ("t150", 12.0),
    ("t125", 9.0),
    ("t75", 7.0),
    ("t25", 3.0),
    ("t12", 2.0),
    ("225", 15.0),
    ("175", 10.0),
    ("150", 10.0),
    ("125", 9.0),
    ("75", 7.0),
    ("25", 3.0),
    ("12.5", 2.0),
    ("100 mm", 7.0),
    ("150 mm", 10.0),
    ("60 mm", 5.0),
    ("35 mm", 2.0),
    ("6-well", 1.5),
    ("12-well", 1.0),
    ("24-well", 0.5),
    ("48-well", 0.25),
    ("96-well", 0.1),
    ("384-well", 0.02),
    ("1536", 0.01),
];

pub fn suggest_slurry_volume(vessel_name: Option<&str>) -> Option<f64> {
    let normalized = vessel_name.filter(|name| !name.is_empty())?.to_lowercase();
    HARVEST_VOLUME_HINTS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, volume)| *volume)
}
