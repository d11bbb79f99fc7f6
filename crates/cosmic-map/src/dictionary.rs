//! Static synonym dictionary for canonical astronomical fields.

use std::sync::LazyLock;

use indexmap::IndexMap;

/// Canonical fields and their lowercase synonyms.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    (
        "position_ra",
        &[
            "ra",
            "right ascension",
            "right_ascension",
            "alpha",
            "rarad",
            "raj2000",
            "ra_icrs",
            "ra_j2000",
            "ra_deg",
            "radeg",
        ],
    ),
    (
        "position_dec",
        &[
            "dec",
            "declination",
            "delta",
            "decrad",
            "decj2000",
            "dec_icrs",
            "dej2000",
            "dec_j2000",
            "dec_deg",
            "de_icrs",
        ],
    ),
    (
        "brightness",
        &[
            "flux",
            "luminosity",
            "mag",
            "magnitude",
            "intensity",
            "count",
            "brightness",
            "flux_density",
            "flux_val",
            "counts",
        ],
    ),
    (
        "temperature",
        &["temp", "temperature", "t_eff", "kelvin", "t_surface", "teff"],
    ),
    (
        "velocity",
        &[
            "vel",
            "velocity",
            "v_lsr",
            "radial_velocity",
            "redshift",
            "z",
            "doppler",
            "v_rad",
            "rv",
            "radvel",
        ],
    ),
    (
        "object_id",
        &[
            "id",
            "object_id",
            "source_id",
            "name",
            "target",
            "objid",
            "obj_name",
            "obj_id",
            "designation",
        ],
    ),
    (
        "error",
        &[
            "err",
            "error",
            "uncertainty",
            "sigma",
            "std_dev",
            "flux_err",
            "e_flux",
        ],
    ),
];

/// Every synonym, and each canonical name itself, to its canonical field.
///
/// Iteration order is dictionary order, which settles ties between equally
/// similar keys.
static LOOKUP: LazyLock<IndexMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut lookup = IndexMap::new();
    for (field, synonyms) in SYNONYMS {
        for synonym in *synonyms {
            lookup.entry(*synonym).or_insert(*field);
        }
        lookup.entry(*field).or_insert(*field);
    }
    lookup
});

/// Canonical field names in dictionary order.
pub fn canonical_fields() -> impl Iterator<Item = &'static str> {
    SYNONYMS.iter().map(|(field, _)| *field)
}

/// Exact lookup of an already lowercased key.
pub fn canonical_field(key: &str) -> Option<&'static str> {
    LOOKUP.get(key).copied()
}

/// All lookup keys with their canonical field.
pub fn lookup_keys() -> impl Iterator<Item = (&'static str, &'static str)> {
    LOOKUP.iter().map(|(key, field)| (*key, *field))
}
