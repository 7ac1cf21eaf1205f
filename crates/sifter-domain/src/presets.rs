//! Built-in schemas

use crate::schema::{FieldDescriptor, Schema, SchemaError, DEFAULT_SENTINEL};

/// (key, display name, description) for the photovoltaic article schema
const PHOTOVOLTAIC_FIELDS: &[(&str, &str, &str)] = &[
    ("title", "Title", "Title of the article"),
    ("last_name", "Last Name", "Last name of the first author"),
    ("year", "Year", "Year the article was published"),
    ("doi", "Digital Object Identifier (DOI)", "DOI of the article"),
    ("research_focus", "Research Focus", "Main research question of the article"),
    ("key_findings", "Key Findings", "Most important results reported"),
    ("device_type", "Device Type", "Type of solar cell device studied"),
    ("absorber_material", "Absorber Material", ""),
    ("absorber_material_term_used", "Absorber Material Term Used", ""),
    ("absorber_dopant_material", "Absorber Dopant Material", ""),
    ("absorber_dopant_material_term_used", "Absorber Dopant Material Term Used", ""),
    ("absorber_dopant_polarity", "Absorber Dopant Polarity", "n-type or p-type"),
    ("absorber_dopant_polarity_term_used", "Absorber Dopant Polarity Term Used", ""),
    ("front_surface_morphology", "Front Surface Morphology", ""),
    ("front_surface_morphology_term_used", "Front Surface Morphology Term Used", ""),
    ("rear_surface_morphology", "Rear Surface Morphology", ""),
    ("rear_surface_morphology_term_used", "Rear Surface Morphology Term Used", ""),
    ("front_surface_passivation_material", "Front Surface Passivation Material", ""),
    ("front_surface_passivation_material_term_used", "Front Surface Passivation Material Term Used", ""),
    ("rear_surface_passivation_material", "Rear Surface Passivation Material", ""),
    ("rear_surface_passivation_material_term_used", "Rear Surface Passivation Material Term Used", ""),
    ("negative_metallization_material", "Negative Metallization Material", ""),
    ("negative_metallization_material_term_used", "Negative Metallization Material Term Used", ""),
    ("positive_metallization_material", "Positive Metallization Material", ""),
    ("positive_metallization_material_term_used", "Positive Metallization Material Term Used", ""),
    ("efficiency_percent", "Efficiency (%)", "Power conversion efficiency of the best cell"),
    ("cell_area_cm2", "Cell Area (cm2)", ""),
    ("short_circuit_current_a", "Short-Circuit Current (A)", ""),
    ("short_circuit_current_density_ma_cm2", "Short-Circuit Current Density (mA/cm2)", ""),
    ("open_circuit_voltage_v", "Open-Circuit Voltage (V)", ""),
    ("fill_factor_percent", "Fill Factor (%)", ""),
];

/// Field descriptors for academic articles on photovoltaic cells
///
/// Describes the most efficient cell reported in an article.
pub fn photovoltaic_fields() -> Vec<FieldDescriptor> {
    PHOTOVOLTAIC_FIELDS
        .iter()
        .map(|(key, display, description)| {
            FieldDescriptor::new(*key, *display).with_description(*description)
        })
        .collect()
}

/// The photovoltaic article schema with the default sentinel
pub fn photovoltaic() -> Result<Schema, SchemaError> {
    Schema::new(photovoltaic_fields(), DEFAULT_SENTINEL)
}
