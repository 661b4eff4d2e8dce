//! # Strand Materials
//!
//! Physical properties of conductor strand materials in SI units, and an
//! immutable library to look them up by name.
//!
//! ## Example
//!
//! ```rust
//! use catenary_core::conductor::MaterialLibrary;
//!
//! let library = MaterialLibrary::standard();
//! let steel = library.get("Galvanized Steel").unwrap();
//! assert_eq!(steel.density, 7780.0);
//! assert!(library.get("Copper").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CalcError, CalcResult};

/// Standard gravity, m/s²
pub const GRAVITY: f64 = 9.80665;

/// A strand material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name, also the lookup key
    pub name: String,
    /// Mass density, kg/m³
    pub density: f64,
    /// Minimum strand tensile strength, Pa
    pub tensile_strength: f64,
    /// Linear thermal expansion coefficient, 1/°C
    pub thermal_coefficient: f64,
    /// Typical final (unloading) modulus of a stranded layer, Pa
    pub final_modulus: f64,
}

impl Material {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("density", self.density)?;
        require_positive("tensile_strength", self.tensile_strength)?;
        require_positive("thermal_coefficient", self.thermal_coefficient)?;
        require_positive("final_modulus", self.final_modulus)?;
        Ok(())
    }

    /// Weight per unit volume, N/m³
    pub fn unit_weight(&self) -> f64 {
        self.density * GRAVITY
    }
}

/// Named collection of materials, built once and passed by reference
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        MaterialLibrary::default()
    }

    /// Common overhead conductor materials
    pub fn standard() -> Self {
        let materials = vec![
            Material {
                name: "Aluminum 1350-H19".to_string(),
                density: 2703.0,
                tensile_strength: 165e6,
                thermal_coefficient: 23e-6,
                final_modulus: 64e9,
            },
            Material {
                name: "Aluminum Alloy 6201-T81".to_string(),
                density: 2690.0,
                tensile_strength: 315e6,
                thermal_coefficient: 23e-6,
                final_modulus: 64e9,
            },
            Material {
                name: "Galvanized Steel".to_string(),
                density: 7780.0,
                tensile_strength: 1410e6,
                thermal_coefficient: 11.5e-6,
                final_modulus: 190e9,
            },
            Material {
                name: "Aluminum-Clad Steel".to_string(),
                density: 6590.0,
                tensile_strength: 1100e6,
                thermal_coefficient: 13e-6,
                final_modulus: 162e9,
            },
        ];
        MaterialLibrary { materials }
    }

    /// Add or replace a material
    pub fn insert(&mut self, material: Material) -> CalcResult<()> {
        material.validate()?;
        match self.materials.iter_mut().find(|m| m.name.eq_ignore_ascii_case(&material.name)) {
            Some(existing) => *existing = material,
            None => self.materials.push(material),
        }
        Ok(())
    }

    /// Case-insensitive lookup by name
    pub fn get(&self, name: &str) -> CalcResult<&Material> {
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CalcError::material_not_found(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library_lookup() {
        let library = MaterialLibrary::standard();
        assert_eq!(library.len(), 4);
        let aluminum = library.get("aluminum 1350-h19").unwrap();
        assert_eq!(aluminum.thermal_coefficient, 23e-6);
        assert!(library.names().any(|name| name == "Aluminum-Clad Steel"));
    }

    #[test]
    fn test_missing_material() {
        let err = MaterialLibrary::standard().get("Copper").unwrap_err();
        assert_eq!(err.error_code(), "MATERIAL_NOT_FOUND");
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut library = MaterialLibrary::standard();
        let mut steel = library.get("Galvanized Steel").unwrap().clone();
        steel.tensile_strength = 1520e6;
        library.insert(steel).unwrap();
        assert_eq!(library.len(), 4);
        assert_eq!(library.get("Galvanized Steel").unwrap().tensile_strength, 1520e6);

        let bad = Material {
            name: "Lead".to_string(),
            density: -1.0,
            tensile_strength: 1.0,
            thermal_coefficient: 1.0,
            final_modulus: 1.0,
        };
        assert!(library.insert(bad).is_err());
    }

    #[test]
    fn test_unit_weight() {
        let library = MaterialLibrary::standard();
        let steel = library.get("Galvanized Steel").unwrap();
        assert!((steel.unit_weight() - 7780.0 * 9.80665).abs() < 1e-9);
    }
}
