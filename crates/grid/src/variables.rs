//! Variable-name translation between model naming conventions and CF names.
//!
//! Each physical quantity is registered once under its CF name together with
//! the native name it goes by in every convention, plus an optional unit
//! conversion. The `"CF"` convention is always known and never translates.

use std::collections::BTreeMap;

use crate::error::GridError;
use crate::field::GridField;

/// Name of the identity convention.
pub const CF_CONVENTION: &str = "CF";

/// Linear unit conversion `value * scale + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConversion {
    /// Multiplicative factor.
    pub scale: f64,
    /// Additive offset applied after scaling.
    pub offset: f64,
    /// Units after conversion.
    pub units: Option<String>,
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            units: None,
        }
    }
}

/// One physical quantity known to the translator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    cf_name: String,
    aliases: BTreeMap<String, String>,
    conversion: UnitConversion,
}

impl VariableEntry {
    /// Create an entry for `cf_name` with no aliases.
    pub fn new(cf_name: impl Into<String>) -> Self {
        Self {
            cf_name: cf_name.into(),
            aliases: BTreeMap::new(),
            conversion: UnitConversion::default(),
        }
    }

    /// Register the native name used by `convention`.
    pub fn with_alias(mut self, convention: impl Into<String>, native: impl Into<String>) -> Self {
        self.aliases.insert(convention.into(), native.into());
        self
    }

    /// Set the unit conversion applied when loading this variable.
    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// CF name.
    pub fn cf_name(&self) -> &str {
        &self.cf_name
    }

    /// Unit conversion.
    pub fn conversion(&self) -> &UnitConversion {
        &self.conversion
    }
}

/// Lookup table translating variable names between conventions.
#[derive(Debug, Clone, Default)]
pub struct VariableTranslator {
    entries: BTreeMap<String, VariableEntry>,
    // convention -> native name -> cf name
    inverse: BTreeMap<String, BTreeMap<String, String>>,
}

impl VariableTranslator {
    /// Create an empty translator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateAlias`] if a native name is already
    /// claimed by another CF name in the same convention.
    pub fn with_entry(mut self, entry: VariableEntry) -> Result<Self, GridError> {
        for (convention, native) in &entry.aliases {
            let table = self.inverse.entry(convention.clone()).or_default();
            if let Some(existing) = table.get(native)
                && existing != &entry.cf_name
            {
                return Err(GridError::DuplicateAlias {
                    convention: convention.clone(),
                    native: native.clone(),
                });
            }
            table.insert(native.clone(), entry.cf_name.clone());
        }
        self.entries.insert(entry.cf_name.clone(), entry);
        Ok(self)
    }

    fn check_convention(&self, convention: &str) -> Result<(), GridError> {
        if convention == CF_CONVENTION || self.inverse.contains_key(convention) {
            Ok(())
        } else {
            Err(GridError::UnknownConvention(convention.to_string()))
        }
    }

    /// CF name for a native name; unknown names pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownConvention`] for an unregistered convention.
    pub fn to_cf(&self, convention: &str, native: &str) -> Result<String, GridError> {
        self.check_convention(convention)?;
        Ok(self
            .inverse
            .get(convention)
            .and_then(|t| t.get(native))
            .cloned()
            .unwrap_or_else(|| native.to_string()))
    }

    /// Native name for a CF name; unknown names pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownConvention`] for an unregistered convention.
    pub fn from_cf(&self, convention: &str, cf_name: &str) -> Result<String, GridError> {
        self.check_convention(convention)?;
        Ok(self
            .entries
            .get(cf_name)
            .and_then(|e| e.aliases.get(convention))
            .cloned()
            .unwrap_or_else(|| cf_name.to_string()))
    }

    /// Unit conversion registered for a CF name.
    pub fn conversion(&self, cf_name: &str) -> Option<&UnitConversion> {
        self.entries.get(cf_name).map(|e| &e.conversion)
    }

    /// Rename a field loaded under `convention` to its CF name and apply the
    /// registered unit conversion.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownConvention`] for an unregistered convention.
    pub fn apply(&self, convention: &str, field: &GridField) -> Result<GridField, GridError> {
        let cf = self.to_cf(convention, field.name())?;
        let out = match self.conversion(&cf) {
            Some(conv) => {
                let converted = field.map_values(conv.scale, conv.offset);
                match &conv.units {
                    Some(u) => converted.with_units(u.clone()),
                    None => converted,
                }
            }
            None => field.clone(),
        };
        Ok(out.with_name(cf))
    }
}
