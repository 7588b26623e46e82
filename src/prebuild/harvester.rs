//! Property promotion
//!
//! Only properties that a definition *introduced* while building, and whose
//! name carries the reserved prefix, reach the global table. Everything else
//! stays local to the definition.

use crate::diagnostics::DiagnosticLog;
use crate::properties::{GlobalPropertyTable, Property, PropertySet, Watermark};
use crate::verbosity::Verbosity;
use tracing::info;

/// Prefix a property name needs to be promoted.
pub const RESERVED_PREFIX: &str = "Custom";

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyHarvester;

impl PropertyHarvester {
    pub fn is_promotable(&self, name: &str) -> bool {
        name.starts_with(RESERVED_PREFIX)
    }

    /// New, prefixed properties in append order, without touching any table.
    pub fn select<'p>(&self, properties: &'p PropertySet, watermark: Watermark) -> Vec<&'p Property> {
        properties
            .appended_since(watermark)
            .iter()
            .filter(|p| self.is_promotable(&p.name))
            .collect()
    }

    /// Promotes the selected properties into `table`, overwriting existing
    /// entries, and returns what was promoted.
    pub fn harvest(
        &self,
        properties: &PropertySet,
        watermark: Watermark,
        table: &mut GlobalPropertyTable,
        log: &DiagnosticLog,
    ) -> Vec<Property> {
        let selected = self.select(properties, watermark);
        let mut promoted = Vec::with_capacity(selected.len());

        for property in selected {
            log.write_line(
                Verbosity::Detailed,
                &format!(
                    "defined global build property {} = {}",
                    property.name, property.value
                ),
            );
            info!(property = %property.name, value = %property.value, "Promoted global property");
            table.set(&property.name, &property.value);
            promoted.push(property.clone());
        }

        promoted
    }
}
