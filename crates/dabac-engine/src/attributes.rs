//! In-process attribute and risk provider.
//!
//! Stands in for an external attribute service: a fixed object table and a
//! location / network-security risk map. Unknown objects get the maximum
//! base requirement; unknown contexts get a medium-high default risk.

use std::collections::HashMap;

use dabac_core::constants::{DEFAULT_ENVIRONMENTAL_RISK, UNKNOWN_OBJECT_REQUIREMENT};
use dabac_core::traits::{ObjectMetadataProvider, RiskProvider};
use dabac_core::types::{ObjectMetadata, RequestContext};

pub const LOCATION_KEY: &str = "location";
pub const NETWORK_SECURITY_KEY: &str = "network_security";

const LOW_RISK: f64 = 0.1;
const HIGH_RISK: f64 = 0.9;

#[derive(Debug, Clone)]
pub struct StaticAttributeProvider {
    objects: HashMap<String, ObjectMetadata>,
}

impl StaticAttributeProvider {
    /// Provider with no known objects.
    pub fn empty() -> Self {
        Self {
            objects: HashMap::new(),
        }
    }

    /// Register (or replace) an object.
    pub fn with_object(
        mut self,
        object_id: impl Into<String>,
        base_trust_requirement: f64,
        classification: Option<&str>,
    ) -> Self {
        self.objects.insert(
            object_id.into(),
            ObjectMetadata {
                base_trust_requirement,
                classification: classification.map(str::to_string),
            },
        );
        self
    }
}

impl Default for StaticAttributeProvider {
    /// The demonstration table: a high-sensitivity health record and a
    /// public page.
    fn default() -> Self {
        Self::empty()
            .with_object("record_8842", 0.60, Some("high"))
            .with_object("public_page", 0.0, Some("public"))
    }
}

impl ObjectMetadataProvider for StaticAttributeProvider {
    fn object_metadata(&self, object_id: &str) -> ObjectMetadata {
        self.objects
            .get(object_id)
            .cloned()
            .unwrap_or(ObjectMetadata {
                base_trust_requirement: UNKNOWN_OBJECT_REQUIREMENT,
                classification: None,
            })
    }
}

impl RiskProvider for StaticAttributeProvider {
    fn environmental_risk(&self, context: &RequestContext) -> f64 {
        let location = context
            .get(LOCATION_KEY)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let network = context.get(NETWORK_SECURITY_KEY).unwrap_or("none");

        if location == "hospital" || network == "wpa3_enterprise" {
            LOW_RISK
        } else if location == "cafe" || network == "open" {
            HIGH_RISK
        } else {
            DEFAULT_ENVIRONMENTAL_RISK
        }
    }
}
