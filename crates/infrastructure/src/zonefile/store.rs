use async_trait::async_trait;
use serde_yaml::Value;
use tracing::debug;

use gslb_application::ports::{BackendMatchCriteria, ModifiedBackend, ZoneFileStore};
use gslb_domain::{GslbError, ZoneConfig};

/// YAML zone-file store.
///
/// `load` is the one parse path shared by startup and the watcher:
/// read, decode, validate. The bulk mutation works on the raw YAML
/// document so unknown keys survive the rewrite; re-marshaling keeps
/// mapping order.
#[derive(Debug, Default, Clone)]
pub struct YamlZoneFileStore;

impl YamlZoneFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ZoneFileStore for YamlZoneFileStore {
    async fn load(&self, path: &str) -> Result<ZoneConfig, GslbError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GslbError::Io(format!("{path}: {e}")))?;
        if raw.trim().is_empty() {
            return Err(GslbError::ConfigParse(format!("{path}: file empty")));
        }
        let config: ZoneConfig =
            serde_yaml::from_str(&raw).map_err(|e| GslbError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    async fn set_backends_enable(
        &self,
        path: &str,
        criteria: &BackendMatchCriteria,
        enable: bool,
    ) -> Result<Vec<ModifiedBackend>, GslbError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GslbError::Io(format!("{path}: {e}")))?;
        let mut doc: Value =
            serde_yaml::from_str(&raw).map_err(|e| GslbError::ConfigParse(e.to_string()))?;

        let modified = flip_matching_backends(&mut doc, criteria, enable);
        if modified.is_empty() {
            return Ok(modified);
        }

        let rendered =
            serde_yaml::to_string(&doc).map_err(|e| GslbError::ConfigParse(e.to_string()))?;
        tokio::fs::write(path, rendered)
            .await
            .map_err(|e| GslbError::Io(format!("{path}: {e}")))?;

        debug!(path, enable, backends = modified.len(), "Zone file updated");
        Ok(modified)
    }
}

/// Walk `records.*.backends[*]` and set `enable` on every match.
fn flip_matching_backends(
    doc: &mut Value,
    criteria: &BackendMatchCriteria,
    enable: bool,
) -> Vec<ModifiedBackend> {
    let mut modified = Vec::new();

    let Some(records) = doc.get_mut("records").and_then(Value::as_mapping_mut) else {
        return modified;
    };

    for (fqdn, record) in records.iter_mut() {
        let Some(fqdn) = fqdn.as_str() else { continue };
        let Some(backends) = record.get_mut("backends").and_then(Value::as_sequence_mut)
        else {
            continue;
        };

        for backend in backends.iter_mut() {
            let Some(mapping) = backend.as_mapping_mut() else {
                continue;
            };
            let address = mapping
                .get(&Value::from("address"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            if !backend_matches(mapping, &address, criteria) {
                continue;
            }

            mapping.insert(Value::from("enable"), Value::from(enable));
            modified.push(ModifiedBackend {
                record: fqdn.to_string(),
                address,
            });
        }
    }

    modified
}

fn backend_matches(
    backend: &serde_yaml::Mapping,
    address: &str,
    criteria: &BackendMatchCriteria,
) -> bool {
    if let Some(wanted) = criteria.location.as_deref().filter(|l| !l.is_empty()) {
        let location = backend
            .get(&Value::from("locations_custom"))
            .and_then(Value::as_sequence)
            .and_then(|locations| locations.first())
            .and_then(Value::as_str);
        if location == Some(wanted) {
            return true;
        }
    }

    if let Some(prefix) = criteria.address_prefix.as_deref().filter(|p| !p.is_empty()) {
        if address.starts_with(prefix) {
            return true;
        }
    }

    if !criteria.tags.is_empty() {
        if let Some(tags) = backend.get(&Value::from("tags")).and_then(Value::as_sequence) {
            let backend_tags: Vec<&str> = tags.iter().filter_map(Value::as_str).collect();
            if criteria
                .tags
                .iter()
                .any(|tag| backend_tags.contains(&tag.as_str()))
            {
                return true;
            }
        }
    }

    false
}
