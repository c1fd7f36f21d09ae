//! Response bodies shaped like the API's.

use serde_json::{json, Value};

/// A reservation record with no placement data.
pub fn reservation(uuid: &str, status: &str) -> Value {
    json!({
        "uuid": uuid,
        "displayName": "web-01",
        "count": 1,
        "status": status,
    })
}

/// A reservation record whose single demand entity was placed on
/// `compute` / `storage`.
pub fn placed_reservation(uuid: &str, status: &str, compute: &str, storage: &str) -> Value {
    json!({
        "uuid": uuid,
        "displayName": "web-01",
        "count": 1,
        "status": status,
        "demandEntities": [demand_entity("web-01", compute, storage)],
    })
}

/// A reservation record with an explicit (possibly empty) entity list.
pub fn reservation_with_entities(uuid: &str, status: &str, entities: Vec<Value>) -> Value {
    json!({
        "uuid": uuid,
        "displayName": "web-01",
        "count": entities.len(),
        "status": status,
        "demandEntities": entities,
    })
}

/// A demand entity placed on `compute` / `storage`.
pub fn demand_entity(name: &str, compute: &str, storage: &str) -> Value {
    json!({
        "uuid": format!("_{name}"),
        "displayName": name,
        "className": "VirtualMachine",
        "template": { "uuid": "tmpl-1", "displayName": "small", "className": "VirtualMachineProfile" },
        "deploymentProfile": { "uuid": "dp-1", "displayName": "DEP-small", "className": "ServiceCatalogItem" },
        "placements": {
            "computeResources": [{
                "stats": [
                    { "name": "numOfCpu", "value": 1 },
                    { "name": "cpuSpeed", "value": 2594 },
                    { "name": "memorySize", "value": 1048576 }
                ],
                "provider": { "uuid": format!("pm-{compute}"), "displayName": compute, "className": "PhysicalMachine" }
            }],
            "storageResources": [{
                "stats": [
                    { "name": "diskSize", "value": 27522.389 },
                    { "name": "diskIops", "value": "Infinity" }
                ],
                "provider": { "uuid": format!("st-{storage}"), "displayName": storage, "className": "Storage" },
                "type": "disk"
            }]
        }
    })
}

/// A template with one compute and one storage resource.
pub fn template(uuid: &str, name: &str, deployment_profile: Option<&str>, model: &str) -> Value {
    json!({
        "uuid": uuid,
        "displayName": name,
        "className": "VirtualMachineProfile",
        "discovered": true,
        "model": model,
        "price": 0.0,
        "deploymentProfile": deployment_profile
            .map(|id| json!({ "uuid": id, "displayName": format!("DEP-{name}") }))
            .unwrap_or_else(|| json!({})),
        "computeResources": [{
            "stats": [
                { "name": "numOfCpu", "value": 2 },
                { "name": "memorySize", "value": 4194304, "units": "KB" }
            ]
        }],
        "storageResources": [{
            "type": "disk",
            "stats": [{ "name": "diskSize", "value": "Infinity" }]
        }]
    })
}
