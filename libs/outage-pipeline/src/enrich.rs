//! Device name join

use outage_model::{Device, Outage, OutageWithDeviceName};
use std::collections::HashMap;

/// Attach the name of each outage's device
///
/// Left join on `outage.id == device.id`: every outage is returned once, in
/// order, with `name` set to `None` when no device matches. When several
/// devices share an id the last one wins.
pub fn attach_device_name_to_outages(
    devices: &[Device],
    outages: &[Outage],
) -> Vec<OutageWithDeviceName> {
    let device_id_to_name: HashMap<&str, &str> = devices
        .iter()
        .map(|device| (device.id.as_str(), device.name.as_str()))
        .collect();

    outages
        .iter()
        .map(|outage| {
            let name = device_id_to_name
                .get(outage.id.as_str())
                .map(|name| name.to_string());
            OutageWithDeviceName::new(outage.clone(), name)
        })
        .collect()
}
