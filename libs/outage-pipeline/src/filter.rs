//! Outage selection

use outage_model::{Device, Outage, Timestamp};
use std::collections::HashSet;

/// Which outages to keep
///
/// An unset criterion places no constraint. An empty device list is treated
/// the same as an unset one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Keep outages that begin at or after this instant
    pub after: Option<Timestamp>,
    /// Keep outages whose id matches one of these devices
    pub devices: Option<Vec<Device>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(mut self, after: Timestamp) -> Self {
        self.after = Some(after);
        self
    }

    pub fn devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = Some(devices);
        self
    }
}

/// Keep the outages matching `criteria`, in input order
///
/// An outage is kept when it begins at or after `criteria.after` (inclusive)
/// and its id belongs to one of `criteria.devices`; either test passes
/// trivially when its criterion is unset. A `begin` that is not a valid date
/// never satisfies `after`.
pub fn filter_outages(criteria: &FilterCriteria, outages: &[Outage]) -> Vec<Outage> {
    let device_ids: HashSet<&str> = criteria
        .devices
        .iter()
        .flatten()
        .map(|device| device.id.as_str())
        .collect();

    outages
        .iter()
        .filter(|outage| {
            let is_after = criteria
                .after
                .as_ref()
                .map_or(true, |after| outage.begin >= *after);
            let is_of_given_devices = device_ids.is_empty() || device_ids.contains(outage.id.as_str());
            is_after && is_of_given_devices
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    const BATTERY_1: &str = "002b28fc-283c-47ec-9af2-ea287336dc1b";
    const BATTERY_2: &str = "086b0d53-b311-4441-aaf3-935646f03d4d";
    const OTHER_1: &str = "04ccad00-eb8d-4045-8994-b569cb4b64c1";
    const OTHER_2: &str = "27820d4a-1bc4-4fc1-a5f0-bcb3627e94a1";

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn outage(id: &str, begin: &str, end: &str) -> Outage {
        Outage::new(id, ts(begin), ts(end))
    }

    fn mock_outages() -> Vec<Outage> {
        vec![
            outage(BATTERY_1, "2021-07-26T17:09:31.036Z", "2021-08-29T00:37:42.253Z"),
            outage(BATTERY_1, "2022-05-23T12:21:27.377Z", "2022-11-13T02:16:38.905Z"),
            outage(BATTERY_1, "2022-12-04T09:59:33.628Z", "2022-12-12T22:35:13.815Z"),
            outage(OTHER_1, "2022-07-12T16:31:47.254Z", "2022-10-13T04:05:10.044Z"),
            outage(BATTERY_2, "2022-07-12T16:31:47.254Z", "2022-10-13T04:05:10.044Z"),
            outage(OTHER_2, "2021-07-12T16:31:47.254Z", "2022-10-13T04:05:10.044Z"),
        ]
    }

    fn site_devices() -> Vec<Device> {
        vec![
            Device::new(BATTERY_1, "Battery 1"),
            Device::new(BATTERY_2, "Battery 2"),
        ]
    }

    #[test]
    fn test_filter_by_date() {
        let criteria = FilterCriteria::new().after(ts("2022-01-01T00:00:00.000Z"));
        let outages = filter_outages(&criteria, &mock_outages());

        let expected: Vec<Outage> = mock_outages().into_iter().skip(1).take(4).collect();
        assert_eq!(outages, expected);
    }

    #[test]
    fn test_filter_by_devices() {
        let criteria = FilterCriteria::new().devices(site_devices());
        let outages = filter_outages(&criteria, &mock_outages());

        let ids: Vec<&str> = outages.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![BATTERY_1, BATTERY_1, BATTERY_1, BATTERY_2]);
    }

    #[test]
    fn test_filter_by_date_and_devices() {
        let criteria = FilterCriteria::new()
            .after(ts("2022-01-01T00:00:00.000Z"))
            .devices(site_devices());
        let outages = filter_outages(&criteria, &mock_outages());

        let all = mock_outages();
        assert_eq!(outages, vec![all[1].clone(), all[2].clone(), all[4].clone()]);
    }

    #[test]
    fn test_after_bound_is_inclusive() {
        let criteria = FilterCriteria::new().after(ts("2022-07-12T16:31:47.254Z"));
        let outages = filter_outages(&criteria, &mock_outages());

        assert!(outages.iter().any(|o| o.id == BATTERY_2));
        assert!(outages.iter().any(|o| o.id == OTHER_1));
    }

    #[test]
    fn test_malformed_begin_fails_date_bound() {
        let broken = Outage::new(BATTERY_1, Timestamp::lenient("not a date"), ts("2022-12-12"));

        let dated = FilterCriteria::new().after(ts("2022-01-01"));
        assert!(filter_outages(&dated, &[broken.clone()]).is_empty());

        let undated = FilterCriteria::new().devices(site_devices());
        assert_eq!(filter_outages(&undated, &[broken.clone()]), vec![broken]);
    }

    #[test]
    fn test_empty_device_list_is_no_constraint() {
        let criteria = FilterCriteria::new().devices(Vec::new());
        assert_eq!(filter_outages(&criteria, &mock_outages()), mock_outages());
    }

    #[test]
    fn test_no_matching_devices_keeps_nothing() {
        let criteria = FilterCriteria::new().devices(vec![Device::new("unknown", "Ghost")]);
        assert!(filter_outages(&criteria, &mock_outages()).is_empty());
    }

    fn arb_outage() -> impl Strategy<Value = Outage> {
        (
            prop::sample::select(vec!["a", "b", "c", "d"]),
            1_500_000_000i64..1_700_000_000i64,
            0i64..10_000_000i64,
        )
            .prop_map(|(id, begin, length)| {
                let begin = Utc.timestamp_opt(begin, 0).unwrap();
                let end = Utc.timestamp_opt(begin.timestamp() + length, 0).unwrap();
                Outage::new(id, Timestamp::from(begin), Timestamp::from(end))
            })
    }

    proptest! {
        #[test]
        fn prop_no_criteria_is_identity(outages in prop::collection::vec(arb_outage(), 0..30)) {
            prop_assert_eq!(filter_outages(&FilterCriteria::default(), &outages), outages);
        }

        #[test]
        fn prop_after_splits_on_begin(
            outages in prop::collection::vec(arb_outage(), 0..30),
            threshold in 1_500_000_000i64..1_700_000_000i64,
        ) {
            let after = Timestamp::from(Utc.timestamp_opt(threshold, 0).unwrap());
            let kept = filter_outages(&FilterCriteria::new().after(after.clone()), &outages);

            prop_assert!(kept.iter().all(|o| o.begin >= after));
            let excluded = outages.iter().filter(|o| !kept.contains(o)).count();
            prop_assert_eq!(
                excluded,
                outages.iter().filter(|o| o.begin < after).count()
            );
        }

        #[test]
        fn prop_devices_restrict_ids(
            outages in prop::collection::vec(arb_outage(), 0..30),
            ids in prop::collection::vec(prop::sample::select(vec!["a", "b", "c", "d"]), 1..3),
        ) {
            let devices: Vec<Device> = ids.iter().map(|id| Device::new(*id, "device")).collect();
            let kept = filter_outages(&FilterCriteria::new().devices(devices), &outages);

            prop_assert!(kept.iter().all(|o| ids.contains(&o.id.as_str())));
            prop_assert_eq!(
                kept.len(),
                outages.iter().filter(|o| ids.contains(&o.id.as_str())).count()
            );
        }
    }
}
