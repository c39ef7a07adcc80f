// Filter sets for the event list and export endpoints.
//
// Sets are ordered (`BTreeSet`) so two filter values compare and encode
// identically regardless of the order the operator picked options in.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters as sent by reqwest: repeated keys for list values.
pub type QueryParams = Vec<(&'static str, String)>;

/// Constraints applied to the actuation event list and its export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationFilters {
    pub actuator_types: BTreeSet<String>,
    pub commands: BTreeSet<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Constraints applied to the detection event list and its export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionFilters {
    pub camera_ids: BTreeSet<u64>,
    pub classified_animals: BTreeSet<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ActuationFilters {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.extend(self.actuator_types.iter().map(|t| ("actuator_types", t.clone())));
        params.extend(self.commands.iter().map(|c| ("commands", c.clone())));
        push_date_range(&mut params, self.start, self.end);
        params
    }
}

impl DetectionFilters {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.extend(self.camera_ids.iter().map(|id| ("camera_ids", id.to_string())));
        params.extend(
            self.classified_animals
                .iter()
                .map(|a| ("classified_animals", a.clone())),
        );
        push_date_range(&mut params, self.start, self.end);
        params
    }
}

/// Window of a paginated request.
pub(crate) fn page_params(offset: u64, limit: u32) -> QueryParams {
    vec![("offset", offset.to_string()), ("limit", limit.to_string())]
}

fn push_date_range(
    params: &mut QueryParams,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) {
    if let Some(start) = start {
        params.push(("date_from", start.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }
    if let Some(end) = end {
        params.push(("date_to", end.to_rfc3339_opts(SecondsFormat::Secs, true)));
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_filters_send_nothing() {
        assert!(ActuationFilters::default().to_params().is_empty());
        assert!(DetectionFilters::default().to_params().is_empty());
    }

    #[test]
    fn actuation_filters_repeat_list_keys() {
        let filters = ActuationFilters {
            actuator_types: ["Road Sign".to_owned(), "Feeder".to_owned()].into(),
            commands: ["display".to_owned()].into(),
            start: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).single(),
            end: None,
        };

        assert_eq!(
            filters.to_params(),
            vec![
                ("actuator_types", "Feeder".to_owned()),
                ("actuator_types", "Road Sign".to_owned()),
                ("commands", "display".to_owned()),
                ("date_from", "2025-03-01T00:00:00Z".to_owned()),
            ]
        );
    }

    #[test]
    fn structural_equality_ignores_pick_order() {
        let a = DetectionFilters {
            classified_animals: ["bear".to_owned(), "wolf".to_owned()].into(),
            ..DetectionFilters::default()
        };
        let b = DetectionFilters {
            classified_animals: ["wolf".to_owned(), "bear".to_owned()].into(),
            ..DetectionFilters::default()
        };
        assert_eq!(a, b);
    }
}
