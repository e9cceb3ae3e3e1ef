use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Guest record returned by the event registry.
///
/// Only the fields the workflows branch on are typed; everything else the
/// registry sends is passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_status_updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filter for guests of one event, optionally only those updated after a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestQuery {
    pub event_id: String,
    pub updated_after: Option<DateTime<Utc>>,
}

impl GuestQuery {
    /// Builds a query from the raw request values.
    ///
    /// `last_checked` must be RFC 3339 with any offset, e.g.
    /// `2025-07-07T07:04:16.398-04:00`; it is normalised to UTC.
    pub fn new(
        event_id: &str,
        last_checked: Option<&str>,
    ) -> Result<Self, chrono::ParseError> {
        let updated_after = last_checked
            .map(str::trim)
            .filter(|ts| !ts.is_empty())
            .map(DateTime::<FixedOffset>::parse_from_rfc3339)
            .transpose()?
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Self {
            event_id: event_id.trim().to_string(),
            updated_after,
        })
    }

    /// Applies the filter and ordering locally: strictly newer than
    /// `updated_after`, oldest first. Guests without an update date only pass
    /// when no lower bound is set.
    pub fn select(&self, mut guests: Vec<Guest>) -> Vec<Guest> {
        if let Some(after) = self.updated_after {
            guests.retain(|guest| {
                guest
                    .attendance_status_updated_date
                    .is_some_and(|updated| updated > after)
            });
            guests.sort_by_key(|guest| guest.attendance_status_updated_date);
        }
        guests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn guest(id: &str, updated: &str) -> Guest {
        serde_json::from_value(json!({
            "_id": id,
            "eventId": "ev1",
            "attendanceStatus": "ATTENDING",
            "attendanceStatusUpdatedDate": updated,
        }))
        .unwrap()
    }

    #[test]
    fn test_guest_query_normalises_offset_to_utc() {
        let query = GuestQuery::new("ev1", Some("2025-07-07T07:04:16.398-04:00")).unwrap();
        let expected = Utc
            .with_ymd_and_hms(2025, 7, 7, 11, 4, 16)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(398))
            .unwrap();
        assert_eq!(query.updated_after, Some(expected));
    }

    #[test]
    fn test_guest_query_without_timestamp() {
        assert_eq!(GuestQuery::new("ev1", None).unwrap().updated_after, None);
        assert_eq!(GuestQuery::new("ev1", Some("  ")).unwrap().updated_after, None);
    }

    #[test]
    fn test_guest_query_rejects_garbage_timestamp() {
        assert!(GuestQuery::new("ev1", Some("yesterday")).is_err());
    }

    #[test]
    fn test_select_filters_strictly_newer_and_sorts_ascending() {
        let query = GuestQuery::new("ev1", Some("2025-07-07T08:00:00Z")).unwrap();
        let guests = vec![
            guest("late", "2025-07-07T10:17:37.126Z"),
            guest("exact", "2025-07-07T08:00:00Z"),
            guest("early", "2025-07-07T07:59:59Z"),
            guest("mid", "2025-07-07T08:34:30.991Z"),
        ];

        let ids: Vec<_> = query
            .select(guests)
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec!["mid", "late"]);
    }

    #[test]
    fn test_guest_passes_unknown_fields_through() {
        let raw = json!({
            "id": "g1",
            "eventId": "ev1",
            "rsvpId": "r1",
            "totalGuests": 1,
            "guestDetails": {"email": "merry.w@thimbletree.net", "phone": "+36301234567"}
        });
        let guest: Guest = serde_json::from_value(raw).unwrap();
        assert_eq!(guest.id, "g1");
        assert_eq!(guest.extra["rsvpId"], json!("r1"));

        let back = serde_json::to_value(&guest).unwrap();
        assert_eq!(back["_id"], json!("g1"));
        assert_eq!(back["totalGuests"], json!(1));
        assert_eq!(back["guestDetails"]["phone"], json!("+36301234567"));
    }
}
