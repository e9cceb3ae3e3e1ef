use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Optimistic-concurrency token issued by the contacts store.
///
/// The store hands it out as a number, other collaborators as a string, so it
/// is kept as the textual form and converted back on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Revision(pub String);

impl Revision {
    /// Numeric revisions go back as numbers, anything else as a string.
    pub fn to_wire(&self) -> Value {
        match self.0.parse::<u64>() {
            Ok(number) => Value::from(number),
            Err(_) => Value::from(self.0.clone()),
        }
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Revision(s)),
            Value::Number(n) => Ok(Revision(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "revision must be a string or a number, got {other}"
            ))),
        }
    }
}

/// A contact as seen by this service. Owned by the remote store, never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub phone: Option<String>,
    pub revision: Option<Revision>,
}

impl Contact {
    /// The phone with surrounding whitespace removed, if the contact has one.
    pub fn trimmed_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}

/// True when the contact carries a non-blank phone string.
///
/// Every branch in the service (email vs. record insert, label vs. skip,
/// reported phone vs. empty) is decided by this predicate alone.
pub fn has_phone(contact: &Contact) -> bool {
    contact.trimmed_phone().is_some()
}

/// Same predicate over a raw JSON value: only strings with visible content count.
pub fn has_phone_value(value: &Value) -> bool {
    value.as_str().is_some_and(|phone| !phone.trim().is_empty())
}

/// Keeps string values, maps every other JSON shape to `None`.
pub fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Phone item written to a contact, always marked as primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneEntry {
    pub country_code: String,
    pub phone: String,
    pub primary: bool,
}

impl PhoneEntry {
    pub fn primary(country_code: &str, phone: &str) -> Self {
        Self {
            country_code: country_code.to_string(),
            phone: phone.trim().to_string(),
            primary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact_with_phone(phone: Option<&str>) -> Contact {
        Contact {
            id: "c1".into(),
            email: Some("c1@example.com".into()),
            phone: phone.map(String::from),
            revision: Some(Revision("1".into())),
        }
    }

    #[test]
    fn test_has_phone_false_for_missing_or_blank() {
        assert!(!has_phone(&contact_with_phone(None)));
        assert!(!has_phone(&contact_with_phone(Some(""))));
        assert!(!has_phone(&contact_with_phone(Some("   "))));
        assert!(!has_phone(&contact_with_phone(Some("\t\n"))));
    }

    #[test]
    fn test_has_phone_true_for_real_number() {
        let contact = contact_with_phone(Some(" +36301234567 "));
        assert!(has_phone(&contact));
        assert_eq!(contact.trimmed_phone(), Some("+36301234567"));
    }

    #[test]
    fn test_has_phone_value_only_accepts_strings() {
        assert!(!has_phone_value(&Value::Null));
        assert!(!has_phone_value(&json!("")));
        assert!(!has_phone_value(&json!("   ")));
        assert!(!has_phone_value(&json!(36301234567u64)));
        assert!(!has_phone_value(&json!(false)));
        assert!(!has_phone_value(&json!({"number": "+36301234567"})));
        assert!(!has_phone_value(&json!(["+36301234567"])));
        assert!(has_phone_value(&json!("+36301234567")));
    }

    #[test]
    fn test_contact_non_string_phone_deserializes_as_none() {
        let contact: Contact = serde_json::from_value(json!({
            "id": "c1",
            "email": "c1@example.com",
            "phone": 36301234567u64,
            "revision": 3
        }))
        .unwrap();

        assert_eq!(contact.phone, None);
        assert!(!has_phone(&contact));
        assert_eq!(contact.revision, Some(Revision("3".into())));
    }

    #[test]
    fn test_contact_missing_and_null_phone() {
        let missing: Contact = serde_json::from_value(json!({"id": "c1"})).unwrap();
        let null: Contact = serde_json::from_value(json!({"id": "c1", "phone": null})).unwrap();
        assert_eq!(missing.phone, None);
        assert_eq!(null.phone, None);
    }

    #[test]
    fn test_revision_wire_format() {
        assert_eq!(Revision("7".into()).to_wire(), json!(7));
        assert_eq!(Revision("abc".into()).to_wire(), json!("abc"));
    }

    #[test]
    fn test_phone_entry_serializes_camel_case() {
        let entry = PhoneEntry::primary("HU", " +36301234567 ");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"countryCode": "HU", "phone": "+36301234567", "primary": true})
        );
    }
}
