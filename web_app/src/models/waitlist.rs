use super::contact::string_or_none;
use serde::Deserialize;

/// Payload of the waitlist email-or-record automation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEmailPayload {
    #[serde(default, deserialize_with = "string_or_none")]
    pub contact_id: Option<String>,
    #[serde(default, rename = "guest_email", deserialize_with = "string_or_none")]
    pub guest_email: Option<String>,
    #[serde(default, rename = "guest_firstName", deserialize_with = "string_or_none")]
    pub guest_first_name: Option<String>,
    #[serde(default, rename = "guest_lastName", deserialize_with = "string_or_none")]
    pub guest_last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationContact {
    #[serde(default, deserialize_with = "string_or_none")]
    pub contact_id: Option<String>,
}

/// Payload of the waitlist label automation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistLabelPayload {
    #[serde(default)]
    pub contact: AutomationContact,
    #[serde(default, rename = "guest_email", deserialize_with = "string_or_none")]
    pub guest_email: Option<String>,
}

impl WaitlistLabelPayload {
    /// Id of the contact to label, read from the nested contact only.
    pub fn target_contact_id(&self) -> Option<&str> {
        self.contact
            .contact_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
