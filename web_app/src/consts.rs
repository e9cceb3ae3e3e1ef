pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

pub const MSG_PHONE_FOUND: &str = "✅ Phone number found for the contact.";
pub const MSG_PHONE_NOT_FOUND: &str = "⛔ No phone number found for the contact.";
pub const MSG_NO_NEW_GUESTS: &str = "⛔ No new guest found.";
pub const MSG_UNAUTHORIZED_TOKEN: &str = "Unauthorized: Invalid token.";

pub const GUEST_FIELDS: [&str; 1] = ["GUEST_DETAILS"];
pub const GUEST_UPDATED_DATE_FIELD: &str = "attendanceStatusUpdatedDate";

pub const WIX_CONTACTS_PATH: &str = "/contacts/v4/contacts";
pub const WIX_CONTACTS_QUERY_PATH: &str = "/contacts/v4/contacts/query";
pub const WIX_LABELS_PATH: &str = "/contacts/v4/labels";
pub const WIX_GUESTS_QUERY_PATH: &str = "/events/v2/guests/query";
pub const WIX_SECRETS_PATH: &str = "/_api/cloud-secrets-vault/v1/secrets";
pub const WIX_TRIGGERED_EMAILS_PATH: &str = "/triggered-emails/v1/emails";
pub const WIX_DATA_ITEMS_PATH: &str = "/wix-data/v2/items";
pub const WIX_SITE_ID_HEADER: &str = "wix-site-id";
