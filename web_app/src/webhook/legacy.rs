//! Contact lookup for automations that still authenticate with a plain shared
//! secret in the body instead of a bearer token.

use super::{AppState, log_failure, schemas};
use crate::{
    api::{
        auth_gate::verify_shared_secret,
        contact_resolver::{ContactResolver, PhoneLookup},
    },
    errors::{AuthFailure, GatewayError},
};
use ntex::{util::Bytes, web};

const ENDPOINT: &str = "post_findRsvpContactById";

/// `POST /_functions/findRsvpContactById`
///
/// # Request Body
/// `{ "data": { "userId": <contact id>, "secretKey": <shared secret> } }`
///
/// # Returns
/// `{ message, phone }`, with an empty `phone` when the contact has none
#[web::post("/findRsvpContactById")]
pub async fn find_rsvp_contact_by_id(
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let _span = logfire::span!("post_findRsvpContactById").entered();

    let found = rsvp_contact_phone(&body, &app_state)
        .await
        .inspect_err(|err| log_failure(ENDPOINT, err))?;

    Ok(web::HttpResponse::Ok().json(&found))
}

async fn rsvp_contact_phone(body: &Bytes, app_state: &AppState) -> Result<PhoneLookup, GatewayError> {
    let expected = app_state
        .secrets
        .get_secret_value(&app_state.settings.legacy_secret_id)
        .await
        .map_err(|err| GatewayError::upstream(&err))?
        .ok_or(AuthFailure::SharedSecretMissing)?;

    let request: schemas::FindRsvpContactRequest = schemas::parse_body(body)?;

    let authorized = request
        .data
        .secret_key
        .as_deref()
        .is_some_and(|provided| verify_shared_secret(provided, &expected));
    if !authorized {
        return Err(AuthFailure::InvalidSharedSecret.into());
    }

    let user_id = schemas::required_field(
        request.data.user_id.as_deref(),
        "'userId' must be a non-empty string ID.",
    )?;

    Ok(ContactResolver::new(app_state.contacts.as_ref())
        .find_phone(&user_id)
        .await?)
}

#[cfg(test)]
mod tests {
    use crate::{
        models::contact::{Contact, Revision},
        webhook::{
            routes,
            test_support::{LEGACY_SECRET, Mocks},
        },
    };
    use mockall::predicate::*;
    use ntex::{
        http,
        web::{App, test},
    };
    use serde_json::{Value, json};

    async fn post(mocks: Mocks, body: Value) -> (http::StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .state(mocks.into_state())
                .configure(routes::functions),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/_functions/findRsvpContactById")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[ntex::test]
    async fn test_contact_without_phone() {
        let mut mocks = Mocks::default();
        mocks
            .contacts
            .expect_get_contact()
            .with(eq("u7"))
            .times(1)
            .returning(|_| {
                Ok(Some(Contact {
                    id: "u7".into(),
                    email: Some("u7@example.com".into()),
                    phone: None,
                    revision: Some(Revision("2".into())),
                }))
            });

        let (status, body) = post(
            mocks,
            json!({"data": {"userId": "u7", "secretKey": LEGACY_SECRET}}),
        )
        .await;

        assert_eq!(status, http::StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "⛔ No phone number found for the contact.", "phone": ""})
        );
    }

    #[ntex::test]
    async fn test_wrong_or_missing_secret() {
        for data in [
            json!({"userId": "u7", "secretKey": "guess"}),
            json!({"userId": "u7", "secretKey": 12345}),
            json!({"userId": "u7"}),
        ] {
            let mut mocks = Mocks::default();
            mocks.contacts.expect_get_contact().never();

            let (status, body) = post(mocks, json!({ "data": data })).await;
            assert_eq!(status, http::StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({"error": "Unauthorized: Invalid or missing secretKey."})
            );
        }
    }

    #[ntex::test]
    async fn test_blank_user_id() {
        let (status, body) = post(
            Mocks::default(),
            json!({"data": {"userId": "   ", "secretKey": LEGACY_SECRET}}),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": "'userId' must be a non-empty string ID."})
        );
    }

    #[ntex::test]
    async fn test_unknown_contact() {
        let mut mocks = Mocks::default();
        mocks.contacts.expect_get_contact().returning(|_| Ok(None));

        let (status, body) = post(
            mocks,
            json!({"data": {"userId": "gone", "secretKey": LEGACY_SECRET}}),
        )
        .await;

        assert_eq!(status, http::StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Contact not found."}));
    }
}
