//! Account API: email sessions and profile edits for the signed-in user.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::Result;
use crate::rest::RestClient;

impl RestClient {
    /// The account behind the current session.
    pub async fn get_account<T: DeserializeOwned>(&self) -> Result<T> {
        self.get("/account", &[]).await
    }

    /// Sign in with email and password. The session cookie is kept by the
    /// client for later calls.
    pub async fn create_email_session<T: DeserializeOwned>(
        &self,
        email: &str,
        password: &str,
    ) -> Result<T> {
        self.post(
            "/account/sessions/email",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Sign out. `session_id` is usually `"current"`.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.delete(&format!("/account/sessions/{session_id}")).await
    }

    pub async fn update_name<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.patch("/account/name", &json!({ "name": name })).await
    }

    pub async fn update_password<T: DeserializeOwned>(
        &self,
        password: &str,
        old_password: &str,
    ) -> Result<T> {
        self.patch(
            "/account/password",
            &json!({ "password": password, "oldPassword": old_password }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClientOptions, RestClient};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/account/sessions/email"))
            .and(body_json(json!({ "email": "me@example.com", "password": "hunter22" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "$id": "s1" })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            RestClient::new(ClientOptions::new(format!("{}/v1", server.uri()), "folio")).unwrap();
        let session: Value = client
            .create_email_session("me@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(session["$id"], "s1");
    }

    #[tokio::test]
    async fn anonymous_account_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "User (role: guests) missing scope (account)",
                "code": 401,
                "type": "general_unauthorized_scope"
            })))
            .mount(&server)
            .await;

        let client =
            RestClient::new(ClientOptions::new(format!("{}/v1", server.uri()), "folio")).unwrap();
        let err = client.get_account::<Value>().await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
