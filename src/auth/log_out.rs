//! The log-out endpoint.

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie, ending the user's session.
pub async fn post_log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    (invalidate_auth_cookie(jar), StatusCode::OK)
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use crate::{app_state::create_cookie_key, auth::COOKIE_TOKEN, endpoints};

    use super::post_log_out;

    #[tokio::test]
    async fn log_out_expires_auth_cookie() {
        let key: Key = create_cookie_key("foobar");
        let app = Router::new()
            .route(endpoints::LOG_OUT, post(post_log_out))
            .with_state(key);
        let server = TestServer::new(app);

        let response = server.post(endpoints::LOG_OUT).await;

        response.assert_status_ok();
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
