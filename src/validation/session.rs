use reqwest::header::{LOCATION, REFERER, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};

use std::collections::BTreeMap;

use crate::core::constants::{http, routes};
use crate::core::error::{Result, RouteProbeError};
use crate::core::types::Route;
use crate::discovery::render::UrlRenderer;
use crate::discovery::source::RouteSource;
use crate::reporting::sink::ReportSink;
use crate::validation::probe::TransportSettings;

/// Absolute URL of the login form, taken from the `user.login` route when
/// the source has one.
pub fn login_url(source: &dyn RouteSource, renderer: &UrlRenderer) -> Result<Url> {
    if !renderer.is_absolute() {
        return Err(RouteProbeError::Config(
            "A base URL is required to request a session cookie.".to_string(),
        ));
    }

    let route = source
        .route_by_name(routes::LOGIN_ROUTE)
        .unwrap_or_else(|_| Route::new(routes::LOGIN_ROUTE, routes::LOGIN_PATH));

    let rendered = renderer.render(&route, &BTreeMap::new()).ok_or_else(|| {
        RouteProbeError::Config(format!(
            "Could not generate a login URL from path '{}'",
            route.path
        ))
    })?;

    Url::parse(rendered.as_str())
        .map_err(|e| RouteProbeError::Config(format!("Invalid login URL: {e}")))
}

/// Log in with `username` and `password`, writing every `Set-Cookie` value
/// seen along the redirect chain to `sink`. Returns the same values.
pub async fn session_cookies(
    login_url: &Url,
    username: &str,
    password: &str,
    settings: &TransportSettings,
    verify_ssl: bool,
    sink: &dyn ReportSink,
) -> Result<Vec<String>> {
    let client = Client::builder()
        .timeout(settings.timeout)
        .redirect(Policy::none())
        .user_agent(settings.user_agent.as_str())
        .danger_accept_invalid_certs(!verify_ssl)
        .cookie_store(true)
        .build()?;

    let form = [
        ("name", username),
        ("pass", password),
        ("form_id", "user_login_form"),
        ("op", "Log in"),
    ];

    log::debug!("HTTP Request: {login_url}.");
    let mut response = client.post(login_url.clone()).form(&form).send().await?;
    let mut cookies = Vec::new();
    let mut hops = 0;

    loop {
        for value in response.headers().get_all(SET_COOKIE) {
            match value.to_str() {
                Ok(cookie) => {
                    sink.line(cookie);
                    cookies.push(cookie.to_string());
                }
                Err(_) => log::warn!("Ignoring non-ASCII Set-Cookie header"),
            }
        }

        if !response.status().is_redirection() || hops >= http::MAX_LOGIN_REDIRECTS {
            break;
        }

        let current = response.url().clone();
        let Some(next) = response
            .headers()
            .get(LOCATION)
            .and_then(|location| location.to_str().ok())
            .and_then(|location| current.join(location).ok())
        else {
            break;
        };

        hops += 1;
        log::debug!("HTTP Request: {next}.");
        // 307 and 308 repeat the form submission; other redirects become a GET
        let request = match response.status() {
            StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => {
                client.post(next).form(&form)
            }
            _ => client.get(next),
        };
        response = request.header(REFERER, current.as_str()).send().await?;
    }

    if cookies.is_empty() {
        log::warn!("Login at {login_url} did not set any cookies");
    }

    Ok(cookies)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::discovery::source::{ParameterCatalog, RouteTable};
    use crate::reporting::sink::MemorySink;
    use mockito::{Matcher, Server};

    fn empty_table() -> RouteTable {
        RouteTable::new(Vec::new(), ParameterCatalog::default()).unwrap()
    }

    #[test]
    fn test_login_url__defaults_to_user_login_path() {
        let renderer = UrlRenderer::new(Some("http://example.com/")).unwrap();
        let url = login_url(&empty_table(), &renderer).unwrap();
        assert_eq!(url.as_str(), "http://example.com/user/login");
    }

    #[test]
    fn test_login_url__uses_registered_route() {
        let table = RouteTable::new(
            vec![Route::new("user.login", "/account/signin")],
            ParameterCatalog::default(),
        )
        .unwrap();
        let renderer = UrlRenderer::new(Some("http://example.com")).unwrap();

        let url = login_url(&table, &renderer).unwrap();
        assert_eq!(url.as_str(), "http://example.com/account/signin");
    }

    #[test]
    fn test_login_url__requires_base_url() {
        let result = login_url(&empty_table(), &UrlRenderer::relative());
        assert!(matches!(result, Err(RouteProbeError::Config(_))));
    }

    #[tokio::test]
    async fn test_session_cookies__posts_login_form() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/user/login")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "admin".into()),
                Matcher::UrlEncoded("pass".into(), "secret".into()),
                Matcher::UrlEncoded("form_id".into(), "user_login_form".into()),
                Matcher::UrlEncoded("op".into(), "Log in".into()),
            ]))
            .with_status(200)
            .with_header("set-cookie", "SESSabc=xyz; path=/; HttpOnly")
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/user/login", server.url())).unwrap();
        let sink = MemorySink::new();

        let cookies = session_cookies(&url, "admin", "secret", &TransportSettings::default(), true, &sink)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(cookies, vec!["SESSabc=xyz; path=/; HttpOnly"]);
        assert_eq!(sink.lines(), cookies);
    }

    #[tokio::test]
    async fn test_session_cookies__follows_redirect_chain() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/user/login")
            .with_status(303)
            .with_header("location", "/user/1")
            .with_header("set-cookie", "SESSabc=xyz; path=/")
            .create_async()
            .await;
        let profile = server
            .mock("GET", "/user/1")
            .match_header("referer", Matcher::Regex("/user/login$".into()))
            .with_status(200)
            .with_header("set-cookie", "has_js=1; path=/")
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/user/login", server.url())).unwrap();
        let sink = MemorySink::new();

        let cookies = session_cookies(&url, "admin", "secret", &TransportSettings::default(), true, &sink)
            .await
            .unwrap();

        profile.assert_async().await;
        assert_eq!(cookies, vec!["SESSabc=xyz; path=/", "has_js=1; path=/"]);
    }

    #[tokio::test]
    async fn test_session_cookies__temporary_redirect_resends_form() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/user/login")
            .with_status(307)
            .with_header("location", "/user/login/submit")
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/user/login/submit")
            .match_header("referer", Matcher::Regex("/user/login$".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "admin".into()),
                Matcher::UrlEncoded("pass".into(), "secret".into()),
                Matcher::UrlEncoded("form_id".into(), "user_login_form".into()),
            ]))
            .with_status(302)
            .with_header("location", "/user/1")
            .with_header("set-cookie", "SESSabc=xyz; path=/")
            .create_async()
            .await;
        let profile = server
            .mock("GET", "/user/1")
            .match_body(Matcher::Exact(String::new()))
            .with_status(200)
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/user/login", server.url())).unwrap();
        let sink = MemorySink::new();

        let cookies = session_cookies(&url, "admin", "secret", &TransportSettings::default(), true, &sink)
            .await
            .unwrap();

        submit.assert_async().await;
        profile.assert_async().await;
        assert_eq!(cookies, vec!["SESSabc=xyz; path=/"]);
    }

    #[tokio::test]
    async fn test_session_cookies__stops_after_five_redirects() {
        let mut server = Server::new_async().await;
        let _login = server
            .mock("POST", "/user/login")
            .with_status(302)
            .with_header("location", "/loop")
            .create_async()
            .await;
        let looping = server
            .mock("GET", "/loop")
            .with_status(302)
            .with_header("location", "/loop")
            .expect(5)
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/user/login", server.url())).unwrap();
        let sink = MemorySink::new();

        let cookies = session_cookies(&url, "admin", "secret", &TransportSettings::default(), true, &sink)
            .await
            .unwrap();

        looping.assert_async().await;
        assert!(cookies.is_empty());
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_session_cookies__unreachable_host() {
        let url = Url::parse("http://127.0.0.1:1/user/login").unwrap();
        let result = session_cookies(
            &url,
            "admin",
            "secret",
            &TransportSettings::default(),
            true,
            &MemorySink::new(),
        )
        .await;

        assert!(matches!(result, Err(RouteProbeError::Http(_))));
    }
}
