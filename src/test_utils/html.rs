use axum::{body::Body, response::Response};
use scraper::{Html, Selector};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_fragment(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// Assert that the response body is a fragment containing an alert with
/// `message`.
pub(crate) async fn assert_fragment_contains_alert(response: Response<Body>, message: &str) {
    let fragment = parse_html_fragment(response).await;
    let alert_selector = Selector::parse("div[role='alert']").unwrap();
    let alert_text: String = fragment
        .select(&alert_selector)
        .flat_map(|element| element.text())
        .collect();

    assert!(
        alert_text.contains(message),
        "want alert containing {message:?}, got {alert_text:?}"
    );
}
