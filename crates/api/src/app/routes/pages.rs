//! Static viewer/admin pages, embedded in the binary.

use axum::response::Html;

const VIEWER_PAGE: &str = include_str!("../../../assets/viewer.html");
const ADMIN_PAGE: &str = include_str!("../../../assets/admin.html");

/// GET /
pub async fn viewer() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

/// GET /admin
pub async fn admin() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}
