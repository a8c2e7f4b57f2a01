use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::error;

static HTML_500: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>registrar | Error</title>
</head>
<body>
<h1>Internal Server Error</h1>
<p>(Error 500)</p>
<p>Something went wrong on our end. No further or more
helpful information is available about the problem.</p>
</body>
</html>"#;

/// Compiled-in page templates. One registry per process, built at startup
/// and shared through the app state.
pub struct Pages {
    hb: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Self {
        let mut hb = Handlebars::new();

        let templates: &[(&str, &str)] = &[
            ("login", include_str!("../templates/login.hbs")),
            ("register", include_str!("../templates/register.hbs")),
            ("dashboard", include_str!("../templates/dashboard.hbs")),
            (
                "admin_dashboard",
                include_str!("../templates/admin_dashboard.hbs"),
            ),
            ("edit_student", include_str!("../templates/edit_student.hbs")),
            ("chat", include_str!("../templates/chat.hbs")),
        ];

        for (name, source) in templates {
            hb.register_template_string(name, source)
                .unwrap_or_else(|e| panic!("template {} failed to compile: {}", name, e));
        }

        Self { hb }
    }

    pub fn render<S: Serialize>(&self, name: &str, data: &S) -> Response {
        match self.hb.render(name, data) {
            Ok(body) => Html(body).into_response(),
            Err(e) => {
                error!("Error rendering template {:?}: {}", name, e);
                html_500()
            }
        }
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self::new()
    }
}

pub fn html_500() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(HTML_500)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile_and_render_login() {
        let pages = Pages::new();
        let body = pages
            .hb
            .render("login", &serde_json::json!({ "flash": null }))
            .unwrap();
        assert!(body.contains("<form"));
    }
}
