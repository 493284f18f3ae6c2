//! Capture page served at `/`
//!
//! The HTML is embedded at compile time and rendered once at startup, since
//! everything it shows comes from immutable configuration.

const TEMPLATE: &str = include_str!("index.html");

/// Render the page for an app name, recipient and API base URL
pub fn render_index(app_name: &str, to_email: &str, api_base: &str) -> String {
    let to_email = if to_email.is_empty() { "(not set)" } else { to_email };

    TEMPLATE
        .replace("{{APP_NAME}}", &escape_html(app_name))
        .replace("{{TO_EMAIL}}", &escape_html(to_email))
        .replace("{{API_BASE_JSON}}", &script_string(api_base))
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON string literal that cannot close the surrounding <script>
fn script_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
