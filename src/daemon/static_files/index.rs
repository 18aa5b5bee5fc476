/// Script tag the server-root value is injected in front of.
pub(super) const CLIENT_SCRIPT_TAG: &str = "<script src=\"assets/script.js\"></script>";

/// Expose `root_display` to the client as `window.SERVER_ROOT_DIR`.
///
/// The value is written as a JSON string literal with `</` escaped so it
/// cannot close the surrounding script element.
pub(super) fn inject_server_root(html: &str, root_display: &str) -> String {
    let literal = serde_json::to_string(root_display)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/");
    let snippet = format!("<script>window.SERVER_ROOT_DIR = {literal};</script>");

    if html.contains(CLIENT_SCRIPT_TAG) {
        html.replacen(
            CLIENT_SCRIPT_TAG,
            &format!("{snippet}\n  {CLIENT_SCRIPT_TAG}"),
            1,
        )
    } else if let Some(pos) = html.rfind("</body>") {
        let mut out = String::with_capacity(html.len() + snippet.len() + 1);
        out.push_str(&html[..pos]);
        out.push_str(&snippet);
        out.push('\n');
        out.push_str(&html[pos..]);
        out
    } else {
        format!("{html}{snippet}")
    }
}
