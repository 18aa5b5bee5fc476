/// Built-in entry page, used when the root has no `assets/index.html`.
pub const INDEX_HTML: &str = include_str!("../../assets/index.html");

const SCRIPT_JS: &str = include_str!("../../assets/script.js");
const STYLE_CSS: &str = include_str!("../../assets/style.css");

#[derive(Debug, Clone, Copy)]
pub struct EmbeddedAsset {
    pub content_type: &'static str,
    pub body: &'static str,
}

/// Built-in client asset for a root-relative path such as `assets/script.js`.
pub fn lookup(relative: &str) -> Option<EmbeddedAsset> {
    let asset = match relative {
        "assets/index.html" => EmbeddedAsset {
            content_type: "text/html; charset=utf-8",
            body: INDEX_HTML,
        },
        "assets/script.js" => EmbeddedAsset {
            content_type: "text/javascript; charset=utf-8",
            body: SCRIPT_JS,
        },
        "assets/style.css" => EmbeddedAsset {
            content_type: "text/css; charset=utf-8",
            body: STYLE_CSS,
        },
        _ => return None,
    };
    Some(asset)
}
