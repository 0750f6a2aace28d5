// src/server/inject.rs

//! Live-reload client and its injection into served pages.

/// SSE endpoint the client subscribes to.
pub const EVENTS_PATH: &str = "/__assetflow/events";

/// Route serving [`CLIENT_SCRIPT`].
pub const SCRIPT_PATH: &str = "/__assetflow/client.js";

/// Browser side of live reload: `page` reloads the document, `styles`
/// re-fetches every stylesheet in place.
pub const CLIENT_SCRIPT: &str = r#"(() => {
  const source = new EventSource("/__assetflow/events");
  source.addEventListener("page", () => location.reload());
  source.addEventListener("styles", () => {
    for (const link of document.querySelectorAll('link[rel="stylesheet"]')) {
      const url = new URL(link.href);
      url.searchParams.set("assetflow", Date.now().toString());
      link.href = url.toString();
    }
  });
})();
"#;

/// Insert the client `<script>` tag before the last `</body>`, or append it
/// when the page has none.
pub fn inject_script(html: &str) -> String {
    let tag = format!(r#"<script src="{SCRIPT_PATH}"></script>"#);
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..at]);
            out.push_str(&tag);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{html}{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_goes_before_closing_body() {
        let out = inject_script("<html><BODY><p>x</p></BODY></html>");
        assert_eq!(
            out,
            "<html><BODY><p>x</p><script src=\"/__assetflow/client.js\"></script></BODY></html>"
        );
    }

    #[test]
    fn fragments_get_the_script_appended() {
        assert_eq!(
            inject_script("<p>x</p>"),
            "<p>x</p><script src=\"/__assetflow/client.js\"></script>"
        );
    }

    #[test]
    fn client_listens_on_the_events_route() {
        assert!(CLIENT_SCRIPT.contains(EVENTS_PATH));
    }
}
