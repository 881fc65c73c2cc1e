//! Resources compiled into the binary.

pub mod serve {
    /// URL the live reload client is served from.
    pub const RELOAD_JS_URL: &str = "/__assetflow/reload.js";

    const RELOAD_JS: &str = include_str!("serve/reload.js");

    /// Settings baked into the reload client when it is served.
    #[derive(Debug, Clone, Copy)]
    pub struct ReloadVars {
        pub ws_port: u16,
        pub notify: bool,
    }

    impl ReloadVars {
        /// The client with its `__ASSETFLOW_<NAME>__` markers filled in.
        pub fn client_script(&self) -> String {
            let port = self.ws_port.to_string();
            let notify = if self.notify { "true" } else { "false" };
            fill_markers(RELOAD_JS, &[("WS_PORT", &port), ("NOTIFY", notify)])
        }
    }

    fn fill_markers(source: &str, values: &[(&str, &str)]) -> String {
        values.iter().fold(source.to_string(), |out, (name, value)| {
            out.replace(&format!("__ASSETFLOW_{name}__"), value)
        })
    }

    /// `<script>` tag loading the client, injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{RELOAD_JS_URL}" defer></script>"#)
    }
}
