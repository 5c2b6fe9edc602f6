//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (the live reload script block)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use std::sync::LazyLock;

    /// Path the browser script opens on the live reload port.
    pub const WS_PATH: &str = "/livegate";

    /// Variables for livereload.html.
    pub struct LiveReloadVars<'a> {
        pub ws_path: &'a str,
    }

    impl TemplateVars for LiveReloadVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__WS_PATH__", self.ws_path)
        }
    }

    /// Script block spliced into served HTML right after `<body>`.
    pub const LIVERELOAD_HTML: Template<LiveReloadVars<'static>> =
        Template::new(include_str!("serve/livereload.html"));

    /// The rendered block. Identical for every response of a run.
    pub static LIVERELOAD_SCRIPT: LazyLock<String> =
        LazyLock::new(|| LIVERELOAD_HTML.render(&LiveReloadVars { ws_path: WS_PATH }));

}
