pub mod layout;
pub mod map;

use dioxus::prelude::VirtualDom;

pub use map::render_map;

/// Render a VirtualDom into a complete HTML document string.
fn render_to_html(dom: &VirtualDom) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\">{}</html>",
        dioxus::ssr::render(dom)
    )
}
