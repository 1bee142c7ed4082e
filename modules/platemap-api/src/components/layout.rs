use dioxus::prelude::*;

const PAGE_STYLE: &str = r#"
#map { position: absolute; inset: 0; }
body.dark #map .leaflet-tile { filter: invert(1) hue-rotate(180deg) brightness(0.9); }
#toast { transition: opacity 0.3s; }
.chat-link { color: #2563eb; cursor: pointer; text-decoration: underline; }
"#;

/// Full-screen map shell: CDN includes in the head, overlay panels as
/// children.
#[allow(non_snake_case)]
#[component]
pub fn Layout(title: String, children: Element) -> Element {
    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{title}" }
            script { src: "https://cdn.tailwindcss.com" }
            link { rel: "stylesheet", href: "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" }
            link {
                rel: "stylesheet",
                href: "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.css"
            }
            link {
                rel: "stylesheet",
                href: "https://unpkg.com/leaflet.markercluster@1.5.3/dist/MarkerCluster.Default.css"
            }
            style { dangerous_inner_html: PAGE_STYLE }
        }
        body { class: "font-sans text-gray-900",
            {children}
        }
    }
}
