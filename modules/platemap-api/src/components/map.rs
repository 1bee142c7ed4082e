use dioxus::prelude::*;

use platemap_common::{AwardSource, FacetKey};

use super::layout::Layout;
use super::render_to_html;

/// The browser side is a dumb renderer: it posts viewport + filter state
/// to `/api/projection` and draws whatever handles come back. Identity is
/// the record id on every marker and row; the full dataset is fetched once
/// only to resolve chat `[[Name]]` tokens and focus targets.
const MAP_SCRIPT: &str = r#"
const map = L.map('map').setView([37.5665, 126.9780], 12);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
    attribution: '&copy; OpenStreetMap contributors',
    maxZoom: 18,
}).addTo(map);

const cluster = L.markerClusterGroup({ showCoverageOnHover: false });
map.addLayer(cluster);

let markersById = {};
let visibleIds = [];
let pendingFocus = null;
let lang = 'en';
const idIndex = {};
const nameIndex = {};

fetch('/api/places')
    .then(r => r.json())
    .then(data => {
        (data.features || []).forEach(f => {
            const p = f.properties;
            const [lng, lat] = f.geometry.coordinates;
            idIndex[p.id] = { lat, lng };
            nameIndex[(p.name || '').toLowerCase()] = p.id;
            if (p.localized_name) nameIndex[p.localized_name.toLowerCase()] = p.id;
        });
    });

function notice(message) {
    const toast = document.getElementById('toast');
    toast.textContent = message;
    toast.style.opacity = 1;
    setTimeout(() => { toast.style.opacity = 0; }, 4000);
}

function markerColor(source) {
    return (source || '').toLowerCase().includes('michelin') ? '#c62828' : '#1565c0';
}

function escapeHtml(s) {
    return (s || '').replace(/[&<>"']/g, c => ({
        '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
    })[c]);
}

function popupHtml(m) {
    let html = `<strong>${escapeHtml(m.label)}</strong>` +
        `<br><span style="color:${markerColor(m.source)};font-weight:600;font-size:11px">${escapeHtml(m.category)}</span>`;
    const meta = [m.cuisine, m.price, m.phone].filter(Boolean).map(escapeHtml).join(' · ');
    if (meta) html += `<br><span style="font-size:12px;color:#555">${meta}</span>`;
    if (m.address) html += `<br><span style="font-size:12px;color:#555">${escapeHtml(m.address)}</span>`;
    if (m.description) html += `<br><span style="font-size:12px">${escapeHtml(m.description.substring(0, 160))}</span>`;
    html += `<br><span style="font-size:12px">` +
        `<a href="${m.links.provider}" target="_blank" rel="noopener">Kakao</a> · ` +
        `<a href="${m.links.map_search}" target="_blank" rel="noopener">Naver</a> · ` +
        `<a href="${m.links.web_search}" target="_blank" rel="noopener">Google</a></span>`;
    return html;
}

function highlight(id, on) {
    const marker = markersById[id];
    if (!marker) return;
    marker.setStyle({ radius: on ? 10 : 7, weight: on ? 3 : 2 });
}

function renderProjection(data) {
    cluster.clearLayers();
    markersById = {};
    visibleIds = data.markers.map(m => m.id);

    data.markers.forEach(m => {
        const marker = L.circleMarker([m.lat, m.lng], {
            radius: 7, fillColor: markerColor(m.source), color: '#fff', weight: 2, fillOpacity: 0.85
        });
        marker.bindPopup(popupHtml(m));
        markersById[m.id] = marker;
        cluster.addLayer(marker);
    });

    const list = document.getElementById('list');
    list.innerHTML = '';
    data.rows.forEach(row => {
        const el = document.createElement('div');
        el.className = 'px-3 py-2 border-b border-gray-100 cursor-pointer hover:bg-gray-50';
        const sub = [row.category, row.cuisine, row.price].filter(Boolean).map(escapeHtml).join(' · ');
        el.innerHTML = `<span class="text-xs text-gray-400 mr-1">${row.rank}</span>` +
            `<strong class="text-sm">${escapeHtml(row.label)}</strong>` +
            `<div class="text-xs text-gray-500">${sub}</div>`;
        el.onmouseenter = () => highlight(row.id, true);
        el.onmouseleave = () => highlight(row.id, false);
        el.onclick = () => {
            focusById(row.id);
            if (window.innerWidth < 768) document.getElementById('panel').classList.add('hidden');
        };
        list.appendChild(el);
    });

    document.getElementById('count').textContent = data.total;

    // Deferred popup from a focus request: only if the target survived
    // this pass. Stale targets are dropped, never resurrected.
    if (pendingFocus) {
        const target = markersById[pendingFocus];
        pendingFocus = null;
        if (target) cluster.zoomToShowLayer(target, () => target.openPopup());
    }
}

function refresh() {
    const b = map.getBounds();
    const params = new URLSearchParams({
        south: b.getSouth(), west: b.getWest(), north: b.getNorth(), east: b.getEast(), lang
    });
    const q = document.getElementById('search').value.trim();
    if (q) params.set('q', q);
    const off = Array.from(document.querySelectorAll('.facet:not(:checked)'))
        .map(el => el.dataset.key).join(',');
    if (off) params.set('off', off);
    fetch('/api/projection?' + params).then(r => r.json()).then(renderProjection);
}

function focusById(id) {
    const hit = idIndex[id];
    if (!hit) return;
    // Recenter first; the moveend refresh reopens the popup once the
    // marker exists again, even if the record was off-screen.
    pendingFocus = id;
    map.setView([hit.lat, hit.lng], 15);
}

function focusByName(name) {
    const id = nameIndex[(name || '').toLowerCase()];
    if (!id) { notice(`No place named "${name}" on this map.`); return; }
    focusById(id);
}

map.on('moveend', refresh);
document.querySelectorAll('.facet').forEach(el => el.addEventListener('change', refresh));
document.getElementById('search').addEventListener('input', refresh);

document.getElementById('locate').onclick = () => {
    if (!navigator.geolocation) { notice('Geolocation is not available.'); return; }
    navigator.geolocation.getCurrentPosition(
        pos => map.setView([pos.coords.latitude, pos.coords.longitude], 14),
        () => notice('Could not determine your location.')
    );
};

document.getElementById('lang').onclick = () => {
    lang = lang === 'en' ? 'ko' : 'en';
    document.getElementById('lang').textContent = lang === 'en' ? '한국어' : 'English';
    refresh();
};

document.getElementById('theme').onclick = () => document.body.classList.toggle('dark');

document.getElementById('panel-toggle').onclick = () =>
    document.getElementById('panel').classList.toggle('hidden');

const chatForm = document.getElementById('chat-form');
if (chatForm) {
    const log = document.getElementById('chat-log');
    log.addEventListener('click', e => {
        if (e.target.classList.contains('chat-link')) focusByName(e.target.dataset.name);
    });
    chatForm.addEventListener('submit', e => {
        e.preventDefault();
        const input = document.getElementById('chat-input');
        const question = input.value.trim();
        if (!question) return;
        input.value = '';
        log.insertAdjacentHTML('beforeend',
            `<div class="text-sm text-right text-gray-600 my-1">${escapeHtml(question)}</div>`);
        fetch('/api/chat', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ question, lang, visible: visibleIds.slice(0, 50) }),
        })
            .then(r => r.json())
            .then(data => {
                const answer = escapeHtml(data.answer).replace(/\[\[([^\]]+)\]\]/g,
                    (_, name) => `<span class="chat-link" data-name="${name}">${name}</span>`);
                log.insertAdjacentHTML('beforeend', `<div class="text-sm my-1">${answer}</div>`);
                log.scrollTop = log.scrollHeight;
            })
            .catch(() => log.insertAdjacentHTML('beforeend',
                '<div class="text-sm text-red-600 my-1">The dining guide did not answer. Please try again.</div>'));
    });
}

refresh();
"#;

#[allow(non_snake_case)]
#[component]
fn FacetBox(facet: FacetKey, label: String, indent: bool) -> Element {
    let class = if indent {
        "flex items-center gap-2 text-sm ml-4"
    } else {
        "flex items-center gap-2 text-sm font-semibold"
    };
    rsx! {
        label { class: class,
            input {
                r#type: "checkbox",
                class: "facet",
                checked: true,
                "data-key": "{facet}",
            }
            "{label}"
        }
    }
}

#[allow(non_snake_case)]
#[component]
fn MapPage(total: usize, chat_enabled: bool) -> Element {
    rsx! {
        Layout { title: "Platemap — Seoul award restaurants".to_string(),
            div { id: "map" }

            // Filter + ranked list panel
            div {
                id: "panel",
                class: "absolute top-4 left-4 z-[1000] w-72 max-h-[85vh] bg-white rounded-lg shadow-lg flex flex-col",
                div { class: "p-3 border-b border-gray-200",
                    input {
                        id: "search",
                        r#type: "text",
                        placeholder: "Search name, cuisine, address…",
                        class: "w-full px-2 py-1.5 text-sm border border-gray-300 rounded",
                    }
                }
                div { class: "p-3 border-b border-gray-200 flex flex-col gap-1",
                    FacetBox { facet: AwardSource::Michelin.facet(), label: "Michelin Guide".to_string(), indent: false }
                    for (facet, label) in [
                        (FacetKey::MichelinThreeStars, "3 Stars"),
                        (FacetKey::MichelinTwoStars, "2 Stars"),
                        (FacetKey::MichelinOneStar, "1 Star"),
                        (FacetKey::MichelinBib, "Bib Gourmand"),
                    ] {
                        FacetBox { facet, label: label.to_string(), indent: true }
                    }
                    FacetBox { facet: AwardSource::BlueRibbon.facet(), label: "Blue Ribbon".to_string(), indent: false }
                    for (facet, label) in [
                        (FacetKey::RibbonThree, "3 Ribbons"),
                        (FacetKey::RibbonTwo, "2 Ribbons"),
                        (FacetKey::RibbonOne, "1 Ribbon"),
                    ] {
                        FacetBox { facet, label: label.to_string(), indent: true }
                    }
                }
                div { class: "px-3 py-1.5 text-xs text-gray-400 border-b border-gray-100",
                    span { id: "count", "{total}" }
                    " places in view"
                }
                div { id: "list", class: "overflow-y-auto flex-1" }
            }

            // Top-right controls
            div { class: "absolute top-4 right-4 z-[1000] flex gap-2",
                button {
                    id: "panel-toggle",
                    class: "bg-white rounded shadow px-3 py-1.5 text-sm md:hidden",
                    "List"
                }
                button { id: "locate", class: "bg-white rounded shadow px-3 py-1.5 text-sm", "Near me" }
                button { id: "lang", class: "bg-white rounded shadow px-3 py-1.5 text-sm", "한국어" }
                button { id: "theme", class: "bg-white rounded shadow px-3 py-1.5 text-sm", "Dark" }
            }

            // Chat panel
            if chat_enabled {
                div { class: "absolute bottom-4 right-4 z-[1000] w-80 bg-white rounded-lg shadow-lg flex flex-col",
                    div { class: "px-3 py-2 border-b border-gray-200 text-sm font-semibold", "Ask the guide" }
                    div { id: "chat-log", class: "px-3 overflow-y-auto max-h-60 min-h-[3rem]" }
                    form { id: "chat-form", class: "p-2 border-t border-gray-200 flex gap-2",
                        input {
                            id: "chat-input",
                            r#type: "text",
                            placeholder: "Where should I eat tonight?",
                            class: "flex-1 px-2 py-1.5 text-sm border border-gray-300 rounded",
                        }
                        button {
                            r#type: "submit",
                            class: "px-3 py-1.5 bg-blue-600 text-white rounded text-sm",
                            "Send"
                        }
                    }
                }
            }

            // One-shot notices (geolocation failure, unknown chat target)
            div {
                id: "toast",
                class: "absolute bottom-4 left-4 z-[1000] bg-gray-900 text-white text-sm px-4 py-2 rounded shadow",
                style: "opacity: 0",
            }

            script { src: "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" }
            script { src: "https://unpkg.com/leaflet.markercluster@1.5.3/dist/leaflet.markercluster.js" }
            script { dangerous_inner_html: MAP_SCRIPT }
        }
    }
}

pub fn render_map(total: usize, chat_enabled: bool) -> String {
    let mut dom = VirtualDom::new_with_props(
        MapPage,
        MapPageProps {
            total,
            chat_enabled,
        },
    );
    dom.rebuild_in_place();
    render_to_html(&dom)
}
