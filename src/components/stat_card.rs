use dioxus::prelude::*;

/// One labelled figure. Stale values are dimmed while a refetch runs.
#[component]
pub fn StatCard(#[props(into)] label: String, #[props(into)] value: String, #[props(default)] stale: bool) -> Element {
    let opacity = if stale { "0.5" } else { "1" };

    rsx! {
        div {
            style: "background: #0f172a; padding: 12px 16px; border-radius: 12px; border: 1px solid #334155;",
            div { style: "color: #94a3b8; font-size: 12px; margin-bottom: 4px;", "{label}" }
            div {
                style: "color: #e0e0e0; font-size: 18px; font-weight: 600; opacity: {opacity}; transition: opacity 0.3s ease;",
                "{value}"
            }
        }
    }
}
