use dioxus::prelude::*;

use crate::session::{Notice, NoticeKind};

fn palette(kind: NoticeKind) -> (&'static str, &'static str) {
    match kind {
        NoticeKind::Info => ("#60a5fa", "rgba(96, 165, 250, 0.1)"),
        NoticeKind::Success => ("#34d399", "rgba(52, 211, 153, 0.1)"),
        NoticeKind::Error => ("#ef4444", "rgba(239, 68, 68, 0.1)"),
    }
}

#[component]
pub fn NoticeBanner(notice: Notice, on_dismiss: EventHandler<()>) -> Element {
    let (color, background) = palette(notice.kind);

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; gap: 12px; color: {color}; margin-bottom: 16px; padding: 12px; background: {background}; border-radius: 8px; border: 1px solid {color}; font-size: 14px;",
            span { "{notice.text}" }
            button {
                onclick: move |_| on_dismiss.call(()),
                style: "background: transparent; border: none; color: {color}; font-size: 16px; cursor: pointer;",
                "×"
            }
        }
    }
}
