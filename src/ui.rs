// Presentational pieces of the feedback page. State lives in app.rs; these
// components only render what they are given and forward input events.

pub mod components {
    use crate::api::FeedbackEntry;
    use crate::i18n::I18nService;
    use crate::state::StatusMessage;
    use dioxus::prelude::*;

    #[component]
    pub fn Header() -> Element {
        let i18n = use_context::<Signal<I18nService>>();
        let i18n = i18n.read();
        rsx! {
            div { class: "page-header",
                div { class: "page-icon", "💬" }
                h1 { "{i18n.translate(\"title\")}" }
                p { class: "page-subtitle", "{i18n.translate(\"subtitle\")}" }
            }
        }
    }

    #[component]
    pub fn StatusBanner(status: StatusMessage) -> Element {
        let i18n = use_context::<Signal<I18nService>>();
        let text = i18n.read().translate(status.key);
        let class = if status.is_error() { "status-banner error" } else { "status-banner success" };
        rsx! {
            div { class: "{class}", "{text}" }
        }
    }

    #[component]
    pub fn FeedbackForm(
        name: String,
        comment: String,
        loading: bool,
        #[props(!optional)] status: Option<StatusMessage>,
        on_name: EventHandler<String>,
        on_comment: EventHandler<String>,
        on_submit: EventHandler<()>,
    ) -> Element {
        let i18n = use_context::<Signal<I18nService>>();
        let i18n = i18n.read();
        let button_label = if loading { i18n.translate("btn-submitting") } else { i18n.translate("btn-submit") };

        rsx! {
            div { class: "card",
                h2 { "{i18n.translate(\"form-heading\")}" }
                div { class: "field",
                    label { "{i18n.translate(\"label-name\")}" }
                    input {
                        r#type: "text",
                        value: "{name}",
                        placeholder: "{i18n.translate(\"placeholder-name\")}",
                        oninput: move |e| on_name.call(e.value()),
                    }
                }
                div { class: "field",
                    label { "{i18n.translate(\"label-comment\")}" }
                    textarea {
                        rows: "4",
                        value: "{comment}",
                        placeholder: "{i18n.translate(\"placeholder-comment\")}",
                        oninput: move |e| on_comment.call(e.value()),
                    }
                }
                if let Some(status) = status {
                    StatusBanner { status }
                }
                button {
                    class: "submit-btn",
                    disabled: loading,
                    onclick: move |_| on_submit.call(()),
                    span { "➤" }
                    "{button_label}"
                }
            }
        }
    }

    #[component]
    pub fn FeedbackFeed(entries: Vec<FeedbackEntry>) -> Element {
        let i18n = use_context::<Signal<I18nService>>();
        let i18n = i18n.read();

        rsx! {
            div { class: "card",
                h2 { "{i18n.translate(\"feed-heading\")}" }
                if entries.is_empty() {
                    p { class: "feed-empty", "{i18n.translate(\"feed-empty\")}" }
                } else {
                    div { class: "feed",
                        for entry in entries.iter() {
                            FeedbackCard { key: "{entry.id}", entry: entry.clone() }
                        }
                    }
                }
            }
        }
    }

    #[component]
    pub fn FeedbackCard(entry: FeedbackEntry) -> Element {
        let i18n = use_context::<Signal<I18nService>>();
        let date = i18n.read().format_date(&entry.created_at);
        rsx! {
            div { class: "feedback-card",
                div { class: "feedback-card-head",
                    h3 { "{entry.name}" }
                    span { class: "feedback-date", "{date}" }
                }
                p { "{entry.comment}" }
            }
        }
    }
}
