use dioxus::prelude::*;
use crate::api::FeedbackApi;
use crate::i18n::{I18nService, DEFAULT_LANG};
use crate::settings::Settings;
use crate::state::{load_feedbacks, submit_feedback, BoardHandle, FeedbackBoard};
use crate::ui::components::{FeedbackFeed, FeedbackForm, Header};
use sys_locale::get_locale;

pub fn app() -> Element {
    let settings = use_context::<Settings>();
    let api = use_context::<FeedbackApi>();

    use_context_provider(|| {
        let lang = settings
            .locale
            .clone()
            .or_else(get_locale)
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        let i18n = I18nService::for_locale(&lang);
        log::debug!("ui language {} (locale {lang})", i18n.lang());
        Signal::new(i18n)
    });

    let mut board = use_signal(FeedbackBoard::new);

    // Initial list load, once per mount.
    let list_api = api.clone();
    use_future(move || {
        let api = list_api.clone();
        async move { load_feedbacks(board, api.list()).await }
    });

    let on_submit = move |_: ()| {
        let api = api.clone();
        spawn(submit_feedback(board, move |draft| async move { api.create(&draft).await }));
    };

    let (name, comment, loading, status, entries) = {
        let b = board.read();
        (
            b.name().to_string(),
            b.comment().to_string(),
            b.is_loading(),
            b.status().cloned(),
            b.entries().to_vec(),
        )
    };

    rsx! {
        div { class: "page",
            div { class: "page-inner",
                Header {}
                FeedbackForm {
                    name,
                    comment,
                    loading,
                    status,
                    on_name: move |v: String| board.write().set_name(v),
                    on_comment: move |v: String| board.write().set_comment(v),
                    on_submit,
                }
                FeedbackFeed { entries }
            }
        }
    }
}

impl BoardHandle for Signal<FeedbackBoard> {
    fn update<R>(&mut self, f: impl FnOnce(&mut FeedbackBoard) -> R) -> R {
        f(&mut self.write())
    }
}
