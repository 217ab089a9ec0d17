#![allow(non_snake_case)]
mod api;
mod app;
mod i18n;
mod settings;
mod state;
mod ui;

use dioxus::prelude::*;
use dioxus::desktop::{Config, WindowBuilder};
use env_logger::Env;
use api::FeedbackApi;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = match settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    let api = match FeedbackApi::new(&settings.api_base) {
        Ok(api) => api,
        Err(err) => {
            log::error!("could not build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let custom_head = r#"
        <style>
            :root {
                --bg-from: #eff6ff;
                --bg-to: #e0e7ff;
                --card: #ffffff;
                --text-main: #1f2937;
                --text-sub: #4b5563;
                --text-muted: #6b7280;
                --accent-primary: #4f46e5;
                --accent-hover: #4338ca;
                --border-color: #e5e7eb;
                --ok-bg: #dcfce7;
                --ok-text: #15803d;
                --err-bg: #fee2e2;
                --err-text: #b91c1c;
            }

            html, body {
                margin: 0; padding: 0; min-height: 100%;
                font-family: 'Inter', sans-serif; color: var(--text-main);
                background: linear-gradient(135deg, var(--bg-from), var(--bg-to));
            }

            .page { min-height: 100vh; padding: 32px 16px; box-sizing: border-box; }
            .page-inner { max-width: 896px; margin: 0 auto; }

            .page-header { text-align: center; margin-bottom: 32px; }
            .page-icon { font-size: 4em; color: var(--accent-primary); margin-bottom: 16px; }
            .page-header h1 { font-size: 2.25em; font-weight: 700; margin: 0 0 8px 0; }
            .page-subtitle { color: var(--text-sub); margin: 0; }

            .card {
                background: var(--card); border-radius: 8px; padding: 24px; margin-bottom: 32px;
                box-shadow: 0 10px 15px -3px rgba(0,0,0,0.1), 0 4px 6px -4px rgba(0,0,0,0.1);
            }
            .card h2 { font-size: 1.5em; font-weight: 600; margin: 0 0 16px 0; }

            .field { margin-bottom: 16px; }
            .field label { display: block; color: #374151; font-weight: 500; margin-bottom: 8px; }

            input, textarea {
                width: 100%; box-sizing: border-box; padding: 8px 16px; font: inherit;
                border: 1px solid #d1d5db; border-radius: 8px; outline: none; resize: none;
            }
            input:focus, textarea:focus { border-color: transparent; box-shadow: 0 0 0 2px var(--accent-primary); }

            .status-banner { margin-bottom: 16px; padding: 12px; border-radius: 8px; }
            .status-banner.success { background: var(--ok-bg); color: var(--ok-text); }
            .status-banner.error { background: var(--err-bg); color: var(--err-text); }

            .submit-btn {
                width: 100%; padding: 12px; border: none; border-radius: 8px; cursor: pointer;
                background: var(--accent-primary); color: white; font-weight: 600; font-size: 1em;
                display: flex; align-items: center; justify-content: center; gap: 8px;
                transition: background 0.2s;
            }
            .submit-btn:hover { background: var(--accent-hover); }
            .submit-btn:disabled { opacity: 0.5; cursor: default; }

            .feed { display: flex; flex-direction: column; gap: 16px; }
            .feed-empty { color: var(--text-muted); text-align: center; padding: 32px 0; }

            .feedback-card { border: 1px solid var(--border-color); border-radius: 8px; padding: 16px; transition: box-shadow 0.2s; }
            .feedback-card:hover { box-shadow: 0 4px 6px -1px rgba(0,0,0,0.1); }
            .feedback-card-head { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 8px; }
            .feedback-card-head h3 { font-size: 1em; font-weight: 600; margin: 0; }
            .feedback-date { font-size: 0.875em; color: var(--text-muted); }
            .feedback-card p { color: var(--text-sub); margin: 0; white-space: pre-wrap; }
        </style>
    "#;

    let window = WindowBuilder::new()
        .with_title("Feedback Collector")
        .with_resizable(true);

    let config = Config::new()
        .with_custom_head(custom_head.to_string())
        .with_window(window);

    log::info!("using feedback API at {}", api.feedbacks_url());

    LaunchBuilder::desktop()
        .with_cfg(config)
        .with_context(settings)
        .with_context(api)
        .launch(app::app);
}
