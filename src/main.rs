#![deny(clippy::all, clippy::pedantic)]
#![allow(non_snake_case, clippy::module_name_repetitions)]

use leptos::{component, provide_context, view, IntoView};
use leptos_router::{Route, Router, Routes, A};
use wasm_tracing::WASMLayerConfigBuilder;

use crate::config::Config;
use crate::dashboard::Dashboard;

mod components;
mod config;
mod dashboard;
mod datetime;
mod executor;
mod request;
mod types;

fn main() {
    console_error_panic_hook::set_once();

    let config = Config::from_build_env();
    wasm_tracing::set_as_global_default_with_config(
        WASMLayerConfigBuilder::new()
            .set_max_level(config.log_level)
            .build(),
    );
    leptos::mount_to_body(move || view! { <App config=config.clone() /> });
}

#[component]
fn App(config: Config) -> impl IntoView {
    provide_context(config);

    view! {
        <main class="container">
            <Router>
                <nav>
                    <ul>
                        <li>
                            <strong>
                                <A href="/">"Pulse"</A>
                            </strong>
                        </li>
                    </ul>
                </nav>
                <Routes>
                    <Route path="/" view=Dashboard />
                    <Route path="/*any" view=|| view! { <h1>"Not Found"</h1> } />
                </Routes>
            </Router>
        </main>
    }
}
