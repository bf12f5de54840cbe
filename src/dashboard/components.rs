use chrono::Local;
use leptos::{
    component, ev, event_target_value, use_context, view, Callable, Callback, CollectView,
    IntoView, Resource, Show, Signal, SignalGet, SignalWith,
};
use leptos_use::{use_interval, UseIntervalReturn};
use tracing::warn;

use crate::components::Spinner;
use crate::config::Config;
use crate::datetime::{
    display_time, format_absolute, format_date_only, format_relative, format_time_only,
};
use crate::types::TelemetryDocument;

use super::create_dashboard::{create_dashboard, CreateDashboardReturn};
use super::state::{Connectivity, DashboardState, RefreshInterval};

#[component]
pub fn Dashboard() -> impl IntoView {
    let config = use_context::<Config>().unwrap_or_default();
    let CreateDashboardReturn {
        state,
        api_base_url,
        backend_reachable,

        refresh,
        toggle_auto_refresh,
        set_refresh_interval,
    } = create_dashboard(&config);

    view! {
        <header>
            <nav>
                <ul>
                    <li>
                        <hgroup>
                            <h2>"MQTT Data Visualization"</h2>
                            <p>"Real-time IoT data dashboard"</p>
                        </hgroup>
                    </li>
                </ul>
                <ul>
                    <li>
                        <label>
                            <input
                                type="checkbox"
                                role="switch"
                                prop:checked=move || state.with(DashboardState::auto_refresh)
                                on:change=move |_| toggle_auto_refresh.call(())
                            />
                            "Auto-refresh"
                        </label>
                    </li>
                    <Show when=move || state.with(DashboardState::auto_refresh)>
                        <li>
                            <IntervalSelect state set_refresh_interval />
                        </li>
                    </Show>
                    <li>
                        <RefreshButton state refresh />
                    </li>
                </ul>
            </nav>
        </header>

        <StatusBar state api_base_url />
        <ErrorBanner state refresh />

        <div class="grid">
            <DataCard state />
            <SystemInfo state backend_reachable />
        </div>
    }
}

#[component]
fn IntervalSelect(
    state: Signal<DashboardState>,
    set_refresh_interval: Callback<RefreshInterval>,
) -> impl IntoView {
    let handle_change = move |evt: ev::Event| {
        match event_target_value(&evt).parse::<RefreshInterval>() {
            Ok(interval) => set_refresh_interval.call(interval),
            Err(err) => warn!("{err}"),
        }
    };

    view! {
        <select aria-label="Refresh interval" on:change=handle_change>
            {RefreshInterval::ALL
                .into_iter()
                .map(|interval| {
                    view! {
                        <option
                            value=interval.as_secs().to_string()
                            selected=move || state.with(|state| state.refresh_interval() == interval)
                        >
                            {interval.to_string()}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

#[component]
fn RefreshButton(state: Signal<DashboardState>, refresh: Callback<()>) -> impl IntoView {
    let is_loading = move || state.with(DashboardState::is_loading);

    view! {
        <button
            on:click=move |_| refresh.call(())
            disabled=is_loading
            aria-busy=move || is_loading().to_string()
        >
            {move || if is_loading() { "Refreshing..." } else { "Refresh" }}
        </button>
    }
}

#[component]
fn StatusBar(state: Signal<DashboardState>, api_base_url: String) -> impl IntoView {
    let connectivity = move || state.with(DashboardState::connectivity);
    let last_updated = move || {
        state.with(DashboardState::last_updated).map(|last_updated| {
            let last_updated = display_time(last_updated.with_timezone(&Local));
            view! { <small>"Last updated: " {last_updated}</small> }
        })
    };

    view! {
        <section class="grid">
            <div>
                <mark class:connected=move || connectivity() == Connectivity::Connected>
                    {move || match connectivity() {
                        Connectivity::Connected => "Connected",
                        Connectivity::ConnectionError => "Connection Error",
                    }}
                </mark>
                " "
                {last_updated}
            </div>
            <small>"API: " {api_base_url}</small>
        </section>
    }
}

#[component]
fn ErrorBanner(state: Signal<DashboardState>, refresh: Callback<()>) -> impl IntoView {
    move || {
        state
            .with(|state| state.error().map(str::to_string))
            .map(|error| {
                view! {
                    <article role="alert">
                        <strong>"Error Loading Data"</strong>
                        <p>{error}</p>
                        <button class="secondary" on:click=move |_| refresh.call(())>
                            "Try Again"
                        </button>
                    </article>
                }
            })
    }
}

#[component]
fn DataCard(state: Signal<DashboardState>) -> impl IntoView {
    let UseIntervalReturn { counter, .. } = use_interval(1000_u64);

    move || {
        if state.with(DashboardState::is_loading) {
            return view! {
                <article>
                    <Spinner />
                </article>
            }
            .into_view();
        }

        match state.with(|state| state.document().cloned()) {
            Some(document) => view! { <DocumentDetails document ticks=counter /> }.into_view(),
            None => view! {
                <article>
                    <p>"No data available"</p>
                    <small>"No MQTT documents found"</small>
                </article>
            }
            .into_view(),
        }
    }
}

#[component]
fn DocumentDetails(document: TelemetryDocument, ticks: Signal<u64>) -> impl IntoView {
    let payload = document.payload.unwrap_or_default();
    let received_at = document.publish_received_at;
    let received_relative = move || {
        // Re-evaluated every tick so the relative time keeps moving
        let _ = ticks.get();
        format_relative(received_at)
    };

    let heart_beat_rate = payload.heart_beat_rate.as_ref().map(|rate| {
        view! {
            <p>
                "Heart Beat Rate: " <strong>{rate.to_string()}</strong> " bpm"
            </p>
        }
    });
    let payload_time = payload.timestamp_ms().map(|timestamp_ms| {
        view! { <p>"Payload Timestamp: " {format_absolute(Some(timestamp_ms))}</p> }
    });
    let raw_payload = payload.to_pretty_json();

    view! {
        <article>
            <header>
                <strong>"Latest MQTT Data"</strong>
                " "
                <small>"Live"</small>
            </header>

            <label>"Document ID"</label>
            <code>{document.id.unwrap_or_default()}</code>

            <h6>"Payload Data"</h6>
            {heart_beat_rate}
            {payload_time}
            <details>
                <summary>"View Raw Payload"</summary>
                <pre>{raw_payload}</pre>
            </details>

            <h6>"Received At"</h6>
            <p>"Date & Time: " {format_absolute(received_at)}</p>
            <p>"Date (UTC): " {format_date_only(received_at)}</p>
            <p>"Local time: " {format_time_only(received_at)}</p>
            <p>"Relative: " {received_relative}</p>

            <footer>
                <small>"Last updated: " {received_relative}</small>
            </footer>
        </article>
    }
}

#[component]
fn SystemInfo(
    state: Signal<DashboardState>,
    backend_reachable: Resource<(), bool>,
) -> impl IntoView {
    let status = move || {
        if state.with(|state| state.error().is_some()) {
            "Error"
        } else {
            "Active"
        }
    };
    let last_update = move || {
        state.with(DashboardState::last_updated).map_or_else(
            || "Never".to_string(),
            |last_updated| display_time(last_updated.with_timezone(&Local)),
        )
    };
    let backend = move || match backend_reachable.get() {
        None => "Checking...",
        Some(true) => "Reachable",
        Some(false) => "Unreachable",
    };

    view! {
        <article>
            <header>
                <strong>"System Info"</strong>
            </header>
            <p>"Auto-refresh: " {move || state.with(DashboardState::auto_refresh_label)}</p>
            <p>"Status: " {status}</p>
            <p>"Last Update: " {last_update}</p>
            <p>"Backend docs: " {backend}</p>
        </article>
    }
}
