use leptos::{
    create_local_resource, create_signal, on_cleanup, store_value, Callback, Resource, Signal,
    SignalSet,
};

use crate::config::Config;
use crate::executor::BrowserExecutor;
use crate::request::HttpDocumentClient;

use super::controller::DashboardController;
use super::state::{DashboardState, RefreshInterval};

pub struct CreateDashboardReturn {
    pub state: Signal<DashboardState>,
    pub api_base_url: String,
    pub backend_reachable: Resource<(), bool>,

    pub refresh: Callback<()>,
    pub toggle_auto_refresh: Callback<()>,
    pub set_refresh_interval: Callback<RefreshInterval>,
}

pub fn create_dashboard(config: &Config) -> CreateDashboardReturn {
    let client = HttpDocumentClient::new(config);
    let api_base_url = client.base_url().to_string();

    let health_client = client.clone();
    let backend_reachable = create_local_resource(
        || (),
        move |()| {
            let client = health_client.clone();
            async move { client.health_check().await }
        },
    );

    let (state, set_state) = create_signal(DashboardState::default());

    let mut controller = DashboardController::new(client, BrowserExecutor);
    controller.subscribe(move |state| set_state.set(state.clone()));
    controller.mount();

    let controller = store_value(controller);
    on_cleanup(move || {
        controller.try_update_value(DashboardController::teardown);
    });

    let refresh = Callback::new(move |()| controller.with_value(DashboardController::refresh));
    let toggle_auto_refresh = Callback::new(move |()| {
        controller.update_value(DashboardController::toggle_auto_refresh);
    });
    let set_refresh_interval = Callback::new(move |interval: RefreshInterval| {
        controller.update_value(|controller| controller.set_refresh_interval(interval));
    });

    CreateDashboardReturn {
        state: state.into(),
        api_base_url,
        backend_reachable,

        refresh,
        toggle_auto_refresh,
        set_refresh_interval,
    }
}
