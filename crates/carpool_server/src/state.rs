use std::sync::Arc;

use tracing::info;

use carpool_core::optimizer::CarpoolOptimizer;
use carpool_core::privacy::VisibilityChain;
use carpool_core::routing::{HaversineRouteProvider, RouteProvider};
use carpool_core::seed::{seed_store, SeedParams};
use carpool_core::store::{EventStore, InMemoryStore};

use super::config::ServerArgs;

/// Shared application state: the seeded store, the optimizer built over it,
/// and the participant visibility chain.
pub struct AppState {
    pub store: Arc<InMemoryStore>,
    pub optimizer: CarpoolOptimizer,
    pub privacy: VisibilityChain,
}

impl AppState {
    pub fn new(args: &ServerArgs) -> Arc<Self> {
        let params = SeedParams::default()
            .with_num_users(args.seed_users)
            .with_seed(args.seed);
        let store = Arc::new(seed_store(&params));
        info!(users = args.seed_users, seed = args.seed, "seeded demo store");

        let provider = build_provider(args);
        let optimizer =
            CarpoolOptimizer::new(store.clone() as Arc<dyn EventStore>, provider);

        Arc::new(Self {
            store,
            optimizer,
            privacy: VisibilityChain::participants(),
        })
    }
}

#[cfg(feature = "mapbox")]
fn build_provider(args: &ServerArgs) -> Box<dyn RouteProvider> {
    use carpool_core::routing::mapbox::MapboxRouteProvider;

    match &args.mapbox_token {
        Some(token) => {
            info!("routing via Mapbox Directions");
            Box::new(MapboxRouteProvider::new(token.clone()))
        }
        None => {
            info!("no Mapbox token configured, using straight-line estimates");
            Box::new(HaversineRouteProvider)
        }
    }
}

#[cfg(not(feature = "mapbox"))]
fn build_provider(_args: &ServerArgs) -> Box<dyn RouteProvider> {
    info!("built without the mapbox feature, using straight-line estimates");
    Box::new(HaversineRouteProvider)
}
