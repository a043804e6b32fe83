// [apps/gateway/src/lib.rs]

pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod schemas;
pub mod state;

pub mod prelude {
    pub use crate::kernel::GatewayKernel;
    pub use crate::routes::create_analytics_router;
    pub use crate::state::AppState;
}
// FIN DEL ARCHIVO [apps/gateway/src/lib.rs]
