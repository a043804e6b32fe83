// [apps/gateway/src/handlers/mod.rs]

pub mod analytics;
// FIN DEL ARCHIVO [apps/gateway/src/handlers/mod.rs]
