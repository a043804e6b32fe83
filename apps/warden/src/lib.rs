// [apps/warden/src/lib.rs]

pub mod kernel;
pub mod tasks;

pub mod prelude {
    pub use crate::kernel::{WardenKernel, WardenRole};
}
// FIN DEL ARCHIVO [apps/warden/src/lib.rs]
