/*!
 * Driver Module
 * Connection management and handle-to-connection resolution
 */

mod connection;
mod manager;
mod resolver;
pub mod traits;

pub use connection::ConnectionState;
pub use manager::Driver;
pub use resolver::{HandleResolver, ResolvedConnection};
pub use traits::ResolveHandle;
