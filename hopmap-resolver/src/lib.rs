pub mod error;
pub mod extract;
pub mod lookup;
pub mod record;
pub mod resolver;

pub use error::ResolveError;
pub use lookup::{GeoLookup, IpApiClient};
pub use record::{GeoPoint, HopRecord, Location};
pub use resolver::{Resolver, resolve_sequential};
