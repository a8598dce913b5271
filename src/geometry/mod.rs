pub mod coordinate;
pub mod heading;
pub mod region;

pub use coordinate::{Coordinate, GeometryError};
pub use heading::Heading;
pub use region::Region;
