mod distance_vector;
mod link_state;
mod path;
mod traits;

pub use distance_vector::{compute_distance_vector, DistanceVectorEngine};
pub use link_state::{compute_link_state, LinkStateEngine};
pub use path::reconstruct_path;
pub use traits::{check_source, RouteComputeEngine};
