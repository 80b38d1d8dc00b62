pub mod routing;
pub mod topology;
