//! Port definitions implemented by the infrastructure layer.

mod resolver_port;
mod rest_port;

pub use resolver_port::ResourceResolver;
pub use rest_port::RestPort;

#[cfg(test)]
pub use rest_port::MockRestPort;
#[cfg(test)]
pub use rest_port::mock::RecordingRestPort;
