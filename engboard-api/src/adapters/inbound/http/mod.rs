mod responses;
mod service_factory;

pub use responses::*;
pub use service_factory::ServiceFactory;
