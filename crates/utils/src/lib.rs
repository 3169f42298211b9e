pub mod clock;
pub mod logging;
pub mod response;
pub mod rotation;
