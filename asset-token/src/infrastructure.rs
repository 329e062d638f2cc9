pub mod certificate;
pub mod logging;
pub mod pem_utils;
