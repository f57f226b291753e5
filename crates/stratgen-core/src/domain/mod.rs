//! 파이프라인 도메인 모델.

mod artifact;
mod outcome;
mod params;
mod request;
mod result;

pub use artifact::*;
pub use outcome::*;
pub use params::*;
pub use request::*;
pub use result::*;
