//! 시스템 전반에서 사용되는 공통 타입.

mod interval;
mod sample;
mod window;

pub use interval::*;
pub use sample::*;
pub use window::*;
