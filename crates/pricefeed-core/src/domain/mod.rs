//! 가격 이력 도메인 모델 및 외부 협력자 추상화.

mod backfill;
mod clock;
mod history_provider;

pub use backfill::*;
pub use clock::*;
pub use history_provider::*;
