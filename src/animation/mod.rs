mod animatable;
mod relax;

pub use animatable::Animatable;
pub use relax::{AdvanceResult, RelaxState, Settle};
