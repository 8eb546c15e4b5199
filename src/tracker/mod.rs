mod controller;
mod state;


pub use controller::{LifecycleController, SideEffect};
pub use state::UserState;
