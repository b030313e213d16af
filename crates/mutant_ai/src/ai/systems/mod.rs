//! AI systems (lifecycle, FSM tick, state actions)

pub mod actions;
pub mod fsm;
pub mod lifecycle;

pub use actions::{
    change_state, enter_state, exit_state, face_towards, force_dead, update_state, StateContext,
    StateUpdate,
};
pub use fsm::{ai_fsm_tick, evaluate_transition, Observation};
pub use lifecycle::{initialize_agents, require_link};
