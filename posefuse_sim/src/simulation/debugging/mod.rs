pub mod state_error;
