pub mod controller;
pub mod domain;
pub mod ports;
pub mod view;

pub use controller::{Action, Controller, ControllerState, KeyCommand, ReviewInput};
pub use domain::{BootData, Puzzle, Review, ReviewSubmission, Session};
pub use ports::{AuthService, PortError, PortResult, PuzzleStore, ReviewGateway};
pub use view::Node;
