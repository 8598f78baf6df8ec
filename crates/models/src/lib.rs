pub mod bet;
pub mod decision;
pub mod error;
pub mod events;
pub mod game_state;
pub mod money;
pub mod seed;
pub mod session;
pub mod vault;

pub use bet::*;
pub use decision::*;
pub use error::*;
pub use events::*;
pub use game_state::*;
pub use money::*;
pub use seed::*;
pub use session::*;
pub use vault::*;
