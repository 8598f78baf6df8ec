use diceforge_models::bet::BetType;
use diceforge_models::game_state::GameState;
use diceforge_models::money::Money;

/// Everything a strategy needs to decide the next bet. Borrowed for the
/// duration of one `decide()` call; strategies never hold on to it.
pub struct DecisionContext<'a> {
    pub game_state: &'a GameState,
    pub base_bet: Money,
    pub base_multiplier: f64,
    pub min_bet: Money,
    pub max_bet: Money,
    /// The bet direction a progression calls "home". Parking flips around
    /// this rather than mutating a progression's own state.
    pub default_bet_type: BetType,
}
