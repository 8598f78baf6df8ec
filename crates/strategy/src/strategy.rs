use diceforge_models::bet::BetResult;
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adaptive::AdaptiveState;
use crate::composite::CompositeState;
use crate::context::DecisionContext;
use crate::metrics::Metrics;
use crate::parking::ParkingState;
use crate::progression::{DAlembertState, FibonacciState, FlatState, MartingaleState, ParoliState};

/// The sum type every bet-deciding unit is expressed as. A tagged enum
/// rather than `dyn Trait`: every variant is known up front, serialises
/// directly, and match exhaustiveness catches a missed case at compile time
/// instead of at a vtable call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StrategyKind {
    Flat(FlatState),
    Martingale(MartingaleState),
    Fibonacci(FibonacciState),
    DAlembert(DAlembertState),
    Paroli(ParoliState),
    Composite(CompositeState),
    Adaptive(AdaptiveState),
    Parking(ParkingState),
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat(_) => "flat",
            Self::Martingale(_) => "martingale",
            Self::Fibonacci(_) => "fibonacci",
            Self::DAlembert(_) => "dalembert",
            Self::Paroli(_) => "paroli",
            Self::Composite(_) => "composite",
            Self::Adaptive(_) => "adaptive",
            Self::Parking(_) => "parking",
        }
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>) -> BetDecision {
        match self {
            Self::Flat(s) => s.decide(ctx),
            Self::Martingale(s) => s.decide(ctx),
            Self::Fibonacci(s) => s.decide(ctx),
            Self::DAlembert(s) => s.decide(ctx),
            Self::Paroli(s) => s.decide(ctx),
            Self::Composite(s) => s.decide(ctx),
            Self::Adaptive(s) => s.decide(ctx),
            Self::Parking(s) => s.decide(ctx),
        }
    }

    pub fn update(&mut self, result: &BetResult) {
        match self {
            Self::Flat(s) => s.update(result),
            Self::Martingale(s) => s.update(result),
            Self::Fibonacci(s) => s.update(result),
            Self::DAlembert(s) => s.update(result),
            Self::Paroli(s) => s.update(result),
            Self::Composite(s) => s.update(result),
            Self::Adaptive(s) => s.update(result),
            Self::Parking(s) => s.update(result),
        }
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        match self {
            Self::Flat(s) => s.on_alt_action(action),
            Self::Martingale(s) => s.on_alt_action(action),
            Self::Fibonacci(s) => s.on_alt_action(action),
            Self::DAlembert(s) => s.on_alt_action(action),
            Self::Paroli(s) => s.on_alt_action(action),
            Self::Composite(s) => s.on_alt_action(action),
            Self::Adaptive(s) => s.on_alt_action(action),
            Self::Parking(s) => s.on_alt_action(action),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Flat(s) => s.reset(),
            Self::Martingale(s) => s.reset(),
            Self::Fibonacci(s) => s.reset(),
            Self::DAlembert(s) => s.reset(),
            Self::Paroli(s) => s.reset(),
            Self::Composite(s) => s.reset(),
            Self::Adaptive(s) => s.reset(),
            Self::Parking(s) => s.reset(),
        }
    }

    pub fn genome(&self) -> Genome {
        let (kind, inner) = match self {
            Self::Flat(s) => ("flat", s.genome()),
            Self::Martingale(s) => ("martingale", s.genome()),
            Self::Fibonacci(s) => ("fibonacci", s.genome()),
            Self::DAlembert(s) => ("dalembert", s.genome()),
            Self::Paroli(s) => ("paroli", s.genome()),
            Self::Composite(s) => ("composite", s.genome()),
            Self::Adaptive(s) => ("adaptive", s.genome()),
            Self::Parking(s) => ("parking", s.genome()),
        };
        let mut genome = inner;
        genome.insert("kind".to_string(), json!(kind));
        genome
    }
}

/// A strategy plus the bookkeeping every strategy accrues the same way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub metrics: Metrics,
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            metrics: Metrics::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>) -> BetDecision {
        self.kind.decide(ctx)
    }

    pub fn update(&mut self, decision: &BetDecision, result: &BetResult) {
        self.metrics.record(decision, result);
        self.kind.update(result);
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        self.kind.on_alt_action(action);
    }

    pub fn reset(&mut self) {
        self.metrics = Metrics::default();
        self.kind.reset();
    }

    pub fn genome(&self) -> Genome {
        self.kind.genome()
    }

    pub fn from_genome(genome: &Genome) -> Result<Self, EngineError> {
        let kind_name = genome
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::config_invalid("genome.kind", "missing", "no kind tag in genome"))?;

        let kind = match kind_name {
            "flat" => FlatState::from_genome(genome).map(StrategyKind::Flat),
            "martingale" => MartingaleState::from_genome(genome).map(StrategyKind::Martingale),
            "fibonacci" => FibonacciState::from_genome(genome).map(StrategyKind::Fibonacci),
            "dalembert" => DAlembertState::from_genome(genome).map(StrategyKind::DAlembert),
            "paroli" => ParoliState::from_genome(genome).map(StrategyKind::Paroli),
            other => {
                return Err(EngineError::config_invalid(
                    "genome.kind",
                    other,
                    "composite/adaptive/parking genomes are not reconstructible standalone",
                ))
            }
        }
        .ok_or_else(|| EngineError::config_invalid("genome", kind_name, "malformed genome fields"))?;

        Ok(Self::new(kind))
    }
}
